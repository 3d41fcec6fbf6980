use crate::infra::load_predictor;
use clap::Args;
use nutriscan::config::AppConfig;
use nutriscan::error::AppError;
use nutriscan::nutrients::NutrientDocument;
use nutriscan::predictor::RawNutrients;
use nutriscan::product::OpenFoodFactsClient;
use nutriscan::scan::build_scan_report;
use nutriscan::scoring::HealthScorer;
use serde_json::Value;
use std::fs;
use std::path::PathBuf;

#[derive(Args, Debug)]
pub(crate) struct PredictArgs {
    /// Sugar per 100 g
    #[arg(long)]
    pub(crate) sugar: String,
    /// Fat per 100 g
    #[arg(long)]
    pub(crate) fat: String,
    /// Sodium per 100 g
    #[arg(long)]
    pub(crate) sodium: String,
    /// Protein per 100 g
    #[arg(long)]
    pub(crate) protein: String,
}

#[derive(Args, Debug)]
pub(crate) struct ScoreArgs {
    /// JSON file holding a nutriments object or a whole product document
    pub(crate) file: PathBuf,
}

#[derive(Args, Debug)]
pub(crate) struct ScanArgs {
    /// Product barcode (EAN/UPC)
    pub(crate) barcode: String,
}

pub(crate) fn run_predict(args: PredictArgs) -> Result<(), AppError> {
    let config = AppConfig::load()?;
    let predictor = load_predictor(&config.artifacts)?;

    let input = RawNutrients::new(args.sugar, args.fat, args.sodium, args.protein);
    let prediction = predictor.predict(&input)?;

    println!("Predicted label: {}", prediction.label);
    println!("- decoded via {:?} stage", prediction.stage);
    println!("- model: {}", predictor.classifier_path().display());
    Ok(())
}

pub(crate) fn run_score(args: ScoreArgs) -> Result<(), AppError> {
    let config = AppConfig::load()?;
    let raw = fs::read_to_string(&args.file)?;
    let document = nutriments_of(serde_json::from_str(&raw)?);

    let outcome = HealthScorer::new(config.scoring).score(&document);

    println!("Health score: {} ({})", outcome.health_score, outcome.result);
    if outcome.warnings.is_empty() {
        println!("- no warnings");
    }
    for warning in &outcome.warnings {
        println!("- {warning}");
    }
    Ok(())
}

pub(crate) async fn run_scan(args: ScanArgs) -> Result<(), AppError> {
    let config = AppConfig::load()?;
    let predictor = load_predictor(&config.artifacts)?;
    let scorer = HealthScorer::new(config.scoring.clone());
    let client = OpenFoodFactsClient::new(&config.product_api)?;

    let product = client
        .fetch_product(&args.barcode)
        .await
        .ok_or(AppError::ProductNotFound)?;
    let report = build_scan_report(&product, &predictor, &scorer);

    println!("{}", serde_json::to_string_pretty(&report)?);
    Ok(())
}

/// Accepts either a bare nutriments object or a product carrying one.
fn nutriments_of(document: Value) -> NutrientDocument {
    match document {
        Value::Object(mut fields) if fields.get("nutriments").is_some_and(Value::is_object) => {
            NutrientDocument::from_value(fields.remove("nutriments").unwrap_or_default())
        }
        other => NutrientDocument::from_value(other),
    }
}
