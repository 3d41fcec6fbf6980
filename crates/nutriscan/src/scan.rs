//! Composes both engines into the per-barcode response.

use crate::nutrients::{NutrientDocument, NutrientVector};
use crate::predictor::HealthPredictor;
use crate::product::Product;
use crate::scoring::{HealthScorer, HealthVerdict};
use serde::Serialize;
use tracing::warn;

/// Everything returned for a scanned product.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScanReport {
    pub product_name: Option<String>,
    pub brands: Option<String>,
    pub ingredients: Option<String>,
    pub image_url: Option<String>,
    pub nutriments: NutrientDocument,
    pub model_prediction: String,
    pub health_score: i32,
    pub warnings: Vec<String>,
    pub result: HealthVerdict,
}

/// Runs the predictor and the scorer independently over one product.
///
/// A predictor failure becomes a `"Prediction error: ..."` string; scoring
/// always runs.
pub fn build_scan_report(
    product: &Product,
    predictor: &HealthPredictor,
    scorer: &HealthScorer,
) -> ScanReport {
    let vector = NutrientVector::from_document(&product.nutriments);

    let model_prediction = match predictor.predict_vector(&vector) {
        Ok(prediction) => prediction.label.to_string(),
        Err(err) => {
            warn!(error = %err, "model prediction failed");
            format!("Prediction error: {err}")
        }
    };

    let scoring = scorer.score(&product.nutriments);

    ScanReport {
        product_name: product.product_name.clone(),
        brands: product.brands.clone(),
        ingredients: product.ingredients_text.clone(),
        image_url: product.display_image().map(str::to_string),
        nutriments: product.nutriments.clone(),
        model_prediction,
        health_score: scoring.health_score,
        warnings: scoring.warnings,
        result: scoring.result,
    }
}
