//! Classifier-backed health label prediction.

use crate::artifacts::{load_artifact, ArtifactCandidates, ArtifactError, ArtifactSource, LoadedArtifact};
use crate::model::{ClassLabel, Classifier, LabelEncoder, RawPrediction};
use crate::nutrients::{coerce_f64, FeatureRow, NutrientVector, FEATURE_COUNT, FEATURE_NAMES};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;
use std::path::Path;
use tracing::info;

/// Four loosely typed nutrient values as received from a caller.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RawNutrients {
    #[serde(default)]
    pub sugar: Value,
    #[serde(default)]
    pub fat: Value,
    #[serde(default)]
    pub sodium: Value,
    #[serde(default)]
    pub protein: Value,
}

impl RawNutrients {
    pub fn new(
        sugar: impl Into<Value>,
        fat: impl Into<Value>,
        sodium: impl Into<Value>,
        protein: impl Into<Value>,
    ) -> Self {
        Self {
            sugar: sugar.into(),
            fat: fat.into(),
            sodium: sodium.into(),
            protein: protein.into(),
        }
    }

    fn values(&self) -> [&Value; FEATURE_COUNT] {
        [&self.sugar, &self.fat, &self.sodium, &self.protein]
    }

    /// Coerces all four values or reports every field that failed.
    pub fn to_row(&self) -> Result<FeatureRow, PredictError> {
        let mut row = [0.0; FEATURE_COUNT];
        let mut rejected = Vec::new();

        for (column, value) in self.values().into_iter().enumerate() {
            match coerce_f64(value) {
                Some(number) => row[column] = number,
                None => rejected.push(FEATURE_NAMES[column]),
            }
        }

        if rejected.is_empty() {
            Ok(row)
        } else {
            Err(PredictError::InvalidNumericInput { rejected })
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PredictError {
    #[error("Inputs must be numeric: sugar, fat, sodium, protein (rejected: {})", .rejected.join(", "))]
    InvalidNumericInput { rejected: Vec<&'static str> },
    #[error("Input contains NaN or infinity (fields: {})", .rejected.join(", "))]
    NonFiniteInput { rejected: Vec<&'static str> },
}

/// Rejects rows the classifier cannot evaluate meaningfully.
fn ensure_finite(row: FeatureRow) -> Result<FeatureRow, PredictError> {
    let rejected: Vec<&'static str> = row
        .iter()
        .zip(FEATURE_NAMES)
        .filter(|(value, _)| !value.is_finite())
        .map(|(_, name)| name)
        .collect();

    if rejected.is_empty() {
        Ok(row)
    } else {
        Err(PredictError::NonFiniteInput { rejected })
    }
}

/// Ordered strategies for turning a raw prediction into a label.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DecodeStage {
    /// Inverse-map through the label encoder.
    Encoder,
    /// First element of a sequence-shaped raw prediction.
    FirstRaw,
    /// The raw prediction as-is.
    WholeRaw,
}

impl DecodeStage {
    pub const CHAIN: [DecodeStage; 3] = [
        DecodeStage::Encoder,
        DecodeStage::FirstRaw,
        DecodeStage::WholeRaw,
    ];

    /// Applies this stage alone; `None` hands over to the next stage.
    pub fn apply(&self, encoder: &LabelEncoder, raw: &RawPrediction) -> Option<ModelLabel> {
        match self {
            DecodeStage::Encoder => encoder
                .inverse_transform(raw.labels())
                .ok()
                .and_then(|decoded| decoded.into_iter().next())
                .map(ModelLabel::Decoded),
            DecodeStage::FirstRaw => match raw {
                RawPrediction::Batch(labels) => labels.first().cloned().map(ModelLabel::Class),
                RawPrediction::Single(_) => None,
            },
            DecodeStage::WholeRaw => Some(match raw {
                RawPrediction::Single(label) => ModelLabel::Class(label.clone()),
                RawPrediction::Batch(_) => ModelLabel::Raw(raw.clone()),
            }),
        }
    }
}

/// Label returned by the predictor.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum ModelLabel {
    Decoded(String),
    Class(ClassLabel),
    Raw(RawPrediction),
}

impl fmt::Display for ModelLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ModelLabel::Decoded(label) => f.write_str(label),
            ModelLabel::Class(label) => write!(f, "{label}"),
            ModelLabel::Raw(raw) => write!(f, "{raw}"),
        }
    }
}

/// Predicted label and the decode stage that produced it.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Prediction {
    pub label: ModelLabel,
    pub stage: DecodeStage,
}

/// Runs decode stages in order and keeps the first that yields a label.
pub fn decode_prediction(encoder: &LabelEncoder, raw: &RawPrediction) -> Prediction {
    for stage in DecodeStage::CHAIN {
        if let Some(label) = stage.apply(encoder, raw) {
            return Prediction { label, stage };
        }
    }

    Prediction {
        label: ModelLabel::Raw(raw.clone()),
        stage: DecodeStage::WholeRaw,
    }
}

/// Owns the loaded classifier and label encoder for the process lifetime.
/// Read-only after construction and safe to share across request handlers.
#[derive(Debug)]
pub struct HealthPredictor {
    classifier: LoadedArtifact<Box<dyn Classifier>>,
    encoder: LoadedArtifact<LabelEncoder>,
}

impl HealthPredictor {
    pub fn new(
        classifier: LoadedArtifact<Box<dyn Classifier>>,
        encoder: LoadedArtifact<LabelEncoder>,
    ) -> Self {
        Self {
            classifier,
            encoder,
        }
    }

    /// Loads both artifacts from their candidate lists. Any failure is fatal
    /// for the caller's startup.
    pub fn load(
        candidates: &ArtifactCandidates,
        source: &dyn ArtifactSource,
    ) -> Result<Self, ArtifactError> {
        let classifier = load_artifact::<Box<dyn Classifier>>(&candidates.classifier, source)?;
        let encoder = load_artifact::<LabelEncoder>(&candidates.encoder, source)?;

        info!(path = %classifier.path().display(), "loaded model");
        info!(path = %encoder.path().display(), "loaded label encoder");

        Ok(Self::new(classifier, encoder))
    }

    pub fn classifier_path(&self) -> &Path {
        self.classifier.path()
    }

    pub fn encoder_path(&self) -> &Path {
        self.encoder.path()
    }

    /// Validates the input before touching the classifier; decoding never fails.
    pub fn predict(&self, input: &RawNutrients) -> Result<Prediction, PredictError> {
        let row = ensure_finite(input.to_row()?)?;
        Ok(self.predict_row(row))
    }

    /// Predicts from already-coerced nutrients. Only non-finite values fail.
    pub fn predict_vector(&self, vector: &NutrientVector) -> Result<Prediction, PredictError> {
        let row = ensure_finite(vector.as_row())?;
        Ok(self.predict_row(row))
    }

    fn predict_row(&self, row: FeatureRow) -> Prediction {
        let raw = self.classifier.value().predict(&[row]);
        decode_prediction(self.encoder.value(), &raw)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn encoder() -> LabelEncoder {
        LabelEncoder::new(vec![
            "Healthy".to_string(),
            "Moderate".to_string(),
            "Unhealthy".to_string(),
        ])
        .expect("valid encoder")
    }

    #[test]
    fn encoder_stage_decodes_codes() {
        let raw = RawPrediction::Batch(vec![ClassLabel::Code(1)]);

        assert_eq!(
            DecodeStage::Encoder.apply(&encoder(), &raw),
            Some(ModelLabel::Decoded("Moderate".to_string()))
        );
    }

    #[test]
    fn encoder_stage_declines_text_labels() {
        let raw = RawPrediction::Batch(vec![ClassLabel::Text("Healthy".to_string())]);

        assert_eq!(DecodeStage::Encoder.apply(&encoder(), &raw), None);
    }

    #[test]
    fn first_raw_stage_only_applies_to_sequences() {
        let batch = RawPrediction::Batch(vec![ClassLabel::Code(9), ClassLabel::Code(1)]);
        let single = RawPrediction::Single(ClassLabel::Code(9));

        assert_eq!(
            DecodeStage::FirstRaw.apply(&encoder(), &batch),
            Some(ModelLabel::Class(ClassLabel::Code(9)))
        );
        assert_eq!(DecodeStage::FirstRaw.apply(&encoder(), &single), None);
    }

    #[test]
    fn chain_falls_back_to_whole_raw_value() {
        let single = RawPrediction::Single(ClassLabel::Code(7));
        let empty = RawPrediction::Batch(Vec::new());

        let from_single = decode_prediction(&encoder(), &single);
        let from_empty = decode_prediction(&encoder(), &empty);

        assert_eq!(from_single.stage, DecodeStage::WholeRaw);
        assert_eq!(from_single.label.to_string(), "7");
        assert_eq!(from_empty.stage, DecodeStage::WholeRaw);
        assert_eq!(from_empty.label, ModelLabel::Raw(empty));
    }

    #[test]
    fn row_coercion_lists_rejected_fields() {
        let input = RawNutrients::new("sweet", 3, json!(null), "4.5");

        assert_eq!(
            input.to_row(),
            Err(PredictError::InvalidNumericInput {
                rejected: vec!["sugar", "sodium"],
            })
        );
    }

    #[test]
    fn non_finite_values_are_rejected_by_name() {
        assert_eq!(
            ensure_finite([f64::INFINITY, 1.0, f64::NAN, 2.0]),
            Err(PredictError::NonFiniteInput {
                rejected: vec!["sugar", "sodium"],
            })
        );
        assert_eq!(ensure_finite([1.0, 2.0, 3.0, 4.0]), Ok([1.0, 2.0, 3.0, 4.0]));
    }

    #[test]
    fn infinite_string_parses_but_is_not_finite() {
        let row = RawNutrients::new("inf", 1, 1, 1).to_row().expect("parses");

        assert!(matches!(
            ensure_finite(row),
            Err(PredictError::NonFiniteInput { .. })
        ));
    }

    #[test]
    fn numeric_strings_are_accepted() {
        let input = RawNutrients::new("5", 3, 200, " 6 ");

        assert_eq!(input.to_row(), Ok([5.0, 3.0, 200.0, 6.0]));
    }
}
