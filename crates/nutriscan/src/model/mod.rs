//! Classifier and label-encoder representations loaded from artifacts.

mod encoder;
mod linear;
mod tree;

pub use encoder::{EncoderParseError, LabelDecodeError, LabelEncoder};
pub use linear::{LogisticRegression, StandardScaler};
pub use tree::{DecisionTree, RandomForest, TreeDocument, TreeNode};

use crate::nutrients::{FeatureRow, FEATURE_COUNT, FEATURE_NAMES};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;

/// Estimator names this build knows how to evaluate.
pub const SUPPORTED_ESTIMATORS: [&str; 3] =
    ["decision_tree", "random_forest", "logistic_regression"];

/// Class value as stored in a model: an encoded integer or a readable label.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ClassLabel {
    Code(i64),
    Text(String),
}

impl fmt::Display for ClassLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ClassLabel::Code(code) => write!(f, "{code}"),
            ClassLabel::Text(text) => f.write_str(text),
        }
    }
}

/// Raw classifier output before label decoding.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum RawPrediction {
    Batch(Vec<ClassLabel>),
    Single(ClassLabel),
}

impl RawPrediction {
    pub fn labels(&self) -> &[ClassLabel] {
        match self {
            RawPrediction::Batch(labels) => labels,
            RawPrediction::Single(label) => std::slice::from_ref(label),
        }
    }
}

impl fmt::Display for RawPrediction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RawPrediction::Single(label) => write!(f, "{label}"),
            RawPrediction::Batch(labels) => {
                let joined: Vec<String> = labels.iter().map(ToString::to_string).collect();
                write!(f, "[{}]", joined.join(", "))
            }
        }
    }
}

/// Prediction seam over a loaded model. Implementations must be reentrant.
pub trait Classifier: Send + Sync + fmt::Debug {
    fn predict(&self, rows: &[FeatureRow]) -> RawPrediction;
}

#[derive(Debug, thiserror::Error, PartialEq)]
pub enum ModelValidationError {
    #[error("model declares no classes")]
    NoClasses,
    #[error("feature_names {found:?} do not match the expected columns {expected:?}")]
    FeatureNames {
        found: Vec<String>,
        expected: [&'static str; FEATURE_COUNT],
    },
    #[error("tree {tree}, node {node}: {detail}")]
    Tree {
        tree: usize,
        node: usize,
        detail: String,
    },
    #[error("{0}")]
    Shape(String),
}

#[derive(Debug, Deserialize)]
#[serde(tag = "estimator", rename_all = "snake_case")]
enum ClassifierDocument {
    DecisionTree(DecisionTree),
    RandomForest(RandomForest),
    LogisticRegression(LogisticRegression),
}

/// Outcome of decoding a classifier document.
#[derive(Debug)]
pub enum ParsedClassifier {
    Ready(Box<dyn Classifier>),
    /// The document names an estimator this build cannot evaluate.
    Unsupported(String),
}

/// Parses and validates a classifier document.
pub fn parse_classifier(document: Value) -> Result<ParsedClassifier, ClassifierParseError> {
    let estimator = document
        .get("estimator")
        .and_then(Value::as_str)
        .ok_or(ClassifierParseError::MissingEstimator)?;

    if !SUPPORTED_ESTIMATORS.contains(&estimator) {
        return Ok(ParsedClassifier::Unsupported(estimator.to_string()));
    }

    if let Some(names) = document.get("feature_names") {
        let found: Vec<String> = serde_json::from_value(names.clone())?;
        if found.iter().map(String::as_str).ne(FEATURE_NAMES.iter().copied()) {
            return Err(ModelValidationError::FeatureNames {
                found,
                expected: FEATURE_NAMES,
            }
            .into());
        }
    }

    let classifier: Box<dyn Classifier> = match serde_json::from_value(document)? {
        ClassifierDocument::DecisionTree(model) => {
            model.validate()?;
            Box::new(model)
        }
        ClassifierDocument::RandomForest(model) => {
            model.validate()?;
            Box::new(model)
        }
        ClassifierDocument::LogisticRegression(model) => {
            model.validate()?;
            Box::new(model)
        }
    };

    Ok(ParsedClassifier::Ready(classifier))
}

#[derive(Debug, thiserror::Error)]
pub enum ClassifierParseError {
    #[error("document has no 'estimator' field")]
    MissingEstimator,
    #[error("malformed classifier document: {0}")]
    Json(#[from] serde_json::Error),
    #[error("invalid classifier: {0}")]
    Invalid(#[from] ModelValidationError),
}

/// Index of the largest value; ties resolve to the first. NaN never wins.
pub(crate) fn argmax(values: &[f64]) -> usize {
    let mut best = 0;
    for (index, value) in values.iter().enumerate().skip(1) {
        if *value > values[best] || (values[best].is_nan() && !value.is_nan()) {
            best = index;
        }
    }
    best
}

pub(crate) fn ensure_classes(classes: &[ClassLabel]) -> Result<(), ModelValidationError> {
    if classes.is_empty() {
        return Err(ModelValidationError::NoClasses);
    }
    Ok(())
}
