use super::{ClassLabel, ModelValidationError};
use serde::Deserialize;
use serde_json::Value;
use std::collections::HashSet;

/// Maps encoded class indices back to readable labels.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LabelEncoder {
    classes: Vec<String>,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum EncoderDocument {
    Wrapped { classes: Vec<String> },
    Bare(Vec<String>),
}

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum LabelDecodeError {
    #[error("y contains previously unseen label {0}")]
    UnseenCode(i64),
    #[error("cannot decode non-integer label '{0}'")]
    NotEncoded(String),
}

impl LabelEncoder {
    pub fn new(classes: Vec<String>) -> Result<Self, ModelValidationError> {
        if classes.is_empty() {
            return Err(ModelValidationError::NoClasses);
        }

        let mut seen = HashSet::new();
        if let Some(duplicate) = classes.iter().find(|class| !seen.insert(class.as_str())) {
            return Err(ModelValidationError::Shape(format!(
                "duplicate encoder class '{duplicate}'"
            )));
        }

        Ok(Self { classes })
    }

    /// Accepts `{"classes": [...]}` or a bare array of labels.
    pub fn from_document(document: Value) -> Result<Self, EncoderParseError> {
        let classes = match serde_json::from_value(document)? {
            EncoderDocument::Wrapped { classes } | EncoderDocument::Bare(classes) => classes,
        };
        Ok(Self::new(classes)?)
    }

    pub fn classes(&self) -> &[String] {
        &self.classes
    }

    /// Decodes every label; any text label or out-of-range code fails the batch.
    pub fn inverse_transform(&self, labels: &[ClassLabel]) -> Result<Vec<String>, LabelDecodeError> {
        labels
            .iter()
            .map(|label| match label {
                ClassLabel::Code(code) => usize::try_from(*code)
                    .ok()
                    .and_then(|index| self.classes.get(index))
                    .cloned()
                    .ok_or(LabelDecodeError::UnseenCode(*code)),
                ClassLabel::Text(text) => Err(LabelDecodeError::NotEncoded(text.clone())),
            })
            .collect()
    }
}

#[derive(Debug, thiserror::Error)]
pub enum EncoderParseError {
    #[error("malformed label encoder document: {0}")]
    Json(#[from] serde_json::Error),
    #[error("invalid label encoder: {0}")]
    Invalid(#[from] ModelValidationError),
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn encoder() -> LabelEncoder {
        LabelEncoder::from_document(json!({ "classes": ["Healthy", "Moderate", "Unhealthy"] }))
            .expect("encoder decodes")
    }

    #[test]
    fn decodes_codes_in_range() {
        let decoded = encoder()
            .inverse_transform(&[ClassLabel::Code(2), ClassLabel::Code(0)])
            .expect("decodes");

        assert_eq!(decoded, vec!["Unhealthy", "Healthy"]);
    }

    #[test]
    fn rejects_unseen_and_text_labels() {
        let encoder = encoder();

        assert_eq!(
            encoder.inverse_transform(&[ClassLabel::Code(3)]),
            Err(LabelDecodeError::UnseenCode(3))
        );
        assert_eq!(
            encoder.inverse_transform(&[ClassLabel::Code(-1)]),
            Err(LabelDecodeError::UnseenCode(-1))
        );
        assert!(matches!(
            encoder.inverse_transform(&[ClassLabel::Text("Healthy".to_string())]),
            Err(LabelDecodeError::NotEncoded(_))
        ));
    }

    #[test]
    fn bare_arrays_are_accepted() {
        let encoder = LabelEncoder::from_document(json!(["a", "b"])).expect("decodes");
        assert_eq!(encoder.classes(), ["a".to_string(), "b".to_string()]);
    }

    #[test]
    fn duplicate_classes_are_rejected() {
        assert!(LabelEncoder::from_document(json!(["a", "a"])).is_err());
        assert!(LabelEncoder::from_document(json!({ "classes": [] })).is_err());
    }
}
