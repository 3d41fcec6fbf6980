use super::{argmax, ensure_classes, ClassLabel, Classifier, ModelValidationError, RawPrediction};
use crate::nutrients::{FeatureRow, FEATURE_COUNT};
use serde::Deserialize;

/// Per-column standardization applied before the linear model.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct StandardScaler {
    pub mean: FeatureRow,
    pub scale: FeatureRow,
}

impl StandardScaler {
    fn transform(&self, row: &FeatureRow) -> FeatureRow {
        let mut scaled = [0.0; FEATURE_COUNT];
        for (column, value) in scaled.iter_mut().enumerate() {
            *value = (row[column] - self.mean[column]) / self.scale[column];
        }
        scaled
    }
}

/// Linear classifier. With two classes and a single coefficient row the
/// model is binary and a positive decision value selects the second class.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct LogisticRegression {
    pub classes: Vec<ClassLabel>,
    pub coef: Vec<FeatureRow>,
    pub intercept: Vec<f64>,
    #[serde(default)]
    pub scaler: Option<StandardScaler>,
}

impl LogisticRegression {
    pub fn validate(&self) -> Result<(), ModelValidationError> {
        ensure_classes(&self.classes)?;

        if self.classes.len() < 2 {
            return Err(ModelValidationError::Shape(format!(
                "logistic regression needs at least 2 classes, found {}",
                self.classes.len()
            )));
        }

        if self.coef.len() != self.intercept.len() {
            return Err(ModelValidationError::Shape(format!(
                "{} coefficient rows but {} intercepts",
                self.coef.len(),
                self.intercept.len()
            )));
        }

        let binary = self.classes.len() == 2 && self.coef.len() == 1;
        if !binary && self.coef.len() != self.classes.len() {
            return Err(ModelValidationError::Shape(format!(
                "{} coefficient rows for {} classes",
                self.coef.len(),
                self.classes.len()
            )));
        }

        if let Some(scaler) = &self.scaler {
            if scaler.scale.iter().any(|scale| *scale == 0.0) {
                return Err(ModelValidationError::Shape(
                    "scaler has a zero scale column".to_string(),
                ));
            }
        }

        Ok(())
    }

    fn decision(&self, row: &FeatureRow) -> Vec<f64> {
        let row = match &self.scaler {
            Some(scaler) => scaler.transform(row),
            None => *row,
        };

        self.coef
            .iter()
            .zip(&self.intercept)
            .map(|(weights, intercept)| {
                weights
                    .iter()
                    .zip(row.iter())
                    .map(|(weight, value)| weight * value)
                    .sum::<f64>()
                    + intercept
            })
            .collect()
    }

    fn predict_row(&self, row: &FeatureRow) -> ClassLabel {
        let decision = self.decision(row);
        let index = if decision.len() == 1 {
            usize::from(decision[0] > 0.0)
        } else {
            argmax(&decision)
        };
        self.classes[index].clone()
    }
}

impl Classifier for LogisticRegression {
    fn predict(&self, rows: &[FeatureRow]) -> RawPrediction {
        RawPrediction::Batch(rows.iter().map(|row| self.predict_row(row)).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn binary_model_thresholds_decision_at_zero() {
        let model: LogisticRegression = serde_json::from_value(json!({
            "classes": [0, 1],
            "coef": [[0.5, 0.0, 0.0, 0.0]],
            "intercept": [-5.0]
        }))
        .expect("decodes");
        model.validate().expect("valid");

        let prediction = model.predict(&[[4.0, 0.0, 0.0, 0.0], [12.0, 0.0, 0.0, 0.0]]);

        assert_eq!(
            prediction,
            RawPrediction::Batch(vec![ClassLabel::Code(0), ClassLabel::Code(1)])
        );
    }

    #[test]
    fn multinomial_model_applies_scaler() {
        let model: LogisticRegression = serde_json::from_value(json!({
            "classes": ["Healthy", "Moderate", "Unhealthy"],
            "coef": [
                [-1.0, 0.0, 0.0, 0.0],
                [0.0, 0.0, 0.0, 0.0],
                [1.0, 0.0, 0.0, 0.0]
            ],
            "intercept": [0.0, 0.5, 0.0],
            "scaler": { "mean": [10.0, 0.0, 0.0, 0.0], "scale": [5.0, 1.0, 1.0, 1.0] }
        }))
        .expect("decodes");
        model.validate().expect("valid");

        let prediction = model.predict(&[[0.0, 0.0, 0.0, 0.0], [10.0, 0.0, 0.0, 0.0]]);

        assert_eq!(
            prediction,
            RawPrediction::Batch(vec![
                ClassLabel::Text("Healthy".to_string()),
                ClassLabel::Text("Moderate".to_string()),
            ])
        );
    }

    #[test]
    fn mismatched_shapes_are_rejected() {
        let model: LogisticRegression = serde_json::from_value(json!({
            "classes": [0, 1, 2],
            "coef": [[1.0, 0.0, 0.0, 0.0]],
            "intercept": [0.0]
        }))
        .expect("decodes");

        assert!(matches!(
            model.validate(),
            Err(ModelValidationError::Shape(_))
        ));
    }

    #[test]
    fn single_class_model_is_rejected() {
        let model: LogisticRegression = serde_json::from_value(json!({
            "classes": [0],
            "coef": [[1.0, 0.0, 0.0, 0.0]],
            "intercept": [0.0]
        }))
        .expect("decodes");

        assert!(matches!(
            model.validate(),
            Err(ModelValidationError::Shape(_))
        ));
    }
}
