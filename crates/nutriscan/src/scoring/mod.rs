mod config;
mod rules;

pub use config::{ScoringConfig, Threshold, TieredThreshold};

use crate::nutrients::NutrientDocument;
use rules::{deductions, ScoreSignals};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Stateless scorer applying threshold deductions to a nutrient document.
#[derive(Debug, Clone, Default)]
pub struct HealthScorer {
    config: ScoringConfig,
}

impl HealthScorer {
    pub fn new(config: ScoringConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &ScoringConfig {
        &self.config
    }

    /// Scores the document. Never fails: missing or malformed nutrients count
    /// as zero. The score is not clamped and may go negative.
    pub fn score(&self, document: &NutrientDocument) -> ScoreResult {
        let signals = ScoreSignals::extract(document);
        let triggered = deductions(&signals, &self.config);

        let health_score = triggered
            .iter()
            .fold(self.config.baseline, |score, deduction| {
                score - deduction.penalty
            });
        let warnings = triggered
            .iter()
            .map(|deduction| deduction.warning.to_string())
            .collect();

        ScoreResult {
            health_score,
            warnings,
            result: self.verdict(health_score),
        }
    }

    fn verdict(&self, score: i32) -> HealthVerdict {
        if score >= self.config.healthy_floor {
            HealthVerdict::Healthy
        } else if score >= self.config.moderate_floor {
            HealthVerdict::Moderate
        } else {
            HealthVerdict::Unhealthy
        }
    }
}

/// Categorical outcome of rule-based scoring.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum HealthVerdict {
    Healthy,
    Moderate,
    Unhealthy,
}

impl HealthVerdict {
    pub fn label(&self) -> &'static str {
        match self {
            HealthVerdict::Healthy => "Healthy",
            HealthVerdict::Moderate => "Moderate",
            HealthVerdict::Unhealthy => "Unhealthy",
        }
    }
}

impl fmt::Display for HealthVerdict {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Score, triggered warnings in rule order, and the verdict.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoreResult {
    pub health_score: i32,
    pub warnings: Vec<String>,
    pub result: HealthVerdict,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn calories_fall_back_to_generic_energy_key() {
        let document = NutrientDocument::from_value(json!({ "energy": 400 }));

        let outcome = HealthScorer::default().score(&document);

        assert_eq!(outcome.warnings, vec!["High calories".to_string()]);
        assert_eq!(outcome.health_score, 85);
    }

    #[test]
    fn custom_config_shifts_thresholds() {
        let config = ScoringConfig {
            healthy_floor: 90,
            calories: Threshold {
                above: 100.0,
                penalty: 30,
            },
            ..ScoringConfig::default()
        };
        let document = NutrientDocument::from_value(json!({ "energy-kcal_100g": 150 }));

        let outcome = HealthScorer::new(config).score(&document);

        assert_eq!(outcome.health_score, 70);
        assert_eq!(outcome.result, HealthVerdict::Moderate);
    }

    #[test]
    fn verdict_serializes_as_label() {
        let value = serde_json::to_value(HealthVerdict::Unhealthy).expect("serializes");
        assert_eq!(value, json!("Unhealthy"));
    }
}
