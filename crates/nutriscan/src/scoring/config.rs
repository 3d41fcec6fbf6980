use serde::{Deserialize, Serialize};

/// Tunable constants for the rule-based scorer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScoringConfig {
    pub baseline: i32,
    pub sugar: TieredThreshold,
    pub fat: TieredThreshold,
    pub calories: Threshold,
    pub healthy_floor: i32,
    pub moderate_floor: i32,
}

impl Default for ScoringConfig {
    fn default() -> Self {
        Self {
            baseline: 100,
            sugar: TieredThreshold {
                high: Threshold {
                    above: 20.0,
                    penalty: 40,
                },
                moderate: Threshold {
                    above: 10.0,
                    penalty: 20,
                },
            },
            fat: TieredThreshold {
                high: Threshold {
                    above: 15.0,
                    penalty: 25,
                },
                moderate: Threshold {
                    above: 8.0,
                    penalty: 10,
                },
            },
            calories: Threshold {
                above: 250.0,
                penalty: 15,
            },
            healthy_floor: 70,
            moderate_floor: 40,
        }
    }
}

/// Strict lower bound and the points deducted when a value exceeds it.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Threshold {
    pub above: f64,
    pub penalty: i32,
}

impl Threshold {
    pub fn exceeded_by(&self, value: f64) -> bool {
        value > self.above
    }
}

/// Two mutually exclusive tiers for one nutrient; `high` is checked first.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TieredThreshold {
    pub high: Threshold,
    pub moderate: Threshold,
}
