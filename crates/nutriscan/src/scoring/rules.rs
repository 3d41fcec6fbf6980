use super::config::{ScoringConfig, Threshold, TieredThreshold};
use crate::nutrients::{KeyChain, NutrientDocument, Presence};

// Primary key counts whenever it is non-null; alternates only when truthy.
pub(crate) const SUGAR: KeyChain = KeyChain::new(&["sugars_100g", "sugars"], Presence::NonNull)
    .with_fallback(Presence::Truthy);
pub(crate) const FAT: KeyChain =
    KeyChain::new(&["fat_100g", "fat"], Presence::NonNull).with_fallback(Presence::Truthy);
pub(crate) const CALORIES: KeyChain = KeyChain::new(
    &["energy-kcal_100g", "energy-kcal", "energy"],
    Presence::NonNull,
)
.with_fallback(Presence::Truthy);

/// Values the rules read from a document.
#[derive(Debug, Clone, Copy, PartialEq)]
pub(crate) struct ScoreSignals {
    pub sugar: f64,
    pub fat: f64,
    pub calories: f64,
}

impl ScoreSignals {
    pub(crate) fn extract(document: &NutrientDocument) -> Self {
        Self {
            sugar: SUGAR.extract(document),
            fat: FAT.extract(document),
            calories: CALORIES.extract(document),
        }
    }
}

/// A single triggered rule.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct Deduction {
    pub warning: &'static str,
    pub penalty: i32,
}

pub(crate) fn deductions(signals: &ScoreSignals, config: &ScoringConfig) -> Vec<Deduction> {
    let mut triggered = Vec::new();

    triggered.extend(tiered(
        signals.sugar,
        &config.sugar,
        "High sugar",
        "Moderate sugar",
    ));
    triggered.extend(tiered(signals.fat, &config.fat, "High fat", "Moderate fat"));
    triggered.extend(single(signals.calories, &config.calories, "High calories"));

    triggered
}

fn tiered(
    value: f64,
    tiers: &TieredThreshold,
    high_warning: &'static str,
    moderate_warning: &'static str,
) -> Option<Deduction> {
    if tiers.high.exceeded_by(value) {
        Some(Deduction {
            warning: high_warning,
            penalty: tiers.high.penalty,
        })
    } else {
        single(value, &tiers.moderate, moderate_warning)
    }
}

fn single(value: f64, threshold: &Threshold, warning: &'static str) -> Option<Deduction> {
    threshold.exceeded_by(value).then_some(Deduction {
        warning,
        penalty: threshold.penalty,
    })
}
