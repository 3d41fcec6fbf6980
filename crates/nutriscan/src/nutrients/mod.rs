//! Loosely keyed nutrition facts and the fixed four-value feature vector.

mod extract;

pub use extract::{coerce_f64, ExtractionStage, Extracted, KeyChain, Presence};

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};

/// Nutrition facts for one product, keyed however the data source chose to.
///
/// Any key may be missing or hold a non-numeric value. Deserializing from a
/// non-object yields an empty document rather than an error.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct NutrientDocument(Map<String, Value>);

impl NutrientDocument {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_value(value: Value) -> Self {
        match value {
            Value::Object(fields) => Self(fields),
            _ => Self::default(),
        }
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.0.get(key)
    }

    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<Value>) {
        self.0.insert(key.into(), value.into());
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl<'de> Deserialize<'de> for NutrientDocument {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        Value::deserialize(deserializer).map(Self::from_value)
    }
}

impl From<Map<String, Value>> for NutrientDocument {
    fn from(fields: Map<String, Value>) -> Self {
        Self(fields)
    }
}

pub const SUGAR_KEYS: KeyChain = KeyChain::new(&["sugars_100g", "sugars"], Presence::Truthy);
pub const FAT_KEYS: KeyChain = KeyChain::new(&["fat_100g", "fat"], Presence::Truthy);
pub const SODIUM_KEYS: KeyChain = KeyChain::new(&["sodium_100g", "sodium"], Presence::Truthy);
pub const PROTEIN_KEYS: KeyChain = KeyChain::new(
    &["proteins_100g", "proteins", "proteins_value"],
    Presence::Truthy,
);

/// Names of the classifier features, in column order.
pub const FEATURE_NAMES: [&str; 4] = ["sugar", "fat", "sodium", "protein"];

/// Number of columns the classifier consumes.
pub const FEATURE_COUNT: usize = FEATURE_NAMES.len();

/// One row of classifier input.
pub type FeatureRow = [f64; FEATURE_COUNT];

/// Sugar, fat, sodium and protein per 100g, always numeric.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct NutrientVector {
    pub sugar: f64,
    pub fat: f64,
    pub sodium: f64,
    pub protein: f64,
}

impl NutrientVector {
    /// Derives the vector with the outer-layer key precedence; missing or
    /// non-numeric values become `0.0`.
    pub fn from_document(document: &NutrientDocument) -> Self {
        Self {
            sugar: SUGAR_KEYS.extract(document),
            fat: FAT_KEYS.extract(document),
            sodium: SODIUM_KEYS.extract(document),
            protein: PROTEIN_KEYS.extract(document),
        }
    }

    pub fn as_row(&self) -> FeatureRow {
        [self.sugar, self.fat, self.sodium, self.protein]
    }
}
