use serde_json::Value;

use super::NutrientDocument;

/// Rule deciding whether a key's value counts as present.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Presence {
    /// Any non-null value, including `0` and `""`.
    NonNull,
    /// Skips null, zero, `false`, empty strings and empty containers.
    Truthy,
}

impl Presence {
    fn accepts(self, value: &Value) -> bool {
        match self {
            Presence::NonNull => !value.is_null(),
            Presence::Truthy => is_truthy(value),
        }
    }
}

/// Where an extracted value came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExtractionStage {
    /// The first key in the chain.
    Primary,
    /// A later key, by position in the chain.
    Alternate(usize),
    /// No key matched; the default applies.
    Default,
}

/// Outcome of walking a [`KeyChain`] against a document.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Extracted<'a> {
    pub stage: ExtractionStage,
    pub raw: Option<&'a Value>,
}

impl Extracted<'_> {
    /// Coerces the raw value, falling back to `0.0` when absent or non-numeric.
    pub fn or_zero(&self) -> f64 {
        self.raw.and_then(coerce_f64).unwrap_or(0.0)
    }
}

/// Ordered list of keys tried for one nutrient. The primary key and the
/// alternates may use different presence rules.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KeyChain {
    pub keys: &'static [&'static str],
    pub presence: Presence,
    pub fallback: Presence,
}

impl KeyChain {
    pub const fn new(keys: &'static [&'static str], presence: Presence) -> Self {
        Self {
            keys,
            presence,
            fallback: presence,
        }
    }

    /// Applies `fallback` to every key after the primary one.
    pub const fn with_fallback(self, fallback: Presence) -> Self {
        Self { fallback, ..self }
    }

    fn accepts(&self, position: usize, value: &Value) -> bool {
        if position == 0 {
            self.presence.accepts(value)
        } else {
            self.fallback.accepts(value)
        }
    }

    pub fn resolve<'a>(&self, document: &'a NutrientDocument) -> Extracted<'a> {
        for (position, key) in self.keys.iter().enumerate() {
            if let Some(value) = document.get(key) {
                if self.accepts(position, value) {
                    let stage = if position == 0 {
                        ExtractionStage::Primary
                    } else {
                        ExtractionStage::Alternate(position)
                    };
                    return Extracted {
                        stage,
                        raw: Some(value),
                    };
                }
            }
        }

        Extracted {
            stage: ExtractionStage::Default,
            raw: None,
        }
    }

    pub fn extract(&self, document: &NutrientDocument) -> f64 {
        self.resolve(document).or_zero()
    }
}

/// Converts a loosely typed JSON value into a float.
///
/// Numbers pass through, strings are parsed after trimming and booleans map to
/// `1.0`/`0.0`. Anything else yields `None`.
pub fn coerce_f64(value: &Value) -> Option<f64> {
    match value {
        Value::Number(number) => number.as_f64(),
        Value::String(text) => text.trim().parse::<f64>().ok(),
        Value::Bool(flag) => Some(if *flag { 1.0 } else { 0.0 }),
        Value::Null | Value::Array(_) | Value::Object(_) => None,
    }
}

fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(flag) => *flag,
        Value::Number(number) => number.as_f64().map(|n| n != 0.0).unwrap_or(true),
        Value::String(text) => !text.is_empty(),
        Value::Array(items) => !items.is_empty(),
        Value::Object(fields) => !fields.is_empty(),
    }
}
