//! OpenFoodFacts product lookup by barcode.

use crate::config::ProductApiConfig;
use crate::nutrients::NutrientDocument;
use reqwest::Client;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use tracing::{debug, warn};

/// Barcodes shorter than this are rejected without a request.
pub const MIN_BARCODE_LEN: usize = 5;

/// Product fields the scanner reads. Every field is optional and decoded
/// leniently; wrongly typed values become `None`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Product {
    #[serde(default, deserialize_with = "lenient_string")]
    pub product_name: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub brands: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub ingredients_text: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub image_front_small_url: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub image_url: Option<String>,
    #[serde(default)]
    pub nutriments: NutrientDocument,
}

impl Product {
    /// Front thumbnail when available, otherwise the main image.
    pub fn display_image(&self) -> Option<&str> {
        non_empty(&self.image_front_small_url).or_else(|| non_empty(&self.image_url))
    }
}

fn non_empty(value: &Option<String>) -> Option<&str> {
    value.as_deref().filter(|text| !text.is_empty())
}

fn lenient_string<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Value::deserialize(deserializer)? {
        Value::String(text) => Some(text),
        _ => None,
    })
}

#[derive(Debug, Deserialize)]
struct ProductEnvelope {
    #[serde(default)]
    status: Value,
    #[serde(default)]
    product: Option<Product>,
}

#[derive(Debug, thiserror::Error)]
pub enum LookupError {
    #[error("failed to build HTTP client: {0}")]
    Client(#[source] reqwest::Error),
    #[error("product request failed: {0}")]
    Request(#[source] reqwest::Error),
    #[error("product API returned {0}")]
    Status(reqwest::StatusCode),
    #[error("failed to decode product response: {0}")]
    Decode(#[source] reqwest::Error),
}

/// True when the barcode is long enough and safe to embed in the URL path.
pub fn is_plausible_barcode(barcode: &str) -> bool {
    let barcode = barcode.trim();
    barcode.len() >= MIN_BARCODE_LEN && barcode.chars().all(|c| c.is_ascii_alphanumeric())
}

/// HTTP client for the OpenFoodFacts v0 product endpoint.
#[derive(Clone)]
pub struct OpenFoodFactsClient {
    client: Client,
    base_url: String,
}

impl OpenFoodFactsClient {
    pub fn new(config: &ProductApiConfig) -> Result<Self, LookupError> {
        let client = Client::builder()
            .timeout(config.timeout)
            .user_agent(concat!("nutriscan/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(LookupError::Client)?;

        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
        })
    }

    /// Fetches a product; every failure is logged and reported as `None`.
    pub async fn fetch_product(&self, barcode: &str) -> Option<Product> {
        let barcode = barcode.trim();
        if !is_plausible_barcode(barcode) {
            debug!(barcode, "rejecting implausible barcode");
            return None;
        }

        match self.request(barcode).await {
            Ok(product) => product,
            Err(err) => {
                warn!(barcode, error = %err, "product lookup failed");
                None
            }
        }
    }

    async fn request(&self, barcode: &str) -> Result<Option<Product>, LookupError> {
        let url = format!("{}/api/v0/product/{}.json", self.base_url, barcode);

        let response = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(LookupError::Request)?;

        if !response.status().is_success() {
            return Err(LookupError::Status(response.status()));
        }

        let envelope: ProductEnvelope = response.json().await.map_err(LookupError::Decode)?;

        if envelope.status.as_i64() == Some(1) {
            Ok(envelope.product)
        } else {
            debug!(barcode, status = %envelope.status, "product not found upstream");
            Ok(None)
        }
    }
}
