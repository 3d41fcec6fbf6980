//! Answers "is this packaged food healthy?" for a barcode.
//!
//! Two independent engines read the same nutrition facts: a threshold-based
//! [`scoring::HealthScorer`] and a [`predictor::HealthPredictor`] wrapping a
//! pre-trained classifier loaded once at startup from [`artifacts`].

pub mod artifacts;
pub mod config;
pub mod error;
pub mod model;
pub mod nutrients;
pub mod predictor;
pub mod product;
pub mod scan;
pub mod scoring;
pub mod telemetry;
