use metrics_exporter_prometheus::PrometheusHandle;
use nutriscan::artifacts::{ArtifactCandidates, FileSystemSource, LocatorInputs};
use nutriscan::config::ArtifactConfig;
use nutriscan::error::AppError;
use nutriscan::predictor::HealthPredictor;
use nutriscan::product::OpenFoodFactsClient;
use nutriscan::scoring::HealthScorer;
use std::sync::atomic::AtomicBool;
use std::sync::Arc;

#[derive(Clone)]
pub(crate) struct AppState {
    pub(crate) readiness: Arc<AtomicBool>,
    pub(crate) metrics: Arc<PrometheusHandle>,
    pub(crate) predictor: Arc<HealthPredictor>,
    pub(crate) scorer: Arc<HealthScorer>,
    pub(crate) products: OpenFoodFactsClient,
}

/// Resolves candidate paths for this host and loads both artifacts from disk.
pub(crate) fn load_predictor(config: &ArtifactConfig) -> Result<HealthPredictor, AppError> {
    let candidates = ArtifactCandidates::resolve(&LocatorInputs::from_config(config));
    Ok(HealthPredictor::load(&candidates, &FileSystemSource)?)
}
