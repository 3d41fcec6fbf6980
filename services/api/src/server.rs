use crate::cli::ServeArgs;
use crate::infra::{load_predictor, AppState};
use crate::routes::router;
use axum::Extension;
use axum_prometheus::PrometheusMetricLayer;
use nutriscan::config::AppConfig;
use nutriscan::error::AppError;
use nutriscan::product::OpenFoodFactsClient;
use nutriscan::scoring::HealthScorer;
use nutriscan::telemetry;
use std::sync::atomic::Ordering;
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};
use tracing::info;

pub(crate) async fn run(mut args: ServeArgs) -> Result<(), AppError> {
    let mut config = AppConfig::load()?;

    if let Some(host) = args.host.take() {
        config.server.host = host;
    }
    if let Some(port) = args.port.take() {
        config.server.port = port;
    }

    telemetry::init(&config.telemetry, config.environment)?;

    // Artifacts must be in place before the listener exists.
    let predictor = Arc::new(load_predictor(&config.artifacts)?);
    let products = OpenFoodFactsClient::new(&config.product_api)?;

    let (prometheus_layer, prometheus_handle) = PrometheusMetricLayer::pair();
    let readiness_flag = Arc::new(std::sync::atomic::AtomicBool::new(false));
    let app_state = AppState {
        readiness: readiness_flag.clone(),
        metrics: Arc::new(prometheus_handle),
        predictor,
        scorer: Arc::new(HealthScorer::new(config.scoring.clone())),
        products,
    };

    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let app = router()
        .layer(Extension(app_state))
        .layer(cors)
        .layer(prometheus_layer);

    let addr = config.server.socket_addr()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    readiness_flag.store(true, Ordering::Release);

    info!(?config.environment, %addr, "nutrition scanner ready");

    axum::serve(listener, app).await?;
    Ok(())
}
