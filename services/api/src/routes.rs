use crate::infra::AppState;
use axum::extract::Path;
use axum::http::{header, StatusCode};
use axum::response::IntoResponse;
use axum::Extension;
use axum::Json;
use nutriscan::error::AppError;
use nutriscan::nutrients::NutrientDocument;
use nutriscan::predictor::{Prediction, RawNutrients};
use nutriscan::scan::{build_scan_report, ScanReport};
use nutriscan::scoring::ScoreResult;
use serde_json::json;
use tracing::debug;

pub(crate) fn router() -> axum::Router {
    axum::Router::new()
        .route("/health", axum::routing::get(healthcheck))
        .route("/ready", axum::routing::get(readiness_endpoint))
        .route("/metrics", axum::routing::get(metrics_endpoint))
        .route("/scan/:barcode", axum::routing::get(scan_endpoint))
        .route("/api/v1/score", axum::routing::post(score_endpoint))
        .route("/api/v1/predict", axum::routing::post(predict_endpoint))
}

pub(crate) async fn healthcheck() -> Json<serde_json::Value> {
    Json(json!({ "status": "ok" }))
}

pub(crate) async fn readiness_endpoint(Extension(state): Extension<AppState>) -> impl IntoResponse {
    let ready = state.readiness.load(std::sync::atomic::Ordering::Acquire);
    let status = if ready {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };

    let payload = if ready {
        json!({ "status": "ready" })
    } else {
        json!({ "status": "initializing" })
    };

    (status, Json(payload))
}

pub(crate) async fn metrics_endpoint(Extension(state): Extension<AppState>) -> impl IntoResponse {
    (
        StatusCode::OK,
        [(header::CONTENT_TYPE, "text/plain; version=0.0.4")],
        state.metrics.render(),
    )
}

pub(crate) async fn scan_endpoint(
    Extension(state): Extension<AppState>,
    Path(barcode): Path<String>,
) -> Result<Json<ScanReport>, AppError> {
    let product = state
        .products
        .fetch_product(&barcode)
        .await
        .ok_or(AppError::ProductNotFound)?;

    let report = build_scan_report(&product, &state.predictor, &state.scorer);
    debug!(%barcode, score = report.health_score, "scanned product");
    Ok(Json(report))
}

pub(crate) async fn score_endpoint(
    Extension(state): Extension<AppState>,
    Json(document): Json<NutrientDocument>,
) -> Json<ScoreResult> {
    Json(state.scorer.score(&document))
}

pub(crate) async fn predict_endpoint(
    Extension(state): Extension<AppState>,
    Json(input): Json<RawNutrients>,
) -> Result<Json<Prediction>, AppError> {
    Ok(Json(state.predictor.predict(&input)?))
}
