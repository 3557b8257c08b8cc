//! Health check and metrics endpoints.

use axum::{
    extract::State,
    http::{header, StatusCode},
    Json,
};
use std::sync::Arc;

use crate::metrics;
use crate::types::HealthResponse;
use crate::AppState;

/// Health check handler. Reports the season scores are recorded under.
pub async fn health(State(state): State<Arc<AppState>>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        season: state.service.season().id.clone(),
    })
}

/// Prometheus metrics handler. Refreshes the best-score gauge first, since
/// deferred spawns settle games after their move response.
pub async fn metrics_handler(
    State(state): State<Arc<AppState>>,
) -> (StatusCode, [(header::HeaderName, &'static str); 1], String) {
    metrics::record_best_score(state.service.best_score());
    (
        StatusCode::OK,
        [(
            header::CONTENT_TYPE,
            "text/plain; version=0.0.4; charset=utf-8",
        )],
        metrics::encode_metrics(),
    )
}
