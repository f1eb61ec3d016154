use std::sync::Arc;

use axum::extract::State;
use axum::Json;

use skillbook_shared::types::api::HealthResponse;

use crate::AppState;

pub async fn health_check() -> Json<HealthResponse> {
    Json(HealthResponse::healthy(
        "skillbook-booking",
        env!("CARGO_PKG_VERSION"),
    ))
}

/// Returns Prometheus metrics.
pub async fn metrics(State(state): State<Arc<AppState>>) -> String {
    state.metrics_handle.render()
}
