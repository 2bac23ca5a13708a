//! Health check handler for service monitoring.

use axum::{response::IntoResponse, Json};
use tracing::{debug, instrument};

/// Liveness endpoint.
///
/// Designed to be called frequently by orchestration systems and load
/// balancers, so it performs no external checks.
#[instrument(name = "health_check")]
pub async fn health_check() -> impl IntoResponse {
    debug!("Performing health check");

    Json(serde_json::json!({ "status": "ok" }))
}
