//! Health check handlers.
//!
//! - `/health`: liveness, returns OK while the process runs
//! - `/ready`: readiness, checks the revocation store is reachable

use crate::models::ReadinessResponse;
use crate::routes::AppState;
use axum::extract::State;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use std::sync::Arc;

/// Liveness probe handler. Checks no dependencies.
pub async fn health_check() -> &'static str {
    "OK"
}

/// Readiness probe handler.
///
/// Every protected request consults the revocation store, so the service is
/// not ready while that store is unreachable. The error body stays generic;
/// the cause is logged.
#[tracing::instrument(skip_all, name = "auth.health.readiness")]
pub async fn readiness_check(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    if let Err(e) = state.revocations.health_check().await {
        tracing::warn!(target: "auth.health", error = %e, "Readiness check failed");
        return (
            StatusCode::SERVICE_UNAVAILABLE,
            Json(ReadinessResponse {
                status: "not_ready",
                database: Some("unhealthy"),
                error: Some("Service dependencies unavailable".to_string()),
            }),
        );
    }

    (
        StatusCode::OK,
        Json(ReadinessResponse {
            status: "ready",
            database: Some("healthy"),
            error: None,
        }),
    )
}
