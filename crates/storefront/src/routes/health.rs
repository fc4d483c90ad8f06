//! Health check endpoints.

use axum::{extract::State, http::StatusCode};

use crate::state::AppState;

/// Liveness: the process is up. Does not check dependencies.
pub async fn health() -> &'static str {
    "ok"
}

/// Readiness: the remote store answers.
///
/// The catalog keeps serving from memory while the remote store is down, so
/// this only tells the platform that edits would currently fail.
pub async fn readiness(State(state): State<AppState>) -> StatusCode {
    match state.shop().remote().ping().await {
        Ok(()) => StatusCode::OK,
        Err(e) => {
            tracing::warn!(error = %e, "Readiness check failed");
            StatusCode::SERVICE_UNAVAILABLE
        }
    }
}
