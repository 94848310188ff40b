//! Health check handler.

use axum::extract::State;
use axum::Json;
use visage_models::HealthResponse;

use crate::state::AppState;

/// Service name reported to monitoring consumers.
pub const SERVICE_NAME: &str = "visage-face-detection";

/// Health check endpoint (liveness probe).
///
/// Reports the backend that is actually running, which differs from the
/// configured one after a CNN startup fallback.
pub async fn health(State(state): State<AppState>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ready".to_string(),
        service: SERVICE_NAME.to_string(),
        model: state.engine.active_kind().to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        confidence_scores: state.engine.confidence_capable(),
    })
}
