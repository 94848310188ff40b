//! API routes.

use axum::routing::{get, post};
use axum::Router;
use tower_http::cors::CorsLayer;
use tower_http::limit::RequestBodyLimitLayer;
use tower_http::trace::TraceLayer;

use crate::handlers::{batch_detect, detect_faces, health};
use crate::state::AppState;

/// Request body size cap. Bodies carry file references, never image bytes,
/// so even large batches stay far below this.
const MAX_BODY_SIZE: usize = 2 * 1024 * 1024;

/// Create the API router.
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/detect", post(detect_faces))
        .route("/batch-detect", post(batch_detect))
        .layer(RequestBodyLimitLayer::new(MAX_BODY_SIZE))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}
