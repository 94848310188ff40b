//! Axum HTTP face detection server.
//!
//! This crate provides:
//! - `POST /detect` and `POST /batch-detect` endpoints over the shared
//!   detection pipeline
//! - `GET /health` reporting the active backend and its capabilities
//! - Environment-driven configuration with safe fallbacks

pub mod config;
pub mod error;
pub mod handlers;
pub mod routes;
pub mod state;

pub use config::ServiceConfig;
pub use error::{ApiError, ApiResult};
pub use routes::create_router;
pub use state::AppState;
