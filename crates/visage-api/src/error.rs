//! API error types.
//!
//! Error responses follow the established wire contract: validation and
//! missing-file errors carry a single `error` key, while detection failures
//! add diagnostic fields. Keys stay camelCase like the success bodies.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;
use thiserror::Error;
use visage_engine::EngineError;

pub type ApiResult<T> = Result<T, ApiError>;

#[derive(Debug, Error)]
pub enum ApiError {
    /// Malformed or incomplete request, including unloadable images.
    #[error("{0}")]
    Validation(String),

    /// Referenced image file does not exist on this host.
    #[error("{0}")]
    NotFound(String),

    /// The detection pipeline failed on a single-photo request.
    #[error("Face detection failed: {message}")]
    Detection {
        message: String,
        processing_time_ms: u64,
    },

    /// The batch request itself could not be processed.
    #[error("Batch detection failed: {0}")]
    BatchFailed(String),
}

impl ApiError {
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    pub fn not_found(msg: impl Into<String>) -> Self {
        Self::NotFound(msg.into())
    }

    pub fn detection(message: impl Into<String>, processing_time_ms: u64) -> Self {
        Self::Detection {
            message: message.into(),
            processing_time_ms,
        }
    }

    pub fn batch_failed(msg: impl Into<String>) -> Self {
        Self::BatchFailed(msg.into())
    }

    /// Map a pipeline error from a single-photo request onto the wire
    /// contract: unloadable images are the client's problem (400), anything
    /// past image loading is a server failure (500).
    pub fn from_engine(err: EngineError, processing_time_ms: u64) -> Self {
        match err {
            EngineError::ImageLoad(reason) => {
                Self::Validation(format!("Failed to load image: {reason}"))
            }
            EngineError::DetectionFailed(message) => Self::Detection {
                message,
                processing_time_ms,
            },
            other => Self::Detection {
                message: other.to_string(),
                processing_time_ms,
            },
        }
    }

    fn status_code(&self) -> StatusCode {
        match self {
            ApiError::Validation(_) => StatusCode::BAD_REQUEST,
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::Detection { .. } | ApiError::BatchFailed(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status_code();

        let body = match &self {
            ApiError::Validation(message) | ApiError::NotFound(message) => {
                json!({ "error": message })
            }
            ApiError::Detection {
                message,
                processing_time_ms,
            } => json!({
                "error": "Face detection failed",
                "message": message,
                "processingTimeMs": processing_time_ms,
            }),
            ApiError::BatchFailed(message) => json!({
                "error": "Batch detection failed",
                "message": message,
            }),
        };

        (status, Json(body)).into_response()
    }
}
