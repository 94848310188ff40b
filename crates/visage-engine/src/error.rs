//! Error types for the detection pipeline.

use thiserror::Error;

/// Result type for pipeline operations.
pub type EngineResult<T> = Result<T, EngineError>;

/// Errors that can occur while loading images or running detection.
#[derive(Debug, Error)]
pub enum EngineError {
    /// The image could not be read or decoded. Callers treat this as a
    /// client error (bad input), not a server fault.
    #[error("Failed to load image: {0}")]
    ImageLoad(String),

    #[error("Model not found: {0}")]
    ModelNotFound(String),

    #[error("Face detection failed: {0}")]
    DetectionFailed(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl EngineError {
    /// Create an image load error.
    pub fn image_load(message: impl Into<String>) -> Self {
        Self::ImageLoad(message.into())
    }

    /// Create a model not found error.
    pub fn model_not_found(path: impl Into<String>) -> Self {
        Self::ModelNotFound(path.into())
    }

    /// Create a detection failure error.
    pub fn detection_failed(message: impl Into<String>) -> Self {
        Self::DetectionFailed(message.into())
    }

    /// Create an internal error.
    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal(message.into())
    }
}
