//! Request and response bodies for the detection endpoints.
//!
//! Wire field names are camelCase (`fileId`, `faceCount`, `processingTimeMs`)
//! to stay compatible with existing consumers of the service.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::face::Face;

/// Body of `POST /detect`.
///
/// Both fields are required and must be non-empty; they are optional here so
/// the handler can report missing fields with a stable error message instead
/// of a serde rejection.
#[derive(Debug, Clone, Default, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct DetectRequest {
    /// Opaque identifier the caller uses to correlate results
    #[serde(default)]
    pub file_id: Option<String>,
    /// Host-resolved path of the image to process
    #[serde(default)]
    pub file_path: Option<String>,
}

/// One photo reference inside a batch request.
#[derive(Debug, Clone, Default, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct PhotoRef {
    #[serde(default)]
    pub file_id: Option<String>,
    #[serde(default)]
    pub file_path: Option<String>,
}

/// Body of `POST /batch-detect`.
///
/// `photos` is optional so that an absent key and an explicit JSON `null`
/// both read as an empty batch, which the handler rejects with a stable
/// error message.
#[derive(Debug, Clone, Default, Serialize, Deserialize, JsonSchema)]
pub struct BatchDetectRequest {
    /// Photos to process, in order; results preserve this order
    #[serde(default)]
    pub photos: Option<Vec<PhotoRef>>,
}

/// Successful response of `POST /detect`.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct DetectResponse {
    pub file_id: String,
    /// Detected faces in detection order (no spatial ordering guaranteed)
    pub faces: Vec<Face>,
    pub face_count: usize,
    /// Wall-clock processing time, truncated to whole milliseconds
    pub processing_time_ms: u64,
}

/// One slot of a batch response, in the same position as its input photo.
///
/// Success entries carry faces and no `error`; failed entries carry an
/// `error` message with an empty face list. Per-photo failures never abort
/// the rest of the batch.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct BatchItem {
    pub file_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    pub faces: Vec<Face>,
    pub face_count: usize,
}

impl BatchItem {
    /// Entry for a photo that processed successfully (zero faces included).
    pub fn success(file_id: impl Into<String>, faces: Vec<Face>) -> Self {
        let face_count = faces.len();
        Self {
            file_id: file_id.into(),
            error: None,
            faces,
            face_count,
        }
    }

    /// Entry for a photo that failed; the failure becomes data, not an
    /// HTTP error.
    pub fn failure(file_id: impl Into<String>, error: impl Into<String>) -> Self {
        Self {
            file_id: file_id.into(),
            error: Some(error.into()),
            faces: Vec::new(),
            face_count: 0,
        }
    }
}

/// Successful response of `POST /batch-detect`.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct BatchDetectResponse {
    pub results: Vec<BatchItem>,
    /// Number of photos in the request, including failed ones
    pub total_photos: usize,
    /// Sum of `faceCount` over successful entries only
    pub total_faces: usize,
    pub processing_time_ms: u64,
}

/// Response of `GET /health`.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct HealthResponse {
    /// Always `"ready"` once the server is accepting requests
    pub status: String,
    /// Service identifier for monitoring dashboards
    pub service: String,
    /// Active detector backend (after any startup fallback)
    pub model: String,
    pub version: String,
    /// Whether `confidence` values carry a real signal on this backend
    pub confidence_scores: bool,
}
