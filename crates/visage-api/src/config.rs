//! Service configuration.

use std::path::PathBuf;

use tracing::warn;
use visage_models::DetectorKind;

/// Face detection server configuration, read once at startup.
#[derive(Debug, Clone)]
pub struct ServiceConfig {
    /// Server host
    pub host: String,
    /// Server port
    pub port: u16,
    /// Requested detector backend
    pub detector: DetectorKind,
    /// Largest image dimension processed without downscaling
    pub max_image_size: u32,
    /// Descriptor distance threshold reserved for downstream matching
    pub face_tolerance: f64,
    /// Directory holding the model files
    pub model_dir: PathBuf,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 5000,
            detector: DetectorKind::default(),
            max_image_size: 2000,
            face_tolerance: 0.6,
            model_dir: PathBuf::from("models"),
        }
    }
}

impl ServiceConfig {
    /// Create config from environment variables.
    ///
    /// Unset or unparsable values fall back to defaults; an unknown
    /// `FACE_DETECTION_MODEL` is logged and replaced with the default
    /// backend rather than failing startup.
    pub fn from_env() -> Self {
        let detector = match std::env::var("FACE_DETECTION_MODEL") {
            Ok(raw) => raw.parse().unwrap_or_else(|e| {
                warn!(value = %raw, error = %e, "Invalid FACE_DETECTION_MODEL, using default");
                DetectorKind::default()
            }),
            Err(_) => DetectorKind::default(),
        };

        Self {
            host: std::env::var("HOST").unwrap_or_else(|_| "0.0.0.0".to_string()),
            port: std::env::var("PORT")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(5000),
            detector,
            max_image_size: std::env::var("MAX_IMAGE_SIZE")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(2000),
            face_tolerance: std::env::var("FACE_TOLERANCE")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(0.6),
            model_dir: std::env::var("FACE_MODEL_DIR")
                .map(PathBuf::from)
                .unwrap_or_else(|_| PathBuf::from("models")),
        }
    }
}
