//! Detection pipeline orchestration.
//!
//! `FaceEngine` wires the stages together: load, conditional downscale,
//! detect, then per-face analysis. Each detection is turned into a complete
//! face record before the next one is processed, so boxes, confidences,
//! descriptors, and landmarks always travel together.

use std::path::{Path, PathBuf};

use tracing::{debug, info};
use visage_models::{DetectorKind, Face};

use crate::analyzer::{FaceAnalyzer, OrtFaceAnalyzer, EMBEDDING_MODEL_FILE, LANDMARK_MODEL_FILE};
use crate::detector::{create_detector, FaceDetector};
use crate::error::EngineResult;
use crate::{image_io, resize};

/// Startup configuration for the detection pipeline.
#[derive(Debug, Clone)]
pub struct EngineConfig {
    /// Requested detector backend; the engine may fall back to `Hog`
    pub detector: DetectorKind,
    /// Largest dimension processed without downscaling
    pub max_image_size: u32,
    /// Directory holding the detection and analysis model files
    pub model_dir: PathBuf,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            detector: DetectorKind::default(),
            max_image_size: 2000,
            model_dir: PathBuf::from("models"),
        }
    }
}

/// The face detection pipeline, initialized once at startup and shared
/// read-only across requests.
pub struct FaceEngine {
    detector: Box<dyn FaceDetector>,
    analyzer: Box<dyn FaceAnalyzer>,
    active_kind: DetectorKind,
    max_image_size: u32,
}

impl FaceEngine {
    /// Build the engine from configuration.
    ///
    /// The analyzer models and the fast detector are required; a CNN
    /// initialization failure degrades to the fast path instead of failing.
    pub fn new(config: &EngineConfig) -> EngineResult<Self> {
        let (detector, active_kind) = create_detector(config.detector, &config.model_dir)?;
        let analyzer = OrtFaceAnalyzer::load(
            &config.model_dir.join(LANDMARK_MODEL_FILE),
            &config.model_dir.join(EMBEDDING_MODEL_FILE),
        )?;

        info!(
            requested = %config.detector,
            active = %active_kind,
            max_image_size = config.max_image_size,
            "Face engine initialized"
        );

        Ok(Self {
            detector,
            analyzer: Box::new(analyzer),
            active_kind,
            max_image_size: config.max_image_size,
        })
    }

    /// Assemble an engine from explicit stage implementations.
    pub fn from_parts(
        detector: Box<dyn FaceDetector>,
        analyzer: Box<dyn FaceAnalyzer>,
        active_kind: DetectorKind,
        max_image_size: u32,
    ) -> Self {
        Self {
            detector,
            analyzer,
            active_kind,
            max_image_size,
        }
    }

    /// The backend actually running (after any startup fallback).
    pub fn active_kind(&self) -> DetectorKind {
        self.active_kind
    }

    /// Whether confidence values carry a real signal.
    pub fn confidence_capable(&self) -> bool {
        self.detector.confidence_capable()
    }

    /// Run the full pipeline over one image file.
    ///
    /// Returns one record per detected face, in detection order; an empty
    /// vector when the image contains no faces.
    pub fn detect_file(&self, file_id: &str, path: &Path) -> EngineResult<Vec<Face>> {
        let image = image_io::load_image(path)?;
        let image = resize::shrink_to_limit(image, self.max_image_size);

        let detections = self.detector.detect(&image)?;
        debug!(
            file_id,
            backend = self.detector.name(),
            count = detections.len(),
            "Detection stage completed"
        );

        let mut faces = Vec::with_capacity(detections.len());
        for (index, detection) in detections.into_iter().enumerate() {
            let attributes = self.analyzer.analyze(&image, &detection)?;
            faces.push(Face {
                id: format!("{file_id}-face-{index}"),
                bounds: detection.bounds,
                descriptor: attributes.descriptor,
                landmarks: attributes.landmarks,
                confidence: round_confidence(detection.confidence),
            });
        }

        Ok(faces)
    }
}

/// Round a backend confidence to 3 decimal places for the wire format.
pub fn round_confidence(confidence: f32) -> f64 {
    (f64::from(confidence) * 1000.0).round() / 1000.0
}
