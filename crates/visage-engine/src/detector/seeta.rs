//! SeetaFace detection backend (the "hog" fast path).

use std::io::Cursor;
use std::path::Path;

use image::DynamicImage;
use tracing::{debug, info};

use crate::detector::{clamped_box, Detection, FaceDetector};
use crate::error::{EngineError, EngineResult};

/// Model file name resolved under the configured model directory.
pub const SEETA_MODEL_FILE: &str = "seeta_fd_frontal_v1.0.bin";

/// Sliding-window detector backed by the `rustface` crate (SeetaFace funnel
/// engine).
///
/// The funnel classifier emits raw stage scores rather than calibrated
/// probabilities, so every detection carries a uniform confidence of 1.0.
pub struct SeetaDetector {
    model: rustface::Model,
}

impl std::fmt::Debug for SeetaDetector {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SeetaDetector").finish_non_exhaustive()
    }
}

impl SeetaDetector {
    /// Load the SeetaFace model from disk.
    pub fn load(model_path: &Path) -> EngineResult<Self> {
        if !model_path.exists() {
            return Err(EngineError::model_not_found(
                model_path.display().to_string(),
            ));
        }

        let bytes = std::fs::read(model_path).map_err(|e| {
            EngineError::detection_failed(format!("Read SeetaFace model: {e}"))
        })?;
        let model = rustface::read_model(Cursor::new(bytes)).map_err(|e| {
            EngineError::detection_failed(format!("Parse SeetaFace model: {e}"))
        })?;

        info!(model_path = %model_path.display(), "SeetaFace detector initialized");
        Ok(Self { model })
    }
}

impl FaceDetector for SeetaDetector {
    fn name(&self) -> &'static str {
        "hog"
    }

    fn confidence_capable(&self) -> bool {
        false
    }

    fn detect(&self, image: &DynamicImage) -> EngineResult<Vec<Detection>> {
        let gray = image.to_luma8();
        let (width, height) = gray.dimensions();

        // The rustface detector is stateful, so build a fresh one per call
        // from the shared model; concurrent requests then never contend.
        let mut detector = rustface::create_detector_with_model(self.model.clone());
        detector.set_min_face_size(20);
        detector.set_score_thresh(2.0);
        detector.set_pyramid_scale_factor(0.8);
        detector.set_slide_window_step(4, 4);

        let faces = detector.detect(&rustface::ImageData::new(gray.as_raw(), width, height));
        debug!(count = faces.len(), "SeetaFace detection completed");

        Ok(faces
            .iter()
            .map(|face| {
                let bbox = face.bbox();
                let left = f64::from(bbox.x());
                let top = f64::from(bbox.y());
                let right = left + f64::from(bbox.width());
                let bottom = top + f64::from(bbox.height());
                Detection {
                    bounds: clamped_box(top, right, bottom, left, width, height),
                    confidence: 1.0,
                }
            })
            .collect())
    }
}
