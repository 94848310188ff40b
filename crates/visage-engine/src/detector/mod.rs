//! Face detector backends.
//!
//! Two implementations sit behind the [`FaceDetector`] trait:
//!
//! - [`SeetaDetector`] — sliding-window SeetaFace ("hog"): fast, boxes only,
//!   uniform confidence
//! - [`UltraFaceDetector`] — UltraFace ONNX ("cnn"): slower, real per-face
//!   confidence scores
//!
//! The backend is chosen once at startup. A failed CNN initialization is
//! logged and degrades to the fast path instead of failing the process.

mod seeta;
mod ultraface;

pub use seeta::{SeetaDetector, SEETA_MODEL_FILE};
pub use ultraface::{UltraFaceDetector, ULTRAFACE_MODEL_FILE};

use std::path::Path;

use image::DynamicImage;
use tracing::warn;
use visage_models::{DetectorKind, FaceBox};

use crate::error::EngineResult;

/// One raw detection: a clamped bounding box plus the backend's confidence.
///
/// This record is created immediately after detection and carried by value
/// through landmark/descriptor extraction, so per-face data can never be
/// joined against the wrong box.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Detection {
    /// Box in processed-image pixel coordinates, clamped to image bounds
    pub bounds: FaceBox,
    /// Raw confidence; 1.0 on backends without a real signal
    pub confidence: f32,
}

/// Backend-agnostic detection seam.
pub trait FaceDetector: Send + Sync {
    /// Short backend name used in health reporting and logs.
    fn name(&self) -> &'static str;

    /// Whether confidence values carry a real signal.
    fn confidence_capable(&self) -> bool;

    /// Detect faces in an image. An empty result is a valid outcome, not an
    /// error. Order is backend-defined and becomes the face index.
    fn detect(&self, image: &DynamicImage) -> EngineResult<Vec<Detection>>;
}

/// Build the configured backend, with non-fatal fallback for the CNN path.
///
/// Returns the detector together with the kind that actually runs, which can
/// differ from the requested kind after a fallback.
pub fn create_detector(
    kind: DetectorKind,
    model_dir: &Path,
) -> EngineResult<(Box<dyn FaceDetector>, DetectorKind)> {
    match kind {
        DetectorKind::Hog => {
            let detector = SeetaDetector::load(&model_dir.join(SEETA_MODEL_FILE))?;
            Ok((Box::new(detector), DetectorKind::Hog))
        }
        DetectorKind::Cnn => {
            match UltraFaceDetector::load(&model_dir.join(ULTRAFACE_MODEL_FILE)) {
                Ok(detector) => Ok((Box::new(detector), DetectorKind::Cnn)),
                Err(e) => {
                    warn!(error = %e, "CNN detector unavailable, falling back to hog");
                    let detector = SeetaDetector::load(&model_dir.join(SEETA_MODEL_FILE))?;
                    Ok((Box::new(detector), DetectorKind::Hog))
                }
            }
        }
    }
}

/// Clamp raw edge coordinates to image bounds and build the wire-format box.
///
/// Edges are ordered after clamping (`right >= left`, `bottom >= top`), so
/// derived width/height are never negative.
pub(crate) fn clamped_box(
    top: f64,
    right: f64,
    bottom: f64,
    left: f64,
    image_width: u32,
    image_height: u32,
) -> FaceBox {
    let max_x = f64::from(image_width);
    let max_y = f64::from(image_height);

    let top = top.clamp(0.0, max_y);
    let left = left.clamp(0.0, max_x);
    let bottom = bottom.clamp(top, max_y);
    let right = right.clamp(left, max_x);

    FaceBox::from_edges(top as i64, right as i64, bottom as i64, left as i64)
}
