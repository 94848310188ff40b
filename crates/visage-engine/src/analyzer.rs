//! Per-face attribute extraction: 68-point landmarks and identity
//! descriptors.
//!
//! Both models operate on a padded square crop around the detector box. The
//! landmark model emits coordinates normalized to the crop, which are mapped
//! back into processed-image pixel space before grouping; the embedding
//! model emits the 128-dimensional descriptor directly.

use std::path::Path;
use std::sync::Mutex;

use image::imageops::FilterType;
use image::{DynamicImage, GenericImageView};
use ort::session::Session;
use tracing::info;
use visage_models::{FaceBox, FaceLandmarks};

use crate::detector::Detection;
use crate::error::{EngineError, EngineResult};
use crate::landmarks::{group_landmarks, LANDMARK_POINT_COUNT};
use crate::onnx;

/// Landmark model file name resolved under the configured model directory.
pub const LANDMARK_MODEL_FILE: &str = "pfld_68.onnx";

/// Embedding model file name resolved under the configured model directory.
pub const EMBEDDING_MODEL_FILE: &str = "mobilefacenet_128.onnx";

/// Length of the identity descriptor.
pub const DESCRIPTOR_LENGTH: usize = 128;

/// Input size of both per-face models.
const CROP_INPUT_SIZE: u32 = 112;

/// Margin added around the detector box before cropping.
const CROP_PAD_RATIO: f64 = 0.25;

/// Landmarks and descriptor computed for one detection.
#[derive(Debug, Clone, PartialEq)]
pub struct FaceAttributes {
    pub landmarks: FaceLandmarks,
    /// Exactly [`DESCRIPTOR_LENGTH`] values
    pub descriptor: Vec<f64>,
}

/// Per-face analysis seam: given the processed image and one detection,
/// produce that face's attributes.
pub trait FaceAnalyzer: Send + Sync {
    fn analyze(&self, image: &DynamicImage, detection: &Detection)
        -> EngineResult<FaceAttributes>;
}

/// ONNX-backed analyzer holding the landmark and embedding sessions.
#[derive(Debug)]
pub struct OrtFaceAnalyzer {
    landmark_session: Mutex<Session>,
    embedding_session: Mutex<Session>,
}

impl OrtFaceAnalyzer {
    /// Load both per-face models from disk.
    pub fn load(landmark_path: &Path, embedding_path: &Path) -> EngineResult<Self> {
        let landmark_session = onnx::load_session(landmark_path)?;
        let embedding_session = onnx::load_session(embedding_path)?;
        info!(
            landmark_model = %landmark_path.display(),
            embedding_model = %embedding_path.display(),
            "Face analyzer initialized"
        );
        Ok(Self {
            landmark_session: Mutex::new(landmark_session),
            embedding_session: Mutex::new(embedding_session),
        })
    }

    fn extract_landmarks(
        &self,
        face: &DynamicImage,
        crop: &CropRect,
    ) -> EngineResult<FaceLandmarks> {
        let resized = face.resize_exact(CROP_INPUT_SIZE, CROP_INPUT_SIZE, FilterType::Triangle);
        let input = onnx::chw_tensor(&resized.to_rgb8(), |v| v as f32 / 255.0)?;

        let mut session = self
            .landmark_session
            .lock()
            .map_err(|_| EngineError::detection_failed("ORT session poisoned"))?;
        let outputs = session
            .run(ort::inputs![input])
            .map_err(|e| EngineError::detection_failed(format!("ORT run failed: {e}")))?;

        let output = outputs
            .get("output")
            .or_else(|| outputs.get("landmarks"))
            .ok_or_else(|| {
                EngineError::detection_failed("Landmark model returned no recognizable output")
            })?;
        let (shape, data) = output
            .try_extract_tensor::<f32>()
            .map_err(|e| EngineError::detection_failed(format!("ORT extract: {e}")))?;

        // Accept [1, 136], [136], or [1, 68, 2]; anything else is a defect.
        let total: usize = shape.iter().map(|&d| d as usize).product();
        if total != LANDMARK_POINT_COUNT * 2 {
            return Err(EngineError::detection_failed(format!(
                "Unexpected landmark output shape: {:?}",
                shape
            )));
        }

        let size = f64::from(crop.size);
        let points: Vec<[i64; 2]> = (0..LANDMARK_POINT_COUNT)
            .map(|i| {
                let nx = f64::from(data[i * 2]);
                let ny = f64::from(data[i * 2 + 1]);
                let x = f64::from(crop.x) + nx * size;
                let y = f64::from(crop.y) + ny * size;
                [x as i64, y as i64]
            })
            .collect();

        group_landmarks(&points)
    }

    fn extract_descriptor(&self, face: &DynamicImage) -> EngineResult<Vec<f64>> {
        let resized = face.resize_exact(CROP_INPUT_SIZE, CROP_INPUT_SIZE, FilterType::Triangle);
        let input = onnx::chw_tensor(&resized.to_rgb8(), |v| (v as f32 - 127.5) / 128.0)?;

        let mut session = self
            .embedding_session
            .lock()
            .map_err(|_| EngineError::detection_failed("ORT session poisoned"))?;
        let outputs = session
            .run(ort::inputs![input])
            .map_err(|e| EngineError::detection_failed(format!("ORT run failed: {e}")))?;

        let output = outputs
            .get("embedding")
            .or_else(|| outputs.get("output"))
            .ok_or_else(|| {
                EngineError::detection_failed("Embedding model returned no recognizable output")
            })?;
        let (shape, data) = output
            .try_extract_tensor::<f32>()
            .map_err(|e| EngineError::detection_failed(format!("ORT extract: {e}")))?;

        let total: usize = shape.iter().map(|&d| d as usize).product();
        if total != DESCRIPTOR_LENGTH {
            return Err(EngineError::detection_failed(format!(
                "Unexpected embedding output shape: {:?}",
                shape
            )));
        }

        Ok(data.iter().map(|&v| f64::from(v)).collect())
    }
}

impl FaceAnalyzer for OrtFaceAnalyzer {
    fn analyze(
        &self,
        image: &DynamicImage,
        detection: &Detection,
    ) -> EngineResult<FaceAttributes> {
        let (width, height) = image.dimensions();
        let crop = make_square_crop(width, height, &detection.bounds, CROP_PAD_RATIO)?;
        let face = image.crop_imm(crop.x, crop.y, crop.size, crop.size);

        let landmarks = self.extract_landmarks(&face, &crop)?;
        let descriptor = self.extract_descriptor(&face)?;

        Ok(FaceAttributes {
            landmarks,
            descriptor,
        })
    }
}

/// Square crop region in processed-image coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct CropRect {
    x: u32,
    y: u32,
    size: u32,
}

/// Expand the detector box by `pad_ratio`, square it, and clamp to the image.
fn make_square_crop(
    image_width: u32,
    image_height: u32,
    bounds: &FaceBox,
    pad_ratio: f64,
) -> EngineResult<CropRect> {
    let w = bounds.width as f64;
    let h = bounds.height as f64;
    let mut size = w.max(h) * (1.0 + pad_ratio);

    let center_x = bounds.left as f64 + w / 2.0;
    let center_y = bounds.top as f64 + h / 2.0;

    let mut x = center_x - size / 2.0;
    let mut y = center_y - size / 2.0;

    let frame_w = f64::from(image_width);
    let frame_h = f64::from(image_height);

    if x < 0.0 {
        size += x;
        x = 0.0;
    }
    if y < 0.0 {
        size += y;
        y = 0.0;
    }
    if x + size > frame_w {
        size = frame_w - x;
    }
    if y + size > frame_h {
        size = frame_h - y;
    }

    if size < 8.0 {
        return Err(EngineError::detection_failed(
            "Face region too small to analyze",
        ));
    }

    // Flooring the size keeps the rounded origin plus size inside the frame.
    Ok(CropRect {
        x: x.round() as u32,
        y: y.round() as u32,
        size: size.floor() as u32,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_square_crop_centered_box() {
        let bounds = FaceBox::from_edges(100, 300, 300, 100);
        let crop = make_square_crop(1000, 1000, &bounds, 0.25).unwrap();
        // 200px box padded by 25% -> 250px, centered at (200, 200)
        assert_eq!(crop.size, 250);
        assert_eq!(crop.x, 75);
        assert_eq!(crop.y, 75);
    }

    #[test]
    fn test_square_crop_clamps_at_origin() {
        let bounds = FaceBox::from_edges(0, 120, 120, 0);
        let crop = make_square_crop(1000, 1000, &bounds, 0.25).unwrap();
        assert_eq!(crop.x, 0);
        assert_eq!(crop.y, 0);
        assert!(crop.size <= 150);
    }

    #[test]
    fn test_square_crop_clamps_at_far_edge() {
        let bounds = FaceBox::from_edges(380, 480, 480, 380);
        let crop = make_square_crop(480, 480, &bounds, 0.25).unwrap();
        assert!(u64::from(crop.x) + u64::from(crop.size) <= 480);
        assert!(u64::from(crop.y) + u64::from(crop.size) <= 480);
    }

    #[test]
    fn test_square_crop_rejects_tiny_region() {
        let bounds = FaceBox::from_edges(10, 14, 14, 10);
        let err = make_square_crop(1000, 1000, &bounds, 0.25).unwrap_err();
        assert!(matches!(err, EngineError::DetectionFailed(_)));
    }

    #[test]
    fn test_load_missing_models() {
        let err = OrtFaceAnalyzer::load(
            Path::new("/nonexistent/pfld.onnx"),
            Path::new("/nonexistent/embed.onnx"),
        )
        .unwrap_err();
        assert!(matches!(err, EngineError::ModelNotFound(_)));
    }
}
