//! UltraFace detection backend (the "cnn" path).
//!
//! Runs the UltraFace RFB-320 ONNX model through ONNX Runtime. Unlike the
//! fast path, this backend yields a real probability per face, which the
//! service surfaces as the detection confidence.

use std::path::Path;
use std::sync::Mutex;

use image::{DynamicImage, GenericImageView};
use ndarray::Array;
use ort::session::Session;
use ort::value::Value;
use tracing::{debug, info};

use crate::detector::{clamped_box, Detection, FaceDetector};
use crate::error::{EngineError, EngineResult};
use crate::onnx;

/// Model file name resolved under the configured model directory.
pub const ULTRAFACE_MODEL_FILE: &str = "version-RFB-320.onnx";

/// Model input size (width x height).
const INPUT_WIDTH: u32 = 320;
const INPUT_HEIGHT: u32 = 240;

/// Face-class probability below which candidates are discarded.
const SCORE_THRESHOLD: f32 = 0.7;

/// IoU above which overlapping candidates are suppressed.
const NMS_THRESHOLD: f32 = 0.45;

/// UltraFace detector running on ONNX Runtime.
#[derive(Debug)]
pub struct UltraFaceDetector {
    session: Mutex<Session>,
}

impl UltraFaceDetector {
    /// Load the UltraFace model from disk.
    pub fn load(model_path: &Path) -> EngineResult<Self> {
        let session = onnx::load_session(model_path)?;
        info!(model_path = %model_path.display(), "UltraFace detector initialized");
        Ok(Self {
            session: Mutex::new(session),
        })
    }

    /// Run inference and return the raw `scores` and `boxes` outputs.
    fn run_inference(&self, input: Value) -> EngineResult<(Vec<f32>, Vec<f32>)> {
        let mut session = self
            .session
            .lock()
            .map_err(|_| EngineError::detection_failed("ORT session poisoned"))?;

        let outputs = session
            .run(ort::inputs![input])
            .map_err(|e| EngineError::detection_failed(format!("ORT run failed: {e}")))?;

        let scores = outputs
            .get("scores")
            .ok_or_else(|| EngineError::detection_failed("Missing scores tensor"))?
            .try_extract_tensor::<f32>()
            .map_err(|e| EngineError::detection_failed(format!("ORT extract scores: {e}")))?;
        let scores = scores.1.to_vec();

        let boxes = outputs
            .get("boxes")
            .ok_or_else(|| EngineError::detection_failed("Missing boxes tensor"))?
            .try_extract_tensor::<f32>()
            .map_err(|e| EngineError::detection_failed(format!("ORT extract boxes: {e}")))?;
        let boxes = boxes.1.to_vec();

        Ok((scores, boxes))
    }
}

impl FaceDetector for UltraFaceDetector {
    fn name(&self) -> &'static str {
        "cnn"
    }

    fn confidence_capable(&self) -> bool {
        true
    }

    fn detect(&self, image: &DynamicImage) -> EngineResult<Vec<Detection>> {
        let (width, height) = image.dimensions();

        let input = preprocess(image)?;
        let (scores, boxes) = self.run_inference(input)?;
        let detections = postprocess(&scores, &boxes, width, height)?;

        debug!(count = detections.len(), "UltraFace detection completed");
        Ok(detections)
    }
}

/// Preprocess for UltraFace: resize to 320x240, normalize to roughly [-1, 1],
/// NCHW layout.
fn preprocess(image: &DynamicImage) -> EngineResult<Value> {
    let resized = image.resize_exact(
        INPUT_WIDTH,
        INPUT_HEIGHT,
        image::imageops::FilterType::Triangle,
    );
    onnx::chw_tensor(&resized.to_rgb8(), |v| (v as f32 - 127.0) / 128.0)
}

/// Parse UltraFace output into clamped pixel-space detections.
///
/// Output layout: `scores` is `[1, N, 2]` (background, face) and `boxes` is
/// `[1, N, 4]` (relative x1, y1, x2, y2). Candidates below the score
/// threshold are dropped, the rest are scaled to image pixels, clamped, and
/// de-duplicated with NMS.
fn postprocess(
    scores: &[f32],
    boxes: &[f32],
    image_width: u32,
    image_height: u32,
) -> EngineResult<Vec<Detection>> {
    if scores.len() % 2 != 0 {
        return Err(EngineError::internal(format!(
            "Unexpected scores length: {}",
            scores.len()
        )));
    }
    let candidates_len = scores.len() / 2;
    if boxes.len() != candidates_len * 4 {
        return Err(EngineError::internal(format!(
            "Output size mismatch: {} scores vs {} box values",
            scores.len(),
            boxes.len()
        )));
    }

    let scores = Array::from_shape_vec((candidates_len, 2), scores.to_vec())
        .map_err(|e| EngineError::internal(format!("Failed to reshape scores: {e}")))?;
    let boxes = Array::from_shape_vec((candidates_len, 4), boxes.to_vec())
        .map_err(|e| EngineError::internal(format!("Failed to reshape boxes: {e}")))?;

    let w = f64::from(image_width);
    let h = f64::from(image_height);

    let mut candidates: Vec<Detection> = Vec::new();
    for i in 0..candidates_len {
        let confidence = scores[[i, 1]];
        if confidence < SCORE_THRESHOLD {
            continue;
        }

        let left = f64::from(boxes[[i, 0]]) * w;
        let top = f64::from(boxes[[i, 1]]) * h;
        let right = f64::from(boxes[[i, 2]]) * w;
        let bottom = f64::from(boxes[[i, 3]]) * h;

        candidates.push(Detection {
            bounds: clamped_box(top, right, bottom, left, image_width, image_height),
            confidence,
        });
    }

    Ok(non_maximum_suppression(candidates))
}

/// Greedy NMS: keep the highest-confidence candidate, suppress overlaps.
fn non_maximum_suppression(mut detections: Vec<Detection>) -> Vec<Detection> {
    if detections.is_empty() {
        return detections;
    }

    detections.sort_by(|a, b| {
        b.confidence
            .partial_cmp(&a.confidence)
            .unwrap_or(std::cmp::Ordering::Equal)
    });

    let mut keep = Vec::new();
    let mut suppressed = vec![false; detections.len()];

    for i in 0..detections.len() {
        if suppressed[i] {
            continue;
        }

        keep.push(detections[i]);

        for j in (i + 1)..detections.len() {
            if suppressed[j] {
                continue;
            }
            if compute_iou(&detections[i], &detections[j]) > NMS_THRESHOLD {
                suppressed[j] = true;
            }
        }
    }

    keep
}

/// Intersection over Union of two detections' boxes.
fn compute_iou(a: &Detection, b: &Detection) -> f32 {
    let x1 = a.bounds.left.max(b.bounds.left);
    let y1 = a.bounds.top.max(b.bounds.top);
    let x2 = a.bounds.right.min(b.bounds.right);
    let y2 = a.bounds.bottom.min(b.bounds.bottom);

    let inter_w = (x2 - x1).max(0) as f32;
    let inter_h = (y2 - y1).max(0) as f32;
    let intersection = inter_w * inter_h;

    let area_a = (a.bounds.width * a.bounds.height) as f32;
    let area_b = (b.bounds.width * b.bounds.height) as f32;
    let union = area_a + area_b - intersection;

    if union > 0.0 {
        intersection / union
    } else {
        0.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use visage_models::FaceBox;

    fn detection(top: i64, right: i64, bottom: i64, left: i64, confidence: f32) -> Detection {
        Detection {
            bounds: FaceBox::from_edges(top, right, bottom, left),
            confidence,
        }
    }

    #[test]
    fn test_load_missing_model() {
        let err = UltraFaceDetector::load(Path::new("/nonexistent/face.onnx")).unwrap_err();
        assert!(matches!(err, EngineError::ModelNotFound(_)));
    }

    #[test]
    fn test_iou_identical_boxes() {
        let a = detection(10, 50, 50, 10, 0.9);
        assert!((compute_iou(&a, &a) - 1.0).abs() < 1e-6);
    }

    #[test]
    fn test_iou_disjoint_boxes() {
        let a = detection(0, 10, 10, 0, 0.9);
        let b = detection(50, 70, 70, 50, 0.8);
        assert_eq!(compute_iou(&a, &b), 0.0);
    }

    #[test]
    fn test_nms_suppresses_overlaps() {
        let strong = detection(10, 60, 60, 10, 0.95);
        let overlapping = detection(12, 62, 62, 12, 0.80);
        let elsewhere = detection(100, 150, 150, 100, 0.75);

        let kept = non_maximum_suppression(vec![overlapping, elsewhere, strong]);
        assert_eq!(kept.len(), 2);
        // Highest confidence first
        assert!((kept[0].confidence - 0.95).abs() < 1e-6);
        assert!((kept[1].confidence - 0.75).abs() < 1e-6);
    }

    #[test]
    fn test_nms_keeps_empty() {
        assert!(non_maximum_suppression(Vec::new()).is_empty());
    }

    #[test]
    fn test_postprocess_filters_and_scales() {
        // Two candidates: one confident face, one background-dominated
        let scores = [0.1, 0.9, 0.95, 0.05];
        let boxes = [
            0.25, 0.25, 0.5, 0.5, // kept: quarter-frame box
            0.0, 0.0, 0.1, 0.1, // dropped by score threshold
        ];

        let detections = postprocess(&scores, &boxes, 320, 240).unwrap();
        assert_eq!(detections.len(), 1);
        let d = &detections[0];
        assert_eq!(d.bounds.left, 80);
        assert_eq!(d.bounds.top, 60);
        assert_eq!(d.bounds.right, 160);
        assert_eq!(d.bounds.bottom, 120);
        assert!((d.confidence - 0.9).abs() < 1e-6);
    }

    #[test]
    fn test_postprocess_clamps_to_image() {
        let scores = [0.05, 0.95];
        let boxes = [-0.1, -0.2, 1.3, 1.1];

        let detections = postprocess(&scores, &boxes, 100, 80).unwrap();
        assert_eq!(detections.len(), 1);
        assert!(detections[0].bounds.is_within(100, 80));
    }

    #[test]
    fn test_postprocess_rejects_mismatched_outputs() {
        let scores = [0.1, 0.9];
        let boxes = [0.0, 0.0, 1.0];
        assert!(postprocess(&scores, &boxes, 100, 100).is_err());
    }
}
