//! Per-face result types: bounding box, landmark groups, and the assembled
//! face record returned to clients.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// Axis-aligned face bounding box in pixel coordinates of the processed
/// (possibly resized) image.
///
/// Coordinates are clamped to image bounds by the detection layer, so
/// `width` and `height` are always non-negative.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct FaceBox {
    /// Top edge (y coordinate of the upper boundary)
    pub top: i64,
    /// Right edge (x coordinate of the right boundary)
    pub right: i64,
    /// Bottom edge (y coordinate of the lower boundary)
    pub bottom: i64,
    /// Left edge (x coordinate of the left boundary)
    pub left: i64,
    /// Derived width (`right - left`)
    pub width: i64,
    /// Derived height (`bottom - top`)
    pub height: i64,
}

impl FaceBox {
    /// Build a box from its four edges, computing the derived dimensions.
    pub fn from_edges(top: i64, right: i64, bottom: i64, left: i64) -> Self {
        Self {
            top,
            right,
            bottom,
            left,
            width: right - left,
            height: bottom - top,
        }
    }

    /// Check that the box lies fully inside an image of the given size.
    pub fn is_within(&self, image_width: u32, image_height: u32) -> bool {
        self.left >= 0
            && self.top >= 0
            && self.left <= self.right
            && self.top <= self.bottom
            && self.right <= i64::from(image_width)
            && self.bottom <= i64::from(image_height)
    }
}

/// The 68-point facial landmark set, grouped by anatomical feature.
///
/// Group names and point ordering follow the standard 68-point annotation:
/// jawline first, then brows, nose, eyes, and lips. Each point is an
/// `[x, y]` pair in pixel coordinates of the processed image. The lip groups
/// repeat the mouth-corner points, so the summed group lengths exceed 68.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize, JsonSchema)]
pub struct FaceLandmarks {
    /// Jawline, left ear to right ear (17 points)
    pub chin: Vec<[i64; 2]>,
    /// Left eyebrow arc (5 points)
    pub left_eyebrow: Vec<[i64; 2]>,
    /// Right eyebrow arc (5 points)
    pub right_eyebrow: Vec<[i64; 2]>,
    /// Bridge of the nose, top to tip (4 points)
    pub nose_bridge: Vec<[i64; 2]>,
    /// Base of the nose (5 points)
    pub nose_tip: Vec<[i64; 2]>,
    /// Left eye outline (6 points)
    pub left_eye: Vec<[i64; 2]>,
    /// Right eye outline (6 points)
    pub right_eye: Vec<[i64; 2]>,
    /// Upper lip outline, outer then inner edge (12 points)
    pub top_lip: Vec<[i64; 2]>,
    /// Lower lip outline, outer then inner edge (12 points)
    pub bottom_lip: Vec<[i64; 2]>,
}

impl FaceLandmarks {
    /// Total number of points across all groups (with lip-corner repeats).
    pub fn point_count(&self) -> usize {
        self.chin.len()
            + self.left_eyebrow.len()
            + self.right_eyebrow.len()
            + self.nose_bridge.len()
            + self.nose_tip.len()
            + self.left_eye.len()
            + self.right_eye.len()
            + self.top_lip.len()
            + self.bottom_lip.len()
    }
}

/// One detected face with everything downstream consumers need: a stable
/// per-request identifier, location, identity descriptor, landmarks, and a
/// detection confidence.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct Face {
    /// `{fileId}-face-{index}`, index in detection order within the image
    pub id: String,
    /// Bounding box in processed-image pixel coordinates
    #[serde(rename = "box")]
    pub bounds: FaceBox,
    /// 128-dimensional identity descriptor for similarity comparison
    pub descriptor: Vec<f64>,
    /// Named landmark point groups
    pub landmarks: FaceLandmarks,
    /// Detection confidence; exactly 1.0 for backends without a real signal,
    /// otherwise rounded to 3 decimal places
    pub confidence: f64,
}
