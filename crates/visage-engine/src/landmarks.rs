//! 68-point landmark layout and feature grouping.
//!
//! Point indices follow the standard 68-point facial annotation scheme:
//!
//! - 0-16: jawline (left ear to right ear)
//! - 17-21: left eyebrow, 22-26: right eyebrow
//! - 27-30: nose bridge, 31-35: nose base
//! - 36-41: left eye, 42-47: right eye
//! - 48-59: outer lip contour, 60-67: inner lip contour
//!
//! The wire format groups these into named features. The lip groups trace
//! the outer edge of one lip followed by the inner edge in reverse, sharing
//! the mouth-corner points, which is why their lengths sum past 68.

use visage_models::FaceLandmarks;

use crate::error::{EngineError, EngineResult};

/// Number of points the landmark model must produce.
pub const LANDMARK_POINT_COUNT: usize = 68;

/// Group a flat 68-point array into named facial features.
///
/// Fails when the point count is wrong; a landmark stage that drops or
/// invents points is an internal defect, never silently truncated.
pub fn group_landmarks(points: &[[i64; 2]]) -> EngineResult<FaceLandmarks> {
    if points.len() != LANDMARK_POINT_COUNT {
        return Err(EngineError::internal(format!(
            "Expected {LANDMARK_POINT_COUNT} landmark points, got {}",
            points.len()
        )));
    }

    let range = |r: std::ops::Range<usize>| points[r].to_vec();
    let pick = |indices: &[usize]| -> Vec<[i64; 2]> {
        indices.iter().map(|&i| points[i]).collect()
    };

    let mut top_lip = range(48..55);
    top_lip.extend(pick(&[64, 63, 62, 61, 60]));

    let mut bottom_lip = range(54..60);
    bottom_lip.extend(pick(&[48, 60, 67, 66, 65, 64]));

    Ok(FaceLandmarks {
        chin: range(0..17),
        left_eyebrow: range(17..22),
        right_eyebrow: range(22..27),
        nose_bridge: range(27..31),
        nose_tip: range(31..36),
        left_eye: range(36..42),
        right_eye: range(42..48),
        top_lip,
        bottom_lip,
    })
}
