//! Shared wire-format models for the Visage face detection service.
//!
//! This crate provides Serde-serializable types for:
//! - Detection requests (single and batch)
//! - Per-face results: bounding boxes, descriptors, landmark groups
//! - Detection and health responses
//! - Detector backend selection

pub mod detect;
pub mod detector_kind;
pub mod face;

// Re-export common types
pub use detect::{
    BatchDetectRequest, BatchDetectResponse, BatchItem, DetectRequest, DetectResponse,
    HealthResponse, PhotoRef,
};
pub use detector_kind::DetectorKind;
pub use face::{Face, FaceBox, FaceLandmarks};
