//! Face detection pipeline for the Visage service.
//!
//! This crate provides:
//! - Image loading with EXIF orientation handling and JPEG XL support
//! - Conditional high-quality downscaling before detection
//! - Two detector backends behind one trait: SeetaFace ("hog") and
//!   UltraFace ONNX ("cnn")
//! - Per-face landmark and descriptor extraction via ONNX Runtime
//! - A `FaceEngine` that orchestrates the stages into assembled face records

pub mod analyzer;
pub mod detector;
pub mod engine;
pub mod error;
pub mod image_io;
pub mod landmarks;
mod onnx;
pub mod resize;

pub use analyzer::{FaceAnalyzer, FaceAttributes, OrtFaceAnalyzer};
pub use detector::{Detection, FaceDetector, SeetaDetector, UltraFaceDetector};
pub use engine::{round_confidence, EngineConfig, FaceEngine};
pub use error::{EngineError, EngineResult};
pub use image_io::load_image;
pub use resize::shrink_to_limit;
