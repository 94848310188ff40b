//! ONNX Runtime session helpers shared by the inference-backed stages.

use std::path::Path;

use ort::session::builder::GraphOptimizationLevel;
use ort::session::Session;
use ort::value::{Tensor, Value};

use crate::error::{EngineError, EngineResult};

/// Load an ONNX model from disk into a ready session.
pub(crate) fn load_session(model_path: &Path) -> EngineResult<Session> {
    if !model_path.exists() {
        return Err(EngineError::model_not_found(
            model_path.display().to_string(),
        ));
    }

    let model_bytes = std::fs::read(model_path)
        .map_err(|e| EngineError::detection_failed(format!("ORT read model file: {e}")))?;

    Session::builder()
        .map_err(|e| EngineError::detection_failed(format!("ORT session builder: {e}")))?
        .with_optimization_level(GraphOptimizationLevel::Level3)
        .map_err(|e| EngineError::detection_failed(format!("ORT opt level: {e}")))?
        .commit_from_memory(model_bytes.as_slice())
        .map_err(|e| EngineError::detection_failed(format!("ORT load model: {e}")))
}

/// Convert an RGB image to a `[1, 3, H, W]` float tensor, applying the given
/// per-channel-value normalization (HWC -> CHW).
pub(crate) fn chw_tensor(
    rgb: &image::RgbImage,
    normalize: impl Fn(u8) -> f32,
) -> EngineResult<Value> {
    let (width, height) = rgb.dimensions();
    let (w, h) = (width as usize, height as usize);

    let mut chw: Vec<f32> = Vec::with_capacity(3 * h * w);
    for c in 0..3 {
        for y in 0..h {
            for x in 0..w {
                let pixel = rgb.get_pixel(x as u32, y as u32);
                chw.push(normalize(pixel[c]));
            }
        }
    }

    let shape = vec![1usize, 3, h, w];
    Tensor::from_array((shape, chw.into_boxed_slice()))
        .map(Value::from)
        .map_err(|e| EngineError::detection_failed(format!("ORT tensor: {e}")))
}
