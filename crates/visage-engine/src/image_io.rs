//! Image loading with orientation handling and modern-container support.
//!
//! The `image` crate's format sniffing covers the common raster formats but
//! does not know about JPEG XL, so JXL payloads are routed to the
//! `jxl-oxide` decoder explicitly before the generic path runs. EXIF
//! orientation is applied after decoding so detectors always see upright
//! pixels.

use std::io::Cursor;
use std::path::Path;

use image::{DynamicImage, ImageDecoder, ImageReader};
use jxl_oxide::integration::JxlDecoder;

use crate::error::{EngineError, EngineResult};

/// Raw JXL codestream signature.
const JXL_CODESTREAM_MAGIC: [u8; 2] = [0xFF, 0x0A];

/// ISO BMFF container signature (`JXL ` box).
const JXL_CONTAINER_MAGIC: [u8; 12] = [
    0x00, 0x00, 0x00, 0x0C, b'J', b'X', b'L', b' ', 0x0D, 0x0A, 0x87, 0x0A,
];

/// Check for a JPEG XL payload (either packaging).
fn is_jxl(data: &[u8]) -> bool {
    data.starts_with(&JXL_CODESTREAM_MAGIC) || data.starts_with(&JXL_CONTAINER_MAGIC)
}

/// Read and decode an image file into upright RGB-capable pixels.
pub fn load_image(path: &Path) -> EngineResult<DynamicImage> {
    let data = std::fs::read(path)
        .map_err(|e| EngineError::image_load(format!("{}: {e}", path.display())))?;
    decode_image(&data)
}

/// Decode an in-memory image payload.
pub fn decode_image(data: &[u8]) -> EngineResult<DynamicImage> {
    if is_jxl(data) {
        let decoder = JxlDecoder::new(Cursor::new(data))
            .map_err(|e| EngineError::image_load(format!("JXL decode: {e}")))?;
        return DynamicImage::from_decoder(decoder)
            .map_err(|e| EngineError::image_load(format!("JXL decode: {e}")));
    }

    let mut decoder = ImageReader::new(Cursor::new(data))
        .with_guessed_format()
        .map_err(|e| EngineError::image_load(e.to_string()))?
        .into_decoder()
        .map_err(|e| EngineError::image_load(e.to_string()))?;

    let orientation = decoder
        .orientation()
        .map_err(|e| EngineError::image_load(e.to_string()))?;

    let mut image = DynamicImage::from_decoder(decoder)
        .map_err(|e| EngineError::image_load(e.to_string()))?;
    image.apply_orientation(orientation);

    Ok(image)
}
