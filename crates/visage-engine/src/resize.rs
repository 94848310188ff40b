//! Downscaling oversized images before detection.
//!
//! Detection cost grows with pixel count, so images whose largest dimension
//! exceeds the configured limit are shrunk with a high-quality filter first.
//! Every coordinate the pipeline reports afterwards (boxes, landmarks) is in
//! the shrunk image's coordinate space; callers that need original-resolution
//! coordinates must rescale by `original_dimension / resized_dimension`.

use image::imageops::FilterType;
use image::{DynamicImage, GenericImageView};
use tracing::info;

/// Compute the downscaled dimensions, or `None` when no resize is needed.
///
/// `scale = max_dim / max(width, height)`, both dimensions truncated to
/// integers, matching the service's documented coordinate contract.
pub fn scaled_dimensions(width: u32, height: u32, max_dim: u32) -> Option<(u32, u32)> {
    let largest = width.max(height);
    if largest <= max_dim {
        return None;
    }

    let scale = f64::from(max_dim) / f64::from(largest);
    let new_width = (f64::from(width) * scale) as u32;
    let new_height = (f64::from(height) * scale) as u32;

    // A degenerate aspect ratio could truncate to zero; keep at least 1px.
    Some((new_width.max(1), new_height.max(1)))
}

/// Shrink an image so its largest dimension is at most `max_dim`.
pub fn shrink_to_limit(image: DynamicImage, max_dim: u32) -> DynamicImage {
    let (width, height) = image.dimensions();
    match scaled_dimensions(width, height, max_dim) {
        Some((new_width, new_height)) => {
            info!(width, height, new_width, new_height, "Resized image before detection");
            image.resize_exact(new_width, new_height, FilterType::Lanczos3)
        }
        None => image,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_no_resize_at_or_below_limit() {
        assert_eq!(scaled_dimensions(2000, 1500, 2000), None);
        assert_eq!(scaled_dimensions(1999, 2000, 2000), None);
        assert_eq!(scaled_dimensions(10, 10, 2000), None);
    }

    #[test]
    fn test_largest_dimension_hits_limit() {
        let (w, h) = scaled_dimensions(4000, 3000, 2000).unwrap();
        assert_eq!(w, 2000);
        assert_eq!(h, 1500);

        let (w, h) = scaled_dimensions(1000, 5000, 2000).unwrap();
        assert_eq!(h, 2000);
        assert_eq!(w, 400);
    }

    #[test]
    fn test_dimensions_truncate() {
        // scale = 2000/3000, 1999 * 2/3 = 1332.67 -> truncates to 1332
        let (w, h) = scaled_dimensions(3000, 1999, 2000).unwrap();
        assert_eq!(w, 2000);
        assert_eq!(h, 1332);
    }

    #[test]
    fn test_aspect_ratio_preserved_within_one_pixel() {
        let (w, h) = scaled_dimensions(4321, 987, 2000).unwrap();
        let original_ratio = 4321.0 / 987.0;
        let resized_ratio = f64::from(w) / f64::from(h);
        // One pixel of truncation on the short side bounds the drift
        assert!((original_ratio - resized_ratio).abs() < original_ratio / f64::from(h));
    }

    #[test]
    fn test_degenerate_aspect_keeps_one_pixel() {
        let (w, h) = scaled_dimensions(1, 100_000, 2000).unwrap();
        assert_eq!(w, 1);
        assert_eq!(h, 2000);
    }

    #[test]
    fn test_shrink_resizes_pixels() {
        let image = DynamicImage::ImageRgb8(image::RgbImage::new(40, 20));
        let shrunk = shrink_to_limit(image, 10);
        assert_eq!(shrunk.dimensions(), (10, 5));
    }

    #[test]
    fn test_shrink_is_noop_for_small_images() {
        let image = DynamicImage::ImageRgb8(image::RgbImage::new(40, 20));
        let same = shrink_to_limit(image, 64);
        assert_eq!(same.dimensions(), (40, 20));
    }
}
