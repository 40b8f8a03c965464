//! Exact-size resampling using the `image` crate's filters.

use crate::decode::{DecodedImage, FilterType};
use crate::params::TargetSize;

use super::{check_output_size, TransformError};

/// Resample an image to exactly `target`, ignoring aspect ratio.
///
/// # Errors
///
/// Returns `TransformError::ZeroDimensions` for an empty target,
/// `TransformError::TooLarge` for a target above
/// [`MAX_OUTPUT_PIXELS`](super::MAX_OUTPUT_PIXELS) and
/// `TransformError::PixelBufferMismatch` if the source buffer is malformed.
pub fn apply_resize(
    image: &DecodedImage,
    target: TargetSize,
    filter: FilterType,
) -> Result<DecodedImage, TransformError> {
    let TargetSize { width, height } = target;
    if width == 0 || height == 0 {
        return Err(TransformError::ZeroDimensions { width, height });
    }
    check_output_size(width, height)?;

    // Fast path: if dimensions match, just clone
    if image.width == width && image.height == height {
        return Ok(image.clone());
    }

    let rgb_image = image
        .to_rgb_image()
        .ok_or(TransformError::PixelBufferMismatch {
            width: image.width,
            height: image.height,
            actual: image.pixels.len(),
        })?;

    let resized = image::imageops::resize(&rgb_image, width, height, filter.to_image_filter());

    Ok(DecodedImage::from_rgb_image(resized))
}
