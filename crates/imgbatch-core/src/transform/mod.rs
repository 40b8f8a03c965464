//! Image transformation operations: resize, rotation and cropping.
//!
//! # Transform Order
//!
//! [`apply_edits`] always runs the stages in this order:
//! 1. Resize (exact target size, Lanczos3 by default)
//! 2. Rotation (clockwise degrees, canvas expanded)
//! 3. Crop (pixel rectangle in the resized and rotated image)
//!
//! Each stage is optional and best-effort: a stage whose parameter is
//! missing or malformed is skipped and the others still run.
//!
//! # Coordinate System
//!
//! - Rotation angles are in degrees, positive = clockwise
//! - Crop coordinates are pixels of the image after resize and rotation
//! - Origin is top-left corner

mod crop;
mod pipeline;
mod resize;
mod rotation;

use thiserror::Error;

use crate::decode::DecodedImage;

pub use crop::{apply_crop, clamp_crop, extract_region, PixelRegion};
pub use pipeline::{
    apply_edits, PipelineOptions, PipelineReport, SkipReason, StageOutcome, Transformed,
};
pub use resize::apply_resize;
pub use rotation::{apply_rotation, compute_rotated_bounds, InterpolationFilter};

/// Failures inside a transform stage that are not parameter parse errors.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TransformError {
    /// A stage was asked to produce an empty image.
    #[error("target dimensions must be non-zero, got {width}x{height}")]
    ZeroDimensions { width: u32, height: u32 },

    /// The source buffer does not match its declared dimensions.
    #[error("pixel buffer of {actual} bytes does not match {width}x{height} RGB")]
    PixelBufferMismatch {
        width: u32,
        height: u32,
        actual: usize,
    },

    /// The stage would produce more pixels than [`MAX_OUTPUT_PIXELS`].
    #[error("{width}x{height} exceeds the {limit} pixel output limit")]
    TooLarge { width: u32, height: u32, limit: u64 },
}

/// Largest image, in pixels, any stage may produce (about 300 MB of RGB8).
pub const MAX_OUTPUT_PIXELS: u64 = 100_000_000;

/// Refuse stage outputs above [`MAX_OUTPUT_PIXELS`] before allocating them.
pub(crate) fn check_output_size(width: u32, height: u32) -> Result<(), TransformError> {
    match u64::from(width).checked_mul(u64::from(height)) {
        Some(pixels) if pixels <= MAX_OUTPUT_PIXELS => Ok(()),
        _ => Err(TransformError::TooLarge {
            width,
            height,
            limit: MAX_OUTPUT_PIXELS,
        }),
    }
}

/// Check that the buffer length matches the declared RGB8 dimensions.
pub(crate) fn check_buffer(image: &DecodedImage) -> Result<(), TransformError> {
    let expected = u64::from(image.width) * u64::from(image.height) * 3;
    if image.pixels.len() as u64 != expected {
        return Err(TransformError::PixelBufferMismatch {
            width: image.width,
            height: image.height,
            actual: image.pixels.len(),
        });
    }
    Ok(())
}
