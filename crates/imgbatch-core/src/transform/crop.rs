//! Pixel-rectangle cropping.
//!
//! Crop rectangles are expressed in pixels of the image being cropped, with
//! exclusive right and bottom edges. They are not required to lie inside the
//! image: the requested rectangle is intersected with the image bounds, and
//! a rectangle that does not overlap the image at all (or has zero width or
//! height) produces no crop.

use crate::decode::DecodedImage;
use crate::params::CropRect;

/// A crop rectangle after clamping to an image, in unsigned pixels.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PixelRegion {
    pub left: u32,
    pub top: u32,
    pub width: u32,
    pub height: u32,
}

/// Intersect `rect` with a `width` x `height` image.
///
/// Returns `None` when the intersection is empty.
pub fn clamp_crop(rect: &CropRect, width: u32, height: u32) -> Option<PixelRegion> {
    let (x1, y1, x2, y2) = rect.corners();

    let left = (x1 as i64).clamp(0, width as i64);
    let top = (y1 as i64).clamp(0, height as i64);
    let right = (x2 as i64).clamp(0, width as i64);
    let bottom = (y2 as i64).clamp(0, height as i64);

    if right <= left || bottom <= top {
        return None;
    }

    Some(PixelRegion {
        left: left as u32,
        top: top as u32,
        width: (right - left) as u32,
        height: (bottom - top) as u32,
    })
}

/// Copy a clamped region out of an image.
pub fn extract_region(image: &DecodedImage, region: PixelRegion) -> DecodedImage {
    // Fast path: full crop returns a clone
    if region.left == 0
        && region.top == 0
        && region.width == image.width
        && region.height == image.height
    {
        return image.clone();
    }

    let src_stride = image.width as usize * 3;
    let row_bytes = region.width as usize * 3;
    let mut output = Vec::with_capacity(row_bytes * region.height as usize);

    // Copy pixel data row by row
    for y in region.top..region.top + region.height {
        let start = y as usize * src_stride + region.left as usize * 3;
        output.extend_from_slice(&image.pixels[start..start + row_bytes]);
    }

    DecodedImage::new(region.width, region.height, output)
}

/// Crop an image to `rect`, clamped to the image bounds.
///
/// Returns `None` when the clamped rectangle is empty.
///
/// # Example
///
/// ```
/// use imgbatch_core::decode::DecodedImage;
/// use imgbatch_core::params::CropRect;
/// use imgbatch_core::transform::apply_crop;
///
/// let image = DecodedImage::new(100, 100, vec![128u8; 100 * 100 * 3]);
/// let cropped = apply_crop(&image, &CropRect::new(25, 25, 75, 75)).unwrap();
/// assert_eq!(cropped.dimensions(), (50, 50));
/// ```
pub fn apply_crop(image: &DecodedImage, rect: &CropRect) -> Option<DecodedImage> {
    clamp_crop(rect, image.width, image.height).map(|region| extract_region(image, region))
}


// ============================================================================
// Property-Based Tests
// ============================================================================
