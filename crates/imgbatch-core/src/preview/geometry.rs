//! Fitting a transformed image into a bounded preview viewport.

use serde::{Deserialize, Serialize};

use crate::decode::{DecodedImage, FilterType};
use crate::params::TargetSize;
use crate::transform::{apply_resize, TransformError};

/// Anything that can report the current preview viewport size in pixels.
///
/// Before first layout a toolkit may report a tiny or zero size; [`fit`]
/// replaces such values with a fallback.
pub trait ViewportProvider {
    fn viewport_size(&self) -> (u32, u32);
}

/// A fixed viewport, e.g. from command-line flags.
impl ViewportProvider for (u32, u32) {
    fn viewport_size(&self) -> (u32, u32) {
        *self
    }
}

/// Preview sizing policy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PreviewConfig {
    /// Viewport dimensions below this are treated as not laid out yet.
    pub min_viewport: u32,
    /// Replacement for any viewport dimension under `min_viewport`.
    pub fallback_viewport: u32,
    /// Filter used to scale the preview rendering.
    pub filter: FilterType,
}

impl Default for PreviewConfig {
    fn default() -> Self {
        Self {
            min_viewport: 50,
            fallback_viewport: 600,
            filter: FilterType::Bilinear,
        }
    }
}

/// How a transformed image is displayed inside the viewport.
///
/// The preview is anchored at the viewport's top-left corner and is usually
/// smaller than the viewport in one dimension (letterboxed).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PreviewGeometry {
    /// Full-resolution transformed image width.
    pub image_width: u32,
    /// Full-resolution transformed image height.
    pub image_height: u32,
    /// Width of the preview actually rendered.
    pub rendered_width: u32,
    /// Height of the preview actually rendered.
    pub rendered_height: u32,
    /// Uniform scale applied to the image, never above 1.
    pub scale: f64,
    /// The effective viewport after the degenerate-size fallback.
    pub viewport: (u32, u32),
}

impl PreviewGeometry {
    /// True when there is nothing to show (zero-sized image).
    pub fn is_empty(&self) -> bool {
        self.rendered_width == 0 || self.rendered_height == 0
    }

    /// Map a preview-space point to image space.
    ///
    /// Each axis is scaled by `image / rendered` and rounded to the nearest
    /// pixel. Points outside the rendered preview map outside the image.
    pub fn preview_to_image(&self, x: i32, y: i32) -> (i32, i32) {
        (
            scale_coord(x, self.image_width, self.rendered_width),
            scale_coord(y, self.image_height, self.rendered_height),
        )
    }

    /// Map an image-space point to preview space, e.g. to draw an existing crop.
    pub fn image_to_preview(&self, x: i32, y: i32) -> (i32, i32) {
        (
            scale_coord(x, self.rendered_width, self.image_width),
            scale_coord(y, self.rendered_height, self.image_height),
        )
    }
}

fn scale_coord(value: i32, numerator: u32, denominator: u32) -> i32 {
    if denominator == 0 {
        return 0;
    }
    let ratio = numerator as f64 / denominator as f64;
    (value as f64 * ratio).round() as i32
}

/// Fit an image into a viewport with the default [`PreviewConfig`].
pub fn fit(image_dims: (u32, u32), viewport_dims: (u32, u32)) -> PreviewGeometry {
    fit_with(image_dims, viewport_dims, &PreviewConfig::default())
}

/// Fit an image into a viewport, preserving aspect ratio.
///
/// The scale is `min(viewport_w / image_w, viewport_h / image_h)`, capped at
/// 1 so small images are never enlarged. Rendered dimensions are rounded to
/// whole pixels and kept within `1..=viewport`.
pub fn fit_with(
    image_dims: (u32, u32),
    viewport_dims: (u32, u32),
    config: &PreviewConfig,
) -> PreviewGeometry {
    let usable = |v: u32| {
        if v < config.min_viewport {
            config.fallback_viewport.max(1)
        } else {
            v
        }
    };
    let viewport = (usable(viewport_dims.0), usable(viewport_dims.1));
    let (image_width, image_height) = image_dims;

    if image_width == 0 || image_height == 0 {
        return PreviewGeometry {
            image_width,
            image_height,
            rendered_width: 0,
            rendered_height: 0,
            scale: 0.0,
            viewport,
        };
    }

    let scale = (viewport.0 as f64 / image_width as f64)
        .min(viewport.1 as f64 / image_height as f64)
        .min(1.0);

    let rendered = |dim: u32, limit: u32| ((dim as f64 * scale).round() as u32).clamp(1, limit);

    PreviewGeometry {
        image_width,
        image_height,
        rendered_width: rendered(image_width, viewport.0),
        rendered_height: rendered(image_height, viewport.1),
        scale,
        viewport,
    }
}

/// Scale `image` down to the geometry's rendered size.
pub fn render_preview(
    image: &DecodedImage,
    geometry: &PreviewGeometry,
    filter: FilterType,
) -> Result<DecodedImage, TransformError> {
    apply_resize(
        image,
        TargetSize {
            width: geometry.rendered_width,
            height: geometry.rendered_height,
        },
        filter,
    )
}


// ============================================================================
// Property-Based Tests
// ============================================================================
