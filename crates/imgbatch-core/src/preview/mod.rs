//! Preview rendering and preview ↔ image coordinate mapping.
//!
//! A transformed image is shown scaled down inside a viewport. [`fit`]
//! decides the rendered size, [`render_preview`] produces the scaled pixels,
//! and [`PreviewCoordinateMapper`] turns a rectangle dragged over that
//! rendering back into a crop in full-resolution pixels.
//!
//! All conversions divide by the *rendered* preview size, never by the
//! viewport size, since the preview is usually letterboxed.

mod geometry;
mod mapper;

pub use geometry::{
    fit, fit_with, render_preview, PreviewConfig, PreviewGeometry, ViewportProvider,
};
pub use mapper::{PreviewCoordinateMapper, PreviewPoint};
