//! Image encoding for imgbatch.
//!
//! This module provides functionality for:
//! - Encoding images to JPEG format with configurable quality
//! - Encoding images to lossless PNG
//!
//! # Examples
//!
//! ```ignore
//! use imgbatch_core::encode::{encode_image, OutputFormat};
//!
//! let bytes = encode_image(&image, OutputFormat::Jpeg, 90)?;
//! println!("Encoded {} bytes", bytes.len());
//! ```

mod jpeg;
mod png;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::decode::DecodedImage;

pub use jpeg::encode_jpeg;
pub use png::encode_png;

/// Errors that can occur during encoding or writing an encoded image.
#[derive(Debug, Error)]
pub enum EncodeError {
    /// Pixel data length doesn't match expected dimensions
    #[error("Invalid pixel data: expected {expected} bytes (width * height * 3), got {actual}")]
    InvalidPixelData { expected: usize, actual: usize },

    /// Width or height is zero
    #[error("Invalid dimensions: width ({width}) and height ({height}) must be non-zero")]
    InvalidDimensions { width: u32, height: u32 },

    /// The encoder itself failed
    #[error("{format} encoding failed: {message}")]
    EncodingFailed {
        format: &'static str,
        message: String,
    },

    /// Writing the encoded bytes failed
    #[error("I/O error writing {path}: {source}")]
    Io {
        path: std::path::PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Output container written by the persistence sink.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    /// Baseline JPEG (lossy, uses the configured quality).
    #[default]
    Jpeg,
    /// PNG (lossless, quality is ignored).
    Png,
}

impl OutputFormat {
    /// File extension forced onto outputs of this format.
    pub fn extension(self) -> &'static str {
        match self {
            OutputFormat::Jpeg => "jpg",
            OutputFormat::Png => "png",
        }
    }
}

/// Encode an image in the requested format.
pub fn encode_image(
    image: &DecodedImage,
    format: OutputFormat,
    quality: u8,
) -> Result<Vec<u8>, EncodeError> {
    match format {
        OutputFormat::Jpeg => encode_jpeg(&image.pixels, image.width, image.height, quality),
        OutputFormat::Png => encode_png(&image.pixels, image.width, image.height),
    }
}

/// Check that a pixel buffer describes a non-empty RGB8 image.
pub(crate) fn validate_rgb(pixels: &[u8], width: u32, height: u32) -> Result<(), EncodeError> {
    if width == 0 || height == 0 {
        return Err(EncodeError::InvalidDimensions { width, height });
    }

    let expected = (width as usize) * (height as usize) * 3;
    if pixels.len() != expected {
        return Err(EncodeError::InvalidPixelData {
            expected,
            actual: pixels.len(),
        });
    }

    Ok(())
}
