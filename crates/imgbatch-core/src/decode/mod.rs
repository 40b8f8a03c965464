//! Image decoding for imgbatch.
//!
//! This module provides functionality for:
//! - Decoding JPEG, PNG, BMP and WebP files into RGB8 buffers
//! - Optional EXIF orientation correction
//!
//! Decode failures are I/O concerns of the caller, never pipeline errors.
//!
//! # Examples
//!
//! ```ignore
//! use imgbatch_core::decode::decode_file;
//!
//! let image = decode_file(Path::new("photo.jpg"), false)?;
//! println!("Decoded {}x{} image", image.width, image.height);
//! ```

mod file;
mod types;

pub use file::{decode_bytes, decode_file};
pub use types::{DecodeError, DecodedImage, FilterType};
