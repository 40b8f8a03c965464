//! Image decode/encode collaborator.

use std::path::Path;

use log::debug;

use crate::decode::{decode_file, DecodeError, DecodedImage};
use crate::encode::{encode_image, EncodeError, OutputFormat};

/// Reads source images and writes encoded results.
///
/// Decode and encode failures are I/O concerns and are reported as such;
/// they never come out of the transform pipeline.
pub trait ImageSource {
    /// Decode the file at `path` into RGB8.
    fn decode(&self, path: &Path) -> Result<DecodedImage, DecodeError>;

    /// Encode `image` as `format` and write it to `path`.
    fn encode(
        &self,
        image: &DecodedImage,
        path: &Path,
        format: OutputFormat,
    ) -> Result<(), EncodeError>;
}

/// Filesystem-backed [`ImageSource`] using the `image` crate codecs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FsImageSource {
    /// Apply the EXIF orientation tag when decoding.
    pub apply_exif_orientation: bool,
    /// JPEG quality, 1-100.
    pub jpeg_quality: u8,
}

impl Default for FsImageSource {
    fn default() -> Self {
        Self {
            apply_exif_orientation: false,
            jpeg_quality: 90,
        }
    }
}

impl ImageSource for FsImageSource {
    fn decode(&self, path: &Path) -> Result<DecodedImage, DecodeError> {
        let image = decode_file(path, self.apply_exif_orientation)?;
        debug!(
            "decoded {} ({}x{})",
            path.display(),
            image.width,
            image.height
        );
        Ok(image)
    }

    fn encode(
        &self,
        image: &DecodedImage,
        path: &Path,
        format: OutputFormat,
    ) -> Result<(), EncodeError> {
        let bytes = encode_image(image, format, self.jpeg_quality)?;
        std::fs::write(path, bytes).map_err(|source| EncodeError::Io {
            path: path.to_path_buf(),
            source,
        })
    }
}
