//! Decoding of still images (JPEG, PNG, BMP, WebP) into RGB buffers.

use std::io::Cursor;
use std::path::Path;

use exif::{In, Reader, Tag};
use image::{DynamicImage, ImageError, ImageReader};

use super::{DecodeError, DecodedImage};

/// Read and decode an image file.
///
/// Alpha is discarded and every format is converted to 8-bit RGB.
///
/// # Errors
///
/// Returns `DecodeError::Io` if the file cannot be read,
/// `DecodeError::InvalidFormat` if the format is not recognized, and
/// `DecodeError::CorruptedFile` if decoding fails part way.
pub fn decode_file(path: &Path, apply_orientation: bool) -> Result<DecodedImage, DecodeError> {
    let bytes = std::fs::read(path).map_err(|source| DecodeError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    decode_bytes(&bytes, apply_orientation)
}

/// Decode an in-memory image.
///
/// When `apply_orientation` is set, the EXIF orientation tag (if any) is
/// applied so the result is upright.
pub fn decode_bytes(bytes: &[u8], apply_orientation: bool) -> Result<DecodedImage, DecodeError> {
    let reader = ImageReader::new(Cursor::new(bytes))
        .with_guessed_format()
        .map_err(|e| DecodeError::CorruptedFile(e.to_string()))?;

    if reader.format().is_none() {
        return Err(DecodeError::InvalidFormat);
    }

    let img = reader.decode().map_err(|e| match e {
        ImageError::Unsupported(_) => DecodeError::InvalidFormat,
        other => DecodeError::CorruptedFile(other.to_string()),
    })?;

    let img = if apply_orientation {
        read_orientation(bytes).apply(img)
    } else {
        img
    };

    Ok(DecodedImage::from_rgb_image(img.into_rgb8()))
}

/// How a camera stored the image relative to upright: clockwise quarter
/// turns needed, then an optional horizontal mirror.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
struct Orientation {
    quarter_turns: u8,
    mirror: bool,
}

impl Orientation {
    /// Map an EXIF `Orientation` tag value. Unknown values mean upright.
    fn from_exif(tag: u32) -> Self {
        let (quarter_turns, mirror) = match tag {
            2 => (0, true),
            3 => (2, false),
            4 => (2, true),
            5 => (1, true),
            6 => (1, false),
            7 => (3, true),
            8 => (3, false),
            _ => (0, false),
        };
        Self {
            quarter_turns,
            mirror,
        }
    }

    fn apply(self, img: DynamicImage) -> DynamicImage {
        let img = match self.quarter_turns {
            1 => img.rotate90(),
            2 => img.rotate180(),
            3 => img.rotate270(),
            _ => img,
        };
        if self.mirror {
            img.fliph()
        } else {
            img
        }
    }
}

/// Orientation recorded in the container's EXIF block, upright if absent.
fn read_orientation(bytes: &[u8]) -> Orientation {
    Reader::new()
        .read_from_container(&mut Cursor::new(bytes))
        .ok()
        .and_then(|exif| {
            exif.get_field(Tag::Orientation, In::PRIMARY)
                .and_then(|field| field.value.get_uint(0))
        })
        .map(Orientation::from_exif)
        .unwrap_or_default()
}
