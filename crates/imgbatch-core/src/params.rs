//! Edit parameters and their free-form text surface.
//!
//! The UI (or CLI) hands over three independent text fields. Each is parsed
//! on its own into a [`StageParam`], so a typo in one field never stops the
//! other stages from running. Nothing in here fails as a whole: a bad field
//! becomes [`StageParam::Invalid`] carrying the reason.
//!
//! # Text formats
//!
//! - resize: `"<width>x<height>"`, separator case-insensitive, e.g. `800x600`
//! - rotate: signed integer degrees, positive = clockwise, e.g. `-15`
//! - crop: four integers separated by commas and/or spaces, e.g. `10,10 200 150`

use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// The text field a parse error came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Field {
    Resize,
    Rotate,
    Crop,
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Field::Resize => "resize",
            Field::Rotate => "rotate",
            Field::Crop => "crop",
        };
        f.write_str(name)
    }
}

/// Malformed or out-of-domain text for a single stage.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParameterParseError {
    /// The field split into the wrong number of components.
    #[error("{field}: expected {expected} values, found {found}")]
    WrongComponentCount {
        field: Field,
        expected: usize,
        found: usize,
    },

    /// A component is not an integer in range.
    #[error("{field}: `{value}` is not a valid integer")]
    InvalidInteger { field: Field, value: String },

    /// Resize dimensions must both be positive.
    #[error("resize: dimensions must be positive, got {width}x{height}")]
    NonPositiveDimension { width: i64, height: i64 },
}

/// Result of parsing one stage's field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StageParam<T> {
    /// Nothing requested; the stage is skipped.
    Absent,
    /// A well-formed value; the stage runs.
    Ready(T),
    /// The field could not be parsed; the stage is skipped.
    Invalid(ParameterParseError),
}

impl<T> Default for StageParam<T> {
    fn default() -> Self {
        StageParam::Absent
    }
}

impl<T> StageParam<T> {
    /// The parsed value, if the stage is ready to run.
    pub fn ready(&self) -> Option<&T> {
        match self {
            StageParam::Ready(value) => Some(value),
            _ => None,
        }
    }

    pub fn is_absent(&self) -> bool {
        matches!(self, StageParam::Absent)
    }
}

/// Exact output size for the resize stage.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TargetSize {
    pub width: u32,
    pub height: u32,
}

/// Crop rectangle in pixels of the image being cropped.
///
/// Always normalized: `x1 <= x2` and `y1 <= y2`. The right and bottom edges
/// are exclusive. Coordinates may lie outside the image; the crop stage
/// clamps them.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CropRect {
    x1: i32,
    y1: i32,
    x2: i32,
    y2: i32,
}

impl CropRect {
    /// Build a rectangle from two corners in any order.
    pub fn new(x1: i32, y1: i32, x2: i32, y2: i32) -> Self {
        Self {
            x1: x1.min(x2),
            y1: y1.min(y2),
            x2: x1.max(x2),
            y2: y1.max(y2),
        }
    }

    /// Corners as `(x1, y1, x2, y2)`.
    pub fn corners(&self) -> (i32, i32, i32, i32) {
        (self.x1, self.y1, self.x2, self.y2)
    }

    pub fn width(&self) -> i64 {
        self.x2 as i64 - self.x1 as i64
    }

    pub fn height(&self) -> i64 {
        self.y2 as i64 - self.y1 as i64
    }

    /// Shift the rectangle by `(dx, dy)`, saturating at the i32 range.
    pub fn offset(&self, dx: i32, dy: i32) -> Self {
        Self::new(
            self.x1.saturating_add(dx),
            self.y1.saturating_add(dy),
            self.x2.saturating_add(dx),
            self.y2.saturating_add(dy),
        )
    }
}

/// Formats in the crop field's text form, `"x1 y1 x2 y2"`.
impl fmt::Display for CropRect {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {} {} {}", self.x1, self.y1, self.x2, self.y2)
    }
}

/// The three raw text fields as typed by the user.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ParameterText {
    pub resize: String,
    pub rotate: String,
    pub crop: String,
}

impl ParameterText {
    pub fn new(
        resize: impl Into<String>,
        rotate: impl Into<String>,
        crop: impl Into<String>,
    ) -> Self {
        Self {
            resize: resize.into(),
            rotate: rotate.into(),
            crop: crop.into(),
        }
    }
}

/// Parsed edit parameters, one independently optional entry per stage.
///
/// Treated as immutable for the duration of a pipeline run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EditParameters {
    pub resize: StageParam<TargetSize>,
    pub rotation: StageParam<i32>,
    pub crop: StageParam<CropRect>,
}

impl EditParameters {
    /// Parameters with every stage absent (identity edit).
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse all three text fields, each in isolation.
    pub fn parse(text: &ParameterText) -> Self {
        Self {
            resize: parse_resize(&text.resize),
            rotation: parse_rotation(&text.rotate),
            crop: parse_crop(&text.crop),
        }
    }

    pub fn with_resize(mut self, width: u32, height: u32) -> Self {
        self.resize = if width == 0 || height == 0 {
            StageParam::Invalid(ParameterParseError::NonPositiveDimension {
                width: width as i64,
                height: height as i64,
            })
        } else {
            StageParam::Ready(TargetSize { width, height })
        };
        self
    }

    pub fn with_rotation(mut self, degrees: i32) -> Self {
        self.rotation = StageParam::Ready(degrees);
        self
    }

    pub fn with_crop(mut self, rect: CropRect) -> Self {
        self.crop = StageParam::Ready(rect);
        self
    }

    /// True when no stage has anything to do.
    pub fn is_identity(&self) -> bool {
        self.resize.ready().is_none()
            && self.rotation.ready().is_none()
            && self.crop.ready().is_none()
    }
}

/// Parse the resize field, `"<width>x<height>"`.
///
/// Text without an `x` separator (including empty text) means no resize.
pub fn parse_resize(text: &str) -> StageParam<TargetSize> {
    let text = text.trim().to_lowercase();
    if !text.contains('x') {
        return StageParam::Absent;
    }

    let parts: Vec<&str> = text.split('x').collect();
    if parts.len() != 2 {
        return StageParam::Invalid(ParameterParseError::WrongComponentCount {
            field: Field::Resize,
            expected: 2,
            found: parts.len(),
        });
    }

    let width = match parse_int::<i64>(parts[0], Field::Resize) {
        Ok(v) => v,
        Err(e) => return StageParam::Invalid(e),
    };
    let height = match parse_int::<i64>(parts[1], Field::Resize) {
        Ok(v) => v,
        Err(e) => return StageParam::Invalid(e),
    };

    if width <= 0 || height <= 0 {
        return StageParam::Invalid(ParameterParseError::NonPositiveDimension { width, height });
    }

    match (u32::try_from(width), u32::try_from(height)) {
        (Ok(width), Ok(height)) => StageParam::Ready(TargetSize { width, height }),
        (Err(_), _) => StageParam::Invalid(ParameterParseError::InvalidInteger {
            field: Field::Resize,
            value: width.to_string(),
        }),
        (_, Err(_)) => StageParam::Invalid(ParameterParseError::InvalidInteger {
            field: Field::Resize,
            value: height.to_string(),
        }),
    }
}

/// Parse the rotate field, a signed integer number of degrees.
pub fn parse_rotation(text: &str) -> StageParam<i32> {
    let text = text.trim();
    if text.is_empty() {
        return StageParam::Absent;
    }
    match parse_int::<i32>(text, Field::Rotate) {
        Ok(degrees) => StageParam::Ready(degrees),
        Err(e) => StageParam::Invalid(e),
    }
}

/// Parse the crop field, four integers separated by commas and/or spaces.
///
/// The result is normalized so that inverted rectangles are accepted.
pub fn parse_crop(text: &str) -> StageParam<CropRect> {
    let text = text.replace(',', " ");
    let tokens: Vec<&str> = text.split_whitespace().collect();

    if tokens.is_empty() {
        return StageParam::Absent;
    }
    if tokens.len() != 4 {
        return StageParam::Invalid(ParameterParseError::WrongComponentCount {
            field: Field::Crop,
            expected: 4,
            found: tokens.len(),
        });
    }

    let mut values = [0i32; 4];
    for (slot, token) in values.iter_mut().zip(&tokens) {
        match parse_int::<i32>(token, Field::Crop) {
            Ok(v) => *slot = v,
            Err(e) => return StageParam::Invalid(e),
        }
    }

    let [x1, y1, x2, y2] = values;
    StageParam::Ready(CropRect::new(x1, y1, x2, y2))
}

fn parse_int<T: std::str::FromStr>(text: &str, field: Field) -> Result<T, ParameterParseError> {
    let text = text.trim();
    text.parse::<T>()
        .map_err(|_| ParameterParseError::InvalidInteger {
            field,
            value: text.to_string(),
        })
}


// ============================================================================
// Property-Based Tests
// ============================================================================
