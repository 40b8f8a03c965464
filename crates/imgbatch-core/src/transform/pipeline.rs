//! The fixed resize → rotate → crop pipeline.

use std::fmt;

use log::debug;
use serde::{Deserialize, Serialize};

use crate::decode::{DecodedImage, FilterType};
use crate::params::{EditParameters, ParameterParseError, StageParam};

use super::{apply_resize, apply_rotation, check_buffer, clamp_crop, extract_region};
use super::{InterpolationFilter, TransformError};

/// Tuning knobs shared by preview and batch runs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineOptions {
    /// Filter used by the resize stage.
    pub resize_filter: FilterType,
    /// Sampler used by the rotate stage for angles that are not quarter turns.
    pub rotation_filter: InterpolationFilter,
    /// RGB fill for canvas area exposed by rotation.
    pub background: [u8; 3],
}

impl Default for PipelineOptions {
    fn default() -> Self {
        Self {
            resize_filter: FilterType::Lanczos3,
            rotation_filter: InterpolationFilter::Bilinear,
            background: [0, 0, 0],
        }
    }
}

/// Why a stage did not run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SkipReason {
    /// The stage's text field could not be parsed.
    Parse(ParameterParseError),
    /// The stage itself failed.
    Transform(TransformError),
    /// The crop rectangle does not overlap the image.
    EmptyCrop,
}

impl fmt::Display for SkipReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SkipReason::Parse(e) => write!(f, "{e}"),
            SkipReason::Transform(e) => write!(f, "{e}"),
            SkipReason::EmptyCrop => f.write_str("crop rectangle does not overlap the image"),
        }
    }
}

/// What happened to one stage during a pipeline run.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum StageOutcome {
    /// No parameter was given.
    #[default]
    Absent,
    /// The stage ran.
    Applied,
    /// A parameter was given but the stage was skipped.
    Skipped(SkipReason),
}

impl StageOutcome {
    pub fn is_applied(&self) -> bool {
        matches!(self, StageOutcome::Applied)
    }

    pub fn is_skipped(&self) -> bool {
        matches!(self, StageOutcome::Skipped(_))
    }
}

/// Per-stage outcomes of one pipeline run.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct PipelineReport {
    pub resize: StageOutcome,
    pub rotate: StageOutcome,
    pub crop: StageOutcome,
    /// Top-left corner of the applied crop in the pre-crop image,
    /// `(0, 0)` when no crop ran.
    pub crop_origin: (u32, u32),
}

impl PipelineReport {
    /// Outcomes of stages that were requested but skipped.
    pub fn skipped(&self) -> impl Iterator<Item = (&'static str, &SkipReason)> {
        [
            ("resize", &self.resize),
            ("rotate", &self.rotate),
            ("crop", &self.crop),
        ]
        .into_iter()
        .filter_map(|(name, outcome)| match outcome {
            StageOutcome::Skipped(reason) => Some((name, reason)),
            _ => None,
        })
    }
}

/// A pipeline result: the new image plus what each stage did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Transformed {
    pub image: DecodedImage,
    pub report: PipelineReport,
}

/// Apply resize, rotate and crop to `source`, in that order.
///
/// Never fails: a stage whose parameter is absent, malformed or unusable is
/// skipped and recorded in the report, and the remaining stages run on the
/// image produced so far. `source` is never modified.
///
/// A source whose pixel buffer does not match its dimensions is returned
/// unchanged with every requested stage skipped.
pub fn apply_edits(
    source: &DecodedImage,
    params: &EditParameters,
    options: &PipelineOptions,
) -> Transformed {
    if let Err(e) = check_buffer(source) {
        let report = PipelineReport {
            resize: refuse(&params.resize, &e),
            rotate: refuse(&params.rotation, &e),
            crop: refuse(&params.crop, &e),
            crop_origin: (0, 0),
        };
        for (stage, reason) in report.skipped() {
            debug!("{stage} stage skipped: {reason}");
        }
        return Transformed {
            image: source.clone(),
            report,
        };
    }

    let mut report = PipelineReport::default();
    let mut image = source.clone();

    report.resize = match &params.resize {
        StageParam::Absent => StageOutcome::Absent,
        StageParam::Invalid(e) => StageOutcome::Skipped(SkipReason::Parse(e.clone())),
        StageParam::Ready(target) => match apply_resize(&image, *target, options.resize_filter) {
            Ok(resized) => {
                image = resized;
                StageOutcome::Applied
            }
            Err(e) => StageOutcome::Skipped(SkipReason::Transform(e)),
        },
    };

    report.rotate = match &params.rotation {
        StageParam::Absent => StageOutcome::Absent,
        StageParam::Invalid(e) => StageOutcome::Skipped(SkipReason::Parse(e.clone())),
        StageParam::Ready(degrees) => match apply_rotation(
            &image,
            *degrees,
            options.rotation_filter,
            options.background,
        ) {
            Ok(rotated) => {
                image = rotated;
                StageOutcome::Applied
            }
            Err(e) => StageOutcome::Skipped(SkipReason::Transform(e)),
        },
    };

    report.crop = match &params.crop {
        StageParam::Absent => StageOutcome::Absent,
        StageParam::Invalid(e) => StageOutcome::Skipped(SkipReason::Parse(e.clone())),
        StageParam::Ready(rect) => match clamp_crop(rect, image.width, image.height) {
            Some(region) => {
                image = extract_region(&image, region);
                report.crop_origin = (region.left, region.top);
                StageOutcome::Applied
            }
            None => StageOutcome::Skipped(SkipReason::EmptyCrop),
        },
    };

    for (stage, reason) in report.skipped() {
        debug!("{stage} stage skipped: {reason}");
    }

    Transformed { image, report }
}

/// Outcome of a stage that cannot run on an unusable source.
fn refuse<T>(param: &StageParam<T>, error: &TransformError) -> StageOutcome {
    match param {
        StageParam::Absent => StageOutcome::Absent,
        StageParam::Invalid(e) => StageOutcome::Skipped(SkipReason::Parse(e.clone())),
        StageParam::Ready(_) => StageOutcome::Skipped(SkipReason::Transform(error.clone())),
    }
}


// ============================================================================
// Property-Based Tests
// ============================================================================
