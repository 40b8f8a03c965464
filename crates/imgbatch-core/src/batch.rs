//! Applying one set of edit parameters to every image of a folder.
//!
//! Images are processed strictly in order. A failure on one image (decode or
//! write) is recorded and the batch moves on, so every listed image is
//! attempted and the caller gets a full account at the end.

use std::fmt;
use std::path::{Path, PathBuf};

use log::{debug, info, warn};
use thiserror::Error;

use crate::decode::DecodeError;
use crate::encode::EncodeError;
use crate::params::EditParameters;
use crate::sink::PersistenceSink;
use crate::source::ImageSource;
use crate::transform::{apply_edits, PipelineOptions, PipelineReport};

/// Failures that stop a batch before any image is processed.
#[derive(Debug, Error)]
pub enum BatchError {
    #[error("cannot prepare output: {0}")]
    Prepare(#[source] EncodeError),
}

/// Why a single image of the batch was not saved.
#[derive(Debug, Error)]
pub enum ImageFailure {
    #[error("decode failed: {0}")]
    Decode(#[from] DecodeError),
    #[error("write failed: {0}")]
    Encode(#[from] EncodeError),
}

/// One successfully written image.
#[derive(Debug)]
pub struct SavedImage {
    pub input: PathBuf,
    pub output: PathBuf,
    pub report: PipelineReport,
}

/// One image that could not be saved.
#[derive(Debug)]
pub struct BatchFailure {
    pub input: PathBuf,
    pub error: ImageFailure,
}

/// Outcome of a whole batch, in processing order.
#[derive(Debug, Default)]
pub struct BatchReport {
    pub saved: Vec<SavedImage>,
    pub failures: Vec<BatchFailure>,
}

impl BatchReport {
    /// Number of images attempted.
    pub fn attempted(&self) -> usize {
        self.saved.len() + self.failures.len()
    }

    /// True when every image was saved.
    pub fn is_complete(&self) -> bool {
        self.failures.is_empty()
    }
}

impl fmt::Display for BatchReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} of {} images saved",
            self.saved.len(),
            self.attempted()
        )?;
        if !self.failures.is_empty() {
            write!(f, ", {} failed", self.failures.len())?;
        }
        Ok(())
    }
}

/// Progress notification sent before each image is processed.
#[derive(Debug, Clone, Copy)]
pub struct BatchProgress<'a> {
    /// Zero-based position in the batch.
    pub index: usize,
    pub total: usize,
    pub path: &'a Path,
}

/// Transform and save every path with the same parameters.
///
/// Uses exactly the pipeline used for previews, so each output equals the
/// preview-resolution result for that image. Returns `Err` only if the sink
/// cannot be prepared; per-image failures are collected in the report.
pub fn save_all<S, P, F>(
    paths: &[PathBuf],
    params: &EditParameters,
    options: &PipelineOptions,
    source: &S,
    sink: &P,
    mut progress: F,
) -> Result<BatchReport, BatchError>
where
    S: ImageSource + ?Sized,
    P: PersistenceSink + ?Sized,
    F: FnMut(BatchProgress<'_>),
{
    let mut report = BatchReport::default();
    if paths.is_empty() {
        return Ok(report);
    }

    sink.prepare().map_err(BatchError::Prepare)?;
    info!("saving {} images", paths.len());

    for (index, path) in paths.iter().enumerate() {
        progress(BatchProgress {
            index,
            total: paths.len(),
            path,
        });

        match process_one(path, params, options, source, sink) {
            Ok((output, pipeline)) => {
                debug!("{} -> {}", path.display(), output.display());
                report.saved.push(SavedImage {
                    input: path.clone(),
                    output,
                    report: pipeline,
                });
            }
            Err(error) => {
                warn!("{}: {error}", path.display());
                report.failures.push(BatchFailure {
                    input: path.clone(),
                    error,
                });
            }
        }
    }

    info!("{report}");
    Ok(report)
}

fn process_one<S, P>(
    path: &Path,
    params: &EditParameters,
    options: &PipelineOptions,
    source: &S,
    sink: &P,
) -> Result<(PathBuf, PipelineReport), ImageFailure>
where
    S: ImageSource + ?Sized,
    P: PersistenceSink + ?Sized,
{
    let image = source.decode(path)?;
    let transformed = apply_edits(&image, params, options);
    let output = sink.persist(path, &transformed.image)?;
    Ok((output, transformed.report))
}
