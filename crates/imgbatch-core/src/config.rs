//! Editor configuration, loadable from JSON.
//!
//! Every field has a default, so a config file only needs to name what it
//! changes:
//!
//! ```json
//! { "output_format": "png", "pipeline": { "background": [255, 255, 255] } }
//! ```

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::encode::OutputFormat;
use crate::preview::PreviewConfig;
use crate::sink::DirectorySink;
use crate::source::FsImageSource;
use crate::transform::PipelineOptions;

/// Errors loading an [`EditorConfig`].
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("cannot read config {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid config {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

/// Settings shared by the preview and batch paths.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EditorConfig {
    /// Directory batch results are written to.
    pub output_dir: PathBuf,
    /// Appended to each input file stem.
    pub output_suffix: String,
    pub output_format: OutputFormat,
    /// JPEG quality 1-100; out-of-range values are clamped when encoding.
    pub jpeg_quality: u8,
    /// Rotate decoded images upright according to their EXIF tag.
    pub apply_exif_orientation: bool,
    pub pipeline: PipelineOptions,
    pub preview: PreviewConfig,
}

impl Default for EditorConfig {
    fn default() -> Self {
        Self {
            output_dir: PathBuf::from("output_images"),
            output_suffix: "_edited".to_string(),
            output_format: OutputFormat::Jpeg,
            jpeg_quality: 90,
            apply_exif_orientation: false,
            pipeline: PipelineOptions::default(),
            preview: PreviewConfig::default(),
        }
    }
}

impl EditorConfig {
    /// Parse a JSON document. Missing fields take their defaults.
    pub fn from_json(text: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(text)
    }

    pub fn from_json_file(path: &Path) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json(&text).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    /// Filesystem image source honoring the decode/encode settings.
    pub fn image_source(&self) -> FsImageSource {
        FsImageSource {
            apply_exif_orientation: self.apply_exif_orientation,
            jpeg_quality: self.jpeg_quality.clamp(1, 100),
        }
    }

    /// Output sink for batch saves.
    pub fn sink(&self) -> DirectorySink<FsImageSource> {
        DirectorySink::new(
            self.image_source(),
            &self.output_dir,
            self.output_suffix.as_str(),
            self.output_format,
        )
    }
}
