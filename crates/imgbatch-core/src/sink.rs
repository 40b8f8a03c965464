//! Persisting transformed images into an output directory.

use std::cell::RefCell;
use std::collections::HashSet;
use std::path::{Path, PathBuf};

use log::debug;

use crate::decode::DecodedImage;
use crate::encode::{EncodeError, OutputFormat};
use crate::source::ImageSource;

/// Destination for batch results.
pub trait PersistenceSink {
    /// Called once before the first image is written.
    fn prepare(&self) -> Result<(), EncodeError> {
        Ok(())
    }

    /// Write the transformed version of `input`, returning where it went.
    fn persist(&self, input: &Path, image: &DecodedImage) -> Result<PathBuf, EncodeError>;
}

/// Writes `<stem><suffix>.<ext>` files into one directory.
///
/// Inputs whose stems collide within one batch (`a.png` and `a.bmp`) get
/// `<stem><suffix>_1.<ext>`, `_2` and so on, so no result replaces another.
/// [`prepare`](PersistenceSink::prepare) starts a new batch.
#[derive(Debug, Clone)]
pub struct DirectorySink<S> {
    source: S,
    dir: PathBuf,
    suffix: String,
    format: OutputFormat,
    claimed: RefCell<HashSet<PathBuf>>,
}

impl<S: ImageSource> DirectorySink<S> {
    pub fn new(
        source: S,
        dir: impl Into<PathBuf>,
        suffix: impl Into<String>,
        format: OutputFormat,
    ) -> Self {
        Self {
            source,
            dir: dir.into(),
            suffix: suffix.into(),
            format,
            claimed: RefCell::default(),
        }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Output path for `input`: same stem plus suffix, extension forced by format.
    pub fn output_path(&self, input: &Path) -> PathBuf {
        self.numbered_path(input, 0)
    }

    fn numbered_path(&self, input: &Path, n: usize) -> PathBuf {
        let stem = input
            .file_stem()
            .map(|s| s.to_string_lossy())
            .unwrap_or_else(|| "image".into());
        let ext = self.format.extension();
        let name = match n {
            0 => format!("{stem}{}.{ext}", self.suffix),
            n => format!("{stem}{}_{n}.{ext}", self.suffix),
        };
        self.dir.join(name)
    }

    /// First output path for `input` not yet written in this batch.
    fn claim(&self, input: &Path) -> PathBuf {
        let mut claimed = self.claimed.borrow_mut();
        let path = (0..)
            .map(|n| self.numbered_path(input, n))
            .find(|path| !claimed.contains(path))
            .unwrap_or_else(|| self.output_path(input));
        claimed.insert(path.clone());
        path
    }
}

impl<S: ImageSource> PersistenceSink for DirectorySink<S> {
    fn prepare(&self) -> Result<(), EncodeError> {
        self.claimed.borrow_mut().clear();
        std::fs::create_dir_all(&self.dir).map_err(|source| EncodeError::Io {
            path: self.dir.clone(),
            source,
        })
    }

    fn persist(&self, input: &Path, image: &DecodedImage) -> Result<PathBuf, EncodeError> {
        let path = self.claim(input);
        if path != self.output_path(input) {
            debug!("{} saved as {}, name already used", input.display(), path.display());
        }
        self.source.encode(image, &path, self.format)?;
        Ok(path)
    }
}
