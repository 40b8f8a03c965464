//! Listing the images in a folder.

use std::path::{Path, PathBuf};

use log::warn;
use thiserror::Error;
use walkdir::WalkDir;

/// File extensions recognized as images, compared case-insensitively.
pub const IMAGE_EXTENSIONS: [&str; 5] = ["jpg", "jpeg", "png", "bmp", "webp"];

/// Errors from enumerating a folder.
#[derive(Debug, Error)]
pub enum FolderError {
    #[error("cannot list {path}: {source}")]
    Walk {
        path: PathBuf,
        #[source]
        source: walkdir::Error,
    },
}

/// Lists the images that make up a batch.
pub trait FolderEnumerator {
    /// Image paths directly inside `folder`, in listing order.
    fn list_images(&self, folder: &Path) -> Result<Vec<PathBuf>, FolderError>;
}

/// Non-recursive filesystem listing.
///
/// Order is whatever the filesystem returns; it is not sorted.
#[derive(Debug, Clone, Copy, Default)]
pub struct FsFolder;

impl FolderEnumerator for FsFolder {
    fn list_images(&self, folder: &Path) -> Result<Vec<PathBuf>, FolderError> {
        let mut paths = Vec::new();

        for entry in WalkDir::new(folder)
            .min_depth(1)
            .max_depth(1)
            .follow_links(true)
        {
            let entry = match entry {
                Ok(entry) => entry,
                // Unreadable entries (e.g. dangling links) are left out
                Err(e) if e.depth() > 0 => {
                    warn!("skipping unreadable entry in {}: {e}", folder.display());
                    continue;
                }
                Err(source) => {
                    return Err(FolderError::Walk {
                        path: folder.to_path_buf(),
                        source,
                    })
                }
            };

            if entry.file_type().is_file() && is_image_path(entry.path()) {
                paths.push(entry.into_path());
            }
        }

        Ok(paths)
    }
}

/// Whether the path has one of the recognized image extensions.
pub fn is_image_path(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| {
            IMAGE_EXTENSIONS
                .iter()
                .any(|known| ext.eq_ignore_ascii_case(known))
        })
        .unwrap_or(false)
}
