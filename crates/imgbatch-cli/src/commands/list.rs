use std::path::Path;

use anyhow::{Context, Result};
use imgbatch_core::{FolderEnumerator, FsFolder};

pub fn execute(folder: &Path) -> Result<()> {
    let paths = FsFolder
        .list_images(folder)
        .with_context(|| format!("Failed to list {}", folder.display()))?;

    for path in &paths {
        println!("{}", path.display());
    }
    eprintln!("{} images", paths.len());
    Ok(())
}
