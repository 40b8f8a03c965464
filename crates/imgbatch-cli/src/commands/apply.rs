use std::path::Path;

use anyhow::{bail, Context, Result};
use imgbatch_core::{EditorConfig, EditorSession, FsFolder, ParameterText};

pub fn execute(config: &EditorConfig, folder: &Path, text: ParameterText) -> Result<()> {
    let sink = config.sink();
    let mut session = EditorSession::new(config.image_source(), FsFolder, config.clone());
    session
        .select_folder(folder)
        .with_context(|| format!("Failed to list {}", folder.display()))?;
    session.set_parameters(text, &(0u32, 0u32));

    let report = session
        .save_all(&sink, |p| {
            eprintln!("[{}/{}] {}", p.index + 1, p.total, p.path.display());
        })
        .with_context(|| format!("Failed to prepare {}", sink.dir().display()))?;

    for failure in &report.failures {
        eprintln!("failed: {}: {}", failure.input.display(), failure.error);
    }
    println!("{report} to {}", sink.dir().display());

    if !report.is_complete() {
        bail!("{} images could not be saved", report.failures.len());
    }
    Ok(())
}
