use std::path::Path;

use anyhow::{Context, Result};
use imgbatch_core::{
    EditorConfig, EditorSession, FsFolder, ImageSource, OutputFormat, ParameterText,
};

use crate::args::{DragArg, ViewportArg};

use super::describe_report;

pub fn execute(
    config: &EditorConfig,
    image: &Path,
    text: ParameterText,
    viewport: ViewportArg,
    drag: Option<DragArg>,
    output: Option<&Path>,
) -> Result<()> {
    let source = config.image_source();
    let mut session = EditorSession::new(source, FsFolder, config.clone());
    session.set_paths(vec![image.to_path_buf()]);
    session.set_parameters(text, &viewport);
    session
        .select_image(0, &viewport)
        .with_context(|| format!("Failed to preview {}", image.display()))?;

    if let Some(drag) = drag {
        session.begin_drag(drag.start);
        session.update_drag(drag.end);
        match session.end_drag(drag.end, &viewport) {
            Some(rect) => println!("crop: {rect}"),
            None => eprintln!("drag ignored: no preview shown"),
        }
    }

    if let Some(transformed) = session.transformed() {
        let (width, height) = transformed.image.dimensions();
        println!("image: {width}x{height}");
        for line in describe_report(&transformed.report) {
            println!("  {line}");
        }
    }

    let Some(preview) = session.preview() else {
        return Ok(());
    };
    println!("preview: {}x{}", preview.width, preview.height);

    if let Some(output) = output {
        source
            .encode(preview, output, format_for(output))
            .with_context(|| format!("Failed to write {}", output.display()))?;
        println!("wrote {}", output.display());
    }
    Ok(())
}

/// PNG for `.png` outputs, JPEG otherwise.
fn format_for(path: &Path) -> OutputFormat {
    match path.extension().and_then(|e| e.to_str()) {
        Some(ext) if ext.eq_ignore_ascii_case("png") => OutputFormat::Png,
        _ => OutputFormat::Jpeg,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use imgbatch_core::DecodedImage;
    use tempfile::TempDir;

    #[test]
    fn test_format_for_extension() {
        assert_eq!(format_for(Path::new("a.PNG")), OutputFormat::Png);
        assert_eq!(format_for(Path::new("a.jpg")), OutputFormat::Jpeg);
        assert_eq!(format_for(Path::new("a")), OutputFormat::Jpeg);
    }

    #[test]
    fn test_preview_writes_scaled_rendering() {
        let dir = TempDir::new().unwrap();
        let input = dir.path().join("in.png");
        let output = dir.path().join("preview.png");
        let config = EditorConfig::default();
        config
            .image_source()
            .encode(
                &DecodedImage::new(200, 100, vec![90; 200 * 100 * 3]),
                &input,
                OutputFormat::Png,
            )
            .unwrap();

        execute(
            &config,
            &input,
            ParameterText::new("", "90", ""),
            "80x80".parse().unwrap(),
            Some("0,0,40,40".parse().unwrap()),
            Some(&output),
        )
        .unwrap();

        // Rotated 100x200 shown at 40x80; the drag selects its top 100x100
        let written = config.image_source().decode(&output).unwrap();
        assert_eq!(written.dimensions(), (80, 80));
    }

    #[test]
    fn test_preview_missing_image_fails() {
        let dir = TempDir::new().unwrap();
        let result = execute(
            &EditorConfig::default(),
            &dir.path().join("nope.jpg"),
            ParameterText::default(),
            "600x600".parse().unwrap(),
            None,
            None,
        );
        assert!(result.is_err());
    }
}
