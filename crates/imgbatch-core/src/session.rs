//! Interactive editing state for one folder of images.
//!
//! An [`EditorSession`] owns everything a front end needs between events:
//! the listed paths, the selected image, the parameter text, the current
//! transformed image and its preview, and the drag mapper. Each event method
//! recomputes synchronously before returning, so the preview always reflects
//! the current parameters.

use std::path::{Path, PathBuf};

use log::{debug, warn};
use thiserror::Error;

use crate::batch::{self, BatchError, BatchProgress, BatchReport};
use crate::config::EditorConfig;
use crate::decode::{DecodeError, DecodedImage};
use crate::folder::{FolderEnumerator, FolderError};
use crate::params::{
    parse_crop, parse_resize, parse_rotation, CropRect, EditParameters, ParameterText,
};
use crate::preview::{
    fit_with, render_preview, PreviewCoordinateMapper, PreviewGeometry, PreviewPoint,
    ViewportProvider,
};
use crate::sink::PersistenceSink;
use crate::source::ImageSource;
use crate::transform::{apply_edits, Transformed};

#[derive(Debug, Error)]
pub enum SessionError {
    #[error(transparent)]
    Folder(#[from] FolderError),
    #[error("no image at index {index} ({count} listed)")]
    NoSuchImage { index: usize, count: usize },
    #[error("cannot open {path}: {source}")]
    Decode {
        path: PathBuf,
        #[source]
        source: DecodeError,
    },
    #[error(transparent)]
    Batch(#[from] BatchError),
}

/// Editor state driven by UI or CLI events.
pub struct EditorSession<S, F> {
    source: S,
    folder: F,
    config: EditorConfig,
    paths: Vec<PathBuf>,
    selected: Option<usize>,
    original: Option<DecodedImage>,
    text: ParameterText,
    params: EditParameters,
    current: Option<Transformed>,
    preview: Option<DecodedImage>,
    mapper: PreviewCoordinateMapper,
}

impl<S: ImageSource, F: FolderEnumerator> EditorSession<S, F> {
    pub fn new(source: S, folder: F, config: EditorConfig) -> Self {
        Self {
            source,
            folder,
            config,
            paths: Vec::new(),
            selected: None,
            original: None,
            text: ParameterText::default(),
            params: EditParameters::new(),
            current: None,
            preview: None,
            mapper: PreviewCoordinateMapper::new(),
        }
    }

    /// List the images in `folder` and drop the current selection.
    ///
    /// Parameters are kept. Returns the number of images found.
    pub fn select_folder(&mut self, folder: &Path) -> Result<usize, SessionError> {
        let paths = self.folder.list_images(folder)?;
        debug!("{} images in {}", paths.len(), folder.display());

        self.paths = paths;
        self.unload();
        Ok(self.paths.len())
    }

    /// Use an explicit list of paths instead of a folder listing.
    pub fn set_paths(&mut self, paths: Vec<PathBuf>) {
        self.paths = paths;
        self.unload();
    }

    fn unload(&mut self) {
        self.selected = None;
        self.original = None;
        self.current = None;
        self.preview = None;
        self.mapper.clear();
    }

    /// Decode the image at `index` and render its preview.
    ///
    /// A decode failure leaves nothing previewed.
    pub fn select_image(
        &mut self,
        index: usize,
        viewport: &impl ViewportProvider,
    ) -> Result<(), SessionError> {
        let path = self
            .paths
            .get(index)
            .cloned()
            .ok_or(SessionError::NoSuchImage {
                index,
                count: self.paths.len(),
            })?;

        self.unload();
        let original = self
            .source
            .decode(&path)
            .map_err(|source| SessionError::Decode { path, source })?;

        self.selected = Some(index);
        self.original = Some(original);
        self.refresh(viewport);
        Ok(())
    }

    pub fn set_resize_text(&mut self, text: &str, viewport: &impl ViewportProvider) {
        self.text.resize = text.to_string();
        self.params.resize = parse_resize(text);
        self.refresh(viewport);
    }

    pub fn set_rotate_text(&mut self, text: &str, viewport: &impl ViewportProvider) {
        self.text.rotate = text.to_string();
        self.params.rotation = parse_rotation(text);
        self.refresh(viewport);
    }

    pub fn set_crop_text(&mut self, text: &str, viewport: &impl ViewportProvider) {
        self.text.crop = text.to_string();
        self.params.crop = parse_crop(text);
        self.refresh(viewport);
    }

    /// Replace all three fields at once.
    pub fn set_parameters(&mut self, text: ParameterText, viewport: &impl ViewportProvider) {
        self.params = EditParameters::parse(&text);
        self.text = text;
        self.refresh(viewport);
    }

    /// Re-run the pipeline and re-fit the preview, e.g. after a viewport resize.
    pub fn refresh(&mut self, viewport: &impl ViewportProvider) {
        let Some(original) = &self.original else {
            self.current = None;
            self.preview = None;
            self.mapper.clear();
            return;
        };

        let transformed = apply_edits(original, &self.params, &self.config.pipeline);
        let geometry = fit_with(
            transformed.image.dimensions(),
            viewport.viewport_size(),
            &self.config.preview,
        );

        match render_preview(&transformed.image, &geometry, self.config.preview.filter) {
            Ok(preview) => {
                self.preview = Some(preview);
                self.mapper.set_geometry(geometry);
            }
            Err(e) => {
                warn!("cannot render preview: {e}");
                self.preview = None;
                self.mapper.clear();
            }
        }
        self.current = Some(transformed);
    }

    pub fn begin_drag(&mut self, point: PreviewPoint) {
        self.mapper.begin_drag(point);
    }

    pub fn update_drag(&mut self, point: PreviewPoint) {
        self.mapper.update_drag(point);
    }

    pub fn cancel_drag(&mut self) {
        self.mapper.cancel_drag();
    }

    /// The drag rectangle to draw over the preview, if a drag is in progress.
    pub fn overlay(&self) -> Option<(PreviewPoint, PreviewPoint)> {
        self.mapper.overlay()
    }

    /// Finish a drag and make it the crop.
    ///
    /// The preview shows the image after any existing crop, so the dragged
    /// rectangle is shifted by that crop's origin to land in the pre-crop
    /// space the crop field is interpreted in. The crop text is replaced and
    /// the preview re-rendered. Returns the new crop, or `None` if there was
    /// no drag to finish.
    pub fn end_drag(
        &mut self,
        point: PreviewPoint,
        viewport: &impl ViewportProvider,
    ) -> Option<CropRect> {
        let rect = self.mapper.end_drag(point)?;

        let (dx, dy) = self
            .current
            .as_ref()
            .filter(|t| t.report.crop.is_applied())
            .map(|t| t.report.crop_origin)
            .unwrap_or((0, 0));
        let rect = rect.offset(dx as i32, dy as i32);

        self.text.crop = rect.to_string();
        self.params.crop = parse_crop(&self.text.crop);
        self.refresh(viewport);
        Some(rect)
    }

    /// Apply the current parameters to every listed image.
    pub fn save_all<P, G>(&self, sink: &P, progress: G) -> Result<BatchReport, SessionError>
    where
        P: PersistenceSink + ?Sized,
        G: FnMut(BatchProgress<'_>),
    {
        Ok(batch::save_all(
            &self.paths,
            &self.params,
            &self.config.pipeline,
            &self.source,
            sink,
            progress,
        )?)
    }

    pub fn paths(&self) -> &[PathBuf] {
        &self.paths
    }

    pub fn selected(&self) -> Option<usize> {
        self.selected
    }

    pub fn selected_path(&self) -> Option<&Path> {
        self.selected.and_then(|i| self.paths.get(i)).map(PathBuf::as_path)
    }

    pub fn text(&self) -> &ParameterText {
        &self.text
    }

    pub fn parameters(&self) -> &EditParameters {
        &self.params
    }

    pub fn config(&self) -> &EditorConfig {
        &self.config
    }

    /// Full-resolution result of the pipeline for the selected image.
    pub fn transformed(&self) -> Option<&Transformed> {
        self.current.as_ref()
    }

    /// The scaled rendering currently shown.
    pub fn preview(&self) -> Option<&DecodedImage> {
        self.preview.as_ref()
    }

    pub fn geometry(&self) -> Option<&PreviewGeometry> {
        self.mapper.geometry()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::encode::{EncodeError, OutputFormat};
    use crate::folder::FsFolder;
    use crate::source::FsImageSource;
    use std::collections::HashMap;
    use tempfile::TempDir;

    struct MemorySource(HashMap<PathBuf, DecodedImage>);

    impl ImageSource for MemorySource {
        fn decode(&self, path: &Path) -> Result<DecodedImage, DecodeError> {
            self.0.get(path).cloned().ok_or(DecodeError::InvalidFormat)
        }

        fn encode(&self, _: &DecodedImage, _: &Path, _: OutputFormat) -> Result<(), EncodeError> {
            Ok(())
        }
    }

    struct FixedFolder(Vec<PathBuf>);

    impl FolderEnumerator for FixedFolder {
        fn list_images(&self, _folder: &Path) -> Result<Vec<PathBuf>, FolderError> {
            Ok(self.0.clone())
        }
    }

    fn solid(width: u32, height: u32) -> DecodedImage {
        DecodedImage::new(width, height, vec![128u8; (width * height * 3) as usize])
    }

    fn session(images: &[(&str, u32, u32)]) -> EditorSession<MemorySource, FixedFolder> {
        let map = images
            .iter()
            .map(|&(name, w, h)| (PathBuf::from(name), solid(w, h)))
            .collect();
        let paths = images.iter().map(|&(name, _, _)| PathBuf::from(name)).collect();
        let mut session = EditorSession::new(
            MemorySource(map),
            FixedFolder(paths),
            EditorConfig::default(),
        );
        session.select_folder(Path::new("photos")).unwrap();
        session
    }

    const VIEWPORT: (u32, u32) = (600, 600);

    #[test]
    fn test_select_image_renders_preview() {
        let mut session = session(&[("a.jpg", 1200, 600)]);
        session.select_image(0, &VIEWPORT).unwrap();

        assert_eq!(session.selected_path(), Some(Path::new("a.jpg")));
        assert_eq!(session.preview().unwrap().dimensions(), (600, 300));
        assert_eq!(session.transformed().unwrap().image.dimensions(), (1200, 600));
    }

    #[test]
    fn test_select_out_of_range() {
        let mut session = session(&[("a.jpg", 10, 10)]);
        assert!(matches!(
            session.select_image(3, &VIEWPORT),
            Err(SessionError::NoSuchImage { index: 3, count: 1 })
        ));
    }

    #[test]
    fn test_decode_failure_leaves_nothing_previewed() {
        let mut session = session(&[("a.jpg", 10, 10)]);
        session.select_image(0, &VIEWPORT).unwrap();
        session.set_paths(vec![PathBuf::from("missing.jpg")]);

        assert!(matches!(
            session.select_image(0, &VIEWPORT),
            Err(SessionError::Decode { .. })
        ));
        assert!(session.preview().is_none());
        assert!(session.selected().is_none());
    }

    #[test]
    fn test_parameter_edits_rerender() {
        let mut session = session(&[("a.jpg", 100, 50)]);
        session.select_image(0, &VIEWPORT).unwrap();

        session.set_rotate_text("90", &VIEWPORT);
        assert_eq!(session.preview().unwrap().dimensions(), (50, 100));

        session.set_resize_text("bogus x 4", &VIEWPORT);
        let report = &session.transformed().unwrap().report;
        assert!(report.resize.is_skipped());
        assert!(report.rotate.is_applied());
        assert_eq!(session.text().resize, "bogus x 4");
    }

    #[test]
    fn test_drag_sets_crop_in_image_space() {
        let mut session = session(&[("a.jpg", 1200, 600)]);
        session.select_image(0, &VIEWPORT).unwrap();

        session.begin_drag(PreviewPoint::new(300, 150));
        session.update_drag(PreviewPoint::new(100, 50));
        assert!(session.overlay().is_some());

        let rect = session.end_drag(PreviewPoint::new(100, 50), &VIEWPORT).unwrap();

        assert_eq!(rect.corners(), (200, 100, 600, 300));
        assert_eq!(session.text().crop, "200 100 600 300");
        assert_eq!(session.transformed().unwrap().image.dimensions(), (400, 200));
        assert!(session.overlay().is_none());
    }

    #[test]
    fn test_second_drag_is_relative_to_precrop_image() {
        let mut session = session(&[("a.jpg", 1000, 1000)]);
        session.select_image(0, &VIEWPORT).unwrap();
        session.set_crop_text("400 400 800 800", &VIEWPORT);

        // The cropped 400x400 image is shown at full size
        assert_eq!(session.preview().unwrap().dimensions(), (400, 400));

        session.begin_drag(PreviewPoint::new(100, 100));
        let rect = session.end_drag(PreviewPoint::new(200, 300), &VIEWPORT).unwrap();

        assert_eq!(rect.corners(), (500, 500, 600, 700));
        assert_eq!(session.transformed().unwrap().image.dimensions(), (100, 200));
    }

    #[test]
    fn test_drag_without_image_is_noop() {
        let mut session = session(&[("a.jpg", 10, 10)]);
        session.begin_drag(PreviewPoint::new(0, 0));

        assert!(session.overlay().is_none());
        assert!(session.end_drag(PreviewPoint::new(5, 5), &VIEWPORT).is_none());
        assert_eq!(session.text().crop, "");
    }

    #[test]
    fn test_select_folder_clears_preview_keeps_parameters() {
        let mut session = session(&[("a.jpg", 10, 10)]);
        session.select_image(0, &VIEWPORT).unwrap();
        session.set_rotate_text("45", &VIEWPORT);

        session.select_folder(Path::new("other")).unwrap();

        assert!(session.preview().is_none());
        assert!(session.geometry().is_none());
        assert_eq!(session.text().rotate, "45");
    }

    #[test]
    fn test_degenerate_viewport_uses_fallback() {
        let mut session = session(&[("a.jpg", 1200, 1200)]);
        session.select_image(0, &(0u32, 0u32)).unwrap();

        assert_eq!(session.preview().unwrap().dimensions(), (600, 600));
    }

    #[test]
    fn test_save_all_matches_preview_pipeline() {
        let input = TempDir::new().unwrap();
        let output = TempDir::new().unwrap();
        let source = FsImageSource::default();
        for name in ["one.png", "two.png"] {
            source
                .encode(&solid(80, 40), &input.path().join(name), OutputFormat::Png)
                .unwrap();
        }
        std::fs::write(input.path().join("notes.txt"), "skip me").unwrap();

        let mut config = EditorConfig::default();
        config.output_dir = output.path().to_path_buf();
        config.output_format = OutputFormat::Png;
        let sink = config.sink();

        let mut session = EditorSession::new(source, FsFolder, config);
        assert_eq!(session.select_folder(input.path()).unwrap(), 2);
        session.select_image(0, &VIEWPORT).unwrap();
        session.set_parameters(ParameterText::new("40x20", "90", ""), &VIEWPORT);
        let previewed = session.transformed().unwrap().image.clone();

        let mut calls = 0;
        let report = session.save_all(&sink, |_| calls += 1).unwrap();

        assert_eq!(calls, 2);
        assert!(report.is_complete());
        let first = report
            .saved
            .iter()
            .find(|s| Some(s.input.as_path()) == session.selected_path())
            .unwrap();
        assert_eq!(source.decode(&first.output).unwrap(), previewed);
    }
}
