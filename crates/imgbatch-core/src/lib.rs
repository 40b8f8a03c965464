//! imgbatch Core - batch image editing library
//!
//! This crate provides the edit pipeline (resize, rotate, crop) shared by the
//! single-image preview and the folder-wide batch save, plus the mapping
//! between a scaled preview and full-resolution pixel coordinates.

pub mod batch;
pub mod config;
pub mod decode;
pub mod encode;
pub mod folder;
pub mod params;
pub mod preview;
pub mod session;
pub mod sink;
pub mod source;
pub mod transform;

pub use batch::{save_all, BatchError, BatchProgress, BatchReport, ImageFailure};
pub use config::{ConfigError, EditorConfig};
pub use decode::{DecodeError, DecodedImage, FilterType};
pub use encode::{EncodeError, OutputFormat};
pub use folder::{FolderEnumerator, FolderError, FsFolder};
pub use params::{CropRect, EditParameters, ParameterParseError, ParameterText, StageParam};
pub use preview::{fit, PreviewCoordinateMapper, PreviewGeometry, PreviewPoint, ViewportProvider};
pub use session::{EditorSession, SessionError};
pub use sink::{DirectorySink, PersistenceSink};
pub use source::{FsImageSource, ImageSource};
pub use transform::{apply_edits, PipelineOptions, PipelineReport, StageOutcome, Transformed};

#[cfg(test)]
mod tests {
    use super::*;

    fn checkerboard(width: u32, height: u32) -> DecodedImage {
        let pixels = (0..height)
            .flat_map(|y| (0..width).map(move |x| if (x + y) % 2 == 0 { 255 } else { 0 }))
            .flat_map(|v| [v, v, v])
            .collect();
        DecodedImage::new(width, height, pixels)
    }

    #[test]
    fn test_preview_drag_feeds_back_into_pipeline() {
        let image = checkerboard(400, 200);
        let options = PipelineOptions::default();

        let first = apply_edits(&image, &EditParameters::new(), &options);
        let mut mapper = PreviewCoordinateMapper::new();
        mapper.set_geometry(fit(first.image.dimensions(), (200, 200)));

        mapper.begin_drag(PreviewPoint::new(0, 0));
        let rect = mapper.end_drag(PreviewPoint::new(50, 100)).unwrap();
        assert_eq!(rect.corners(), (0, 0, 100, 200));

        let params = EditParameters::new().with_crop(rect);
        let second = apply_edits(&image, &params, &options);
        assert_eq!(second.image.dimensions(), (100, 200));
        assert!(second.report.crop.is_applied());
    }

    #[test]
    fn test_crop_text_round_trips_through_display() {
        let rect = CropRect::new(30, 40, 10, 20);
        let text = ParameterText::new("", "", rect.to_string());
        assert_eq!(EditParameters::parse(&text).crop, StageParam::Ready(rect));
    }
}
