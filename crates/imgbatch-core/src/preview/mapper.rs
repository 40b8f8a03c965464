//! Drag-to-crop interaction in preview space.
//!
//! The mapper tracks one drag gesture at a time:
//!
//! ```text
//! Idle --begin_drag--> Dragging --end_drag--> Idle (emits a CropRect)
//! ```
//!
//! Events that do not fit the current state (an update or release without a
//! press, any drag while no preview is shown) are ignored.

use log::debug;

use crate::params::CropRect;

use super::PreviewGeometry;

/// A pointer position in preview pixels, relative to the preview's top-left.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PreviewPoint {
    pub x: i32,
    pub y: i32,
}

impl PreviewPoint {
    pub fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
enum DragState {
    #[default]
    Idle,
    Dragging {
        start: PreviewPoint,
        current: PreviewPoint,
    },
}

/// Converts preview-space drags into image-space crop rectangles.
#[derive(Debug, Clone, Default)]
pub struct PreviewCoordinateMapper {
    geometry: Option<PreviewGeometry>,
    drag: DragState,
}

impl PreviewCoordinateMapper {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record the geometry of the preview now on screen.
    ///
    /// Must be called after every re-render so that conversions use the
    /// rendered size actually displayed.
    pub fn set_geometry(&mut self, geometry: PreviewGeometry) {
        self.geometry = Some(geometry);
    }

    /// Forget the displayed preview (no image loaded). Any drag is dropped.
    pub fn clear(&mut self) {
        self.geometry = None;
        self.drag = DragState::Idle;
    }

    pub fn geometry(&self) -> Option<&PreviewGeometry> {
        self.geometry.as_ref()
    }

    pub fn is_dragging(&self) -> bool {
        matches!(self.drag, DragState::Dragging { .. })
    }

    fn has_preview(&self) -> bool {
        self.geometry.is_some_and(|g| !g.is_empty())
    }

    /// Pointer pressed: start a new rectangle, discarding any previous one.
    pub fn begin_drag(&mut self, point: PreviewPoint) {
        if !self.has_preview() {
            return;
        }
        self.drag = DragState::Dragging {
            start: point,
            current: point,
        };
    }

    /// Pointer moved while pressed. Ignored unless a drag is in progress.
    pub fn update_drag(&mut self, point: PreviewPoint) {
        if let DragState::Dragging { current, .. } = &mut self.drag {
            *current = point;
        }
    }

    /// Abandon the current drag without producing a crop.
    pub fn cancel_drag(&mut self) {
        self.drag = DragState::Idle;
    }

    /// The rectangle to draw over the preview, as `(start, current)`.
    ///
    /// Not normalized: the corners are reported as dragged, so the rectangle
    /// may be inverted.
    pub fn overlay(&self) -> Option<(PreviewPoint, PreviewPoint)> {
        match self.drag {
            DragState::Dragging { start, current } => Some((start, current)),
            DragState::Idle => None,
        }
    }

    /// Pointer released: finish the drag and convert it to image space.
    ///
    /// The rectangle is normalized first, then each corner is scaled by
    /// `image / rendered` per axis and rounded. Returns `None` if no drag was
    /// in progress or no preview is shown.
    pub fn end_drag(&mut self, point: PreviewPoint) -> Option<CropRect> {
        let DragState::Dragging { start, .. } = std::mem::take(&mut self.drag) else {
            return None;
        };
        let geometry = self.geometry.filter(|g| !g.is_empty())?;

        let x1 = start.x.min(point.x);
        let y1 = start.y.min(point.y);
        let x2 = start.x.max(point.x);
        let y2 = start.y.max(point.y);

        let (ix1, iy1) = geometry.preview_to_image(x1, y1);
        let (ix2, iy2) = geometry.preview_to_image(x2, y2);
        let rect = CropRect::new(ix1, iy1, ix2, iy2);

        debug!(
            "drag ({x1},{y1})-({x2},{y2}) on {}x{} preview -> crop {rect}",
            geometry.rendered_width, geometry.rendered_height
        );

        Some(rect)
    }
}


// ============================================================================
// Property-Based Tests
// ============================================================================

#[cfg(test)]
mod proptests {
    use super::*;
    use crate::preview::fit;
    use proptest::prelude::*;

    proptest! {
        /// Property: dragging across the whole rendered preview selects the whole image.
        #[test]
        fn prop_full_drag_round_trip(
            image in (1u32..6000, 1u32..6000),
            viewport in (0u32..1600, 0u32..1600),
        ) {
            let geometry = fit(image, viewport);
            let mut mapper = PreviewCoordinateMapper::new();
            mapper.set_geometry(geometry);

            mapper.begin_drag(PreviewPoint::new(0, 0));
            let end = PreviewPoint::new(geometry.rendered_width as i32, geometry.rendered_height as i32);
            let rect = mapper.end_drag(end).unwrap();
            let (x1, y1, x2, y2) = rect.corners();

            prop_assert_eq!((x1, y1), (0, 0));
            prop_assert!((x2 - image.0 as i32).abs() <= 1);
            prop_assert!((y2 - image.1 as i32).abs() <= 1);
        }

        /// Property: drags inside the preview land inside the image.
        #[test]
        fn prop_inside_drag_stays_in_image(
            image in (1u32..4000, 1u32..4000),
            a in (0.0f64..=1.0, 0.0f64..=1.0),
            b in (0.0f64..=1.0, 0.0f64..=1.0),
        ) {
            let geometry = fit(image, (600, 600));
            let to_point = |(fx, fy): (f64, f64)| PreviewPoint::new(
                (fx * geometry.rendered_width as f64) as i32,
                (fy * geometry.rendered_height as f64) as i32,
            );

            let mut mapper = PreviewCoordinateMapper::new();
            mapper.set_geometry(geometry);
            mapper.begin_drag(to_point(a));
            let rect = mapper.end_drag(to_point(b)).unwrap();
            let (x1, y1, x2, y2) = rect.corners();

            prop_assert!(x1 >= 0 && y1 >= 0);
            prop_assert!(x1 <= x2 && y1 <= y2);
            prop_assert!(x2 <= image.0 as i32 && y2 <= image.1 as i32);
        }
    }
}
