//! Logical view transform: zoom, quarter-turn rotation, flips and fit mode
//!
//! This is the only place that knows how rotation changes the effective
//! width and height of an image. The view, the layout engine and both
//! compositors ask it instead of swapping sizes themselves.

use crate::constants::{DEFAULT_MAX_ZOOM, DEFAULT_MIN_ZOOM, ZOOM_STEP};
use crate::types::{PixelSize, Point, Result, Rotation, Size, validation};

/// Whether the zoom factor is chosen by the user or derived from the viewport
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum FitMode {
    #[default]
    Manual,
    FitWindow,
}

/// Zoom state as presented to the user
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ZoomMode {
    /// Manual zoom at exactly 1.0 ("Original Size")
    Identity,
    FitToWindow,
    Custom,
}

/// Allowed zoom range
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ZoomLimits {
    pub min: f64,
    pub max: f64,
}

impl Default for ZoomLimits {
    fn default() -> Self {
        Self {
            min: DEFAULT_MIN_ZOOM,
            max: DEFAULT_MAX_ZOOM,
        }
    }
}

impl ZoomLimits {
    pub fn new(min: f64, max: f64) -> Result<Self> {
        if !(min.is_finite() && max.is_finite() && min > 0.0 && min <= 1.0 && max >= 1.0) {
            return Err(validation(format!(
                "zoom limits must satisfy 0 < min <= 1 <= max, got [{}, {}]",
                min, max
            )));
        }
        Ok(Self { min, max })
    }

    pub fn clamp(&self, zoom: f64) -> f64 {
        zoom.clamp(self.min, self.max)
    }

    pub fn contains(&self, zoom: f64) -> bool {
        zoom >= self.min && zoom <= self.max
    }
}

/// The view transform owned by one image view
#[derive(Debug, Clone, PartialEq)]
pub struct TransformState {
    zoom: f64,
    rotation: Rotation,
    flip_horizontal: bool,
    flip_vertical: bool,
    fit_mode: FitMode,
    limits: ZoomLimits,
    revision: u64,
}

impl Default for TransformState {
    fn default() -> Self {
        Self::new(ZoomLimits::default())
    }
}

impl TransformState {
    pub fn new(limits: ZoomLimits) -> Self {
        Self {
            zoom: 1.0,
            rotation: Rotation::None,
            flip_horizontal: false,
            flip_vertical: false,
            fit_mode: FitMode::Manual,
            limits,
            revision: 0,
        }
    }

    pub fn zoom(&self) -> f64 {
        self.zoom
    }

    pub fn rotation(&self) -> Rotation {
        self.rotation
    }

    pub fn flip_horizontal_enabled(&self) -> bool {
        self.flip_horizontal
    }

    pub fn flip_vertical_enabled(&self) -> bool {
        self.flip_vertical
    }

    pub fn fit_mode(&self) -> FitMode {
        self.fit_mode
    }

    pub fn limits(&self) -> ZoomLimits {
        self.limits
    }

    /// Counter bumped by every mutation; cached placements compare against it
    pub fn revision(&self) -> u64 {
        self.revision
    }

    pub fn zoom_mode(&self) -> ZoomMode {
        match self.fit_mode {
            FitMode::FitWindow => ZoomMode::FitToWindow,
            FitMode::Manual if self.zoom == 1.0 => ZoomMode::Identity,
            FitMode::Manual => ZoomMode::Custom,
        }
    }

    fn touch(&mut self) {
        self.revision = self.revision.wrapping_add(1);
    }

    pub fn zoom_in(&mut self) {
        self.zoom = self.limits.clamp(self.zoom * ZOOM_STEP);
        self.fit_mode = FitMode::Manual;
        self.touch();
    }

    pub fn zoom_out(&mut self) {
        self.zoom = self.limits.clamp(self.zoom / ZOOM_STEP);
        self.fit_mode = FitMode::Manual;
        self.touch();
    }

    pub fn set_zoom(&mut self, factor: f64) -> Result<()> {
        if !(factor.is_finite() && factor > 0.0) {
            return Err(validation(format!(
                "zoom factor must be positive, got {}",
                factor
            )));
        }
        if !self.limits.contains(factor) {
            return Err(validation(format!(
                "zoom factor {} outside [{}, {}]",
                factor, self.limits.min, self.limits.max
            )));
        }
        self.zoom = factor;
        self.fit_mode = FitMode::Manual;
        self.touch();
        Ok(())
    }

    pub fn reset_zoom(&mut self) {
        self.zoom = 1.0;
        self.fit_mode = FitMode::Manual;
        self.touch();
    }

    /// Zoom so the oriented image fits inside `viewport`, and keep doing so
    /// on later resizes. Returns the new zoom factor.
    pub fn fit_to_window(&mut self, viewport: Size, image: PixelSize) -> Result<f64> {
        self.zoom = self.fitting_zoom(viewport, image)?;
        self.fit_mode = FitMode::FitWindow;
        self.touch();
        Ok(self.zoom)
    }

    /// Recompute the zoom after a viewport resize. Only FitWindow reacts;
    /// returns whether the zoom was recomputed.
    pub fn viewport_resized(&mut self, viewport: Size, image: PixelSize) -> Result<bool> {
        if self.fit_mode != FitMode::FitWindow {
            return Ok(false);
        }
        self.zoom = self.fitting_zoom(viewport, image)?;
        self.touch();
        Ok(true)
    }

    fn fitting_zoom(&self, viewport: Size, image: PixelSize) -> Result<f64> {
        if viewport.is_empty() {
            return Err(validation(format!(
                "viewport must have a positive size, got {}x{}",
                viewport.width, viewport.height
            )));
        }
        if image.is_empty() {
            return Err(validation("cannot fit an empty image"));
        }
        let oriented = self.oriented_size(image.to_size());
        Ok(self.limits.clamp(oriented.fit_factor(&viewport)))
    }

    pub fn rotate_clockwise(&mut self) {
        self.rotation = self.rotation.clockwise();
        self.touch();
    }

    pub fn rotate_counterclockwise(&mut self) {
        self.rotation = self.rotation.counterclockwise();
        self.touch();
    }

    pub fn set_rotation(&mut self, rotation: Rotation) {
        self.rotation = rotation;
        self.touch();
    }

    pub fn flip_horizontal(&mut self) {
        self.flip_horizontal = !self.flip_horizontal;
        self.touch();
    }

    pub fn flip_vertical(&mut self) {
        self.flip_vertical = !self.flip_vertical;
        self.touch();
    }

    /// Back to defaults when a new image is shown, unless the transform
    /// is to be remembered across images.
    pub fn reset_for_new_image(&mut self, remember_transform: bool) {
        if remember_transform {
            return;
        }
        let limits = self.limits;
        let revision = self.revision;
        *self = Self::new(limits);
        self.revision = revision;
        self.touch();
    }

    /// Size of the image after rotation
    pub fn oriented_size(&self, size: Size) -> Size {
        if self.rotation.swaps_axes() {
            size.transposed()
        } else {
            size
        }
    }

    pub fn oriented_pixel_size(&self, size: PixelSize) -> PixelSize {
        if self.rotation.swaps_axes() {
            PixelSize::new(size.height, size.width)
        } else {
            size
        }
    }

    /// Size of the image on screen
    pub fn displayed_size(&self, image: PixelSize) -> Size {
        self.oriented_size(image.to_size()).scaled(self.zoom)
    }

    /// Map a point in image space into the oriented (flipped, then rotated)
    /// frame. `image` is the unrotated size.
    pub fn image_to_oriented(&self, point: Point, image: Size) -> Point {
        let x = if self.flip_horizontal {
            image.width - point.x
        } else {
            point.x
        };
        let y = if self.flip_vertical {
            image.height - point.y
        } else {
            point.y
        };
        match self.rotation {
            Rotation::None => Point::new(x, y),
            Rotation::Clockwise90 => Point::new(image.height - y, x),
            Rotation::Clockwise180 => Point::new(image.width - x, image.height - y),
            Rotation::Clockwise270 => Point::new(y, image.width - x),
        }
    }

    /// Inverse of [`image_to_oriented`](Self::image_to_oriented)
    pub fn oriented_to_image(&self, point: Point, image: Size) -> Point {
        let (x, y) = match self.rotation {
            Rotation::None => (point.x, point.y),
            Rotation::Clockwise90 => (point.y, image.height - point.x),
            Rotation::Clockwise180 => (image.width - point.x, image.height - point.y),
            Rotation::Clockwise270 => (image.width - point.y, point.x),
        };
        let x = if self.flip_horizontal {
            image.width - x
        } else {
            x
        };
        let y = if self.flip_vertical {
            image.height - y
        } else {
            y
        };
        Point::new(x, y)
    }

    /// Rotation and flips only; what a print dialog needs from the view
    pub fn orientation(&self) -> ImageOrientation {
        ImageOrientation {
            rotation: self.rotation,
            flip_horizontal: self.flip_horizontal,
            flip_vertical: self.flip_vertical,
        }
    }

    pub fn to_persisted(&self) -> PersistedTransform {
        PersistedTransform {
            zoom: match self.fit_mode {
                FitMode::Manual => Some(self.zoom),
                FitMode::FitWindow => None,
            },
            rotation: self.rotation,
            flip_horizontal: self.flip_horizontal,
            flip_vertical: self.flip_vertical,
            fit_mode: self.fit_mode,
        }
    }

    /// Restore a persisted transform. A FitWindow state comes back with zoom
    /// 1.0 until the next [`viewport_resized`](Self::viewport_resized).
    pub fn from_persisted(persisted: &PersistedTransform, limits: ZoomLimits) -> Result<Self> {
        let mut state = Self::new(limits);
        state.rotation = persisted.rotation;
        state.flip_horizontal = persisted.flip_horizontal;
        state.flip_vertical = persisted.flip_vertical;
        if let (FitMode::Manual, Some(zoom)) = (persisted.fit_mode, persisted.zoom) {
            state.set_zoom(zoom)?;
        }
        state.fit_mode = persisted.fit_mode;
        Ok(state)
    }
}

/// Rotation and flips of an image, detached from zoom
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ImageOrientation {
    pub rotation: Rotation,
    pub flip_horizontal: bool,
    pub flip_vertical: bool,
}

impl ImageOrientation {
    /// A transform carrying only this orientation, for the shared mapping helpers
    pub fn as_transform(&self) -> TransformState {
        let mut state = TransformState::default();
        state.rotation = self.rotation;
        state.flip_horizontal = self.flip_horizontal;
        state.flip_vertical = self.flip_vertical;
        state
    }
}

/// Serializable form of a transform; a fitted zoom is not stored
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct PersistedTransform {
    pub zoom: Option<f64>,
    pub rotation: Rotation,
    pub flip_horizontal: bool,
    pub flip_vertical: bool,
    pub fit_mode: FitMode,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_zoom_steps_are_clamped() {
        let mut state = TransformState::new(ZoomLimits::new(0.5, 2.0).unwrap());
        for _ in 0..10 {
            state.zoom_in();
        }
        assert_eq!(state.zoom(), 2.0);
        for _ in 0..10 {
            state.zoom_out();
        }
        assert_eq!(state.zoom(), 0.5);
    }

    #[test]
    fn test_point_mapping_round_trip() {
        let image = Size::new(40.0, 30.0);
        let point = Point::new(3.0, 7.0);
        let mut state = TransformState::default();
        for step in 0..8 {
            if step % 3 == 0 {
                state.flip_horizontal();
            }
            if step % 2 == 0 {
                state.flip_vertical();
            }
            state.rotate_clockwise();
            let oriented = state.image_to_oriented(point, image);
            let back = state.oriented_to_image(oriented, image);
            assert!((back.x - point.x).abs() < 1e-12);
            assert!((back.y - point.y).abs() < 1e-12);
        }
    }

    #[test]
    fn test_clockwise_maps_top_left_to_top_right() {
        let mut state = TransformState::default();
        state.rotate_clockwise();
        let image = Size::new(40.0, 30.0);
        let mapped = state.image_to_oriented(Point::new(0.0, 0.0), image);
        assert_eq!(mapped, Point::new(30.0, 0.0));
    }

    #[test]
    fn test_every_mutation_bumps_revision() {
        let mut state = TransformState::default();
        let mut last = state.revision();
        let ops: Vec<fn(&mut TransformState)> = vec![
            TransformState::zoom_in,
            TransformState::zoom_out,
            TransformState::reset_zoom,
            TransformState::rotate_clockwise,
            TransformState::rotate_counterclockwise,
            TransformState::flip_horizontal,
            TransformState::flip_vertical,
        ];
        for op in ops {
            op(&mut state);
            assert!(state.revision() > last);
            last = state.revision();
        }
    }
}
