//! On-screen pipeline: decoded image → oriented image → zoomed viewport rect

use crate::transform::{FitMode, TransformState, ZoomLimits};
use crate::types::{PixelSize, Point, Rect, Result, Size};

/// Pixels moved by one scroll step
pub const SCROLL_STEP: f64 = 40.0;

/// Where the image lands inside the viewport for one frame
#[derive(Debug, Clone, PartialEq)]
pub struct ViewTransform {
    /// Displayed image rectangle in viewport pixels
    pub image_rect: Rect,
    pub zoom: f64,
    transform: TransformState,
    image: Size,
}

impl ViewTransform {
    /// Map a viewport point to image pixel coordinates, if it hits the image
    pub fn viewport_to_image(&self, point: Point) -> Option<Point> {
        if !self.image_rect.contains(point) {
            return None;
        }
        let oriented = Point::new(
            (point.x - self.image_rect.x) / self.zoom,
            (point.y - self.image_rect.y) / self.zoom,
        );
        Some(self.transform.oriented_to_image(oriented, self.image))
    }

    /// Map an image pixel coordinate to the viewport
    pub fn image_to_viewport(&self, point: Point) -> Point {
        let oriented = self.transform.image_to_oriented(point, self.image);
        Point::new(
            self.image_rect.x + oriented.x * self.zoom,
            self.image_rect.y + oriented.y * self.zoom,
        )
    }
}

/// One open image: owns its transform, viewport and scroll position
#[derive(Debug, Clone)]
pub struct ImageView {
    transform: TransformState,
    image: Option<PixelSize>,
    viewport: Size,
    scroll: Point,
    remember_transform: bool,
}

impl ImageView {
    pub fn new(viewport: Size, limits: ZoomLimits) -> Self {
        Self {
            transform: TransformState::new(limits),
            image: None,
            viewport,
            scroll: Point::default(),
            remember_transform: false,
        }
    }

    pub fn transform(&self) -> &TransformState {
        &self.transform
    }

    pub(crate) fn transform_mut(&mut self) -> &mut TransformState {
        &mut self.transform
    }

    pub fn image_size(&self) -> Option<PixelSize> {
        self.image
    }

    pub fn viewport(&self) -> Size {
        self.viewport
    }

    pub fn set_remember_transform(&mut self, remember: bool) {
        self.remember_transform = remember;
    }

    /// Show another image (or none). The transform is reset unless it is
    /// remembered; a fitted zoom is recomputed for the new image.
    pub fn set_image(&mut self, image: Option<PixelSize>) -> Result<()> {
        self.image = image.filter(|size| !size.is_empty());
        self.transform.reset_for_new_image(self.remember_transform);
        self.scroll = Point::default();
        self.refit()
    }

    pub fn resize(&mut self, viewport: Size) -> Result<()> {
        self.viewport = viewport;
        self.refit()?;
        self.clamp_scroll();
        Ok(())
    }

    /// Fit the current image to the viewport
    pub fn fit_to_window(&mut self) -> Result<()> {
        if let Some(image) = self.image {
            self.transform.fit_to_window(self.viewport, image)?;
            self.clamp_scroll();
        }
        Ok(())
    }

    /// Re-apply fit-to-window after anything that changed the oriented size
    pub(crate) fn refit(&mut self) -> Result<()> {
        if let Some(image) = self.image {
            if self.transform.fit_mode() == FitMode::FitWindow && !self.viewport.is_empty() {
                self.transform.viewport_resized(self.viewport, image)?;
            }
        }
        self.clamp_scroll();
        Ok(())
    }

    pub fn scroll_by(&mut self, dx: f64, dy: f64) {
        self.scroll.x += dx;
        self.scroll.y += dy;
        self.clamp_scroll();
    }

    pub fn scroll(&self) -> Point {
        self.scroll
    }

    fn clamp_scroll(&mut self) {
        let Some(image) = self.image else {
            self.scroll = Point::default();
            return;
        };
        let displayed = self.transform.displayed_size(image);
        let max_x = (displayed.width - self.viewport.width).max(0.0);
        let max_y = (displayed.height - self.viewport.height).max(0.0);
        self.scroll.x = self.scroll.x.clamp(0.0, max_x);
        self.scroll.y = self.scroll.y.clamp(0.0, max_y);
    }

    /// Current frame geometry, or `None` when no image is shown
    pub fn view_transform(&self) -> Option<ViewTransform> {
        let image = self.image?;
        let displayed = self.transform.displayed_size(image);
        let x = if displayed.width <= self.viewport.width {
            (self.viewport.width - displayed.width) / 2.0
        } else {
            -self.scroll.x
        };
        let y = if displayed.height <= self.viewport.height {
            (self.viewport.height - displayed.height) / 2.0
        } else {
            -self.scroll.y
        };
        Some(ViewTransform {
            image_rect: Rect::new(x, y, displayed.width, displayed.height),
            zoom: self.transform.zoom(),
            transform: self.transform.clone(),
            image: image.to_size(),
        })
    }
}
