//! Print composition
//!
//! This module turns an image and a placement into pixels on paper:
//! - Mapping the placement rectangle onto a pixel canvas
//! - Compositing the image with rotation, flips and tonal effects
//! - Building the white-paper preview surface
//!
//! Two compositors share the same target rectangle. The direct one samples
//! the source through the inverse transform; the legacy one transforms the
//! whole bitmap first.

mod direct;
mod legacy;

pub use direct::DirectCompositor;
pub use legacy::LegacyCompositor;

use crate::effects::PrintEffects;
use crate::layout::PagePlacement;
use crate::types::{PixelSize, PrintError, Result, Size, validation};
use crate::units::Resolution;
use image::{Rgba, RgbaImage};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

/// Decoded image handed to the print path
#[derive(Debug, Clone)]
pub struct SourceImage {
    pub pixels: RgbaImage,
    /// Resolution stored in the file, if any
    pub resolution: Option<Resolution>,
}

impl SourceImage {
    pub fn new(pixels: RgbaImage, resolution: Option<Resolution>) -> Self {
        Self { pixels, resolution }
    }

    pub fn size(&self) -> PixelSize {
        PixelSize::new(self.pixels.width(), self.pixels.height())
    }
}

/// Shared flag to stop a render between rows
#[derive(Debug, Clone, Default)]
pub struct CancelToken(Arc<AtomicBool>);

impl CancelToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::Relaxed);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::Relaxed)
    }

    pub(crate) fn check(&self) -> Result<()> {
        if self.is_cancelled() {
            Err(PrintError::Cancelled)
        } else {
            Ok(())
        }
    }
}

/// Placement rectangle snapped to canvas pixels. May extend past the canvas
/// when the placement overflows the page.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PixelRect {
    pub x: i64,
    pub y: i64,
    pub width: u32,
    pub height: u32,
}

impl PixelRect {
    pub fn right(&self) -> i64 {
        self.x + self.width as i64
    }

    pub fn bottom(&self) -> i64 {
        self.y + self.height as i64
    }
}

/// Snap the placement to a canvas at `px_per_mm`. Both edges are rounded
/// independently so adjacent rectangles never overlap. `None` when the
/// rectangle collapses to nothing, an error when a side does not fit in
/// `u32` pixels.
pub fn target_pixel_rect(
    placement: &PagePlacement,
    px_per_mm: f64,
) -> Result<Option<PixelRect>> {
    let rect = placement.rect;
    let x0 = (rect.x * px_per_mm).round() as i64;
    let y0 = (rect.y * px_per_mm).round() as i64;
    let x1 = (rect.right() * px_per_mm).round() as i64;
    let y1 = (rect.bottom() * px_per_mm).round() as i64;
    if x1 <= x0 || y1 <= y0 {
        return Ok(None);
    }
    let pixels = |start: i64, end: i64| {
        end.checked_sub(start)
            .and_then(|span| u32::try_from(span).ok())
            .ok_or_else(|| {
                validation(format!(
                    "placement {:?} at {} px/mm is too large to render",
                    rect, px_per_mm
                ))
            })
    };
    Ok(Some(PixelRect {
        x: x0,
        y: y0,
        width: pixels(x0, x1)?,
        height: pixels(y0, y1)?,
    }))
}

/// Composites a source image into a canvas at its placement
pub trait Compositor: Send + Sync {
    fn name(&self) -> &'static str;

    /// Draw `image` into the `target` pixels of `canvas`, using the
    /// placement's rotation and flips.
    fn composite(
        &self,
        canvas: &mut RgbaImage,
        image: &RgbaImage,
        placement: &PagePlacement,
        effects: &PrintEffects,
        target: PixelRect,
        cancel: &CancelToken,
    ) -> Result<()>;
}

/// The compositor selected by the legacy-rendering flag
pub fn compositor_for(effects: &PrintEffects) -> Box<dyn Compositor> {
    if effects.legacy_rendering {
        Box::new(LegacyCompositor)
    } else {
        Box::new(DirectCompositor)
    }
}

/// A rendered page: white paper with the image composited in
#[derive(Debug, Clone)]
pub struct PreviewSurface {
    pub image: RgbaImage,
    pub px_per_mm: f64,
    /// Page size in millimeters
    pub page_size: Size,
    /// Where the image landed, `None` if it rounded away
    pub target: Option<PixelRect>,
}

impl PreviewSurface {
    pub fn width(&self) -> u32 {
        self.image.width()
    }

    pub fn height(&self) -> u32 {
        self.image.height()
    }

    pub fn into_image(self) -> RgbaImage {
        self.image
    }
}

pub(crate) fn check_inputs(
    image: &RgbaImage,
    placement: &PagePlacement,
    px_per_mm: f64,
) -> Result<()> {
    if !(px_per_mm.is_finite() && px_per_mm > 0.0) {
        return Err(validation(format!(
            "canvas density must be positive, got {} px/mm",
            px_per_mm
        )));
    }
    let size = PixelSize::new(image.width(), image.height());
    if size.is_empty() {
        return Err(validation("cannot print an empty image"));
    }
    if size != placement.image_size {
        return Err(validation(format!(
            "placement was computed for a {}x{} px image, got {}x{} px",
            placement.image_size.width, placement.image_size.height, size.width, size.height
        )));
    }
    Ok(())
}

/// White canvas covering the oriented page
pub fn blank_page(page_size: Size, px_per_mm: f64) -> Result<RgbaImage> {
    let width = (page_size.width * px_per_mm).round();
    let height = (page_size.height * px_per_mm).round();
    if !(width >= 1.0 && height >= 1.0 && width <= u32::MAX as f64 && height <= u32::MAX as f64) {
        return Err(validation(format!(
            "page of {} x {} mm at {} px/mm gives no usable canvas",
            page_size.width, page_size.height, px_per_mm
        )));
    }
    Ok(RgbaImage::from_pixel(
        width as u32,
        height as u32,
        Rgba([255, 255, 255, 255]),
    ))
}

/// Render the page as the printer would see it, at `px_per_mm`
pub fn render_preview(
    image: &RgbaImage,
    placement: &PagePlacement,
    effects: &PrintEffects,
    px_per_mm: f64,
) -> Result<PreviewSurface> {
    render_preview_with_cancel(image, placement, effects, px_per_mm, &CancelToken::new())
}

/// Same as [`render_preview`], stopping early once `cancel` fires
pub fn render_preview_with_cancel(
    image: &RgbaImage,
    placement: &PagePlacement,
    effects: &PrintEffects,
    px_per_mm: f64,
    cancel: &CancelToken,
) -> Result<PreviewSurface> {
    effects.validate()?;
    check_inputs(image, placement, px_per_mm)?;
    let mut canvas = blank_page(placement.page_size, px_per_mm)?;
    let target = target_pixel_rect(placement, px_per_mm)?;
    if let Some(target) = target {
        let compositor = compositor_for(effects);
        log::debug!(
            "rendering {}x{} preview with {} compositor",
            canvas.width(),
            canvas.height(),
            compositor.name()
        );
        compositor.composite(&mut canvas, image, placement, effects, target, cancel)?;
    }
    Ok(PreviewSurface {
        image: canvas,
        px_per_mm,
        page_size: placement.page_size,
        target,
    })
}

/// The image alone, rotated, flipped and toned, scaled to `px_per_mm`
/// across the placement rectangle. Used for printer output.
pub fn render_placed_image(
    image: &RgbaImage,
    placement: &PagePlacement,
    effects: &PrintEffects,
    px_per_mm: f64,
    cancel: &CancelToken,
) -> Result<RgbaImage> {
    effects.validate()?;
    check_inputs(image, placement, px_per_mm)?;
    let target = target_pixel_rect(placement, px_per_mm)?.ok_or_else(|| {
        validation(format!(
            "placement {:?} is empty at {} px/mm",
            placement.rect, px_per_mm
        ))
    })?;
    let mut canvas = RgbaImage::from_pixel(target.width, target.height, Rgba([255, 255, 255, 255]));
    let local = PixelRect {
        x: 0,
        y: 0,
        ..target
    };
    compositor_for(effects).composite(&mut canvas, image, placement, effects, local, cancel)?;
    Ok(canvas)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::layout::{PageGeometry, PageLayoutEngine, PlacementOptions};
    use crate::transform::TransformState;
    use crate::types::Margins;
    use crate::units::ResolutionUnit;

    fn placement_for(image: PixelSize, px_per_mm: f64) -> PagePlacement {
        let page = PageGeometry {
            margins: Margins::uniform(10.0),
            ..Default::default()
        };
        PageLayoutEngine::default()
            .compute_placement(
                &page,
                &TransformState::default(),
                image,
                Resolution::new(px_per_mm, ResolutionUnit::PixelsPerMillimeter).unwrap(),
                PlacementOptions::default(),
            )
            .unwrap()
    }

    #[test]
    fn test_target_rect_rounds_edges() {
        let placement = placement_for(PixelSize::new(1000, 2000), 100.0);
        // 10 x 20 mm at (100, 138.5) on a portrait A4 page
        let target = target_pixel_rect(&placement, 2.0).unwrap().unwrap();
        assert_eq!(target, PixelRect { x: 200, y: 277, width: 20, height: 40 });
    }

    #[test]
    fn test_oversized_target_rejected() {
        let placement = placement_for(PixelSize::new(1000, 2000), 100.0);
        // 20 mm high at 1e9 px/mm needs 2e10 pixels
        assert!(matches!(
            target_pixel_rect(&placement, 1e9),
            Err(PrintError::Validation(_))
        ));
    }

    #[test]
    fn test_cancelled_render_stops() {
        let image = RgbaImage::from_pixel(100, 100, Rgba([0, 0, 0, 255]));
        let placement = placement_for(PixelSize::new(100, 100), 1.0);
        let cancel = CancelToken::new();
        cancel.cancel();
        let result = render_preview_with_cancel(
            &image,
            &placement,
            &PrintEffects::default(),
            1.0,
            &cancel,
        );
        assert!(matches!(result, Err(PrintError::Cancelled)));
    }

    #[test]
    fn test_mismatched_image_rejected() {
        let image = RgbaImage::new(10, 10);
        let placement = placement_for(PixelSize::new(100, 100), 1.0);
        assert!(render_preview(&image, &placement, &PrintEffects::default(), 1.0).is_err());
    }
}
