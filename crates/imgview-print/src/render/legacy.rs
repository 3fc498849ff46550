//! Bitmap-transforming compositing
//!
//! Flips and rotates a copy of the whole image, applies the effects pixel
//! by pixel, scales the part of it that lands on the canvas and overlays
//! it. Slower and heavier on memory than
//! [`DirectCompositor`](super::DirectCompositor), kept for output that must
//! match older prints.

use crate::effects::PrintEffects;
use crate::layout::PagePlacement;
use crate::types::{Result, Rotation};
use image::RgbaImage;
use image::imageops;

use super::{CancelToken, Compositor, PixelRect};

#[derive(Debug, Clone, Copy, Default)]
pub struct LegacyCompositor;

impl Compositor for LegacyCompositor {
    fn name(&self) -> &'static str {
        "legacy"
    }

    fn composite(
        &self,
        canvas: &mut RgbaImage,
        image: &RgbaImage,
        placement: &PagePlacement,
        effects: &PrintEffects,
        target: PixelRect,
        cancel: &CancelToken,
    ) -> Result<()> {
        cancel.check()?;

        // Flip in image space first, then rotate
        let orientation = placement.image_orientation;
        let mut oriented = image.clone();
        if orientation.flip_horizontal {
            imageops::flip_horizontal_in_place(&mut oriented);
        }
        if orientation.flip_vertical {
            imageops::flip_vertical_in_place(&mut oriented);
        }
        let mut oriented = match orientation.rotation {
            Rotation::None => oriented,
            Rotation::Clockwise90 => imageops::rotate90(&oriented),
            Rotation::Clockwise180 => imageops::rotate180(&oriented),
            Rotation::Clockwise270 => imageops::rotate270(&oriented),
        };
        cancel.check()?;

        if !effects.is_identity() {
            for pixel in oriented.pixels_mut() {
                *pixel = effects.apply_pixel(*pixel);
            }
        }
        cancel.check()?;

        // Only the visible part of the target is scaled, an overflowing
        // placement never allocates more than the canvas
        let x_start = target.x.max(0);
        let y_start = target.y.max(0);
        let x_end = target.right().min(canvas.width() as i64);
        let y_end = target.bottom().min(canvas.height() as i64);
        if x_end <= x_start || y_end <= y_start {
            return Ok(());
        }

        let scaled = scale_visible(
            &oriented,
            target,
            (x_start - target.x) as u32,
            (y_start - target.y) as u32,
            (x_end - x_start) as u32,
            (y_end - y_start) as u32,
        );
        cancel.check()?;
        imageops::overlay(canvas, &scaled, x_start, y_start);
        Ok(())
    }
}

/// Nearest-neighbour scale of `oriented` to the target size, keeping only
/// the `width` x `height` window at (`left`, `top`) in target coordinates
fn scale_visible(
    oriented: &RgbaImage,
    target: PixelRect,
    left: u32,
    top: u32,
    width: u32,
    height: u32,
) -> RgbaImage {
    let x_ratio = oriented.width() as f64 / target.width as f64;
    let y_ratio = oriented.height() as f64 / target.height as f64;
    let max_x = oriented.width() - 1;
    let max_y = oriented.height() - 1;
    RgbaImage::from_fn(width, height, |x, y| {
        let sx = ((((left + x) as f64 + 0.5) * x_ratio) as u32).min(max_x);
        let sy = ((((top + y) as f64 + 0.5) * y_ratio) as u32).min(max_y);
        *oriented.get_pixel(sx, sy)
    })
}
