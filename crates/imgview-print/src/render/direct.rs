//! Inverse-mapped compositing
//!
//! Every canvas pixel inside the target rectangle is traced back through
//! the rotation and flips to a source pixel (nearest neighbour). Tonal
//! effects go through a 256-entry table.

use crate::effects::PrintEffects;
use crate::layout::PagePlacement;
use crate::types::{Point, Result};
use image::{Pixel, RgbaImage};

use super::{CancelToken, Compositor, PixelRect};

#[derive(Debug, Clone, Copy, Default)]
pub struct DirectCompositor;

impl Compositor for DirectCompositor {
    fn name(&self) -> &'static str {
        "direct"
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

        let transform = placement.image_orientation.as_transform();
        let source = placement.image_size.to_size();
        let oriented = transform.oriented_size(source);
        let table = effects.lookup_table();
        let max_x = image.width() - 1;
        let max_y = image.height() - 1;

        // Visible part of the target
        let x_start = target.x.max(0);
        let y_start = target.y.max(0);
        let x_end = target.right().min(canvas.width() as i64);
        let y_end = target.bottom().min(canvas.height() as i64);

        for cy in y_start..y_end {
            cancel.check()?;
            let v = ((cy - target.y) as f64 + 0.5) * oriented.height / target.height as f64;
            for cx in x_start..x_end {
                let u = ((cx - target.x) as f64 + 0.5) * oriented.width / target.width as f64;
                let p = transform.oriented_to_image(Point::new(u, v), source);
                let sx = (p.x.floor().max(0.0) as u32).min(max_x);
                let sy = (p.y.floor().max(0.0) as u32).min(max_y);
                let toned = table.apply(*image.get_pixel(sx, sy));
                canvas.get_pixel_mut(cx as u32, cy as u32).blend(&toned);
            }
        }
        Ok(())
    }
}
