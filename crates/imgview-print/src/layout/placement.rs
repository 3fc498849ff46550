//! Image placement on the page
//!
//! This module calculates where the image is drawn on paper, accounting for:
//! - Page orientation (including auto-rotation toward the image shape)
//! - Margins (unless ignored)
//! - Image resolution and the rotation from the view
//! - Shrinking to the printable area (unless overflow is allowed)
//! - Centering within the printable area

use crate::transform::{ImageOrientation, TransformState};
use crate::types::{Orientation, PixelSize, Rect, Result, Size, validation};
use crate::units::Resolution;

use super::PageGeometry;

/// Placed image rectangle in millimeters, page top-left origin, y down
pub type PlacementRect = Rect;

/// Flags that relax the layout
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct PlacementOptions {
    /// Use the whole paper instead of the area inside the margins
    pub ignore_margins: bool,
    /// Keep the physical size even when it overflows the printable area
    pub ignore_paper_bounds: bool,
}

/// Defaults the engine applies, passed in explicitly by each document
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct LayoutConfig {
    /// Page orientation chosen by AutoRotate for a square image
    pub square_orientation: Orientation,
    /// Resolution for images that carry none
    pub default_resolution: Resolution,
}

impl Default for LayoutConfig {
    fn default() -> Self {
        Self {
            square_orientation: Orientation::Portrait,
            default_resolution: Resolution::default(),
        }
    }
}

/// Final placement of the image on the page
///
/// This is the result of all layout calculations and contains everything
/// needed to render the page.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct PagePlacement {
    /// Where the image goes
    pub rect: PlacementRect,
    /// Paper size after orientation
    pub page_size: Size,
    /// Area the image is laid out in
    pub printable_area: Rect,
    /// Resolved orientation, never `AutoRotate`
    pub orientation: Orientation,
    /// Factor applied to the natural physical size (1.0 when it fit)
    pub scale: f64,
    /// Rotation and flips to draw the image with
    pub image_orientation: ImageOrientation,
    /// Unrotated source size
    pub image_size: PixelSize,
}

impl PagePlacement {
    /// Source size after rotation
    pub fn oriented_image_size(&self) -> PixelSize {
        self.image_orientation
            .as_transform()
            .oriented_pixel_size(self.image_size)
    }
}

/// Computes placements. Holds no mutable state: the same inputs always give
/// the same rectangle.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct PageLayoutEngine {
    config: LayoutConfig,
}

impl PageLayoutEngine {
    pub fn new(config: LayoutConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &LayoutConfig {
        &self.config
    }

    /// The embedded resolution if there is one, else the configured default
    pub fn effective_resolution(&self, embedded: Option<Resolution>) -> Resolution {
        embedded
            .filter(|r| r.validate().is_ok())
            .unwrap_or(self.config.default_resolution)
    }

    /// Orientation the page takes for an image of `oriented` size
    pub fn resolve_orientation(&self, requested: Orientation, oriented: Size) -> Orientation {
        match requested {
            Orientation::AutoRotate => {
                if oriented.width > oriented.height {
                    Orientation::Landscape
                } else if oriented.width < oriented.height {
                    Orientation::Portrait
                } else {
                    match self.config.square_orientation {
                        Orientation::Landscape => Orientation::Landscape,
                        _ => Orientation::Portrait,
                    }
                }
            }
            fixed => fixed,
        }
    }

    /// Place an image of `image` pixels on `page`.
    ///
    /// Steps: validate the page, resolve the orientation, take the printable
    /// area, convert pixels to millimeters through `resolution` (after the
    /// view's rotation), shrink uniformly to fit unless bounds are ignored,
    /// then center on the requested axes.
    pub fn compute_placement(
        &self,
        page: &PageGeometry,
        transform: &TransformState,
        image: PixelSize,
        resolution: Resolution,
        options: PlacementOptions,
    ) -> Result<PagePlacement> {
        page.validate()?;
        resolution.validate()?;
        if image.is_empty() {
            return Err(validation(format!(
                "image must have a positive size, got {}x{} px",
                image.width, image.height
            )));
        }

        let oriented_px = transform.oriented_size(image.to_size());
        let orientation = self.resolve_orientation(page.orientation, oriented_px);
        page.validate_oriented(orientation)?;
        let page_size = page.oriented_size(orientation);
        let printable_area = page.printable_area(orientation, options.ignore_margins);

        let px_per_mm = resolution.pixels_per_base_unit();
        let natural = oriented_px.scaled(1.0 / px_per_mm);

        let scale = if !options.ignore_paper_bounds && !natural.fits_within(&printable_area.size())
        {
            natural.fit_factor(&printable_area.size())
        } else {
            1.0
        };
        let size = natural.scaled(scale);

        let x = if page.centering.horizontal() {
            printable_area.x + (printable_area.width - size.width) / 2.0
        } else {
            printable_area.x
        };
        let y = if page.centering.vertical() {
            printable_area.y + (printable_area.height - size.height) / 2.0
        } else {
            printable_area.y
        };

        Ok(PagePlacement {
            rect: Rect::new(x, y, size.width, size.height),
            page_size,
            printable_area,
            orientation,
            scale,
            image_orientation: transform.orientation(),
            image_size: image,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{Centering, Margins, PaperSize};
    use crate::units::ResolutionUnit;

    fn per_mm(value: f64) -> Resolution {
        Resolution::new(value, ResolutionUnit::PixelsPerMillimeter).unwrap()
    }

    #[test]
    fn test_auto_rotate_follows_rotated_image() {
        let engine = PageLayoutEngine::default();
        let page = PageGeometry::new(
            PaperSize::A4,
            Margins::zero(),
            Orientation::AutoRotate,
            Centering::None,
        );
        let mut transform = TransformState::default();
        let image = PixelSize::new(3000, 1000);

        let wide = engine
            .compute_placement(&page, &transform, image, per_mm(10.0), Default::default())
            .unwrap();
        assert_eq!(wide.orientation, Orientation::Landscape);
        assert_eq!(wide.page_size, Size::new(297.0, 210.0));

        transform.rotate_clockwise();
        let tall = engine
            .compute_placement(&page, &transform, image, per_mm(10.0), Default::default())
            .unwrap();
        assert_eq!(tall.orientation, Orientation::Portrait);
        // 100 x 300 mm shrinks to the 297 mm page height
        assert!((tall.scale - 0.99).abs() < 1e-12);
        assert!((tall.rect.width - 99.0).abs() < 1e-9);
        assert!((tall.rect.height - 297.0).abs() < 1e-9);
    }

    #[test]
    fn test_square_image_uses_configured_tie_orientation() {
        let page = PageGeometry::new(
            PaperSize::A4,
            Margins::zero(),
            Orientation::AutoRotate,
            Centering::Both,
        );
        let transform = TransformState::default();
        let square = PixelSize::new(500, 500);

        let portrait = PageLayoutEngine::default()
            .compute_placement(&page, &transform, square, per_mm(10.0), Default::default())
            .unwrap();
        assert_eq!(portrait.orientation, Orientation::Portrait);

        let engine = PageLayoutEngine::new(LayoutConfig {
            square_orientation: Orientation::Landscape,
            ..Default::default()
        });
        let landscape = engine
            .compute_placement(&page, &transform, square, per_mm(10.0), Default::default())
            .unwrap();
        assert_eq!(landscape.orientation, Orientation::Landscape);
    }
}
