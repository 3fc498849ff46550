//! Interactive edits of the printed rectangle
//!
//! The print dialog lets the user type the printed size, the print
//! resolution or an edge position in any unit. Every edit is followed by a
//! normalisation pass that keeps the rectangle consistent with the
//! available area, the aspect ratio and the centering.

use crate::constants::{ASPECT_EPSILON, EDITOR_DECIMALS};
use crate::types::{Centering, Rect, Result, Size, validation};
use crate::units::{self, Resolution, ResolutionUnit, Unit};

use super::PagePlacement;

/// Lower/upper bound of an editable field
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FieldRange {
    pub min: f64,
    pub max: f64,
}

/// Bounds and values of every field of the editor, in display units
#[derive(Debug, Clone, PartialEq)]
pub struct EditorFields {
    pub unit: Unit,
    pub resolution_unit: ResolutionUnit,
    pub width: f64,
    pub height: f64,
    pub left: f64,
    pub right: f64,
    pub top: f64,
    pub bottom: f64,
    pub x_resolution: f64,
    pub y_resolution: f64,
    pub width_range: FieldRange,
    pub height_range: FieldRange,
    pub left_range: FieldRange,
    pub right_range: FieldRange,
    pub top_range: FieldRange,
    pub bottom_range: FieldRange,
    pub x_resolution_range: FieldRange,
    pub y_resolution_range: FieldRange,
}

/// Editable copy of a placement
#[derive(Debug, Clone, PartialEq)]
pub struct PrintRectEditor {
    base: PagePlacement,
    rect: Rect,
    keep_aspect: bool,
    centering: Centering,
    allow_overflow: bool,
    /// The rect differs from the computed placement by a user edit
    edited: bool,
}

impl PrintRectEditor {
    pub fn new(
        base: PagePlacement,
        centering: Centering,
        keep_aspect: bool,
        allow_overflow: bool,
    ) -> Self {
        let rect = base.rect;
        let mut editor = Self {
            base,
            rect,
            keep_aspect,
            centering,
            allow_overflow,
            edited: false,
        };
        editor.normalize();
        editor
    }

    /// Move onto a recomputed placement. Edits are kept and normalized
    /// against the new printable area unless the oriented image changed
    /// shape; an unedited rect follows the new placement.
    pub fn rebase(&mut self, base: PagePlacement, centering: Centering, allow_overflow: bool) {
        let keep_edits =
            self.edited && base.oriented_image_size() == self.base.oriented_image_size();
        self.rect = if keep_edits { self.rect } else { base.rect };
        self.base = base;
        self.centering = centering;
        self.allow_overflow = allow_overflow;
        self.edited = keep_edits;
        self.normalize();
    }

    /// Whether the rect carries user edits
    pub fn is_edited(&self) -> bool {
        self.edited
    }

    pub fn rect(&self) -> Rect {
        self.rect
    }

    pub fn centering(&self) -> Centering {
        self.centering
    }

    pub fn keep_aspect(&self) -> bool {
        self.keep_aspect
    }

    /// The base placement with the edited rectangle
    pub fn placement(&self) -> PagePlacement {
        PagePlacement {
            rect: self.rect,
            scale: self.rect.width / self.natural_size().width,
            ..self.base.clone()
        }
    }

    fn available(&self) -> Rect {
        self.base.printable_area
    }

    /// Oriented image size in pixels
    fn source_pixels(&self) -> Size {
        self.base.oriented_image_size().to_size()
    }

    fn aspect(&self) -> f64 {
        self.source_pixels().aspect_ratio()
    }

    /// Size the layout engine chose before any edit
    fn preferred_size(&self) -> Size {
        self.base.rect.size()
    }

    fn natural_size(&self) -> Size {
        self.base.rect.size().scaled(1.0 / self.base.scale)
    }

    fn check_length(value: f64, unit: Unit) -> Result<f64> {
        let mm = units::to_base(value, unit)?;
        if mm <= 0.0 {
            return Err(validation(format!(
                "printed size must be positive, got {} {}",
                value, unit
            )));
        }
        Ok(mm)
    }

    pub fn set_width(&mut self, value: f64, unit: Unit) -> Result<()> {
        self.rect.width = Self::check_length(value, unit)?;
        if self.keep_aspect {
            self.rect.height = self.rect.width / self.aspect();
        }
        self.edited = true;
        self.normalize();
        Ok(())
    }

    pub fn set_height(&mut self, value: f64, unit: Unit) -> Result<()> {
        self.rect.height = Self::check_length(value, unit)?;
        if self.keep_aspect {
            self.rect.width = self.rect.height * self.aspect();
        }
        self.edited = true;
        self.normalize();
        Ok(())
    }

    /// Print the image's width at `resolution`
    pub fn set_x_resolution(&mut self, resolution: Resolution) -> Result<()> {
        resolution.validate()?;
        self.rect.width = resolution.pixels_to_mm(self.source_pixels().width);
        if self.keep_aspect {
            self.rect.height = self.rect.width / self.aspect();
        }
        self.edited = true;
        self.normalize();
        Ok(())
    }

    /// Print the image's height at `resolution`
    pub fn set_y_resolution(&mut self, resolution: Resolution) -> Result<()> {
        resolution.validate()?;
        self.rect.height = resolution.pixels_to_mm(self.source_pixels().height);
        if self.keep_aspect {
            self.rect.width = self.rect.height * self.aspect();
        }
        self.edited = true;
        self.normalize();
        Ok(())
    }

    /// Move the left edge; horizontal centering no longer applies
    pub fn set_left(&mut self, value: f64, unit: Unit) -> Result<()> {
        self.rect.x = units::to_base(value, unit)?;
        self.centering = self.centering.without_horizontal();
        self.edited = true;
        self.normalize();
        Ok(())
    }

    /// Move the right edge; horizontal centering no longer applies
    pub fn set_right(&mut self, value: f64, unit: Unit) -> Result<()> {
        self.rect.move_right(units::to_base(value, unit)?);
        self.centering = self.centering.without_horizontal();
        self.edited = true;
        self.normalize();
        Ok(())
    }

    /// Move the top edge; vertical centering no longer applies
    pub fn set_top(&mut self, value: f64, unit: Unit) -> Result<()> {
        self.rect.y = units::to_base(value, unit)?;
        self.centering = self.centering.without_vertical();
        self.edited = true;
        self.normalize();
        Ok(())
    }

    /// Move the bottom edge; vertical centering no longer applies
    pub fn set_bottom(&mut self, value: f64, unit: Unit) -> Result<()> {
        self.rect.move_bottom(units::to_base(value, unit)?);
        self.centering = self.centering.without_vertical();
        self.edited = true;
        self.normalize();
        Ok(())
    }

    pub fn set_keep_aspect(&mut self, keep_aspect: bool) {
        self.keep_aspect = keep_aspect;
        self.normalize();
    }

    pub fn set_centering(&mut self, centering: Centering) {
        self.centering = centering;
        self.normalize();
    }

    /// Drop every edit and go back to the computed placement
    pub fn load_defaults(&mut self) {
        let preferred = self.preferred_size();
        let available = self.available();
        let mut rect = Rect::new(available.x, available.y, preferred.width, preferred.height);
        if self.centering.horizontal() {
            rect.move_center_x(available.center_x());
        }
        if self.centering.vertical() {
            rect.move_center_y(available.center_y());
        }
        self.rect = rect;
        self.edited = false;
        self.normalize();
    }

    fn shift_for_centering(&self, delta: Size) -> (f64, f64) {
        let dx = if self.centering.horizontal() {
            delta.width / 2.0
        } else {
            0.0
        };
        let dy = if self.centering.vertical() {
            delta.height / 2.0
        } else {
            0.0
        };
        (dx, dy)
    }

    fn resize_keeping_anchor(&mut self, target: Size) {
        let delta = Size::new(self.rect.width - target.width, self.rect.height - target.height);
        let (dx, dy) = self.shift_for_centering(delta);
        self.rect = Rect::new(self.rect.x + dx, self.rect.y + dy, target.width, target.height);
    }

    fn normalize(&mut self) {
        let available = self.available();

        // Too large for the available area
        if !self.allow_overflow && !self.rect.size().fits_within(&available.size()) {
            let current = self.rect.size();
            let scaled = if self.keep_aspect {
                current.scaled_to_fit(&available.size())
            } else {
                available.size()
            };
            let target = Size::new(
                scaled.width.min(current.width),
                scaled.height.min(current.height),
            );
            self.resize_keeping_anchor(target);
        }

        // Aspect drifted while keep-aspect is on
        let preferred = self.preferred_size();
        if self.keep_aspect
            && !aspect_matches(preferred.aspect_ratio(), self.rect.size().aspect_ratio())
        {
            let target = preferred.scaled_to_fit(&self.rect.size());
            self.resize_keeping_anchor(target);
        }

        if self.centering.horizontal() {
            self.rect.move_center_x(available.center_x());
        }
        if self.centering.vertical() {
            self.rect.move_center_y(available.center_y());
        }

        if !self.allow_overflow {
            if self.rect.right() > available.right() {
                self.rect.move_right(available.right());
            }
            if self.rect.bottom() > available.bottom() {
                self.rect.move_bottom(available.bottom());
            }
            if self.rect.y < available.y {
                self.rect.y = available.y;
            }
            if self.rect.x < available.x {
                self.rect.x = available.x;
            }
        }
    }

    /// Effective print resolution on both axes
    pub fn resolution(&self, unit: ResolutionUnit) -> Result<(Resolution, Resolution)> {
        let pixels = self.source_pixels();
        Ok((
            Resolution::from_span(pixels.width, self.rect.width, unit)?,
            Resolution::from_span(pixels.height, self.rect.height, unit)?,
        ))
    }

    /// Values and bounds of every field, for a dialog to display
    pub fn fields(&self, unit: Unit, resolution_unit: ResolutionUnit) -> Result<EditorFields> {
        let available = self.available();
        let rect = self.rect;
        let to_unit = |mm: f64| mm / unit.mm_per_unit();
        let min_length = 10f64.powi(-EDITOR_DECIMALS);

        let width_range = FieldRange {
            min: min_length,
            max: to_unit(available.width),
        };
        let height_range = FieldRange {
            min: min_length,
            max: to_unit(available.height),
        };

        let pixels = self.source_pixels();
        let length_in_res_unit = |value_in_unit: f64| {
            value_in_unit * unit.mm_per_unit() / resolution_unit.length_unit().mm_per_unit()
        };
        let x_resolution_range = FieldRange {
            min: pixels.width / length_in_res_unit(width_range.max),
            max: pixels.width / length_in_res_unit(width_range.min),
        };
        let y_resolution_range = FieldRange {
            min: pixels.height / length_in_res_unit(height_range.max),
            max: pixels.height / length_in_res_unit(height_range.min),
        };
        let (x_resolution, y_resolution) = self.resolution(resolution_unit)?;

        Ok(EditorFields {
            unit,
            resolution_unit,
            width: to_unit(rect.width),
            height: to_unit(rect.height),
            left: to_unit(rect.x),
            right: to_unit(rect.right()),
            top: to_unit(rect.y),
            bottom: to_unit(rect.bottom()),
            x_resolution: x_resolution.value,
            y_resolution: y_resolution.value,
            width_range,
            height_range,
            left_range: FieldRange {
                min: to_unit(available.x),
                max: to_unit(available.right() - rect.width),
            },
            right_range: FieldRange {
                min: to_unit(available.x + rect.width),
                max: to_unit(available.right()),
            },
            top_range: FieldRange {
                min: to_unit(available.y),
                max: to_unit(available.bottom() - rect.height),
            },
            bottom_range: FieldRange {
                min: to_unit(available.y + rect.height),
                max: to_unit(available.bottom()),
            },
            x_resolution_range,
            y_resolution_range,
        })
    }
}

fn aspect_matches(a: f64, b: f64) -> bool {
    (a - b).abs() <= ASPECT_EPSILON * a.abs().max(b.abs())
}
