//! Page geometry: paper, margins, orientation and centering
//!
//! All lengths are millimeters. Margins are relative to the page as it is
//! printed, after orientation has been applied.

use crate::types::{Centering, Margins, Orientation, PaperSize, Rect, Result, Size, validation};

/// The page an image is printed on
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct PageGeometry {
    /// Paper width as reported by the printer (any orientation)
    pub paper_width_mm: f64,
    /// Paper height as reported by the printer (any orientation)
    pub paper_height_mm: f64,
    pub margins: Margins,
    pub orientation: Orientation,
    pub centering: Centering,
}

impl Default for PageGeometry {
    fn default() -> Self {
        Self::new(
            PaperSize::default(),
            Margins::default(),
            Orientation::AutoRotate,
            Centering::Both,
        )
    }
}

impl PageGeometry {
    pub fn new(
        paper: PaperSize,
        margins: Margins,
        orientation: Orientation,
        centering: Centering,
    ) -> Self {
        let (paper_width_mm, paper_height_mm) = paper.dimensions_mm();
        Self {
            paper_width_mm,
            paper_height_mm,
            margins,
            orientation,
            centering,
        }
    }

    fn short_side(&self) -> f64 {
        self.paper_width_mm.min(self.paper_height_mm)
    }

    fn long_side(&self) -> f64 {
        self.paper_width_mm.max(self.paper_height_mm)
    }

    /// Check the invariants: positive finite paper, non-negative margins,
    /// and margins that leave a non-empty printable area.
    ///
    /// With AutoRotate the margins only have to fit one of the two
    /// orientations; [`validate_oriented`](Self::validate_oriented) checks
    /// the one the layout engine resolves.
    pub fn validate(&self) -> Result<()> {
        let (w, h) = (self.paper_width_mm, self.paper_height_mm);
        if !(w.is_finite() && h.is_finite() && w > 0.0 && h > 0.0) {
            return Err(validation(format!(
                "paper size must be positive, got {} x {} mm",
                w, h
            )));
        }

        let m = &self.margins;
        for (name, value) in [
            ("left", m.left_mm),
            ("right", m.right_mm),
            ("top", m.top_mm),
            ("bottom", m.bottom_mm),
        ] {
            if !value.is_finite() || value < 0.0 {
                return Err(validation(format!(
                    "{} margin must be a non-negative length, got {} mm",
                    name, value
                )));
            }
        }

        match self.orientation {
            Orientation::AutoRotate => self
                .check_margins(Orientation::Portrait)
                .or_else(|_| self.check_margins(Orientation::Landscape)),
            fixed => self.check_margins(fixed),
        }
    }

    /// [`validate`](Self::validate), then the margins against the page
    /// turned to `orientation`
    pub fn validate_oriented(&self, orientation: Orientation) -> Result<()> {
        self.validate()?;
        self.check_margins(orientation)
    }

    fn check_margins(&self, orientation: Orientation) -> Result<()> {
        let page = self.oriented_size(orientation);
        let m = &self.margins;
        if m.left_mm + m.right_mm >= page.width {
            return Err(validation(format!(
                "left + right margins ({} mm) leave no room on a {} mm wide page",
                m.left_mm + m.right_mm,
                page.width
            )));
        }
        if m.top_mm + m.bottom_mm >= page.height {
            return Err(validation(format!(
                "top + bottom margins ({} mm) leave no room on a {} mm high page",
                m.top_mm + m.bottom_mm,
                page.height
            )));
        }
        Ok(())
    }

    /// Page size once a concrete orientation is chosen. `AutoRotate` is
    /// treated as Portrait here; the layout engine resolves it first.
    pub fn oriented_size(&self, orientation: Orientation) -> Size {
        match orientation {
            Orientation::Landscape => Size::new(self.long_side(), self.short_side()),
            Orientation::Portrait | Orientation::AutoRotate => {
                Size::new(self.short_side(), self.long_side())
            }
        }
    }

    /// Printable area of the oriented page, or the whole page when margins
    /// are ignored.
    pub fn printable_area(&self, orientation: Orientation, ignore_margins: bool) -> Rect {
        let page = self.oriented_size(orientation);
        if ignore_margins {
            return Rect::from_size(page);
        }
        let m = &self.margins;
        Rect::new(
            m.left_mm,
            m.top_mm,
            page.width - m.left_mm - m.right_mm,
            page.height - m.top_mm - m.bottom_mm,
        )
    }
}
