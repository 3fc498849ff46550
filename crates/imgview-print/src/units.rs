//! Physical length and resolution units
//!
//! Every conversion goes through the base unit (millimeter) so that chains
//! of conversions agree with a direct conversion.

use crate::constants::{
    DIDOTS_PER_CICERO, MM_PER_DIDOT, MM_PER_INCH, MM_PER_POINT, POINTS_PER_PICA,
};
use crate::types::{Rect, Result, Size, validation};
use std::fmt;
use std::str::FromStr;

/// Physical length unit
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Unit {
    #[default]
    Millimeter,
    Point,
    Inch,
    Pica,
    Didot,
    Cicero,
}

impl Unit {
    pub const ALL: [Unit; 6] = [
        Unit::Millimeter,
        Unit::Point,
        Unit::Inch,
        Unit::Pica,
        Unit::Didot,
        Unit::Cicero,
    ];

    /// Length of one unit in millimeters
    pub fn mm_per_unit(self) -> f64 {
        match self {
            Unit::Millimeter => 1.0,
            Unit::Point => MM_PER_POINT,
            Unit::Inch => MM_PER_INCH,
            Unit::Pica => POINTS_PER_PICA * MM_PER_POINT,
            Unit::Didot => MM_PER_DIDOT,
            Unit::Cicero => DIDOTS_PER_CICERO * MM_PER_DIDOT,
        }
    }

    /// Symbol used in labels and configuration values
    pub fn symbol(self) -> &'static str {
        match self {
            Unit::Millimeter => "mm",
            Unit::Point => "pt",
            Unit::Inch => "in",
            Unit::Pica => "P\u{338}",
            Unit::Didot => "DD",
            Unit::Cicero => "CC",
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Unit::Millimeter => "Millimeter",
            Unit::Point => "Point",
            Unit::Inch => "Inch",
            Unit::Pica => "Pica",
            Unit::Didot => "Didot",
            Unit::Cicero => "Cicero",
        }
    }
}

impl fmt::Display for Unit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.symbol())
    }
}

impl FromStr for Unit {
    type Err = crate::PrintError;

    fn from_str(s: &str) -> Result<Self> {
        Unit::ALL
            .into_iter()
            .find(|unit| unit.symbol() == s || unit.name().eq_ignore_ascii_case(s))
            .ok_or_else(|| validation(format!("unknown length unit '{}'", s)))
    }
}

fn check_length(value: f64) -> Result<f64> {
    if !value.is_finite() {
        return Err(validation(format!("length must be finite, got {}", value)));
    }
    if value < 0.0 {
        return Err(validation(format!(
            "length must not be negative, got {}",
            value
        )));
    }
    Ok(value)
}

/// Convert a length to millimeters
pub fn to_base(value: f64, unit: Unit) -> Result<f64> {
    Ok(check_length(value)? * unit.mm_per_unit())
}

/// Convert a length in millimeters to `unit`
pub fn from_base(base_value: f64, unit: Unit) -> Result<f64> {
    Ok(check_length(base_value)? / unit.mm_per_unit())
}

/// Convert a length between two units via millimeters
pub fn convert(value: f64, from: Unit, to: Unit) -> Result<f64> {
    from_base(to_base(value, from)?, to)
}

/// Convert both sides of a size
pub fn convert_size(size: Size, from: Unit, to: Unit) -> Result<Size> {
    Ok(Size::new(
        convert(size.width, from, to)?,
        convert(size.height, from, to)?,
    ))
}

/// Scale a rectangle between units.
///
/// Coordinates may be negative (a placement allowed to overflow the paper),
/// so only the factor is applied here; sizes are still checked.
pub fn convert_rect(rect: Rect, from: Unit, to: Unit) -> Result<Rect> {
    check_length(rect.width)?;
    check_length(rect.height)?;
    let factor = from.mm_per_unit() / to.mm_per_unit();
    if !rect.x.is_finite() || !rect.y.is_finite() {
        return Err(validation("rectangle origin must be finite"));
    }
    Ok(rect.map(|v| v * factor))
}

/// Unit in which an image resolution is expressed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum ResolutionUnit {
    PixelsPerMillimeter,
    PixelsPerPoint,
    #[default]
    PixelsPerInch,
    PixelsPerPica,
    PixelsPerDidot,
    PixelsPerCicero,
}

impl ResolutionUnit {
    pub const ALL: [ResolutionUnit; 6] = [
        ResolutionUnit::PixelsPerMillimeter,
        ResolutionUnit::PixelsPerPoint,
        ResolutionUnit::PixelsPerInch,
        ResolutionUnit::PixelsPerPica,
        ResolutionUnit::PixelsPerDidot,
        ResolutionUnit::PixelsPerCicero,
    ];

    /// Length unit the pixel count is spread over
    pub fn length_unit(self) -> Unit {
        match self {
            ResolutionUnit::PixelsPerMillimeter => Unit::Millimeter,
            ResolutionUnit::PixelsPerPoint => Unit::Point,
            ResolutionUnit::PixelsPerInch => Unit::Inch,
            ResolutionUnit::PixelsPerPica => Unit::Pica,
            ResolutionUnit::PixelsPerDidot => Unit::Didot,
            ResolutionUnit::PixelsPerCicero => Unit::Cicero,
        }
    }

    pub fn from_length_unit(unit: Unit) -> Self {
        match unit {
            Unit::Millimeter => ResolutionUnit::PixelsPerMillimeter,
            Unit::Point => ResolutionUnit::PixelsPerPoint,
            Unit::Inch => ResolutionUnit::PixelsPerInch,
            Unit::Pica => ResolutionUnit::PixelsPerPica,
            Unit::Didot => ResolutionUnit::PixelsPerDidot,
            Unit::Cicero => ResolutionUnit::PixelsPerCicero,
        }
    }

    pub fn symbol(self) -> String {
        format!("px/{}", self.length_unit().symbol())
    }
}

impl fmt::Display for ResolutionUnit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.symbol())
    }
}

impl FromStr for ResolutionUnit {
    type Err = crate::PrintError;

    fn from_str(s: &str) -> Result<Self> {
        let unit = s
            .strip_prefix("px/")
            .or_else(|| s.strip_prefix("pixels/"))
            .unwrap_or(s);
        match unit.to_ascii_lowercase().as_str() {
            "dpi" | "ppi" => Ok(ResolutionUnit::PixelsPerInch),
            _ => unit.parse::<Unit>().map(ResolutionUnit::from_length_unit),
        }
    }
}

/// A pixel density: `value` pixels per one `unit` of length
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Resolution {
    pub value: f64,
    pub unit: ResolutionUnit,
}

impl Default for Resolution {
    fn default() -> Self {
        Self {
            value: crate::constants::DEFAULT_IMAGE_DPI,
            unit: ResolutionUnit::PixelsPerInch,
        }
    }
}

impl Resolution {
    pub fn new(value: f64, unit: ResolutionUnit) -> Result<Self> {
        let resolution = Self { value, unit };
        resolution.validate()?;
        Ok(resolution)
    }

    pub fn dpi(value: f64) -> Result<Self> {
        Self::new(value, ResolutionUnit::PixelsPerInch)
    }

    pub fn validate(&self) -> Result<()> {
        if !(self.value.is_finite() && self.value > 0.0) {
            return Err(validation(format!(
                "resolution must be positive, got {} {}",
                self.value, self.unit
            )));
        }
        Ok(())
    }

    /// Pixels per millimeter
    pub fn pixels_per_base_unit(&self) -> f64 {
        self.value / self.unit.length_unit().mm_per_unit()
    }

    /// Express the same density in another resolution unit
    pub fn to_unit(&self, unit: ResolutionUnit) -> Resolution {
        Resolution {
            value: self.pixels_per_base_unit() * unit.length_unit().mm_per_unit(),
            unit,
        }
    }

    /// Resolution at which `pixels` span `length_mm`
    pub fn from_span(pixels: f64, length_mm: f64, unit: ResolutionUnit) -> Result<Self> {
        if !(length_mm.is_finite() && length_mm > 0.0) {
            return Err(validation(format!(
                "printed length must be positive, got {} mm",
                length_mm
            )));
        }
        Resolution::new(pixels / length_mm * unit.length_unit().mm_per_unit(), unit)
    }

    /// Physical length in millimeters covered by `pixels`
    pub fn pixels_to_mm(&self, pixels: f64) -> f64 {
        pixels / self.pixels_per_base_unit()
    }
}

impl fmt::Display for Resolution {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.value, self.unit)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn close(a: f64, b: f64) -> bool {
        (a - b).abs() <= 1e-9 * a.abs().max(b.abs()).max(1.0)
    }

    #[test]
    fn test_reference_factors() {
        assert!(close(convert(1.0, Unit::Inch, Unit::Millimeter).unwrap(), 25.4));
        assert!(close(convert(72.0, Unit::Point, Unit::Inch).unwrap(), 1.0));
        assert!(close(convert(1.0, Unit::Pica, Unit::Point).unwrap(), 12.0));
        assert!(close(convert(1.0, Unit::Didot, Unit::Millimeter).unwrap(), 0.376));
        assert!(close(convert(1.0, Unit::Cicero, Unit::Didot).unwrap(), 12.0));
    }

    #[test]
    fn test_negative_length_rejected() {
        assert!(to_base(-1.0, Unit::Inch).is_err());
        assert!(from_base(-0.5, Unit::Point).is_err());
        assert!(convert(f64::NAN, Unit::Point, Unit::Inch).is_err());
        assert_eq!(to_base(0.0, Unit::Cicero).unwrap(), 0.0);
    }

    #[test]
    fn test_symbols_parse_back() {
        for unit in Unit::ALL {
            assert_eq!(unit.symbol().parse::<Unit>().unwrap(), unit);
            assert_eq!(unit.name().parse::<Unit>().unwrap(), unit);
        }
        assert_eq!(Unit::Pica.symbol(), "P̸");
        assert!("furlong".parse::<Unit>().is_err());
    }

    #[test]
    fn test_resolution_pixels_per_mm() {
        let dpi = Resolution::dpi(254.0).unwrap();
        assert!(close(dpi.pixels_per_base_unit(), 10.0));

        let per_mm = dpi.to_unit(ResolutionUnit::PixelsPerMillimeter);
        assert!(close(per_mm.value, 10.0));
        assert!(close(per_mm.pixels_to_mm(1000.0), 100.0));

        assert!(Resolution::dpi(0.0).is_err());
        assert!(Resolution::dpi(-3.0).is_err());
    }

    #[test]
    fn test_resolution_unit_parse() {
        assert_eq!(
            "dpi".parse::<ResolutionUnit>().unwrap(),
            ResolutionUnit::PixelsPerInch
        );
        assert_eq!(
            "px/mm".parse::<ResolutionUnit>().unwrap(),
            ResolutionUnit::PixelsPerMillimeter
        );
        assert_eq!(
            "CC".parse::<ResolutionUnit>().unwrap(),
            ResolutionUnit::PixelsPerCicero
        );
    }
}
