//! Shared constants for view and print composition
//!
//! This module centralizes magic numbers and constants used throughout
//! the transform and layout calculations.

// =============================================================================
// Unit Conversion
// =============================================================================

/// Millimeters per inch
pub const MM_PER_INCH: f64 = 25.4;

/// Points per inch (PostScript point)
pub const POINTS_PER_INCH: f64 = 72.0;

/// Millimeters per point
pub const MM_PER_POINT: f64 = MM_PER_INCH / POINTS_PER_INCH;

/// Points per pica
pub const POINTS_PER_PICA: f64 = 12.0;

/// Millimeters per Didot point
pub const MM_PER_DIDOT: f64 = 0.376;

/// Didot points per cicero
pub const DIDOTS_PER_CICERO: f64 = 12.0;

/// Convert millimeters to points
#[inline]
pub fn mm_to_pt(mm: f64) -> f64 {
    mm / MM_PER_POINT
}

/// Convert points to millimeters
#[inline]
pub fn pt_to_mm(pt: f64) -> f64 {
    pt * MM_PER_POINT
}

// =============================================================================
// Zoom
// =============================================================================

/// Factor applied by a single zoom-in / zoom-out step
pub const ZOOM_STEP: f64 = 1.25;

/// Smallest zoom factor reachable by default
pub const DEFAULT_MIN_ZOOM: f64 = 1.0 / 64.0;

/// Largest zoom factor reachable by default
pub const DEFAULT_MAX_ZOOM: f64 = 64.0;

// =============================================================================
// Print Defaults
// =============================================================================

/// Resolution assumed for images without embedded metadata (pixels per inch)
pub const DEFAULT_IMAGE_DPI: f64 = 72.0;

/// Bounds for tonal effect parameters
pub const EFFECT_MIN: f64 = -100.0;
pub const EFFECT_MAX: f64 = 100.0;

/// Exposure parameter units per photographic stop
pub const EXPOSURE_UNITS_PER_STOP: f64 = 25.0;

/// Copies accepted by the print dialog
pub const MIN_COPIES: u32 = 1;
pub const MAX_COPIES: u32 = 999;

/// Decimal places shown for lengths and resolutions in editors
pub const EDITOR_DECIMALS: i32 = 3;

/// Preview density used when the caller does not ask for one (pixels per mm)
pub const DEFAULT_PREVIEW_PX_PER_MM: f64 = 2.0;

/// Relative tolerance used when comparing aspect ratios
pub const ASPECT_EPSILON: f64 = 1e-9;
