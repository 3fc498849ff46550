//! Tonal effects applied at print time
//!
//! The pipeline order is fixed: brightness → contrast → exposure →
//! grayscale. Each tonal stage works per channel on values in [0, 1] and
//! clamps its output; grayscale comes last and maps gray onto itself.

use crate::constants::{EFFECT_MAX, EFFECT_MIN, EXPOSURE_UNITS_PER_STOP};
use crate::types::{Result, validation};
use image::Rgba;

/// Tonal adjustments for a print. Does not touch the source image.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct PrintEffects {
    /// Additive offset, -100..=100 (100 adds full white)
    pub brightness: f64,
    /// Slope around mid-gray, -100..=100 (-100 flattens to gray)
    pub contrast: f64,
    /// Gain in quarter stops, -100..=100 (±4 stops)
    pub exposure: f64,
    pub grayscale: bool,
    /// Composite with the bitmap-transforming path kept for older output
    pub legacy_rendering: bool,
}

impl PrintEffects {
    pub fn validate(&self) -> Result<()> {
        for (name, value) in [
            ("brightness", self.brightness),
            ("contrast", self.contrast),
            ("exposure", self.exposure),
        ] {
            if !(value.is_finite() && (EFFECT_MIN..=EFFECT_MAX).contains(&value)) {
                return Err(validation(format!(
                    "{} must be within [{}, {}], got {}",
                    name, EFFECT_MIN, EFFECT_MAX, value
                )));
            }
        }
        Ok(())
    }

    /// Whether the tonal stages change anything
    pub fn is_identity(&self) -> bool {
        self.brightness == 0.0 && self.contrast == 0.0 && self.exposure == 0.0 && !self.grayscale
    }

    /// Tonal stages for one normalized channel value
    pub fn apply_channel(&self, value: f64) -> f64 {
        let mut v = value;
        if self.brightness != 0.0 {
            v = (v + self.brightness / EFFECT_MAX).clamp(0.0, 1.0);
        }
        if self.contrast != 0.0 {
            let slope = ((EFFECT_MAX + self.contrast) / EFFECT_MAX).powi(2);
            v = ((v - 0.5) * slope + 0.5).clamp(0.0, 1.0);
        }
        if self.exposure != 0.0 {
            v = (v * 2f64.powf(self.exposure / EXPOSURE_UNITS_PER_STOP)).clamp(0.0, 1.0);
        }
        v
    }

    fn apply_channel_u8(&self, value: u8) -> u8 {
        (self.apply_channel(value as f64 / 255.0) * 255.0).round() as u8
    }

    /// Full pipeline for one pixel, computed directly
    pub fn apply_pixel(&self, pixel: Rgba<u8>) -> Rgba<u8> {
        let [r, g, b, a] = pixel.0;
        let toned = Rgba([
            self.apply_channel_u8(r),
            self.apply_channel_u8(g),
            self.apply_channel_u8(b),
            a,
        ]);
        if self.grayscale {
            to_gray(toned)
        } else {
            toned
        }
    }

    /// Precomputed form of the same pipeline
    pub fn lookup_table(&self) -> ToneTable {
        let mut table = [0u8; 256];
        for (i, slot) in table.iter_mut().enumerate() {
            *slot = self.apply_channel_u8(i as u8);
        }
        ToneTable {
            table,
            grayscale: self.grayscale,
        }
    }
}

/// Lookup-table version of [`PrintEffects::apply_pixel`]
#[derive(Debug, Clone)]
pub struct ToneTable {
    table: [u8; 256],
    grayscale: bool,
}

impl ToneTable {
    pub fn apply(&self, pixel: Rgba<u8>) -> Rgba<u8> {
        let [r, g, b, a] = pixel.0;
        let toned = Rgba([
            self.table[r as usize],
            self.table[g as usize],
            self.table[b as usize],
            a,
        ]);
        if self.grayscale {
            to_gray(toned)
        } else {
            toned
        }
    }
}

/// Rec. 601 luma in integer arithmetic; weights sum to 1000 so gray stays put
pub fn to_gray(pixel: Rgba<u8>) -> Rgba<u8> {
    let [r, g, b, a] = pixel.0;
    let luma = (299 * r as u32 + 587 * g as u32 + 114 * b as u32 + 500) / 1000;
    let y = luma as u8;
    Rgba([y, y, y, a])
}
