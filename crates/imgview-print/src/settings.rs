use crate::effects::PrintEffects;
use crate::job::JobSettings;
use crate::layout::{LayoutConfig, PageGeometry, PlacementOptions};
use crate::types::*;
use crate::units::{Resolution, ResolutionUnit, Unit};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Print dialog configuration remembered between sessions
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct PrintSettings {
    // Page
    pub paper_size: PaperSize,
    pub orientation: Orientation,
    pub margins: Margins,
    pub centering: Centering,
    /// AutoRotate choice for square images
    pub square_orientation: Orientation,

    // Units shown in the dialog
    pub size_unit: Unit,
    pub resolution_unit: ResolutionUnit,
    /// Used when the image file carries no resolution
    pub default_resolution: Resolution,

    // Layout flags
    pub ignore_margins: bool,
    pub ignore_paper_bounds: bool,
    pub keep_aspect: bool,

    pub effects: PrintEffects,

    // Job
    pub copies: u32,
    pub color_mode: ColorMode,

    /// Keep zoom, rotation and flips when switching images
    pub remember_transform: bool,
}

impl Default for PrintSettings {
    fn default() -> Self {
        Self {
            paper_size: PaperSize::A4,
            orientation: Orientation::AutoRotate,
            margins: Margins::default(),
            centering: Centering::Both,
            square_orientation: Orientation::Portrait,
            size_unit: Unit::Millimeter,
            resolution_unit: ResolutionUnit::PixelsPerInch,
            default_resolution: Resolution::default(),
            ignore_margins: false,
            ignore_paper_bounds: false,
            keep_aspect: true,
            effects: PrintEffects::default(),
            copies: crate::constants::MIN_COPIES,
            color_mode: ColorMode::Color,
            remember_transform: false,
        }
    }
}

impl PrintSettings {
    /// Load settings from a JSON file
    #[cfg(feature = "serde")]
    pub async fn load(path: impl AsRef<std::path::Path>) -> Result<Self> {
        let bytes = tokio::fs::read(path).await?;
        let settings: Self = serde_json::from_slice(&bytes)
            .map_err(|e| PrintError::Config(format!("Failed to parse settings: {}", e)))?;
        settings.validate()?;
        Ok(settings)
    }

    /// Save settings to a JSON file
    #[cfg(feature = "serde")]
    pub async fn save(&self, path: impl AsRef<std::path::Path>) -> Result<()> {
        let json = serde_json::to_string_pretty(self)
            .map_err(|e| PrintError::Config(format!("Failed to serialize settings: {}", e)))?;
        tokio::fs::write(path, json).await?;
        Ok(())
    }

    /// Validate the settings
    pub fn validate(&self) -> Result<()> {
        self.page_geometry().validate()?;
        self.default_resolution.validate()?;
        self.effects.validate()?;
        self.job_settings(String::new()).validate()?;
        if self.square_orientation == Orientation::AutoRotate {
            return Err(PrintError::Config(
                "Square images need a fixed orientation, not AutoRotate".to_string(),
            ));
        }
        Ok(())
    }

    pub fn page_geometry(&self) -> PageGeometry {
        PageGeometry::new(self.paper_size, self.margins, self.orientation, self.centering)
    }

    pub fn placement_options(&self) -> PlacementOptions {
        PlacementOptions {
            ignore_margins: self.ignore_margins,
            ignore_paper_bounds: self.ignore_paper_bounds,
        }
    }

    pub fn layout_config(&self) -> LayoutConfig {
        LayoutConfig {
            square_orientation: self.square_orientation,
            default_resolution: self.default_resolution,
        }
    }

    pub fn job_settings(&self, document_name: impl Into<String>) -> JobSettings {
        JobSettings {
            copies: self.copies,
            color_mode: self.color_mode,
            document_name: document_name.into(),
            ..JobSettings::default()
        }
    }
}
