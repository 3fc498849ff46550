//! Printer collaborator boundary
//!
//! The print path never talks to a device directly. It asks a
//! [`PrinterCapabilityAdapter`] what is installed and what each printer
//! supports, and hands finished jobs to a [`PrinterBackend`].

mod pdf;

pub use pdf::PdfPrinter;

use crate::job::PrintJobDescriptor;
use crate::types::{ColorMode, Margins, PaperSize, PrintError, Result};
use crate::units::{Resolution, ResolutionUnit};
use std::fmt;
use std::sync::Arc;

/// State reported by a printer for itself or for a submitted job
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum PrinterJobState {
    #[default]
    Idle,
    Active,
    Aborted,
    Error,
    /// A device state this crate does not know, with its raw code
    Unknown(i32),
}

impl PrinterJobState {
    /// Error and Aborted end a job without output
    pub fn is_failure(self) -> bool {
        matches!(self, Self::Aborted | Self::Error)
    }
}

impl fmt::Display for PrinterJobState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Idle => write!(f, "Idle"),
            Self::Active => write!(f, "Active"),
            Self::Aborted => write!(f, "Aborted"),
            Self::Error => write!(f, "Error"),
            Self::Unknown(code) => write!(f, "Unknown ({})", code),
        }
    }
}

/// Descriptive information about an installed printer
#[derive(Debug, Clone, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct PrinterInfo {
    pub name: String,
    pub description: String,
    pub location: String,
    pub make_and_model: String,
    pub is_default: bool,
    pub is_remote: bool,
    pub state: PrinterJobState,
}

/// What a printer accepts
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct PrinterCapabilities {
    pub paper_sizes: Vec<PaperSize>,
    pub default_paper: PaperSize,
    pub default_margins: Margins,
    pub resolution_units: Vec<ResolutionUnit>,
    pub color_modes: Vec<ColorMode>,
    pub supports_multiple_copies: bool,
    pub device_resolution: Resolution,
}

impl PrinterCapabilities {
    pub fn supports_color_mode(&self, mode: ColorMode) -> bool {
        self.color_modes.contains(&mode)
    }

    /// `requested` if the printer has it, else the first mode it offers
    pub fn resolve_color_mode(&self, requested: ColorMode) -> Result<ColorMode> {
        if self.supports_color_mode(requested) {
            return Ok(requested);
        }
        self.color_modes.first().copied().ok_or_else(|| {
            PrintError::Resource("printer reports no supported color mode".to_string())
        })
    }

    /// Copy count the printer will honor: 1 unless it can print several
    pub fn resolve_copies(&self, requested: u32) -> u32 {
        if self.supports_multiple_copies {
            requested
        } else {
            1
        }
    }
}

/// Enumerates printers and reports what they can do
pub trait PrinterCapabilityAdapter: Send + Sync {
    fn printers(&self) -> Result<Vec<PrinterInfo>>;

    fn capabilities(&self, printer: &str) -> Result<PrinterCapabilities>;

    /// The printer flagged as default, or the first one
    fn default_printer(&self) -> Result<Option<PrinterInfo>> {
        let printers = self.printers()?;
        let default = printers.iter().find(|p| p.is_default).cloned();
        Ok(default.or_else(|| printers.into_iter().next()))
    }
}

/// A device (or file sink) that accepts print jobs.
///
/// `submit` blocks until the device reports a state for the job; the
/// spooler calls it off the async runtime.
pub trait PrinterBackend: Send + Sync + 'static {
    fn info(&self) -> PrinterInfo;

    fn capabilities(&self) -> Result<PrinterCapabilities>;

    fn submit(&self, job_id: u64, job: &PrintJobDescriptor) -> Result<PrinterJobState>;
}

/// Adapter over a fixed set of backends
#[derive(Clone, Default)]
pub struct LocalPrinters {
    backends: Vec<Arc<dyn PrinterBackend>>,
}

impl LocalPrinters {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_backend(mut self, backend: Arc<dyn PrinterBackend>) -> Self {
        self.backends.push(backend);
        self
    }

    pub fn backend(&self, printer: &str) -> Result<Arc<dyn PrinterBackend>> {
        self.backends
            .iter()
            .find(|b| b.info().name == printer)
            .cloned()
            .ok_or_else(|| PrintError::Resource(format!("no printer named '{}'", printer)))
    }
}

impl PrinterCapabilityAdapter for LocalPrinters {
    fn printers(&self) -> Result<Vec<PrinterInfo>> {
        Ok(self.backends.iter().map(|b| b.info()).collect())
    }

    fn capabilities(&self, printer: &str) -> Result<PrinterCapabilities> {
        self.backend(printer)?.capabilities()
    }
}

impl fmt::Debug for LocalPrinters {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list()
            .entries(self.backends.iter().map(|b| b.info().name))
            .finish()
    }
}
