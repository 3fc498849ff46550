pub mod commands;
pub mod constants;
pub mod effects;
pub mod job;
pub mod layout;
pub mod printer;
pub mod render;
mod settings;
pub mod transform;
mod types;
pub mod units;
pub mod view;

pub use commands::{DocumentHost, NavigateDirection, ViewCommand};
pub use effects::PrintEffects;
pub use job::{JobHandle, JobSettings, JobStatus, PrintJobDescriptor, PrintSpooler, Submission};
pub use layout::{
    LayoutConfig, PageGeometry, PageLayoutEngine, PagePlacement, PlacementOptions, PlacementRect,
    PrintRectEditor, PrintSession,
};
pub use printer::{
    LocalPrinters, PdfPrinter, PrinterBackend, PrinterCapabilities, PrinterCapabilityAdapter,
    PrinterInfo, PrinterJobState,
};
pub use render::{
    CancelToken, Compositor, DirectCompositor, LegacyCompositor, PreviewSurface, SourceImage,
    render_preview, render_preview_with_cancel,
};
pub use settings::PrintSettings;
pub use transform::{
    FitMode, ImageOrientation, PersistedTransform, TransformState, ZoomLimits, ZoomMode,
};
pub use types::*;
pub use units::{Resolution, ResolutionUnit, Unit};
pub use view::{ImageView, ViewTransform};
