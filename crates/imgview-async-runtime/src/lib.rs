use std::sync::Arc;

mod worker;

pub use worker::worker_task;

// Re-export types from the library crate
pub use imgview_print::{
    JobStatus, PagePlacement, PreviewSurface, PrintEffects, PrintJobDescriptor, PrintSpooler,
    SourceImage,
};

/// Handle to one preview request. Later requests carry larger ids.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct PreviewId(pub u64);

/// Commands sent from UI to worker
#[derive(Debug)]
pub enum PrintCommand {
    /// Render a preview; supersedes any preview queued or in flight
    RenderPreview {
        id: PreviewId,
        image: Arc<SourceImage>,
        placement: PagePlacement,
        effects: PrintEffects,
        px_per_mm: f64,
    },
    CancelPreview,
    SubmitJob {
        job: PrintJobDescriptor,
    },
}

/// Updates sent from worker to UI
#[derive(Debug, Clone)]
pub enum PrintUpdate {
    PreviewRendered {
        id: PreviewId,
        surface: PreviewSurface,
    },
    JobQueued {
        job_id: u64,
    },
    JobStatusChanged {
        job_id: u64,
        status: JobStatus,
    },
    Error {
        message: String,
    },
}
