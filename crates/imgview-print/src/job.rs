//! Print jobs and their asynchronous submission
//!
//! A [`PrintJobDescriptor`] is validated once and never changes afterwards.
//! [`PrintSpooler::submit`] hands it to a backend on a blocking thread and
//! returns straight away; the job's progress is published on a watch
//! channel that [`JobHandle`] wraps.

use crate::constants::{MAX_COPIES, MIN_COPIES};
use crate::effects::PrintEffects;
use crate::layout::PagePlacement;
use crate::printer::{PrinterBackend, PrinterCapabilities, PrinterJobState};
use crate::render::{CancelToken, SourceImage, render_placed_image};
use crate::types::{ColorMode, PrintError, Result, validation};
use image::RgbaImage;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use tokio::sync::watch;

/// Per-job options chosen in the print dialog
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct JobSettings {
    pub copies: u32,
    pub color_mode: ColorMode,
    /// Title shown in the printer queue
    pub document_name: String,
    pub creator: String,
}

impl Default for JobSettings {
    fn default() -> Self {
        Self {
            copies: MIN_COPIES,
            color_mode: ColorMode::Color,
            document_name: String::new(),
            creator: format!("{} {}", env!("CARGO_PKG_NAME"), env!("CARGO_PKG_VERSION")),
        }
    }
}

impl JobSettings {
    pub fn validate(&self) -> Result<()> {
        if !(MIN_COPIES..=MAX_COPIES).contains(&self.copies) {
            return Err(validation(format!(
                "copies must be within [{}, {}], got {}",
                MIN_COPIES, MAX_COPIES, self.copies
            )));
        }
        Ok(())
    }
}

/// Everything a backend needs to print: image, placement, effects, options
#[derive(Debug, Clone)]
pub struct PrintJobDescriptor {
    image: Arc<SourceImage>,
    placement: PagePlacement,
    effects: PrintEffects,
    settings: JobSettings,
}

impl PrintJobDescriptor {
    /// Validate and freeze a job. A grayscale color mode turns the
    /// grayscale effect on.
    pub fn new(
        image: Arc<SourceImage>,
        placement: PagePlacement,
        effects: PrintEffects,
        settings: JobSettings,
    ) -> Result<Self> {
        effects.validate()?;
        settings.validate()?;
        if image.size().is_empty() {
            return Err(validation("cannot print an empty image"));
        }
        if image.size() != placement.image_size {
            return Err(validation(format!(
                "placement was computed for a {}x{} px image, got {}x{} px",
                placement.image_size.width,
                placement.image_size.height,
                image.size().width,
                image.size().height
            )));
        }
        let rect = placement.rect;
        if !(rect.x.is_finite() && rect.y.is_finite()) || rect.is_empty() {
            return Err(validation(format!("placement {:?} is empty", rect)));
        }
        if placement.page_size.is_empty() {
            return Err(validation("page size must be positive"));
        }

        let effects = PrintEffects {
            grayscale: effects.grayscale || settings.color_mode == ColorMode::Grayscale,
            ..effects
        };
        Ok(Self {
            image,
            placement,
            effects,
            settings,
        })
    }

    pub fn image(&self) -> &SourceImage {
        &self.image
    }

    pub fn placement(&self) -> &PagePlacement {
        &self.placement
    }

    /// Effects as they will be applied
    pub fn effects(&self) -> &PrintEffects {
        &self.effects
    }

    pub fn settings(&self) -> &JobSettings {
        &self.settings
    }

    pub fn copies(&self) -> u32 {
        self.settings.copies
    }

    pub fn color_mode(&self) -> ColorMode {
        self.settings.color_mode
    }

    pub fn document_name(&self) -> &str {
        &self.settings.document_name
    }

    pub fn creator(&self) -> &str {
        &self.settings.creator
    }

    /// Copy of this job limited to what `capabilities` allows
    pub fn resolved_for(&self, capabilities: &PrinterCapabilities) -> Result<Self> {
        let settings = JobSettings {
            copies: capabilities.resolve_copies(self.settings.copies),
            color_mode: capabilities.resolve_color_mode(self.settings.color_mode)?,
            ..self.settings.clone()
        };
        Self::new(
            Arc::clone(&self.image),
            self.placement.clone(),
            self.effects,
            settings,
        )
    }

    /// Source pixels per millimeter of paper at the placed size
    pub fn native_density(&self) -> f64 {
        let oriented = self.placement.oriented_image_size();
        oriented.width as f64 / self.placement.rect.width
    }

    /// Density to rasterize at for a device of `device_px_per_mm`: never
    /// finer than the source provides
    pub fn raster_density(&self, device_px_per_mm: f64) -> f64 {
        self.native_density().min(device_px_per_mm)
    }

    /// The placed image rendered at `px_per_mm`, sized to the placement
    pub fn render_raster(&self, px_per_mm: f64, cancel: &CancelToken) -> Result<RgbaImage> {
        render_placed_image(
            &self.image.pixels,
            &self.placement,
            &self.effects,
            px_per_mm,
            cancel,
        )
    }
}

/// Progress of a submitted job
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JobStatus {
    Queued,
    Printing,
    /// Final state reported by the printer
    Finished(PrinterJobState),
}

impl JobStatus {
    pub fn is_finished(&self) -> bool {
        matches!(self, Self::Finished(_))
    }
}

/// Observer for one submitted job
#[derive(Debug, Clone)]
pub struct JobHandle {
    job_id: u64,
    status: watch::Receiver<JobStatus>,
}

impl JobHandle {
    pub fn job_id(&self) -> u64 {
        self.job_id
    }

    pub fn status(&self) -> JobStatus {
        *self.status.borrow()
    }

    /// Raw receiver, for callers that want every transition
    pub fn subscribe(&self) -> watch::Receiver<JobStatus> {
        self.status.clone()
    }

    /// Wait for the job to finish. Error and Aborted come back as
    /// [`PrintError::Job`].
    pub async fn wait(mut self) -> Result<PrinterJobState> {
        let job_id = self.job_id;
        let state = match self.status.wait_for(JobStatus::is_finished).await {
            Ok(status) => match *status {
                JobStatus::Finished(state) => state,
                _ => PrinterJobState::Error,
            },
            // Spooler task went away without a verdict
            Err(_) => PrinterJobState::Error,
        };
        if state.is_failure() {
            Err(PrintError::Job { job_id, state })
        } else {
            Ok(state)
        }
    }
}

/// Result of handing a job to the spooler
#[derive(Debug, Clone)]
pub struct Submission {
    pub job_id: u64,
    /// Status at the time of submission, always `Queued`
    pub status: JobStatus,
    pub handle: JobHandle,
}

/// Sends jobs to one printer backend
pub struct PrintSpooler {
    backend: Arc<dyn PrinterBackend>,
    next_job_id: AtomicU64,
}

impl PrintSpooler {
    pub fn new(backend: Arc<dyn PrinterBackend>) -> Self {
        Self {
            backend,
            next_job_id: AtomicU64::new(1),
        }
    }

    pub fn backend(&self) -> &Arc<dyn PrinterBackend> {
        &self.backend
    }

    /// Build a job from its parts and submit it
    pub fn commit(
        &self,
        image: Arc<SourceImage>,
        placement: PagePlacement,
        effects: PrintEffects,
        settings: JobSettings,
    ) -> Result<Submission> {
        let job = PrintJobDescriptor::new(image, placement, effects, settings)?;
        self.submit(job)
    }

    /// Queue `job` and return without waiting for the printer.
    ///
    /// The printer must be usable and its capabilities readable; otherwise
    /// a [`PrintError::Resource`] is returned and nothing is queued. Must be
    /// called from within a Tokio runtime.
    pub fn submit(&self, job: PrintJobDescriptor) -> Result<Submission> {
        let info = self.backend.info();
        if info.state.is_failure() {
            return Err(PrintError::Resource(format!(
                "printer '{}' is in state {}",
                info.name, info.state
            )));
        }
        let capabilities = self.backend.capabilities().map_err(|e| match e {
            PrintError::Resource(_) => e,
            other => PrintError::Resource(format!(
                "capability query for '{}' failed: {}",
                info.name, other
            )),
        })?;
        let job = job.resolved_for(&capabilities)?;

        let job_id = self.next_job_id.fetch_add(1, Ordering::Relaxed);
        let (status_tx, status_rx) = watch::channel(JobStatus::Queued);
        let backend = Arc::clone(&self.backend);
        log::info!(
            "queued job {} '{}' on '{}' ({} copies, {:?})",
            job_id,
            job.document_name(),
            info.name,
            job.copies(),
            job.color_mode()
        );

        tokio::spawn(async move {
            let _ = status_tx.send(JobStatus::Printing);
            log::debug!("job {} printing", job_id);
            let outcome = tokio::task::spawn_blocking(move || backend.submit(job_id, &job)).await;
            let state = match outcome {
                Ok(Ok(state)) => state,
                Ok(Err(e)) => {
                    log::warn!("job {} failed: {}", job_id, e);
                    PrinterJobState::Error
                }
                Err(e) => {
                    log::warn!("job {} worker stopped: {}", job_id, e);
                    PrinterJobState::Error
                }
            };
            if state.is_failure() {
                log::warn!("job {} ended in state {}", job_id, state);
            } else {
                log::debug!("job {} finished in state {}", job_id, state);
            }
            let _ = status_tx.send(JobStatus::Finished(state));
        });

        Ok(Submission {
            job_id,
            status: JobStatus::Queued,
            handle: JobHandle {
                job_id,
                status: status_rx,
            },
        })
    }
}

impl std::fmt::Debug for PrintSpooler {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PrintSpooler")
            .field("printer", &self.backend.info().name)
            .field("next_job_id", &self.next_job_id)
            .finish()
    }
}
