use imgview_print::render::render_preview_with_cancel;
use imgview_print::{
    CancelToken, PagePlacement, PreviewSurface, PrintEffects, PrintError, PrintJobDescriptor,
    PrintSpooler, Result, SourceImage,
};
use std::sync::Arc;
use tokio::sync::mpsc;
use tokio::task::{JoinError, JoinHandle};

use crate::{PreviewId, PrintCommand, PrintUpdate};

struct InFlight {
    id: PreviewId,
    cancel: CancelToken,
    handle: JoinHandle<Result<PreviewSurface>>,
}

impl InFlight {
    fn abandon(self) {
        log::debug!("cancelling preview {:?}", self.id);
        self.cancel.cancel();
        // The blocking render stops at its next row; its result is never read
        drop(self.handle);
    }
}

async fn wait_render(
    slot: &mut Option<InFlight>,
) -> (PreviewId, std::result::Result<Result<PreviewSurface>, JoinError>) {
    match slot {
        Some(render) => (render.id, (&mut render.handle).await),
        None => std::future::pending().await,
    }
}

/// Async worker task that renders previews and submits print jobs.
///
/// Previews are last-write-wins: queued requests collapse to the newest,
/// a new request cancels the one in flight, and a result whose id is not
/// the latest is dropped.
pub async fn worker_task(
    mut command_rx: mpsc::UnboundedReceiver<PrintCommand>,
    update_tx: mpsc::UnboundedSender<PrintUpdate>,
    spooler: Option<PrintSpooler>,
) {
    let mut in_flight: Option<InFlight> = None;
    let mut latest: Option<PreviewId> = None;

    loop {
        tokio::select! {
            cmd = command_rx.recv() => {
                let Some(cmd) = cmd else { break };
                process_command(
                    cmd,
                    &mut command_rx,
                    &update_tx,
                    spooler.as_ref(),
                    &mut in_flight,
                    &mut latest,
                );
            }
            (id, result) = wait_render(&mut in_flight) => {
                in_flight = None;
                if latest != Some(id) {
                    log::debug!("dropping stale preview {:?}", id);
                    continue;
                }
                match result {
                    Ok(Ok(surface)) => {
                        let _ = update_tx.send(PrintUpdate::PreviewRendered { id, surface });
                    }
                    Ok(Err(PrintError::Cancelled)) => {
                        log::debug!("preview {:?} cancelled", id);
                    }
                    Ok(Err(e)) => {
                        let _ = update_tx.send(PrintUpdate::Error {
                            message: format!("Failed to render preview: {}", e),
                        });
                    }
                    Err(e) => {
                        let _ = update_tx.send(PrintUpdate::Error {
                            message: format!("Preview worker stopped: {}", e),
                        });
                    }
                }
            }
        }
    }

    if let Some(render) = in_flight.take() {
        render.abandon();
    }
}

struct PreviewRequest {
    id: PreviewId,
    image: Arc<SourceImage>,
    placement: PagePlacement,
    effects: PrintEffects,
    px_per_mm: f64,
}

fn process_command(
    cmd: PrintCommand,
    command_rx: &mut mpsc::UnboundedReceiver<PrintCommand>,
    update_tx: &mpsc::UnboundedSender<PrintUpdate>,
    spooler: Option<&PrintSpooler>,
    in_flight: &mut Option<InFlight>,
    latest: &mut Option<PreviewId>,
) {
    let mut pending = match cmd {
        PrintCommand::RenderPreview {
            id,
            image,
            placement,
            effects,
            px_per_mm,
        } => Some(PreviewRequest {
            id,
            image,
            placement,
            effects,
            px_per_mm,
        }),
        PrintCommand::CancelPreview => None,
        PrintCommand::SubmitJob { job } => {
            submit_job(job, spooler, update_tx);
            return;
        }
    };

    // Drain queued commands in arrival order; the last preview or cancel wins
    while let Ok(next_cmd) = command_rx.try_recv() {
        match next_cmd {
            PrintCommand::RenderPreview {
                id,
                image,
                placement,
                effects,
                px_per_mm,
            } => {
                if let Some(stale) = &pending {
                    log::debug!("Discarding queued preview {:?}, using newer request", stale.id);
                }
                pending = Some(PreviewRequest {
                    id,
                    image,
                    placement,
                    effects,
                    px_per_mm,
                });
            }
            PrintCommand::CancelPreview => {
                if let Some(stale) = pending.take() {
                    log::debug!("Discarding queued preview {:?}, cancelled", stale.id);
                }
            }
            PrintCommand::SubmitJob { job } => submit_job(job, spooler, update_tx),
        }
    }

    if let Some(render) = in_flight.take() {
        render.abandon();
    }
    let Some(request) = pending else {
        *latest = None;
        return;
    };

    let PreviewRequest {
        id,
        image,
        placement,
        effects,
        px_per_mm,
    } = request;
    *latest = Some(id);
    let cancel = CancelToken::new();
    let token = cancel.clone();
    let handle = tokio::task::spawn_blocking(move || {
        render_preview_with_cancel(&image.pixels, &placement, &effects, px_per_mm, &token)
    });
    *in_flight = Some(InFlight { id, cancel, handle });
}

fn submit_job(
    job: PrintJobDescriptor,
    spooler: Option<&PrintSpooler>,
    update_tx: &mpsc::UnboundedSender<PrintUpdate>,
) {
    let Some(spooler) = spooler else {
        let _ = update_tx.send(PrintUpdate::Error {
            message: "No printer configured".to_string(),
        });
        return;
    };
    let submission = match spooler.submit(job) {
        Ok(submission) => submission,
        Err(e) => {
            let _ = update_tx.send(PrintUpdate::Error {
                message: format!("Failed to submit print job: {}", e),
            });
            return;
        }
    };

    let job_id = submission.job_id;
    let _ = update_tx.send(PrintUpdate::JobQueued { job_id });

    // Forward every status change until the job finishes
    let mut status_rx = submission.handle.subscribe();
    let update_tx = update_tx.clone();
    tokio::spawn(async move {
        while status_rx.changed().await.is_ok() {
            let status = *status_rx.borrow_and_update();
            let _ = update_tx.send(PrintUpdate::JobStatusChanged { job_id, status });
            if status.is_finished() {
                break;
            }
        }
    });
}
