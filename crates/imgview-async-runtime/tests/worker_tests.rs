use imgview_async_runtime::{PreviewId, PrintCommand, PrintUpdate, worker_task};
use imgview_print::{
    JobSettings, JobStatus, Margins, PageGeometry, PageLayoutEngine, PagePlacement, PdfPrinter,
    PixelSize, PlacementOptions, PrintEffects, PrintJobDescriptor, PrintSpooler, PrinterJobState,
    Resolution, ResolutionUnit, SourceImage, TransformState,
};
use image::{Rgba, RgbaImage};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;
use tokio::time::timeout;

fn source() -> Arc<SourceImage> {
    Arc::new(SourceImage::new(
        RgbaImage::from_pixel(40, 20, Rgba([200, 10, 10, 255])),
        None,
    ))
}

fn placement() -> PagePlacement {
    let page = PageGeometry {
        margins: Margins::uniform(10.0),
        ..Default::default()
    };
    PageLayoutEngine::default()
        .compute_placement(
            &page,
            &TransformState::default(),
            PixelSize::new(40, 20),
            Resolution::new(10.0, ResolutionUnit::PixelsPerMillimeter).unwrap(),
            PlacementOptions::default(),
        )
        .unwrap()
}

fn preview(id: u64) -> PrintCommand {
    PrintCommand::RenderPreview {
        id: PreviewId(id),
        image: source(),
        placement: placement(),
        effects: PrintEffects::default(),
        px_per_mm: 1.0,
    }
}

/// Run the worker over the queued commands and collect every update
async fn run(commands: Vec<PrintCommand>, spooler: Option<PrintSpooler>) -> Vec<PrintUpdate> {
    let (command_tx, command_rx) = mpsc::unbounded_channel();
    let (update_tx, mut update_rx) = mpsc::unbounded_channel();
    for cmd in commands {
        command_tx.send(cmd).unwrap();
    }
    drop(command_tx);

    worker_task(command_rx, update_tx, spooler).await;

    let mut updates = Vec::new();
    while let Some(update) = update_rx.recv().await {
        updates.push(update);
    }
    updates
}

#[tokio::test]
async fn test_preview_rendered() {
    let (command_tx, command_rx) = mpsc::unbounded_channel();
    let (update_tx, mut update_rx) = mpsc::unbounded_channel();
    let worker = tokio::spawn(worker_task(command_rx, update_tx, None));

    command_tx.send(preview(1)).unwrap();
    match update_rx.recv().await {
        Some(PrintUpdate::PreviewRendered { id, surface }) => {
            assert_eq!(id, PreviewId(1));
            // Landscape page for a wide image
            assert_eq!((surface.width(), surface.height()), (297, 210));
            let target = surface.target.unwrap();
            let center = surface.image.get_pixel(
                (target.x + target.width as i64 / 2) as u32,
                (target.y + target.height as i64 / 2) as u32,
            );
            assert_eq!(*center, Rgba([200, 10, 10, 255]));
        }
        other => panic!("unexpected update: {:?}", other),
    }

    drop(command_tx);
    worker.await.unwrap();
}

/// Next rendered preview; fails on any other update or a stalled worker
async fn next_preview(update_rx: &mut mpsc::UnboundedReceiver<PrintUpdate>) -> PreviewId {
    match timeout(Duration::from_secs(10), update_rx.recv()).await {
        Ok(Some(PrintUpdate::PreviewRendered { id, .. })) => id,
        Ok(other) => panic!("unexpected update: {:?}", other),
        Err(_) => panic!("no preview rendered"),
    }
}

/// Queue `commands` before the worker starts, keeping the sender open
async fn newest_preview_for(commands: Vec<PrintCommand>) -> PreviewId {
    let (command_tx, command_rx) = mpsc::unbounded_channel();
    let (update_tx, mut update_rx) = mpsc::unbounded_channel();
    for cmd in commands {
        command_tx.send(cmd).unwrap();
    }
    let worker = tokio::spawn(worker_task(command_rx, update_tx, None));

    let id = next_preview(&mut update_rx).await;

    drop(command_tx);
    worker.await.unwrap();
    // Nothing else was rendered
    let rest = update_rx.recv().await;
    assert!(rest.is_none(), "unexpected update: {:?}", rest);
    id
}

#[tokio::test]
async fn test_queued_previews_collapse_to_latest() {
    let id = newest_preview_for(vec![preview(1), preview(2), preview(3)]).await;
    assert_eq!(id, PreviewId(3));
}

#[tokio::test]
async fn test_preview_after_cancel_still_renders() {
    let id = newest_preview_for(vec![preview(1), PrintCommand::CancelPreview, preview(2)]).await;
    assert_eq!(id, PreviewId(2));
}

#[tokio::test]
async fn test_newer_request_supersedes_running_preview() {
    let (command_tx, command_rx) = mpsc::unbounded_channel();
    let (update_tx, mut update_rx) = mpsc::unbounded_channel();
    let worker = tokio::spawn(worker_task(command_rx, update_tx, None));

    command_tx.send(preview(1)).unwrap();
    command_tx.send(preview(2)).unwrap();
    // The first may finish before the second arrives, never after it
    let mut id = next_preview(&mut update_rx).await;
    if id == PreviewId(1) {
        id = next_preview(&mut update_rx).await;
    }
    assert_eq!(id, PreviewId(2));

    drop(command_tx);
    worker.await.unwrap();
}

#[tokio::test]
async fn test_cancel_drops_pending_preview() {
    let updates = run(vec![preview(1), PrintCommand::CancelPreview], None).await;
    assert!(
        updates
            .iter()
            .all(|u| !matches!(u, PrintUpdate::PreviewRendered { .. }))
    );
}

#[tokio::test]
async fn test_bad_preview_reports_error() {
    let cmd = PrintCommand::RenderPreview {
        id: PreviewId(1),
        image: source(),
        placement: placement(),
        effects: PrintEffects::default(),
        px_per_mm: 0.0,
    };
    let (command_tx, command_rx) = mpsc::unbounded_channel();
    let (update_tx, mut update_rx) = mpsc::unbounded_channel();
    let worker = tokio::spawn(worker_task(command_rx, update_tx, None));

    command_tx.send(cmd).unwrap();
    assert!(matches!(
        update_rx.recv().await,
        Some(PrintUpdate::Error { .. })
    ));

    drop(command_tx);
    worker.await.unwrap();
}

#[tokio::test]
async fn test_submit_without_printer() {
    let job = PrintJobDescriptor::new(
        source(),
        placement(),
        PrintEffects::default(),
        JobSettings::default(),
    )
    .unwrap();
    let updates = run(vec![PrintCommand::SubmitJob { job }], None).await;
    assert_eq!(updates.len(), 1);
    assert!(matches!(updates[0], PrintUpdate::Error { .. }));
}

#[tokio::test]
async fn test_submit_forwards_job_status() {
    let dir = tempfile::tempdir().unwrap();
    let output = dir.path().join("job.pdf");
    let spooler = PrintSpooler::new(Arc::new(PdfPrinter::new(&output)));
    let job = PrintJobDescriptor::new(
        source(),
        placement(),
        PrintEffects::default(),
        JobSettings {
            document_name: "red.png".to_string(),
            ..Default::default()
        },
    )
    .unwrap();

    let updates = run(vec![PrintCommand::SubmitJob { job }], Some(spooler)).await;

    assert!(matches!(updates[0], PrintUpdate::JobQueued { job_id: 1 }));
    match updates.last() {
        Some(PrintUpdate::JobStatusChanged { job_id, status }) => {
            assert_eq!(*job_id, 1);
            assert_eq!(*status, JobStatus::Finished(PrinterJobState::Idle));
        }
        other => panic!("unexpected last update: {:?}", other),
    }
    assert!(output.exists());
}
