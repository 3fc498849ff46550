//! Image list behind the `view` command

use anyhow::Result;
use imgview_print::{
    DocumentHost, ImageView, JobHandle, NavigateDirection, PageLayoutEngine, PdfPrinter,
    PixelSize, PrintSession, PrintSettings, PrintSpooler, Resolution, SourceImage, ViewCommand,
    ZoomLimits,
};
use std::path::PathBuf;
use std::sync::Arc;

use crate::document_name;

/// Files shown one at a time. Deleting drops a file from the list only.
pub struct FileHost {
    paths: Vec<PathBuf>,
    current: usize,
    settings: PrintSettings,
    print_dir: PathBuf,
    device_dpi: Option<f64>,
    jobs: Vec<(PathBuf, JobHandle)>,
}

impl FileHost {
    pub fn new(
        paths: Vec<PathBuf>,
        settings: PrintSettings,
        print_dir: PathBuf,
        device_dpi: Option<f64>,
    ) -> Self {
        Self {
            paths,
            current: 0,
            settings,
            print_dir,
            device_dpi,
            jobs: Vec::new(),
        }
    }

    fn current_size(&self) -> imgview_print::Result<Option<PixelSize>> {
        match self.paths.get(self.current) {
            Some(path) => {
                let (width, height) = image::image_dimensions(path)?;
                Ok(Some(PixelSize::new(width, height)))
            }
            None => Ok(None),
        }
    }

    /// Run `commands` against a fresh view of the first image, reporting
    /// the view after each one
    pub fn replay(&mut self, viewport: imgview_print::Size, commands: &[ViewCommand]) -> Result<()> {
        let mut view = ImageView::new(viewport, ZoomLimits::default());
        view.set_remember_transform(self.settings.remember_transform);
        view.set_image(self.current_size()?)?;
        view.fit_to_window()?;
        self.report("Open", &view);

        for &command in commands {
            view.execute(command, self)?;
            self.report(&command.to_string(), &view);
        }
        Ok(())
    }

    fn report(&self, label: &str, view: &ImageView) {
        let Some(frame) = view.view_transform() else {
            println!("{:<26} no image", label);
            return;
        };
        let transform = view.transform();
        let name = self
            .paths
            .get(self.current)
            .map(|path| document_name(path))
            .unwrap_or_default();
        println!(
            "{:<26} {} zoom {:.3} ({:?}) rotation {}° flip {}{} shown {:.0}x{:.0} at {:.0},{:.0}",
            label,
            name,
            transform.zoom(),
            transform.zoom_mode(),
            transform.rotation().degrees(),
            if transform.flip_horizontal_enabled() { "H" } else { "-" },
            if transform.flip_vertical_enabled() { "V" } else { "-" },
            frame.image_rect.width,
            frame.image_rect.height,
            frame.image_rect.x,
            frame.image_rect.y,
        );
    }

    /// Wait for every print job started during the replay
    pub async fn finish(self) -> Result<()> {
        for (output, handle) in self.jobs {
            let job_id = handle.job_id();
            let state = handle.wait().await?;
            println!("Job {} finished ({}) → {}", job_id, state, output.display());
        }
        Ok(())
    }
}

impl DocumentHost for FileHost {
    fn navigate(&mut self, direction: NavigateDirection) -> imgview_print::Result<Option<PixelSize>> {
        let last = self.paths.len().saturating_sub(1);
        let target = match direction {
            NavigateDirection::Previous => self.current.saturating_sub(1),
            NavigateDirection::Next => (self.current + 1).min(last),
            NavigateDirection::First => 0,
            NavigateDirection::Last => last,
        };
        if target == self.current {
            return Ok(None);
        }
        self.current = target;
        self.current_size()
    }

    fn print(&mut self, view: &ImageView) -> imgview_print::Result<()> {
        let Some(path) = self.paths.get(self.current).cloned() else {
            log::warn!("nothing to print");
            return Ok(());
        };
        let pixels = image::open(&path)?.to_rgba8();
        let image = Arc::new(SourceImage::new(pixels, None));

        let session = PrintSession::new(
            PageLayoutEngine::new(self.settings.layout_config()),
            self.settings.page_geometry(),
            view.transform(),
            image.size(),
            image.resolution,
            self.settings.placement_options(),
        )?;

        let stem = path
            .file_stem()
            .map(|stem| stem.to_string_lossy().into_owned())
            .unwrap_or_else(|| "print".to_string());
        let output = self
            .print_dir
            .join(format!("{}-{}.pdf", stem, self.jobs.len() + 1));
        let mut printer = PdfPrinter::new(&output);
        if let Some(dpi) = self.device_dpi {
            printer = printer.with_device_resolution(Resolution::dpi(dpi)?)?;
        }

        let spooler = PrintSpooler::new(Arc::new(printer));
        let submission = spooler.commit(
            image,
            session.placement(),
            self.settings.effects,
            self.settings.job_settings(document_name(&path)),
        )?;
        self.jobs.push((output, submission.handle));
        Ok(())
    }

    fn delete_current(&mut self) -> imgview_print::Result<Option<PixelSize>> {
        if self.current < self.paths.len() {
            let removed = self.paths.remove(self.current);
            log::info!("removed {} from the list", removed.display());
        }
        self.current = self.current.min(self.paths.len().saturating_sub(1));
        self.current_size()
    }
}
