//! Print dialog state for one document
//!
//! Keeps the inputs of the last successful layout together with its
//! result. A rejected input leaves both untouched.

use crate::transform::TransformState;
use crate::types::{Centering, PixelSize, Result};
use crate::units::Resolution;

use super::{PageGeometry, PageLayoutEngine, PagePlacement, PlacementOptions, PrintRectEditor};

#[derive(Debug, Clone)]
pub struct PrintSession {
    engine: PageLayoutEngine,
    page: PageGeometry,
    transform: TransformState,
    image: PixelSize,
    resolution: Resolution,
    options: PlacementOptions,
    keep_aspect: bool,
    editor: PrintRectEditor,
}

impl PrintSession {
    /// Snapshot the view transform and compute the first placement
    pub fn new(
        engine: PageLayoutEngine,
        page: PageGeometry,
        transform: &TransformState,
        image: PixelSize,
        resolution: Option<Resolution>,
        options: PlacementOptions,
    ) -> Result<Self> {
        let resolution = engine.effective_resolution(resolution);
        let placement =
            engine.compute_placement(&page, transform, image, resolution, options)?;
        let editor = PrintRectEditor::new(
            placement,
            page.centering,
            true,
            options.ignore_paper_bounds,
        );
        Ok(Self {
            engine,
            page,
            transform: transform.clone(),
            image,
            resolution,
            options,
            keep_aspect: true,
            editor,
        })
    }

    pub fn page(&self) -> &PageGeometry {
        &self.page
    }

    pub fn options(&self) -> PlacementOptions {
        self.options
    }

    pub fn resolution(&self) -> Resolution {
        self.resolution
    }

    pub fn image_size(&self) -> PixelSize {
        self.image
    }

    pub fn transform(&self) -> &TransformState {
        &self.transform
    }

    /// Current placement, including the user's edits
    pub fn placement(&self) -> PagePlacement {
        self.editor.placement()
    }

    pub fn editor(&self) -> &PrintRectEditor {
        &self.editor
    }

    pub fn editor_mut(&mut self) -> &mut PrintRectEditor {
        &mut self.editor
    }

    /// Recompute the placement and carry the editor over to it. Centering
    /// dropped by an edge edit stays dropped unless the page asks for a
    /// different centering.
    fn relayout(
        &mut self,
        page: PageGeometry,
        transform: Option<&TransformState>,
        resolution: Resolution,
        options: PlacementOptions,
    ) -> Result<()> {
        let transform = transform.cloned().unwrap_or_else(|| self.transform.clone());
        let placement =
            self.engine
                .compute_placement(&page, &transform, self.image, resolution, options)?;
        self.transform = transform;
        let centering = if page.centering != self.page.centering {
            page.centering
        } else {
            self.editor.centering()
        };
        self.editor.rebase(placement, centering, options.ignore_paper_bounds);
        self.page = page;
        self.resolution = resolution;
        self.options = options;
        log::debug!(
            "placement recomputed: {:?} on {:?} page",
            self.editor.rect(),
            self.editor.placement().orientation
        );
        Ok(())
    }

    /// Switch paper, margins, orientation or centering. On error the
    /// previous geometry and placement stay in effect.
    pub fn set_page_geometry(&mut self, page: PageGeometry) -> Result<()> {
        self.relayout(page, None, self.resolution, self.options)
    }

    pub fn set_options(&mut self, options: PlacementOptions) -> Result<()> {
        self.relayout(self.page, None, self.resolution, options)
    }

    pub fn set_resolution(&mut self, resolution: Resolution) -> Result<()> {
        self.relayout(self.page, None, resolution, self.options)
    }

    pub fn set_centering(&mut self, centering: Centering) -> Result<()> {
        let page = PageGeometry {
            centering,
            ..self.page
        };
        self.relayout(page, None, self.resolution, self.options)
    }

    pub fn set_keep_aspect(&mut self, keep_aspect: bool) {
        self.keep_aspect = keep_aspect;
        self.editor.set_keep_aspect(keep_aspect);
    }

    /// Pick up a newer view transform. Returns whether the placement was
    /// recomputed (it is only when the transform changed since the snapshot).
    pub fn sync_transform(&mut self, transform: &TransformState) -> Result<bool> {
        if transform.revision() == self.transform.revision()
            && transform.orientation() == self.transform.orientation()
        {
            return Ok(false);
        }
        self.relayout(self.page, Some(transform), self.resolution, self.options)?;
        Ok(true)
    }

    /// Discard edits made through the editor
    pub fn load_defaults(&mut self) {
        self.editor.load_defaults();
    }
}
