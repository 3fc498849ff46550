mod host;
mod logger;

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand, ValueEnum};
use imgview_print::units::{convert, convert_rect};
use imgview_print::{
    Centering, ColorMode, LocalPrinters, NavigateDirection, Orientation, PageLayoutEngine,
    PagePlacement, PaperSize, PdfPrinter, PrintSession, PrintSettings, PrintSpooler,
    PrinterCapabilityAdapter, Resolution, Rotation, Size, SourceImage, TransformState, Unit,
    ViewCommand, render_preview,
};
use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::host::FileHost;
use crate::logger::CliLogger;

#[derive(Parser)]
#[command(name = "ivp", about = "Image view and print tools", version)]
struct Cli {
    /// Log more (repeat for debug output)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// Log errors only
    #[arg(short, long, global = true)]
    quiet: bool,

    /// Load print settings from a JSON file
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Write the settings in effect to a JSON file
    #[arg(long, global = true)]
    save_config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Convert a length between units
    Convert {
        value: f64,

        #[arg(long, value_enum)]
        from: UnitArg,

        #[arg(long, value_enum)]
        to: UnitArg,
    },

    /// Show where an image lands on the page
    Place {
        /// Input image file
        #[arg(short, long)]
        input: PathBuf,

        /// Unit for the reported rectangle
        #[arg(long, value_enum)]
        unit: Option<UnitArg>,

        #[command(flatten)]
        layout: LayoutArgs,
    },

    /// Render the print preview to a PNG file
    Preview {
        /// Input image file
        #[arg(short, long)]
        input: PathBuf,

        /// Output PNG file
        #[arg(short, long)]
        output: PathBuf,

        /// Preview density in pixels per millimeter
        #[arg(long, default_value = "4.0")]
        px_per_mm: f64,

        #[command(flatten)]
        layout: LayoutArgs,

        #[command(flatten)]
        effects: EffectArgs,
    },

    /// Print an image to a PDF file
    Print {
        /// Input image file
        #[arg(short, long)]
        input: PathBuf,

        /// Output PDF file
        #[arg(short, long)]
        output: PathBuf,

        #[command(flatten)]
        layout: LayoutArgs,

        #[command(flatten)]
        effects: EffectArgs,

        #[command(flatten)]
        job: JobArgs,
    },

    /// Show the PDF printer and its capabilities
    Printer {
        /// File the printer would write to
        #[arg(short, long, default_value = "print.pdf")]
        output: PathBuf,
    },

    /// Replay viewer commands over a list of images
    View {
        /// Input image files, in viewing order
        #[arg(short, long, required = true, num_args = 1..)]
        input: Vec<PathBuf>,

        /// Commands to run, comma separated
        #[arg(short, long, value_enum, value_delimiter = ',')]
        commands: Vec<ViewCommandArg>,

        /// Viewport width in pixels
        #[arg(long, default_value = "800")]
        width: f64,

        /// Viewport height in pixels
        #[arg(long, default_value = "600")]
        height: f64,

        /// Directory for PDFs written by the print command
        #[arg(long, default_value = ".")]
        print_dir: PathBuf,

        /// Keep zoom, rotation and flips across images
        #[arg(long)]
        remember_transform: bool,

        #[command(flatten)]
        layout: LayoutArgs,

        #[command(flatten)]
        effects: EffectArgs,

        #[command(flatten)]
        job: JobArgs,
    },
}

#[derive(Args)]
struct LayoutArgs {
    /// Paper size
    #[arg(long, value_enum)]
    paper: Option<PaperArg>,

    /// Page orientation
    #[arg(long, value_enum)]
    orientation: Option<OrientationArg>,

    /// Margin in mm (uniform on all sides)
    #[arg(long)]
    margin: Option<f64>,

    /// Axes to center the image on
    #[arg(long, value_enum)]
    center: Option<CenterArg>,

    /// Image resolution in dpi (default from settings)
    #[arg(long)]
    dpi: Option<f64>,

    /// Lay out over the whole page
    #[arg(long)]
    ignore_margins: bool,

    /// Never shrink the image to fit
    #[arg(long)]
    ignore_paper_bounds: bool,

    /// Clockwise rotation in degrees (0, 90, 180, 270)
    #[arg(long, default_value = "0")]
    rotate: i32,

    /// Mirror left to right
    #[arg(long)]
    flip_h: bool,

    /// Mirror top to bottom
    #[arg(long)]
    flip_v: bool,
}

impl LayoutArgs {
    fn apply(&self, settings: &mut PrintSettings) {
        if let Some(paper) = self.paper {
            settings.paper_size = paper.into();
        }
        if let Some(orientation) = self.orientation {
            settings.orientation = orientation.into();
        }
        if let Some(margin) = self.margin {
            settings.margins = imgview_print::Margins::uniform(margin);
        }
        if let Some(center) = self.center {
            settings.centering = center.into();
        }
        settings.ignore_margins |= self.ignore_margins;
        settings.ignore_paper_bounds |= self.ignore_paper_bounds;
    }

    fn transform(&self) -> Result<TransformState> {
        let mut transform = TransformState::default();
        transform.set_rotation(Rotation::from_degrees(self.rotate)?);
        if self.flip_h {
            transform.flip_horizontal();
        }
        if self.flip_v {
            transform.flip_vertical();
        }
        Ok(transform)
    }

    fn resolution(&self) -> Result<Option<Resolution>> {
        Ok(self.dpi.map(Resolution::dpi).transpose()?)
    }
}

#[derive(Args)]
struct EffectArgs {
    /// Brightness, -100 to 100
    #[arg(long, allow_hyphen_values = true)]
    brightness: Option<f64>,

    /// Contrast, -100 to 100
    #[arg(long, allow_hyphen_values = true)]
    contrast: Option<f64>,

    /// Exposure, -100 to 100
    #[arg(long, allow_hyphen_values = true)]
    exposure: Option<f64>,

    /// Print in shades of gray
    #[arg(long)]
    grayscale: bool,

    /// Use the bitmap-transform compositor
    #[arg(long)]
    legacy_rendering: bool,
}

impl EffectArgs {
    fn apply(&self, settings: &mut PrintSettings) {
        let effects = &mut settings.effects;
        if let Some(brightness) = self.brightness {
            effects.brightness = brightness;
        }
        if let Some(contrast) = self.contrast {
            effects.contrast = contrast;
        }
        if let Some(exposure) = self.exposure {
            effects.exposure = exposure;
        }
        effects.grayscale |= self.grayscale;
        effects.legacy_rendering |= self.legacy_rendering;
    }
}

#[derive(Args)]
struct JobArgs {
    /// Number of copies
    #[arg(long)]
    copies: Option<u32>,

    /// Color mode
    #[arg(long, value_enum)]
    color: Option<ColorArg>,

    /// Printer resolution in dpi
    #[arg(long)]
    device_dpi: Option<f64>,
}

impl JobArgs {
    fn apply(&self, settings: &mut PrintSettings) {
        if let Some(copies) = self.copies {
            settings.copies = copies;
        }
        if let Some(color) = self.color {
            settings.color_mode = color.into();
        }
    }

    fn printer(&self, output: impl Into<PathBuf>) -> Result<PdfPrinter> {
        let printer = PdfPrinter::new(output);
        Ok(match self.device_dpi {
            Some(dpi) => printer.with_device_resolution(Resolution::dpi(dpi)?)?,
            None => printer,
        })
    }
}

#[derive(Clone, Copy, ValueEnum)]
enum UnitArg {
    Mm,
    Pt,
    In,
    Pica,
    Didot,
    Cicero,
}

#[derive(Clone, Copy, ValueEnum)]
enum PaperArg {
    A3,
    A4,
    A5,
    Letter,
    Legal,
    Tabloid,
}

#[derive(Clone, Copy, ValueEnum)]
enum OrientationArg {
    Portrait,
    Landscape,
    Auto,
}

#[derive(Clone, Copy, ValueEnum)]
enum CenterArg {
    None,
    Horizontal,
    Vertical,
    Both,
}

#[derive(Clone, Copy, ValueEnum)]
enum ColorArg {
    Color,
    Grayscale,
}

#[derive(Clone, Copy, ValueEnum)]
enum ViewCommandArg {
    ZoomIn,
    ZoomOut,
    ResetZoom,
    Fit,
    RotateCw,
    RotateCcw,
    FlipH,
    FlipV,
    Previous,
    Next,
    First,
    Last,
    Print,
    Delete,
}

impl From<UnitArg> for Unit {
    fn from(arg: UnitArg) -> Self {
        match arg {
            UnitArg::Mm => Self::Millimeter,
            UnitArg::Pt => Self::Point,
            UnitArg::In => Self::Inch,
            UnitArg::Pica => Self::Pica,
            UnitArg::Didot => Self::Didot,
            UnitArg::Cicero => Self::Cicero,
        }
    }
}

impl From<PaperArg> for PaperSize {
    fn from(arg: PaperArg) -> Self {
        match arg {
            PaperArg::A3 => Self::A3,
            PaperArg::A4 => Self::A4,
            PaperArg::A5 => Self::A5,
            PaperArg::Letter => Self::Letter,
            PaperArg::Legal => Self::Legal,
            PaperArg::Tabloid => Self::Tabloid,
        }
    }
}

impl From<OrientationArg> for Orientation {
    fn from(arg: OrientationArg) -> Self {
        match arg {
            OrientationArg::Portrait => Self::Portrait,
            OrientationArg::Landscape => Self::Landscape,
            OrientationArg::Auto => Self::AutoRotate,
        }
    }
}

impl From<CenterArg> for Centering {
    fn from(arg: CenterArg) -> Self {
        match arg {
            CenterArg::None => Self::None,
            CenterArg::Horizontal => Self::Horizontal,
            CenterArg::Vertical => Self::Vertical,
            CenterArg::Both => Self::Both,
        }
    }
}

impl From<ColorArg> for ColorMode {
    fn from(arg: ColorArg) -> Self {
        match arg {
            ColorArg::Color => Self::Color,
            ColorArg::Grayscale => Self::Grayscale,
        }
    }
}

impl From<ViewCommandArg> for ViewCommand {
    fn from(arg: ViewCommandArg) -> Self {
        match arg {
            ViewCommandArg::ZoomIn => Self::ZoomIn,
            ViewCommandArg::ZoomOut => Self::ZoomOut,
            ViewCommandArg::ResetZoom => Self::ResetZoom,
            ViewCommandArg::Fit => Self::FitToWindow,
            ViewCommandArg::RotateCw => Self::RotateClockwise,
            ViewCommandArg::RotateCcw => Self::RotateCounterclockwise,
            ViewCommandArg::FlipH => Self::FlipHorizontal,
            ViewCommandArg::FlipV => Self::FlipVertical,
            ViewCommandArg::Previous => Self::Navigate(NavigateDirection::Previous),
            ViewCommandArg::Next => Self::Navigate(NavigateDirection::Next),
            ViewCommandArg::First => Self::Navigate(NavigateDirection::First),
            ViewCommandArg::Last => Self::Navigate(NavigateDirection::Last),
            ViewCommandArg::Print => Self::Print,
            ViewCommandArg::Delete => Self::Delete,
        }
    }
}

/// Decode an image file on a blocking thread
pub(crate) async fn load_image(path: &Path) -> Result<Arc<SourceImage>> {
    let owned = path.to_path_buf();
    let pixels = tokio::task::spawn_blocking(move || image::open(&owned).map(|img| img.to_rgba8()))
        .await?
        .with_context(|| format!("Failed to open {}", path.display()))?;
    log::debug!(
        "loaded {} ({}x{} px)",
        path.display(),
        pixels.width(),
        pixels.height()
    );
    Ok(Arc::new(SourceImage::new(pixels, None)))
}

pub(crate) fn document_name(path: &Path) -> String {
    path.file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_default()
}

/// Place `image` on the page described by `settings`
fn place(
    settings: &PrintSettings,
    image: &SourceImage,
    transform: &TransformState,
    resolution: Option<Resolution>,
) -> Result<PagePlacement> {
    let mut session = PrintSession::new(
        PageLayoutEngine::new(settings.layout_config()),
        settings.page_geometry(),
        transform,
        image.size(),
        resolution.or(image.resolution),
        settings.placement_options(),
    )?;
    session.set_keep_aspect(settings.keep_aspect);
    Ok(session.placement())
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    CliLogger::new(CliLogger::level_for(cli.verbose, cli.quiet)).init()?;

    let mut settings = match &cli.config {
        Some(path) => PrintSettings::load(path)
            .await
            .with_context(|| format!("Failed to load settings from {}", path.display()))?,
        None => PrintSettings::default(),
    };

    match cli.command {
        Commands::Convert { value, from, to } => {
            let (from, to) = (Unit::from(from), Unit::from(to));
            let converted = convert(value, from, to)?;
            println!("{} {} = {} {}", value, from, converted, to);
        }

        Commands::Place {
            input,
            unit,
            layout,
        } => {
            layout.apply(&mut settings);
            settings.validate()?;
            let image = load_image(&input).await?;
            let placement = place(&settings, &image, &layout.transform()?, layout.resolution()?)?;

            let unit = unit.map(Unit::from).unwrap_or(settings.size_unit);
            let rect = convert_rect(placement.rect, Unit::Millimeter, unit)?;
            let oriented = placement.oriented_image_size();
            let resolution = Resolution::from_span(
                oriented.width as f64,
                placement.rect.width,
                settings.resolution_unit,
            )?;
            println!("Placement for {}:", input.display());
            println!(
                "  Page: {} {:?}, {} x {} mm",
                settings.paper_size.name(),
                placement.orientation,
                placement.page_size.width,
                placement.page_size.height
            );
            println!("  Image: {} x {} px (oriented)", oriented.width, oriented.height);
            println!("  Position: {:.3}, {:.3} {}", rect.x, rect.y, unit);
            println!("  Size: {:.3} x {:.3} {}", rect.width, rect.height, unit);
            println!("  Scale: {:.4}", placement.scale);
            println!("  Print resolution: {:.1} {}", resolution.value, resolution.unit);
        }

        Commands::Preview {
            input,
            output,
            px_per_mm,
            layout,
            effects,
        } => {
            layout.apply(&mut settings);
            effects.apply(&mut settings);
            settings.validate()?;
            let image = load_image(&input).await?;
            let placement = place(&settings, &image, &layout.transform()?, layout.resolution()?)?;

            let effects = settings.effects;
            let path = output.clone();
            let (width, height) = tokio::task::spawn_blocking(move || -> Result<(u32, u32)> {
                let surface = render_preview(&image.pixels, &placement, &effects, px_per_mm)?;
                let size = (surface.width(), surface.height());
                surface.into_image().save(&path)?;
                Ok(size)
            })
            .await??;
            println!("Preview {}x{} px → {}", width, height, output.display());
        }

        Commands::Print {
            input,
            output,
            layout,
            effects,
            job,
        } => {
            layout.apply(&mut settings);
            effects.apply(&mut settings);
            job.apply(&mut settings);
            settings.validate()?;
            let image = load_image(&input).await?;
            let placement = place(&settings, &image, &layout.transform()?, layout.resolution()?)?;

            let spooler = PrintSpooler::new(Arc::new(job.printer(&output)?));
            let submission = spooler.commit(
                image,
                placement,
                settings.effects,
                settings.job_settings(document_name(&input)),
            )?;
            let job_id = submission.job_id;
            let state = submission.handle.wait().await?;
            println!("Job {} finished ({}) → {}", job_id, state, output.display());
        }

        Commands::Printer { output } => {
            let printers = LocalPrinters::new().with_backend(Arc::new(PdfPrinter::new(output)));
            for info in printers.printers()? {
                let capabilities = printers.capabilities(&info.name)?;
                println!("{}{}", info.name, if info.is_default { " (default)" } else { "" });
                println!("  Description: {}", info.description);
                println!("  Location: {}", info.location);
                println!("  Model: {}", info.make_and_model);
                println!("  State: {}", info.state);
                let papers: Vec<_> = capabilities.paper_sizes.iter().map(|p| p.name()).collect();
                println!("  Paper sizes: {}", papers.join(", "));
                println!("  Color modes: {:?}", capabilities.color_modes);
                println!("  Resolution: {}", capabilities.device_resolution);
                println!(
                    "  Multiple copies: {}",
                    if capabilities.supports_multiple_copies { "yes" } else { "no" }
                );
            }
        }

        Commands::View {
            input,
            commands,
            width,
            height,
            print_dir,
            remember_transform,
            layout,
            effects,
            job,
        } => {
            layout.apply(&mut settings);
            effects.apply(&mut settings);
            job.apply(&mut settings);
            settings.remember_transform |= remember_transform;
            settings.validate()?;

            let mut host = FileHost::new(input, settings.clone(), print_dir, job.device_dpi);
            let viewport = Size::new(width, height);
            let commands: Vec<ViewCommand> = commands.into_iter().map(Into::into).collect();
            host.replay(viewport, &commands)?;
            host.finish().await?;
        }
    }

    if let Some(path) = &cli.save_config {
        settings
            .save(path)
            .await
            .with_context(|| format!("Failed to save settings to {}", path.display()))?;
        log::info!("settings saved to {}", path.display());
    }

    Ok(())
}
