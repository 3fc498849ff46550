//! A printer that writes each job to a PDF file

use crate::constants::mm_to_pt;
use crate::job::PrintJobDescriptor;
use crate::render::CancelToken;
use crate::types::{ColorMode, Margins, PaperSize, Result};
use crate::units::{Resolution, ResolutionUnit};
use image::RgbaImage;
use lopdf::{Dictionary, Document, Object, Stream};
use std::fs::File;
use std::io::BufWriter;
use std::path::{Path, PathBuf};

use super::{PrinterBackend, PrinterCapabilities, PrinterInfo, PrinterJobState};

const DEFAULT_DEVICE_DPI: f64 = 300.0;

/// One page per copy, the composed image placed as an image XObject
#[derive(Debug, Clone)]
pub struct PdfPrinter {
    name: String,
    output: PathBuf,
    device_resolution: Resolution,
}

impl PdfPrinter {
    pub fn new(output: impl Into<PathBuf>) -> Self {
        Self {
            name: "PDF".to_string(),
            output: output.into(),
            device_resolution: Resolution {
                value: DEFAULT_DEVICE_DPI,
                unit: ResolutionUnit::PixelsPerInch,
            },
        }
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    pub fn with_device_resolution(mut self, resolution: Resolution) -> Result<Self> {
        resolution.validate()?;
        self.device_resolution = resolution;
        Ok(self)
    }

    pub fn output(&self) -> &Path {
        &self.output
    }

    /// Build the document for `job` without writing it
    pub fn build_document(&self, job: &PrintJobDescriptor) -> Result<Document> {
        let px_per_mm = job.raster_density(self.device_resolution.pixels_per_base_unit());
        let raster = job.render_raster(px_per_mm, &CancelToken::new())?;
        let placement = job.placement();
        let page_w = mm_to_pt(placement.page_size.width);
        let page_h = mm_to_pt(placement.page_size.height);

        let mut doc = Document::with_version("1.7");
        let pages_id = doc.new_object_id();

        let image_id = doc.add_object(image_xobject(&raster, job.color_mode()));

        // PDF origin is bottom-left; the placement is top-left, y down
        let rect = placement.rect;
        let content = format!(
            "q\n{:.4} 0 0 {:.4} {:.4} {:.4} cm\n/Im0 Do\nQ\n",
            mm_to_pt(rect.width),
            mm_to_pt(rect.height),
            mm_to_pt(rect.x),
            mm_to_pt(placement.page_size.height - rect.bottom()),
        );
        let content_id = doc.add_object(Stream::new(Dictionary::new(), content.into_bytes()));

        let mut xobjects = Dictionary::new();
        xobjects.set("Im0", Object::Reference(image_id));
        let mut resources = Dictionary::new();
        resources.set("XObject", Object::Dictionary(xobjects));
        let resources_id = doc.add_object(resources);

        let mut page_refs = Vec::new();
        for _ in 0..job.copies() {
            let page = Dictionary::from_iter(vec![
                ("Type", Object::Name(b"Page".to_vec())),
                ("Parent", Object::Reference(pages_id)),
                (
                    "MediaBox",
                    Object::Array(vec![
                        Object::Integer(0),
                        Object::Integer(0),
                        Object::Real(page_w as f32),
                        Object::Real(page_h as f32),
                    ]),
                ),
                ("Contents", Object::Reference(content_id)),
                ("Resources", Object::Reference(resources_id)),
            ]);
            page_refs.push(Object::Reference(doc.add_object(page)));
        }

        let count = page_refs.len() as i64;
        let pages = Dictionary::from_iter(vec![
            ("Type", Object::Name(b"Pages".to_vec())),
            ("Kids", Object::Array(page_refs)),
            ("Count", Object::Integer(count)),
        ]);
        doc.objects.insert(pages_id, Object::Dictionary(pages));

        let catalog_id = doc.add_object(Dictionary::from_iter(vec![
            ("Type", Object::Name(b"Catalog".to_vec())),
            ("Pages", Object::Reference(pages_id)),
        ]));
        doc.trailer.set("Root", catalog_id);

        let mut info = Dictionary::new();
        if !job.document_name().is_empty() {
            info.set("Title", Object::string_literal(job.document_name()));
        }
        if !job.creator().is_empty() {
            info.set("Creator", Object::string_literal(job.creator()));
        }
        if !info.is_empty() {
            let info_id = doc.add_object(info);
            doc.trailer.set("Info", info_id);
        }

        Ok(doc)
    }
}

fn image_xobject(raster: &RgbaImage, color_mode: ColorMode) -> Stream {
    // The raster sits on a white canvas, so alpha is already resolved
    let (color_space, data): (&[u8], Vec<u8>) = match color_mode {
        ColorMode::Color => (
            b"DeviceRGB",
            raster.pixels().flat_map(|p| [p[0], p[1], p[2]]).collect(),
        ),
        ColorMode::Grayscale => (b"DeviceGray", raster.pixels().map(|p| p[0]).collect()),
    };

    let dict = Dictionary::from_iter(vec![
        ("Type", Object::Name(b"XObject".to_vec())),
        ("Subtype", Object::Name(b"Image".to_vec())),
        ("Width", Object::Integer(raster.width() as i64)),
        ("Height", Object::Integer(raster.height() as i64)),
        ("ColorSpace", Object::Name(color_space.to_vec())),
        ("BitsPerComponent", Object::Integer(8)),
    ]);
    let mut stream = Stream::new(dict, data);
    // Uncompressed output is still valid if flate fails
    let _ = stream.compress();
    stream
}

impl PrinterBackend for PdfPrinter {
    fn info(&self) -> PrinterInfo {
        PrinterInfo {
            name: self.name.clone(),
            description: "Print to PDF file".to_string(),
            location: self.output.display().to_string(),
            make_and_model: format!("{} {}", env!("CARGO_PKG_NAME"), env!("CARGO_PKG_VERSION")),
            is_default: true,
            is_remote: false,
            state: PrinterJobState::Idle,
        }
    }

    fn capabilities(&self) -> Result<PrinterCapabilities> {
        Ok(PrinterCapabilities {
            paper_sizes: PaperSize::PRESETS.to_vec(),
            default_paper: PaperSize::A4,
            default_margins: Margins::default(),
            resolution_units: ResolutionUnit::ALL.to_vec(),
            color_modes: vec![ColorMode::Color, ColorMode::Grayscale],
            supports_multiple_copies: true,
            device_resolution: self.device_resolution,
        })
    }

    fn submit(&self, job_id: u64, job: &PrintJobDescriptor) -> Result<PrinterJobState> {
        let mut doc = self.build_document(job)?;
        let mut writer = BufWriter::new(File::create(&self.output)?);
        doc.save_to(&mut writer)?;
        log::info!("job {} written to {}", job_id, self.output.display());
        Ok(PrinterJobState::Idle)
    }
}
