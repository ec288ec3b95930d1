//! Writes the report region to a multi-page PDF.

use crate::report::paginate::{
    paginate, PagePlacement, PaginationMode, IMAGE_WIDTH_MM, LEFT_MARGIN_MM, PAGE_HEIGHT_MM,
    PAGE_WIDTH_MM,
};
use crate::report::{Capture, RasterCapture, ReportCapture, ReportView};
use lopdf::content::{Content, Operation};
use lopdf::{dictionary, Document, Object, ObjectId, Stream};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use thiserror::Error;
use tracing::{debug, info};

/// The file name used when none is configured.
pub const DEFAULT_EXPORT_FILE_NAME: &str = "finance_report.pdf";

const POINTS_PER_MM: f64 = 72.0 / 25.4;

#[derive(Debug, Error)]
pub enum ExportError {
    #[error("An export is already in progress")]
    InProgress,
    #[error("There is no report to export yet, load the transactions first")]
    NothingRendered,
    #[error("The captured report is empty")]
    EmptyCapture,
    #[error("Unable to build the PDF: {0}")]
    Pdf(#[from] lopdf::Error),
    #[error("Unable to encode the PDF: {0}")]
    Encode(#[from] std::io::Error),
    #[error("Unable to save the report to {}: {source}", path.display())]
    Save {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("The export task failed: {0}")]
    Task(#[from] tokio::task::JoinError),
}

/// Captures a `ReportView`, paginates it and saves it as a PDF under a fixed file name.
///
/// Only one export runs at a time; a second call while one is in flight fails with
/// `ExportError::InProgress`. Exporting never changes the view.
#[derive(Clone)]
pub struct ReportExporter {
    output: PathBuf,
    mode: PaginationMode,
    capture: Arc<dyn ReportCapture>,
    in_flight: Arc<AtomicBool>,
}

impl ReportExporter {
    /// An exporter writing `file_name` into `dir` using the built-in raster capture.
    pub fn new(dir: impl AsRef<Path>, file_name: &str, mode: PaginationMode) -> Self {
        Self::with_capture(dir, file_name, mode, Arc::new(RasterCapture))
    }

    pub fn with_capture(
        dir: impl AsRef<Path>,
        file_name: &str,
        mode: PaginationMode,
        capture: Arc<dyn ReportCapture>,
    ) -> Self {
        Self {
            output: dir.as_ref().join(file_name),
            mode,
            capture,
            in_flight: Arc::new(AtomicBool::new(false)),
        }
    }

    pub fn is_exporting(&self) -> bool {
        self.in_flight.load(Ordering::SeqCst)
    }

    /// Exports `view`, or fails with `NothingRendered` when there is no view.
    pub async fn export(&self, view: Option<&ReportView>) -> Result<PathBuf, ExportError> {
        let _gate = Gate::enter(&self.in_flight)?;
        let view = view.ok_or(ExportError::NothingRendered)?.clone();
        let capture = self.capture.clone();
        let mode = self.mode;

        let (bytes, pages) = tokio::task::spawn_blocking(move || {
            let captured = capture.capture(&view);
            let (width, height) = captured.image.dimensions();
            let placements = paginate(width, height, mode);
            if placements.is_empty() {
                return Err(ExportError::EmptyCapture);
            }
            let bytes = build_pdf(captured, &placements)?;
            Ok((bytes, placements.len()))
        })
        .await??;

        tokio::fs::write(&self.output, bytes)
            .await
            .map_err(|source| ExportError::Save {
                path: self.output.clone(),
                source,
            })?;
        info!(
            "Saved a {pages} page report to {}",
            self.output.display()
        );
        Ok(self.output.clone())
    }
}

/// Holds the in-flight flag for the duration of one export.
struct Gate<'a>(&'a AtomicBool);

impl<'a> Gate<'a> {
    fn enter(flag: &'a AtomicBool) -> Result<Self, ExportError> {
        if flag.swap(true, Ordering::SeqCst) {
            return Err(ExportError::InProgress);
        }
        Ok(Self(flag))
    }
}

impl Drop for Gate<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::SeqCst);
    }
}

fn pt(mm: f64) -> f32 {
    (mm * POINTS_PER_MM) as f32
}

/// Builds an A4 PDF with one page per placement. Placements drawing the same rows share one
/// image object. Each page also sets, in Helvetica, the labels whose baselines fall on it.
pub(crate) fn build_pdf(
    capture: Capture,
    placements: &[PagePlacement],
) -> Result<Vec<u8>, ExportError> {
    let Capture { image, labels } = capture;
    let (width, height) = image.dimensions();
    let mm_per_px = IMAGE_WIDTH_MM / f64::from(width);

    let mut doc = Document::with_version("1.5");
    let pages_id = doc.new_object_id();
    let font_id = doc.add_object(dictionary! {
        "Type" => "Font",
        "Subtype" => "Type1",
        "BaseFont" => "Helvetica",
        "Encoding" => "WinAnsiEncoding"
    });

    // Bands are cropped before the full image, which takes the pixel buffer without a copy.
    let mut images: HashMap<(u32, u32), ObjectId> = HashMap::new();
    let mut full_image = false;
    for placement in placements {
        let key = (placement.rows.start, placement.rows.end);
        if key == (0, height) {
            full_image = true;
        } else if !images.contains_key(&key) {
            let band = image::imageops::crop_imm(&image, 0, key.0, width, key.1 - key.0)
                .to_image()
                .into_raw();
            let id = doc.add_object(image_stream(width, key.1 - key.0, band));
            images.insert(key, id);
        }
    }
    if full_image {
        let id = doc.add_object(image_stream(width, height, image.into_raw()));
        images.insert((0, height), id);
    }

    let mut kids: Vec<Object> = Vec::with_capacity(placements.len());
    for placement in placements {
        let key = (placement.rows.start, placement.rows.end);
        let image_id = images[&key];

        let bottom_mm = PAGE_HEIGHT_MM - placement.top_mm - placement.height_mm;
        let mut operations = vec![
            Operation::new("q", vec![]),
            Operation::new(
                "cm",
                vec![
                    pt(IMAGE_WIDTH_MM).into(),
                    Object::Integer(0),
                    Object::Integer(0),
                    pt(placement.height_mm).into(),
                    pt(LEFT_MARGIN_MM).into(),
                    pt(bottom_mm).into(),
                ],
            ),
            Operation::new("Do", vec!["Im0".into()]),
            Operation::new("Q", vec![]),
        ];
        for label in labels.iter().filter(|l| placement.rows.contains(&l.baseline)) {
            let from_top_mm =
                placement.top_mm + f64::from(label.baseline - placement.rows.start) * mm_per_px;
            if !(0.0..=PAGE_HEIGHT_MM).contains(&from_top_mm) {
                continue;
            }
            let x_mm = LEFT_MARGIN_MM + f64::from(label.x) * mm_per_px;
            operations.extend([
                Operation::new("BT", vec![]),
                Operation::new(
                    "Tf",
                    vec!["F1".into(), pt(f64::from(label.size) * mm_per_px).into()],
                ),
                Operation::new(
                    "Td",
                    vec![pt(x_mm).into(), pt(PAGE_HEIGHT_MM - from_top_mm).into()],
                ),
                Operation::new("Tj", vec![Object::string_literal(label.text.as_str())]),
                Operation::new("ET", vec![]),
            ]);
        }

        let content = Content { operations };
        let content_id = doc.add_object(Stream::new(dictionary! {}, content.encode()?));
        let page_id = doc.add_object(dictionary! {
            "Type" => "Page",
            "Parent" => pages_id,
            "Contents" => content_id,
            "Resources" => dictionary! {
                "XObject" => dictionary! { "Im0" => image_id },
                "Font" => dictionary! { "F1" => font_id }
            },
            "MediaBox" => vec![
                Object::Integer(0),
                Object::Integer(0),
                pt(PAGE_WIDTH_MM).into(),
                pt(PAGE_HEIGHT_MM).into(),
            ]
        });
        kids.push(page_id.into());
    }

    let count = kids.len() as i64;
    doc.objects.insert(
        pages_id,
        Object::Dictionary(dictionary! {
            "Type" => "Pages",
            "Kids" => kids,
            "Count" => count
        }),
    );
    let catalog_id = doc.add_object(dictionary! {
        "Type" => "Catalog",
        "Pages" => pages_id
    });
    doc.trailer.set("Root", catalog_id);
    doc.compress();

    let mut bytes = Vec::new();
    doc.save_to(&mut bytes)?;
    debug!("Built a {} byte PDF", bytes.len());
    Ok(bytes)
}

/// An image XObject of `width` × `height` RGB pixels.
fn image_stream(width: u32, height: u32, pixels: Vec<u8>) -> Stream {
    Stream::new(
        dictionary! {
            "Type" => "XObject",
            "Subtype" => "Image",
            "Width" => i64::from(width),
            "Height" => i64::from(height),
            "ColorSpace" => "DeviceRGB",
            "BitsPerComponent" => 8_i64
        },
        pixels,
    )
}
