// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// PDF writer — serializes composed pages using `printpdf` 0.8.
//
// Each page canvas becomes one full-bleed RGB image XObject on a page sized
// so that the image lands at exactly the composition DPI.

use doccrop_core::error::{DocCropError, Result};
use lopdf::{Object, ObjectId};
use printpdf::{
    Mm, Op, PdfDocument, PdfPage, PdfSaveOptions, PdfWarnMsg, Pt, RawImage, RawImageData,
    RawImageFormat, XObjectTransform,
};
use tracing::{debug, info, instrument, warn};

use crate::compose::composer::Document;

/// PDF points per inch.
const POINTS_PER_INCH: f64 = 72.0;

/// Writes a [`Document`] as a multi-page PDF.
#[derive(Debug, Clone)]
pub struct PdfWriter {
    /// Title metadata embedded in the PDF /Info dictionary.
    title: String,
}

impl Default for PdfWriter {
    fn default() -> Self {
        Self {
            title: "DocCrop Document".to_owned(),
        }
    }
}

impl PdfWriter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set a title for the PDF metadata.
    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = title.into();
        self
    }

    /// Serialize every page of `document`, first page first.
    #[instrument(skip_all, fields(pages = document.pages.len(), dpi = document.dpi))]
    pub fn write(&self, document: &Document) -> Result<Vec<u8>> {
        if document.pages.is_empty() {
            return Err(DocCropError::EmptyInput);
        }
        if !(document.dpi.is_finite() && document.dpi > 0.0) {
            return Err(DocCropError::Encode(format!(
                "cannot place pages at {} DPI",
                document.dpi
            )));
        }

        let (w_mm, h_mm) = document.page_size.dimensions_mm(document.dpi);
        let (page_w, page_h) = (Mm(w_mm as f32), Mm(h_mm as f32));
        info!(
            title = %self.title,
            page_w_mm = w_mm,
            page_h_mm = h_mm,
            "Creating PDF"
        );

        let mut doc = PdfDocument::new(&self.title);
        let mut pages = Vec::with_capacity(document.pages.len());

        for page in &document.pages {
            let (width, height) = page.canvas.dimensions();
            if (width, height) != (document.page_size.width, document.page_size.height) {
                return Err(DocCropError::Encode(format!(
                    "page {} is {}x{}, expected {}x{}",
                    page.index,
                    width,
                    height,
                    document.page_size.width,
                    document.page_size.height
                )));
            }

            let raw = RawImage {
                pixels: RawImageData::U8(page.canvas.as_raw().clone()),
                width: width as usize,
                height: height as usize,
                data_format: RawImageFormat::RGB8,
                tag: Vec::new(),
            };
            let xobject_id = doc.add_image(&raw);

            // At the composition DPI the image's natural size is the page.
            let ops = vec![Op::UseXobject {
                id: xobject_id,
                transform: XObjectTransform {
                    translate_x: Some(Pt(0.0)),
                    translate_y: Some(Pt(0.0)),
                    scale_x: None,
                    scale_y: None,
                    dpi: Some(document.dpi as f32),
                    rotate: None,
                },
            }];
            pages.push(PdfPage::new(page_w, page_h, ops));
            debug!(page = page.index, width, height, "Page added to PDF");
        }

        doc.with_pages(pages);

        // Keep page rasters lossless and at full resolution.
        let options = PdfSaveOptions {
            image_optimization: None,
            ..PdfSaveOptions::default()
        };
        let mut warnings: Vec<PdfWarnMsg> = Vec::new();
        let output = doc.save(&options, &mut warnings);
        if !warnings.is_empty() {
            warn!(count = warnings.len(), "PDF serialization reported warnings");
        }

        let width_pt = f64::from(document.page_size.width) / document.dpi * POINTS_PER_INCH;
        let height_pt = f64::from(document.page_size.height) / document.dpi * POINTS_PER_INCH;
        let output = set_exact_page_boxes(&output, width_pt as f32, height_pt as f32)?;

        debug!(output_bytes = output.len(), "PDF serialized");
        Ok(output)
    }
}

/// printpdf writes page boxes in whole points, which clips the last pixel
/// column or row of a full-bleed raster and shifts the size read back. Put
/// the exact point size on every page.
fn set_exact_page_boxes(pdf: &[u8], width_pt: f32, height_pt: f32) -> Result<Vec<u8>> {
    let mut document = lopdf::Document::load_mem(pdf)
        .map_err(|err| DocCropError::Encode(format!("serialized PDF unreadable: {}", err)))?;

    let page_box = || {
        Object::Array(vec![
            Object::Integer(0),
            Object::Integer(0),
            Object::Real(width_pt),
            Object::Real(height_pt),
        ])
    };

    let page_ids: Vec<ObjectId> = document.get_pages().into_values().collect();
    for id in page_ids {
        let page = document
            .get_object_mut(id)
            .and_then(|object| object.as_dict_mut())
            .map_err(|err| DocCropError::Encode(format!("page {:?} unreadable: {}", id, err)))?;
        page.set("MediaBox", page_box());
        for key in ["CropBox", "TrimBox"] {
            if page.has(key.as_bytes()) {
                page.set(key, page_box());
            }
        }
    }

    let mut output = Vec::with_capacity(pdf.len());
    document
        .save_to(&mut output)
        .map_err(|err| DocCropError::Encode(format!("PDF rewrite failed: {}", err)))?;
    debug!(width_pt, height_pt, "Page boxes set");
    Ok(output)
}
