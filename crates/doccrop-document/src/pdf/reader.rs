// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// PDF inspector — re-opens a written document with `lopdf` and reports its
// page count, page sizes, and embedded page rasters.

use std::path::Path;

use doccrop_core::error::{DocCropError, Result};
use doccrop_core::types::MM_PER_INCH;
use lopdf::{Dictionary, Document, Object, ObjectId};
use tracing::{debug, info, instrument};

/// PDF points per inch.
const POINTS_PER_INCH: f64 = 72.0;

/// Guards against cycles in a malformed page tree.
const MAX_TREE_DEPTH: usize = 64;

/// Size of one page as recorded in its MediaBox.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PageBox {
    pub width_pt: f64,
    pub height_pt: f64,
}

impl PageBox {
    /// Page size in pixels at `dpi`, rounded.
    pub fn to_pixels(&self, dpi: f64) -> (u32, u32) {
        let px = |pt: f64| (pt / POINTS_PER_INCH * dpi).round().max(0.0) as u32;
        (px(self.width_pt), px(self.height_pt))
    }

    /// Page size in millimetres.
    pub fn to_mm(&self) -> (f64, f64) {
        let mm = |pt: f64| pt / POINTS_PER_INCH * MM_PER_INCH;
        (mm(self.width_pt), mm(self.height_pt))
    }
}

/// Read-only view of an existing PDF.
pub struct PdfInspector {
    document: Document,
}

impl PdfInspector {
    /// Open a PDF from the filesystem.
    #[instrument(skip_all, fields(path = %path.as_ref().display()))]
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path_ref = path.as_ref();
        let document = Document::load(path_ref).map_err(|err| {
            DocCropError::Pdf(format!("failed to open {}: {}", path_ref.display(), err))
        })?;
        info!(pages = document.get_pages().len(), "PDF opened");
        Ok(Self { document })
    }

    /// Parse a PDF held in memory.
    #[instrument(skip_all, fields(bytes_len = data.len()))]
    pub fn from_bytes(data: &[u8]) -> Result<Self> {
        let document = Document::load_mem(data)
            .map_err(|err| DocCropError::Pdf(format!("failed to load PDF from memory: {}", err)))?;
        debug!(pages = document.get_pages().len(), "PDF loaded from bytes");
        Ok(Self { document })
    }

    pub fn page_count(&self) -> usize {
        self.document.get_pages().len()
    }

    /// MediaBox of every page, in page order.
    pub fn page_boxes(&self) -> Result<Vec<PageBox>> {
        self.document
            .get_pages()
            .into_iter()
            .map(|(number, id)| self.media_box(number, id))
            .collect()
    }

    /// Pixel size of every page at `dpi`, in page order.
    pub fn page_sizes_px(&self, dpi: f64) -> Result<Vec<(u32, u32)>> {
        Ok(self
            .page_boxes()?
            .iter()
            .map(|b| b.to_pixels(dpi))
            .collect())
    }

    /// Width and height of each image drawn on page `page_number` (1-based).
    pub fn page_image_sizes(&self, page_number: u32) -> Result<Vec<(u32, u32)>> {
        let pages = self.document.get_pages();
        let id = *pages.get(&page_number).ok_or_else(|| {
            DocCropError::Pdf(format!(
                "page {} not found (document has {} pages)",
                page_number,
                pages.len()
            ))
        })?;
        let images = self.document.get_page_images(id).map_err(|err| {
            DocCropError::Pdf(format!("page {} images unreadable: {}", page_number, err))
        })?;
        Ok(images
            .iter()
            .map(|img| (img.width.max(0) as u32, img.height.max(0) as u32))
            .collect())
    }

    /// Resolve the MediaBox of a page, following inheritance up the page tree.
    fn media_box(&self, number: u32, id: ObjectId) -> Result<PageBox> {
        let mut node = self.dictionary(id)?;
        for _ in 0..MAX_TREE_DEPTH {
            if let Ok(value) = node.get(b"MediaBox") {
                return self.parse_box(value).ok_or_else(|| {
                    DocCropError::Pdf(format!("page {} has a malformed MediaBox", number))
                });
            }
            let parent = node
                .get(b"Parent")
                .and_then(Object::as_reference)
                .map_err(|_| DocCropError::Pdf(format!("page {} has no MediaBox", number)))?;
            node = self.dictionary(parent)?;
        }
        Err(DocCropError::Pdf(format!(
            "page {} sits in a page tree deeper than {} levels",
            number, MAX_TREE_DEPTH
        )))
    }

    fn parse_box(&self, value: &Object) -> Option<PageBox> {
        let (_, value) = self.document.dereference(value).ok()?;
        let coords = value
            .as_array()
            .ok()?
            .iter()
            .map(|v| {
                self.document
                    .dereference(v)
                    .ok()
                    .and_then(|(_, v)| v.as_float().ok())
                    .map(f64::from)
            })
            .collect::<Option<Vec<f64>>>()?;
        let [x0, y0, x1, y1] = coords.as_slice() else {
            return None;
        };
        Some(PageBox {
            width_pt: (x1 - x0).abs(),
            height_pt: (y1 - y0).abs(),
        })
    }

    fn dictionary(&self, id: ObjectId) -> Result<&Dictionary> {
        self.document
            .get_dictionary(id)
            .map_err(|err| DocCropError::Pdf(format!("object {:?} unreadable: {}", id, err)))
    }
}
