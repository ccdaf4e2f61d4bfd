// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// doccrop-document — Image pipeline for DocCrop.
//
// Provides four-corner perspective rectification with sharpening (scan),
// multi-up page composition with optional demo watermarking (compose), and
// PDF serialization and inspection (pdf).

pub mod compose;
pub mod image;
pub mod pdf;
pub mod scan;

// Re-export the primary structs so callers can use `doccrop_document::Rectifier` etc.
pub use crate::compose::composer::{Document, Page, PageComposer, Placement};
pub use crate::compose::layout::Grid;
pub use crate::compose::watermark::Watermark;
pub use crate::image::raster::RasterImage;
pub use crate::pdf::reader::PdfInspector;
pub use crate::pdf::writer::PdfWriter;
pub use crate::scan::rectify::Rectifier;
