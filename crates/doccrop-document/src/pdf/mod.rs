// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// PDF module — writing composed documents and re-reading them for inspection.

pub mod reader;
pub mod writer;

pub use reader::PdfInspector;
pub use writer::PdfWriter;
