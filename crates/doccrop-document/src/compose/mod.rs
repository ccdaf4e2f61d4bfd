// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Page composition — grid layout, per-cell scaling, and demo watermarking.

pub mod composer;
pub mod layout;
pub mod watermark;

pub use composer::{Document, Page, PageComposer, Placement};
pub use layout::{CellGeometry, Grid};
pub use watermark::Watermark;
