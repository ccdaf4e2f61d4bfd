// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Scanning pipeline — corner geometry checks, homography warp, and sharpening.

pub mod geometry;
pub mod rectify;

pub use rectify::Rectifier;
