// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Layout arithmetic — grid resolution, cell geometry, and scale ratios.
// Pure functions with no pixel work, so the composer's placement rules can
// be tested without allocating page canvases.

use doccrop_core::types::{Arrangement, ImagesPerPage, Orientation, PageSize, ScaleMode};

/// Columns and rows of image cells on one page.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Grid {
    pub cols: u32,
    pub rows: u32,
}

impl Grid {
    pub const fn new(cols: u32, rows: u32) -> Self {
        Self { cols, rows }
    }

    /// Pick the grid for a page layout.
    ///
    /// Two-up `auto` follows the page: side by side in landscape, stacked in
    /// portrait. Four-up `auto` and `grid` are both 2x2.
    pub fn resolve(
        images_per_page: ImagesPerPage,
        arrangement: Arrangement,
        orientation: Orientation,
    ) -> Self {
        match images_per_page {
            ImagesPerPage::One => Self::new(1, 1),
            ImagesPerPage::Two => match arrangement {
                Arrangement::Horizontal => Self::new(2, 1),
                Arrangement::Vertical => Self::new(1, 2),
                Arrangement::Auto | Arrangement::Grid => match orientation {
                    Orientation::Landscape => Self::new(2, 1),
                    Orientation::Portrait => Self::new(1, 2),
                },
            },
            ImagesPerPage::Four => match arrangement {
                Arrangement::Horizontal => Self::new(4, 1),
                Arrangement::Vertical => Self::new(1, 4),
                Arrangement::Auto | Arrangement::Grid => Self::new(2, 2),
            },
        }
    }

    /// Number of cells.
    pub fn cells(&self) -> usize {
        (self.cols * self.rows) as usize
    }

    /// Row-major cell for the `index`-th image on a page.
    pub fn cell_of(&self, index: usize) -> (u32, u32) {
        let index = index as u32;
        (index % self.cols, index / self.cols)
    }
}

/// Pixel geometry of the cells on a page.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CellGeometry {
    pub cell_width: u32,
    pub cell_height: u32,
    pub margin: u32,
    /// Usable width inside the margins, at least one pixel.
    pub inner_width: u32,
    /// Usable height inside the margins, at least one pixel.
    pub inner_height: u32,
}

impl CellGeometry {
    pub fn new(page: PageSize, grid: Grid, margin: u32) -> Self {
        let cell_width = page.width / grid.cols;
        let cell_height = page.height / grid.rows;
        Self {
            cell_width,
            cell_height,
            margin,
            inner_width: cell_width.saturating_sub(margin * 2).max(1),
            inner_height: cell_height.saturating_sub(margin * 2).max(1),
        }
    }

    /// Top-left corner of the inner area of cell `(col, row)`.
    pub fn inner_origin(&self, col: u32, row: u32) -> (u32, u32) {
        (
            col * self.cell_width + self.margin,
            row * self.cell_height + self.margin,
        )
    }

    /// Page position that centres a `width` x `height` image in cell `(col, row)`.
    pub fn centered_position(&self, col: u32, row: u32, width: u32, height: u32) -> (u32, u32) {
        let (x, y) = self.inner_origin(col, row);
        (
            x + self.inner_width.saturating_sub(width) / 2,
            y + self.inner_height.saturating_sub(height) / 2,
        )
    }

    /// Largest ratio at which a `width` x `height` image fits the inner area.
    pub fn fit_ratio(&self, width: u32, height: u32) -> f64 {
        let rw = self.inner_width as f64 / width.max(1) as f64;
        let rh = self.inner_height as f64 / height.max(1) as f64;
        rw.min(rh)
    }
}

/// Scale ratio for one placed image.
///
/// `dpi_ratio` is target DPI over source DPI. Whatever the mode, the result
/// never exceeds `fit_ratio`, so no image overflows its cell.
pub fn scale_ratio(mode: ScaleMode, scale_percent: f64, dpi_ratio: f64, fit_ratio: f64) -> f64 {
    let ratio = match mode {
        ScaleMode::Percent => (scale_percent / 100.0).max(0.01) * dpi_ratio,
        ScaleMode::Fit => fit_ratio,
        ScaleMode::Original => dpi_ratio,
    };
    ratio.min(fit_ratio)
}
