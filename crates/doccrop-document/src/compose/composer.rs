// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Page composer — packs rectified images onto fixed-resolution A4 canvases
// according to a layout, then hands the pages to the PDF writer.

use std::path::Path;

use doccrop_core::config::AppConfig;
use doccrop_core::error::{DocCropError, Result};
use doccrop_core::types::{LayoutSpec, PageSize};
use image::{Rgb, RgbImage};
use tracing::{debug, info, instrument};

use crate::compose::layout::{self, CellGeometry, Grid};
use crate::compose::watermark::Watermark;
use crate::image::raster::{RasterImage, scaled_dimensions};
use crate::pdf::writer::PdfWriter;

/// Page background.
const PAPER_WHITE: Rgb<u8> = Rgb([255, 255, 255]);

/// Where one source image landed on a page.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Placement {
    /// Position of the image in the composer's input.
    pub source_index: usize,
    pub col: u32,
    pub row: u32,
    pub x: u32,
    pub y: u32,
    pub width: u32,
    pub height: u32,
}

/// One composed page.
#[derive(Debug, Clone)]
pub struct Page {
    /// Zero-based position in the document.
    pub index: usize,
    pub canvas: RgbImage,
    pub grid: Grid,
    pub placements: Vec<Placement>,
    pub watermarked: bool,
}

impl Page {
    pub fn image_count(&self) -> usize {
        self.placements.len()
    }
}

/// Ordered pages ready for serialization, first page first.
#[derive(Debug, Clone)]
pub struct Document {
    pub pages: Vec<Page>,
    pub page_size: PageSize,
    /// Resolution the page canvases were rendered at.
    pub dpi: f64,
}

impl Document {
    pub fn page_count(&self) -> usize {
        self.pages.len()
    }

    /// Serialize as a multi-page PDF.
    pub fn to_pdf_bytes(&self) -> Result<Vec<u8>> {
        PdfWriter::new().write(self)
    }

    /// Write the PDF to `path`.
    pub fn save_pdf(&self, path: impl AsRef<Path>) -> Result<()> {
        let bytes = self.to_pdf_bytes()?;
        std::fs::write(path.as_ref(), bytes)?;
        info!(
            pages = self.page_count(),
            "Wrote PDF to {}",
            path.as_ref().display()
        );
        Ok(())
    }
}

/// Lays images out on pages.
///
/// Holds only immutable settings and the loaded watermark font, so a single
/// composer can be shared between threads.
#[derive(Debug)]
pub struct PageComposer {
    target_dpi: f64,
    default_source_dpi: f64,
    margin: u32,
    watermark: Watermark,
}

impl PageComposer {
    /// Build a composer from settings, loading the watermark font once.
    pub fn new(config: &AppConfig) -> Self {
        Self {
            target_dpi: config.target_dpi,
            default_source_dpi: config.default_source_dpi,
            margin: config.cell_margin_px,
            watermark: Watermark::load(
                config.watermark_text.clone(),
                config.watermark_font.as_deref(),
            ),
        }
    }

    /// Replace the watermark.
    pub fn with_watermark(mut self, watermark: Watermark) -> Self {
        self.watermark = watermark;
        self
    }

    pub fn target_dpi(&self) -> f64 {
        self.target_dpi
    }

    /// Lay `images` out according to `spec`.
    ///
    /// Images are taken in order, `images_per_page` at a time, and placed
    /// row-major into the page grid. With `watermark_after_first_page` set,
    /// every page except the first carries the watermark.
    #[instrument(skip(self, images), fields(images = images.len()))]
    pub fn compose(
        &self,
        images: Vec<RasterImage>,
        spec: &LayoutSpec,
        watermark_after_first_page: bool,
    ) -> Result<Document> {
        if images.is_empty() {
            return Err(DocCropError::EmptyInput);
        }

        let grid = Grid::resolve(spec.images_per_page, spec.arrangement, spec.orientation);
        let page_size = PageSize::a4(spec.orientation, self.target_dpi);
        let cells = CellGeometry::new(page_size, grid, self.margin);
        let per_page = spec.images_per_page.count();

        info!(
            cols = grid.cols,
            rows = grid.rows,
            page_w = page_size.width,
            page_h = page_size.height,
            inner_w = cells.inner_width,
            inner_h = cells.inner_height,
            scale_mode = spec.scale_mode.as_str(),
            "Composing pages"
        );

        let pages = images
            .chunks(per_page)
            .enumerate()
            .map(|(index, group)| {
                let first_source = index * per_page;
                let watermark = watermark_after_first_page && index > 0;
                self.compose_page(
                    index,
                    group,
                    first_source,
                    spec,
                    grid,
                    page_size,
                    &cells,
                    watermark,
                )
            })
            .collect::<Vec<_>>();

        info!(pages = pages.len(), "Composition complete");
        Ok(Document {
            pages,
            page_size,
            dpi: self.target_dpi,
        })
    }

    /// Decode encoded images (PNG, JPEG, ...) and compose them.
    ///
    /// The first image that fails to decode aborts the whole composition;
    /// the error names its position.
    pub fn compose_encoded<B: AsRef<[u8]>>(
        &self,
        images: &[B],
        spec: &LayoutSpec,
        watermark_after_first_page: bool,
    ) -> Result<Document> {
        let decoded = images
            .iter()
            .enumerate()
            .map(|(index, bytes)| {
                RasterImage::from_bytes(bytes.as_ref()).map_err(|err| match err {
                    DocCropError::Decode { message, .. } => DocCropError::decode_at(index, message),
                    other => other,
                })
            })
            .collect::<Result<Vec<_>>>()?;
        self.compose(decoded, spec, watermark_after_first_page)
    }

    #[allow(clippy::too_many_arguments)]
    fn compose_page(
        &self,
        index: usize,
        group: &[RasterImage],
        first_source: usize,
        spec: &LayoutSpec,
        grid: Grid,
        page_size: PageSize,
        cells: &CellGeometry,
        watermark: bool,
    ) -> Page {
        let mut canvas = RgbImage::from_pixel(page_size.width, page_size.height, PAPER_WHITE);
        let mut placements = Vec::with_capacity(group.len());

        for (slot, source) in group.iter().enumerate() {
            let (col, row) = grid.cell_of(slot);
            let source_dpi = source.dpi().unwrap_or(self.default_source_dpi);
            let dpi_ratio = self.target_dpi / source_dpi;
            let fit = cells.fit_ratio(source.width(), source.height());
            let ratio = layout::scale_ratio(spec.scale_mode, spec.scale_percent, dpi_ratio, fit);

            let (width, height) = scaled_dimensions(source.width(), source.height(), ratio);
            let (x, y) = cells.centered_position(col, row, width, height);
            debug!(
                page = index,
                slot,
                col,
                row,
                source_dpi,
                ratio,
                width,
                height,
                x,
                y,
                "Placing image"
            );

            let scaled = source.scale(ratio);
            image::imageops::replace(&mut canvas, &scaled, x as i64, y as i64);
            placements.push(Placement {
                source_index: first_source + slot,
                col,
                row,
                x,
                y,
                width,
                height,
            });
        }

        if watermark {
            self.watermark.apply(&mut canvas);
            debug!(page = index, text = self.watermark.text(), "Watermark applied");
        }

        Page {
            index,
            canvas,
            grid,
            placements,
            watermarked: watermark,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use doccrop_core::error::ErrorKind;
    use doccrop_core::types::{Arrangement, ImagesPerPage, Orientation, ScaleMode};

    /// Small canvases keep the tests fast: A4 at 30 DPI is 248x351.
    fn composer() -> PageComposer {
        let config = AppConfig {
            target_dpi: 30.0,
            cell_margin_px: 4,
            ..AppConfig::default()
        };
        PageComposer::new(&config).with_watermark(Watermark::builtin("DEMO"))
    }

    fn gray(width: u32, height: u32) -> RasterImage {
        RasterImage::from_rgb(RgbImage::from_pixel(width, height, Rgb([128, 128, 128])))
    }

    fn spec(per_page: ImagesPerPage, arrangement: Arrangement) -> LayoutSpec {
        LayoutSpec {
            images_per_page: per_page,
            arrangement,
            ..LayoutSpec::default()
        }
    }

    #[test]
    fn empty_input_is_rejected() {
        let err = composer()
            .compose(Vec::new(), &LayoutSpec::default(), false)
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::EmptyInput);
    }

    #[test]
    fn single_image_makes_one_page() {
        let doc = composer()
            .compose(vec![gray(10, 10)], &LayoutSpec::default(), true)
            .expect("compose");
        assert_eq!(doc.page_count(), 1);
        assert!(!doc.pages[0].watermarked);
    }

    #[test]
    fn five_images_two_up_vertical() {
        let images = (0..5).map(|_| gray(40, 56)).collect();
        let doc = composer()
            .compose(images, &spec(ImagesPerPage::Two, Arrangement::Vertical), false)
            .expect("compose");

        let counts: Vec<usize> = doc.pages.iter().map(Page::image_count).collect();
        assert_eq!(counts, vec![2, 2, 1]);
        for page in &doc.pages {
            assert_eq!(page.grid, Grid::new(1, 2));
        }
        let sources: Vec<usize> = doc
            .pages
            .iter()
            .flat_map(|p| p.placements.iter().map(|pl| pl.source_index))
            .collect();
        assert_eq!(sources, vec![0, 1, 2, 3, 4]);
        assert_eq!((doc.pages[1].placements[1].col, doc.pages[1].placements[1].row), (0, 1));
    }

    #[test]
    fn fit_never_overflows_the_inner_cell() {
        let composer = composer();
        let shapes = [(1, 1), (1000, 3), (3, 1000), (500, 707), (248, 351), (7, 9)];
        for arrangement in [Arrangement::Grid, Arrangement::Horizontal, Arrangement::Vertical] {
            let layout = LayoutSpec {
                scale_mode: ScaleMode::Fit,
                ..spec(ImagesPerPage::Four, arrangement)
            };
            let images = shapes.iter().map(|&(w, h)| gray(w, h)).collect();
            let doc = composer.compose(images, &layout, false).expect("compose");
            let cells = CellGeometry::new(doc.page_size, doc.pages[0].grid, 4);

            for page in &doc.pages {
                for pl in &page.placements {
                    let (ox, oy) = cells.inner_origin(pl.col, pl.row);
                    assert!(pl.width <= cells.inner_width, "{pl:?}");
                    assert!(pl.height <= cells.inner_height, "{pl:?}");
                    assert!(pl.x >= ox && pl.x + pl.width <= ox + cells.inner_width, "{pl:?}");
                    assert!(pl.y >= oy && pl.y + pl.height <= oy + cells.inner_height, "{pl:?}");
                }
            }
        }
    }

    #[test]
    fn original_mode_is_clamped_to_cell() {
        // 30 / 7.2 would blow a 120 px image up to 500 px; the cell is 240 wide.
        let layout = LayoutSpec {
            scale_mode: ScaleMode::Original,
            ..LayoutSpec::default()
        };
        let config = AppConfig {
            target_dpi: 30.0,
            default_source_dpi: 7.2,
            cell_margin_px: 4,
            ..AppConfig::default()
        };
        let composer = PageComposer::new(&config).with_watermark(Watermark::builtin("DEMO"));
        let doc = composer
            .compose(vec![gray(120, 120)], &layout, false)
            .expect("compose");
        let pl = doc.pages[0].placements[0];
        assert_eq!((pl.width, pl.height), (240, 240));
    }

    #[test]
    fn original_mode_honours_jpeg_density() {
        use image::codecs::jpeg::{JpegEncoder, PixelDensity};

        let mut jpeg = Vec::new();
        let mut encoder = JpegEncoder::new_with_quality(&mut jpeg, 90);
        encoder.set_pixel_density(PixelDensity::dpi(300));
        encoder
            .encode_image(&RgbImage::from_pixel(100, 100, Rgb([128, 128, 128])))
            .expect("jpeg");

        let layout = LayoutSpec {
            scale_mode: ScaleMode::Original,
            ..LayoutSpec::default()
        };
        // Same DPI as the page, so the image keeps its pixel size.
        let doc = PageComposer::new(&AppConfig::default())
            .compose_encoded(&[jpeg], &layout, false)
            .expect("compose");
        let pl = doc.pages[0].placements[0];
        assert_eq!((pl.width, pl.height), (100, 100));
    }

    #[test]
    fn percent_mode_uses_image_dpi() {
        let layout = LayoutSpec {
            scale_mode: ScaleMode::Percent,
            scale_percent: 50.0,
            ..LayoutSpec::default()
        };
        // 30 DPI target over 60 DPI source halves, then 50% halves again.
        let image = gray(200, 100).with_dpi(60.0);
        let doc = composer().compose(vec![image], &layout, false).expect("compose");
        let pl = doc.pages[0].placements[0];
        assert_eq!((pl.width, pl.height), (50, 25));
        // Centred in the 240x343 inner area at (4, 4).
        assert_eq!((pl.x, pl.y), (4 + 95, 4 + 159));
    }

    #[test]
    fn watermark_skips_first_page() {
        let images = (0..3).map(|_| gray(20, 20)).collect();
        let doc = composer()
            .compose(images, &LayoutSpec::default(), true)
            .expect("compose");
        let flags: Vec<bool> = doc.pages.iter().map(|p| p.watermarked).collect();
        assert_eq!(flags, vec![false, true, true]);

        let red = |page: &Page| page.canvas.pixels().any(|p| p.0 == [255, 0, 0]);
        assert!(!red(&doc.pages[0]));
        assert!(red(&doc.pages[1]));
        assert!(red(&doc.pages[2]));
    }

    #[test]
    fn watermark_disabled_marks_nothing() {
        let images = (0..3).map(|_| gray(20, 20)).collect();
        let doc = composer()
            .compose(images, &LayoutSpec::default(), false)
            .expect("compose");
        assert!(doc.pages.iter().all(|p| !p.watermarked));
    }

    #[test]
    fn landscape_pages_are_transposed() {
        let layout = LayoutSpec {
            orientation: Orientation::Landscape,
            images_per_page: ImagesPerPage::Two,
            ..LayoutSpec::default()
        };
        let doc = composer()
            .compose(vec![gray(10, 10), gray(10, 10)], &layout, false)
            .expect("compose");
        assert_eq!(doc.pages[0].canvas.dimensions(), (351, 248));
        assert_eq!(doc.pages[0].grid, Grid::new(2, 1));
    }

    #[test]
    fn image_pixels_land_on_the_canvas() {
        let doc = composer()
            .compose(vec![gray(10, 10)], &LayoutSpec::default(), false)
            .expect("compose");
        let page = &doc.pages[0];
        let pl = page.placements[0];
        let centre = page.canvas.get_pixel(pl.x + pl.width / 2, pl.y + pl.height / 2);
        assert!(centre.0.iter().all(|c| c.abs_diff(128) <= 4), "{centre:?}");
        assert_eq!(page.canvas.get_pixel(0, 0), &PAPER_WHITE);
    }

    #[test]
    fn encoded_decode_failure_names_index() {
        let good = gray(4, 4).to_png_bytes().expect("encode");
        let inputs: Vec<Vec<u8>> = vec![good.clone(), good, b"junk".to_vec()];
        let err = composer()
            .compose_encoded(&inputs, &LayoutSpec::default(), false)
            .unwrap_err();
        assert!(matches!(err, DocCropError::Decode { index: Some(2), .. }), "{err:?}");
    }

    #[test]
    fn composer_is_shareable_across_threads() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<PageComposer>();
        assert_send_sync::<Document>();
    }
}
