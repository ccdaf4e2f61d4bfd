// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Service layer — owns the configured rectifier and composer and moves
// bytes between files and the pipeline for each CLI command.

use std::path::{Path, PathBuf};

use doccrop_core::error::{DocCropError, Result};
use doccrop_core::types::{CornerSet, LayoutSpec};
use doccrop_core::AppConfig;
use doccrop_document::{PageComposer, PdfInspector, RasterImage, Rectifier};
use tracing::{info, instrument};

use crate::manifest::ScanManifest;

/// Summary of a written PDF.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ComposeReport {
    pub pages: usize,
    pub page_width: u32,
    pub page_height: u32,
}

/// Backend shared by all commands. Built once from the loaded settings.
pub struct DocCropService {
    config: AppConfig,
    rectifier: Rectifier,
    composer: PageComposer,
}

impl DocCropService {
    pub fn new(config: AppConfig) -> Self {
        let composer = PageComposer::new(&config);
        Self {
            config,
            rectifier: Rectifier::new(),
            composer,
        }
    }

    pub fn config(&self) -> &AppConfig {
        &self.config
    }

    /// Rectify one photo and write the result as PNG. Returns the output size.
    #[instrument(skip(self, corners), fields(image = %image.display(), out = %out.display()))]
    pub fn rectify_file(&self, image: &Path, corners: &CornerSet, out: &Path) -> Result<(u32, u32)> {
        let photo = RasterImage::open(image)?;
        let rectified = self.rectifier.rectify(&photo, corners)?;
        rectified.save_png(out)?;
        info!(
            width = rectified.width(),
            height = rectified.height(),
            "Rectified image written"
        );
        Ok((rectified.width(), rectified.height()))
    }

    /// Compose already-rectified image files into one PDF.
    #[instrument(skip(self, images, layout), fields(images = images.len(), out = %out.display()))]
    pub fn compose_files(
        &self,
        images: &[PathBuf],
        layout: &LayoutSpec,
        demo: bool,
        out: &Path,
    ) -> Result<ComposeReport> {
        let encoded = images
            .iter()
            .map(std::fs::read)
            .collect::<std::io::Result<Vec<_>>>()?;
        let document = self.composer.compose_encoded(&encoded, layout, demo)?;
        document.save_pdf(out)?;
        Ok(ComposeReport {
            pages: document.page_count(),
            page_width: document.page_size.width,
            page_height: document.page_size.height,
        })
    }

    /// Rectify every manifest entry in order, then compose the results.
    #[instrument(skip(self, manifest, layout), fields(entries = manifest.len(), out = %out.display()))]
    pub fn scan_manifest(
        &self,
        manifest: &ScanManifest,
        layout: &LayoutSpec,
        demo: bool,
        out: &Path,
    ) -> Result<ComposeReport> {
        let mut rectified = Vec::with_capacity(manifest.len());
        for (position, entry) in manifest.entries.iter().enumerate() {
            let corners = entry.corner_set(position)?;
            let photo = RasterImage::open(&entry.image).map_err(|err| match err {
                DocCropError::Decode { message, .. } => DocCropError::decode_at(position, message),
                other => other,
            })?;
            rectified.push(self.rectifier.rectify(&photo, &corners)?);
            info!(entry = position + 1, "Manifest entry rectified");
        }

        let document = self.composer.compose(rectified, layout, demo)?;
        document.save_pdf(out)?;
        Ok(ComposeReport {
            pages: document.page_count(),
            page_width: document.page_size.width,
            page_height: document.page_size.height,
        })
    }

    /// Page pixel sizes of an existing PDF at `dpi`.
    pub fn inspect(&self, pdf: &Path, dpi: f64) -> Result<Vec<(u32, u32)>> {
        if !(dpi.is_finite() && dpi > 0.0) {
            return Err(DocCropError::Config(format!("DPI must be positive, got {dpi}")));
        }
        PdfInspector::open(pdf)?.page_sizes_px(dpi)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use doccrop_core::error::ErrorKind;
    use doccrop_core::types::{ImagesPerPage, Point};
    use image::{Rgb, RgbImage};

    fn service() -> DocCropService {
        DocCropService::new(AppConfig {
            target_dpi: 30.0,
            cell_margin_px: 4,
            ..AppConfig::default()
        })
    }

    fn write_png(dir: &Path, name: &str, width: u32, height: u32) -> PathBuf {
        let path = dir.join(name);
        RasterImage::from_rgb(RgbImage::from_pixel(width, height, Rgb([200, 190, 180])))
            .save_png(&path)
            .expect("write png");
        path
    }

    fn square(size: f64) -> CornerSet {
        CornerSet::new(
            Point::new(0.0, 0.0),
            Point::new(size, 0.0),
            Point::new(size, size),
            Point::new(0.0, size),
        )
    }

    #[test]
    fn rectify_file_writes_a4_png() {
        let dir = tempfile::tempdir().expect("tempdir");
        let input = write_png(dir.path(), "photo.png", 80, 80);
        let out = dir.path().join("scan.png");

        let size = service()
            .rectify_file(&input, &square(50.0), &out)
            .expect("rectify");
        assert_eq!(size, (50, 71));
        let written = RasterImage::open(&out).expect("reopen");
        assert_eq!((written.width(), written.height()), (50, 71));
    }

    #[test]
    fn compose_then_inspect() {
        let dir = tempfile::tempdir().expect("tempdir");
        let images: Vec<PathBuf> = (0..3)
            .map(|i| write_png(dir.path(), &format!("{i}.png"), 20, 28))
            .collect();
        let out = dir.path().join("out.pdf");
        let layout = LayoutSpec {
            images_per_page: ImagesPerPage::Two,
            ..LayoutSpec::default()
        };

        let svc = service();
        let report = svc.compose_files(&images, &layout, true, &out).expect("compose");
        assert_eq!(report.pages, 2);
        assert_eq!((report.page_width, report.page_height), (248, 351));

        let sizes = svc.inspect(&out, 30.0).expect("inspect");
        assert_eq!(sizes, vec![(248, 351), (248, 351)]);
    }

    #[test]
    fn compose_with_no_images_fails() {
        let dir = tempfile::tempdir().expect("tempdir");
        let err = service()
            .compose_files(&[], &LayoutSpec::default(), false, &dir.path().join("x.pdf"))
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::EmptyInput);
    }

    #[test]
    fn compose_reports_bad_image_position() {
        let dir = tempfile::tempdir().expect("tempdir");
        let good = write_png(dir.path(), "good.png", 10, 10);
        let bad = dir.path().join("bad.png");
        std::fs::write(&bad, b"not a png").expect("write");

        let err = service()
            .compose_files(&[good, bad], &LayoutSpec::default(), false, &dir.path().join("x.pdf"))
            .unwrap_err();
        assert!(matches!(err, DocCropError::Decode { index: Some(1), .. }), "{err:?}");
    }

    #[test]
    fn scan_manifest_rectifies_and_composes() {
        let dir = tempfile::tempdir().expect("tempdir");
        write_png(dir.path(), "p1.png", 60, 60);
        write_png(dir.path(), "p2.png", 60, 60);
        let manifest_path = dir.path().join("manifest.json");
        std::fs::write(
            &manifest_path,
            r#"[{"image": "p1.png", "corners": [5,5,45,5,45,50,5,50]},
                {"image": "p2.png", "corners": [0,0,30,0,30,30,0,30]}]"#,
        )
        .expect("write manifest");

        let manifest = ScanManifest::load(&manifest_path).expect("manifest");
        let out = dir.path().join("scan.pdf");
        let report = service()
            .scan_manifest(&manifest, &LayoutSpec::default(), false, &out)
            .expect("scan");
        assert_eq!(report.pages, 2);
        assert!(out.exists());
    }

    #[test]
    fn scan_manifest_stops_on_degenerate_corners() {
        let dir = tempfile::tempdir().expect("tempdir");
        write_png(dir.path(), "p1.png", 60, 60);
        let manifest = ScanManifest::from_json_str(
            r#"[{"image": "p1.png", "corners": [0,0,1,0,2,0,3,0]}]"#,
            dir.path(),
        )
        .expect("manifest");
        let err = service()
            .scan_manifest(&manifest, &LayoutSpec::default(), false, &dir.path().join("x.pdf"))
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Geometry);
    }

    #[test]
    fn inspect_rejects_zero_dpi() {
        let err = service().inspect(Path::new("missing.pdf"), 0.0).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Config);
    }
}
