// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Criterion benchmarks for the doccrop-document crate: rectifying a skewed
// selection and composing a four-up page set.

use criterion::{Criterion, black_box, criterion_group, criterion_main};
use image::{Rgb, RgbImage};

use doccrop_core::{AppConfig, Arrangement, CornerSet, ImagesPerPage, LayoutSpec, Point};
use doccrop_document::{PageComposer, RasterImage, Rectifier, Watermark};

// ---------------------------------------------------------------------------
// Benchmarks
// ---------------------------------------------------------------------------

/// Rectify a trapezoid selection out of a 400x400 synthetic photo.
fn bench_rectify(c: &mut Criterion) {
    let mut pixels = RgbImage::from_pixel(400, 400, Rgb([30, 30, 30]));
    for y in 40..360 {
        for x in 60..340 {
            pixels.put_pixel(x, y, Rgb([235, 235, 225]));
        }
    }
    let photo = RasterImage::from_rgb(pixels);
    let corners = CornerSet::new(
        Point::new(80.0, 40.0),
        Point::new(320.0, 50.0),
        Point::new(340.0, 360.0),
        Point::new(60.0, 350.0),
    );
    let rectifier = Rectifier::new();

    c.bench_function("rectify (400x400 -> 280x396)", |b| {
        b.iter(|| {
            let out = rectifier
                .rectify(black_box(&photo), black_box(&corners))
                .expect("rectify");
            black_box(out);
        });
    });
}

/// Compose eight small scans four-up onto 150 DPI pages with a watermark.
fn bench_compose(c: &mut Criterion) {
    let config = AppConfig {
        target_dpi: 150.0,
        ..AppConfig::default()
    };
    let composer = PageComposer::new(&config).with_watermark(Watermark::builtin("DEMO"));
    let layout = LayoutSpec {
        images_per_page: ImagesPerPage::Four,
        arrangement: Arrangement::Grid,
        ..LayoutSpec::default()
    };
    let scans: Vec<RasterImage> = (0..8)
        .map(|i| RasterImage::from_rgb(RgbImage::from_pixel(200, 283, Rgb([i * 30, 120, 200]))))
        .collect();

    c.bench_function("compose (8 images, 4-up, 150 dpi)", |b| {
        b.iter(|| {
            let doc = composer
                .compose(black_box(scans.clone()), &layout, true)
                .expect("compose");
            black_box(doc);
        });
    });
}

criterion_group!(benches, bench_rectify, bench_compose);
criterion_main!(benches);
