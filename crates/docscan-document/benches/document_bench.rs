// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Criterion benchmarks for the docscan-document crate: boundary detection on
// a synthetic phone photo and rectification of the detected page.

use criterion::{Criterion, black_box, criterion_group, criterion_main};
use image::{DynamicImage, Rgb, RgbImage};
use imageproc::drawing::draw_polygon_mut;
use imageproc::point::Point;

use docscan_document::{DocumentDetector, PerspectiveRectifier, QuadDetector, Quadrilateral, RasterImage};

// ---------------------------------------------------------------------------
// Fixtures
// ---------------------------------------------------------------------------

/// 1200x1600 dark desk with a slightly skewed light page on it.
fn phone_photo() -> RasterImage {
    let mut img = RgbImage::from_pixel(1200, 1600, Rgb([50, 48, 55]));
    let page = [
        Point::new(150, 190),
        Point::new(1060, 170),
        Point::new(1080, 1430),
        Point::new(130, 1410),
    ];
    draw_polygon_mut(&mut img, &page, Rgb([236, 233, 226]));
    RasterImage::from_dynamic(DynamicImage::ImageRgb8(img)).expect("non-empty fixture")
}

// ---------------------------------------------------------------------------
// Benchmarks
// ---------------------------------------------------------------------------

fn bench_detection(c: &mut Criterion) {
    let image = phone_photo();
    let detector = DocumentDetector::default();

    c.bench_function("detect (1200x1600)", |b| {
        b.iter(|| black_box(detector.detect(black_box(&image)).expect("detection runs")));
    });
}

fn bench_rectification(c: &mut Criterion) {
    let image = phone_photo();
    let quad = Quadrilateral::from_pixel_coords([
        (150.0, 190.0),
        (1060.0, 170.0),
        (1080.0, 1430.0),
        (130.0, 1410.0),
    ])
    .expect("valid fixture quad");
    let rectifier = PerspectiveRectifier::default();

    c.bench_function("rectify bilinear (1200x1600)", |b| {
        b.iter(|| {
            let out = rectifier
                .rectify(black_box(image.clone()), black_box(&quad))
                .expect("rectification succeeds");
            black_box(out.into_dynamic());
        });
    });
}

criterion_group!(benches, bench_detection, bench_rectification);
criterion_main!(benches);
