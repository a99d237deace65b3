// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Hough line strategy: intersect pairs of roughly horizontal and roughly
// vertical lines into candidate quadrilaterals.

use docscan_core::config::DetectorConfig;
use docscan_core::error::Result;
use imageproc::hough::{LineDetectionOptions, PolarLine, detect_lines};
use tracing::{debug, instrument};

use super::DetectionStrategy;
use super::prepare::PreparedImage;
use crate::geometry::{Point2D, Quadrilateral};

/// Lines closer than this (in both r and angle) are merged by the detector.
const SUPPRESSION_RADIUS: u32 = 8;

/// Never accept lines with fewer votes than this, whatever the image size.
const MIN_VOTES: u32 = 40;

/// Classical fallback for images where no closed outline survives
/// binarization, e.g. a page whose corners are cut off by the frame.
#[derive(Debug, Default, Clone, Copy)]
pub struct HoughLineStrategy;

impl DetectionStrategy for HoughLineStrategy {
    fn name(&self) -> &'static str {
        "hough"
    }

    #[instrument(skip_all, name = "hough_strategy")]
    fn propose(&self, prepared: &PreparedImage, cfg: &DetectorConfig) -> Result<Vec<Quadrilateral>> {
        let (w, h) = (prepared.width(), prepared.height());
        let vote_threshold = ((w.min(h) as f64 * cfg.hough_vote_fraction) as u32).max(MIN_VOTES);
        let options = LineDetectionOptions {
            vote_threshold,
            suppression_radius: SUPPRESSION_RADIUS,
        };
        let lines = detect_lines(&prepared.edges, options);

        let (mut horizontal, mut vertical) = classify_lines(&lines);
        debug!(
            line_count = lines.len(),
            horizontal = horizontal.len(),
            vertical = vertical.len(),
            vote_threshold,
            "Hough lines detected"
        );
        if horizontal.len() < 2 || vertical.len() < 2 {
            return Ok(Vec::new());
        }

        let (cx, cy) = (w as f64 / 2.0, h as f64 / 2.0);
        // `detect_lines` orders by angle, not votes, so rank before capping.
        keep_strongest(&mut horizontal, cfg.max_lines_per_axis, |l| {
            (0..w)
                .map(|x| x as f64 + 0.5)
                .filter(|&x| prepared.supported_at(x, position_at_x(l, x)))
                .count()
        });
        keep_strongest(&mut vertical, cfg.max_lines_per_axis, |l| {
            (0..h)
                .map(|y| y as f64 + 0.5)
                .filter(|&y| prepared.supported_at(position_at_y(l, y), y))
                .count()
        });
        sort_by_position(&mut horizontal, |l| position_at_x(l, cx));
        sort_by_position(&mut vertical, |l| position_at_y(l, cy));

        let mut proposals = Vec::new();
        for (i, top) in horizontal.iter().enumerate() {
            for bottom in &horizontal[i + 1..] {
                for (j, left) in vertical.iter().enumerate() {
                    for right in &vertical[j + 1..] {
                        if let Some(quad) = quad_from_lines(top, bottom, left, right) {
                            proposals.push(quad);
                        }
                    }
                }
            }
        }

        debug!(count = proposals.len(), "Hough proposals");
        Ok(proposals)
    }
}

/// Split lines into roughly horizontal and roughly vertical sets.
///
/// A `PolarLine` is the set of points with `x cos(a) + y sin(a) = r`, so an
/// angle near 90 degrees is a horizontal line and an angle near 0 or 180 a
/// vertical one. Lines in the diagonal bands are ignored.
fn classify_lines(lines: &[PolarLine]) -> (Vec<PolarLine>, Vec<PolarLine>) {
    let mut horizontal = Vec::new();
    let mut vertical = Vec::new();

    for line in lines {
        let angle = line.angle_in_degrees;
        if (60..=120).contains(&angle) {
            horizontal.push(*line);
        } else if angle <= 30 || angle >= 150 {
            vertical.push(*line);
        }
    }

    (horizontal, vertical)
}

/// Keep the `cap` lines with the most edge support, ties in input order.
fn keep_strongest(lines: &mut Vec<PolarLine>, cap: usize, support: impl Fn(&PolarLine) -> usize) {
    if lines.len() <= cap {
        return;
    }
    lines.sort_by_cached_key(|l| std::cmp::Reverse(support(l)));
    lines.truncate(cap);
}

fn sort_by_position(lines: &mut [PolarLine], key: impl Fn(&PolarLine) -> f64) {
    lines.sort_by(|a, b| key(a).total_cmp(&key(b)));
}

/// `y` where a near-horizontal line crosses `x`.
fn position_at_x(line: &PolarLine, x: f64) -> f64 {
    let theta = (line.angle_in_degrees as f64).to_radians();
    (line.r as f64 - x * theta.cos()) / theta.sin()
}

/// `x` where a near-vertical line crosses `y`.
fn position_at_y(line: &PolarLine, y: f64) -> f64 {
    let theta = (line.angle_in_degrees as f64).to_radians();
    (line.r as f64 - y * theta.sin()) / theta.cos()
}

fn quad_from_lines(
    top: &PolarLine,
    bottom: &PolarLine,
    left: &PolarLine,
    right: &PolarLine,
) -> Option<Quadrilateral> {
    let corners = [
        intersect_polar_lines(top, left)?,
        intersect_polar_lines(top, right)?,
        intersect_polar_lines(bottom, right)?,
        intersect_polar_lines(bottom, left)?,
    ];
    // Pixel centres.
    Quadrilateral::new(corners.map(|(x, y)| Point2D::pixel(x + 0.5, y + 0.5))).ok()
}

/// Intersection of two lines in polar (Hough) form, `None` when they are
/// (nearly) parallel.
fn intersect_polar_lines(a: &PolarLine, b: &PolarLine) -> Option<(f64, f64)> {
    let theta_a = (a.angle_in_degrees as f64).to_radians();
    let theta_b = (b.angle_in_degrees as f64).to_radians();

    let (sin_a, cos_a) = theta_a.sin_cos();
    let (sin_b, cos_b) = theta_b.sin_cos();

    let denom = cos_a * sin_b - sin_a * cos_b;
    if denom.abs() < 1e-6 {
        return None;
    }

    let r_a = a.r as f64;
    let r_b = b.r as f64;

    let x = (r_a * sin_b - r_b * sin_a) / denom;
    let y = (r_b * cos_a - r_a * cos_b) / denom;

    Some((x, y))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::image::RasterImage;
    use approx::assert_relative_eq;
    use image::{DynamicImage, GrayImage, Luma};

    #[test]
    fn intersect_perpendicular_lines() {
        // Horizontal line y = 100, vertical line x = 50.
        let h = PolarLine { r: 100.0, angle_in_degrees: 90 };
        let v = PolarLine { r: 50.0, angle_in_degrees: 0 };

        let (x, y) = intersect_polar_lines(&h, &v).unwrap();
        assert_relative_eq!(x, 50.0, epsilon = 1e-6);
        assert_relative_eq!(y, 100.0, epsilon = 1e-6);
    }

    #[test]
    fn parallel_lines_do_not_intersect() {
        let a = PolarLine { r: 50.0, angle_in_degrees: 0 };
        let b = PolarLine { r: 100.0, angle_in_degrees: 0 };
        assert!(intersect_polar_lines(&a, &b).is_none());
    }

    #[test]
    fn classify_by_orientation() {
        let lines = vec![
            PolarLine { r: 10.0, angle_in_degrees: 0 },   // vertical
            PolarLine { r: 20.0, angle_in_degrees: 5 },   // vertical
            PolarLine { r: 30.0, angle_in_degrees: 90 },  // horizontal
            PolarLine { r: 40.0, angle_in_degrees: 85 },  // horizontal
            PolarLine { r: 50.0, angle_in_degrees: 45 },  // diagonal, ignored
            PolarLine { r: 60.0, angle_in_degrees: 170 }, // vertical
        ];

        let (horizontal, vertical) = classify_lines(&lines);
        assert_eq!(horizontal.len(), 2);
        assert_eq!(vertical.len(), 3);
    }

    #[test]
    fn cap_keeps_the_best_supported_lines() {
        // Small angles first, as the detector returns them.
        let mut lines: Vec<PolarLine> = (0..10)
            .map(|i| PolarLine { r: 10.0 * i as f32, angle_in_degrees: 80 + i })
            .collect();
        lines.push(PolarLine { r: 200.0, angle_in_degrees: 90 });
        let support = |l: &PolarLine| if l.r == 200.0 { 500 } else { l.r as usize };

        keep_strongest(&mut lines, 2, support);
        assert_eq!(lines.len(), 2);
        assert_eq!(lines[0].r, 200.0);
        assert_eq!(lines[1].r, 90.0);

        let mut few = vec![PolarLine { r: 1.0, angle_in_degrees: 0 }];
        keep_strongest(&mut few, 2, |_| 0);
        assert_eq!(few.len(), 1);
    }

    #[test]
    fn line_positions() {
        let h = PolarLine { r: 120.0, angle_in_degrees: 90 };
        assert_relative_eq!(position_at_x(&h, 37.0), 120.0, epsilon = 1e-9);
        let v = PolarLine { r: 75.0, angle_in_degrees: 0 };
        assert_relative_eq!(position_at_y(&v, 12.0), 75.0, epsilon = 1e-9);
    }

    #[test]
    fn outlined_rectangle_yields_its_boundary() {
        // Page outline only, so the interior has the background colour.
        let mut gray = GrayImage::from_pixel(300, 300, Luma([200u8]));
        for i in 50..250 {
            for t in 0..3 {
                gray.put_pixel(i, 50 + t, Luma([20u8]));
                gray.put_pixel(i, 247 + t, Luma([20u8]));
                gray.put_pixel(50 + t, i, Luma([20u8]));
                gray.put_pixel(247 + t, i, Luma([20u8]));
            }
        }
        let raster = RasterImage::from_dynamic(DynamicImage::ImageLuma8(gray)).unwrap();
        let prepared = PreparedImage::new(&raster, &DetectorConfig::default());

        let quads = HoughLineStrategy
            .propose(&prepared, &DetectorConfig::default())
            .unwrap();
        let hit = quads.iter().any(|q| {
            let [tl, _, br, _] = q.to_array();
            (tl.0 - 50.0).abs() < 8.0
                && (tl.1 - 50.0).abs() < 8.0
                && (br.0 - 250.0).abs() < 8.0
                && (br.1 - 250.0).abs() < 8.0
        });
        assert!(hit, "{quads:?}");
    }
}
