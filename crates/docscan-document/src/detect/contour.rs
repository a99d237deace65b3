// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Contour strategy: border-follow binary masks and keep outlines that
// simplify to four vertices.

use docscan_core::config::DetectorConfig;
use docscan_core::error::Result;
use image::GrayImage;
use imageproc::contours::{BorderType, Contour, find_contours};
use imageproc::geometry::{approximate_polygon_dp, arc_length};
use imageproc::point::Point;
use tracing::{debug, instrument};

use super::DetectionStrategy;
use super::prepare::{PreparedImage, invert};
use crate::geometry::{Point2D, Quadrilateral};

/// Tolerance multipliers tried in order, relative to the configured fraction.
const EPSILON_STEPS: [f64; 3] = [1.0, 2.0, 3.0];

/// A vertex whose turn is flatter than this (cosine of the interior angle)
/// is merged into its neighbours.
const FLAT_VERTEX_COS: f64 = -0.985;

/// Contours shorter than this (working pixels) are noise.
const MIN_CONTOUR_POINTS: usize = 16;

/// Traces the Otsu mask (both polarities) and the dilated edge map.
#[derive(Debug, Default, Clone, Copy)]
pub struct ContourStrategy;

impl DetectionStrategy for ContourStrategy {
    fn name(&self) -> &'static str {
        "contour"
    }

    #[instrument(skip_all, name = "contour_strategy")]
    fn propose(&self, prepared: &PreparedImage, cfg: &DetectorConfig) -> Result<Vec<Quadrilateral>> {
        let min_area = cfg.min_area_ratio * prepared.width() as f64 * prepared.height() as f64;
        let sources = [prepared.mask.clone(), invert(&prepared.mask), prepared.support.clone()];

        let mut proposals = Vec::new();
        for binary in &sources {
            proposals.extend(quads_in(binary, cfg.polygon_epsilon_fraction, min_area));
        }

        debug!(count = proposals.len(), "Contour proposals");
        Ok(proposals)
    }
}

fn quads_in(binary: &GrayImage, epsilon_fraction: f64, min_area: f64) -> Vec<Quadrilateral> {
    let contours: Vec<Contour<u32>> = find_contours(binary);
    contours
        .iter()
        .filter(|c| matches!(c.border_type, BorderType::Outer) && c.points.len() >= MIN_CONTOUR_POINTS)
        .filter_map(|c| simplify_to_quad(&c.points, epsilon_fraction, min_area))
        .collect()
}

/// Douglas-Peucker at increasing tolerance until four corners remain.
pub(crate) fn simplify_to_quad(
    points: &[Point<u32>],
    epsilon_fraction: f64,
    min_area: f64,
) -> Option<Quadrilateral> {
    let perimeter = arc_length(points, true);
    if perimeter <= 0.0 {
        return None;
    }

    for step in EPSILON_STEPS {
        let approx = approximate_polygon_dp(points, epsilon_fraction * step * perimeter, true);
        let mut vertices: Vec<(f64, f64)> = approx
            .iter()
            // Pixel centres.
            .map(|p| (p.x as f64 + 0.5, p.y as f64 + 0.5))
            .collect();
        if vertices.len() > 1 && vertices.first() == vertices.last() {
            vertices.pop();
        }
        drop_flat_vertices(&mut vertices);

        if vertices.len() < 4 {
            return None;
        }
        if vertices.len() == 4 {
            let corners = [vertices[0], vertices[1], vertices[2], vertices[3]];
            let quad = Quadrilateral::new(corners.map(|(x, y)| Point2D::pixel(x, y))).ok()?;
            return (quad.area() >= min_area).then_some(quad);
        }
    }
    None
}

/// Remove vertices where the outline barely turns, such as the starting
/// point of a contour that began halfway along a side.
fn drop_flat_vertices(vertices: &mut Vec<(f64, f64)>) {
    loop {
        let n = vertices.len();
        if n <= 3 {
            return;
        }
        let flat = (0..n).find(|&i| {
            let (px, py) = vertices[(i + n - 1) % n];
            let (cx, cy) = vertices[i];
            let (nx, ny) = vertices[(i + 1) % n];
            let (ax, ay) = (px - cx, py - cy);
            let (bx, by) = (nx - cx, ny - cy);
            let norm = ax.hypot(ay) * bx.hypot(by);
            norm <= f64::EPSILON || (ax * bx + ay * by) / norm < FLAT_VERTEX_COS
        });
        match flat {
            Some(i) => {
                vertices.remove(i);
            }
            None => return,
        }
    }
}
