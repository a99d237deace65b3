// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Plausibility scoring for proposed document boundaries.

use docscan_core::config::DetectorConfig;

use super::prepare::PreparedImage;
use crate::geometry::{Point2D, Quadrilateral};

const W_COVERAGE: f64 = 0.25;
const W_ASPECT: f64 = 0.15;
const W_ORTHO: f64 = 0.25;
const W_SUPPORT: f64 = 0.35;

/// Coverage at or above this fraction of the frame earns full marks.
const FULL_COVERAGE: f64 = 0.5;

/// Long/short side ratios up to this are treated as ordinary paper.
const PLAIN_ASPECT: f64 = 2.0;

/// Fraction of each side skipped at both ends, where corners round off.
const SIDE_MARGIN: f64 = 0.05;

/// Corners may sit this far outside the frame (fraction of the dimension).
const FRAME_SLACK: f64 = 0.02;

/// Component scores of an accepted proposal, each in `[0, 1]`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScoreBreakdown {
    pub coverage: f64,
    pub aspect: f64,
    pub orthogonality: f64,
    pub support: f64,
    pub weakest_side: f64,
    pub total: f64,
}

/// Score a working-space quadrilateral, or `None` when it fails a hard gate
/// (not convex, outside the frame, too small, or a side without edges).
pub fn score_proposal(
    quad: &Quadrilateral,
    prepared: &PreparedImage,
    cfg: &DetectorConfig,
) -> Option<ScoreBreakdown> {
    let (w, h) = (prepared.width() as f64, prepared.height() as f64);
    if !quad.is_convex() || !inside_frame(quad, w, h) {
        return None;
    }

    let ratio = quad.area() / (w * h);
    if ratio < cfg.min_area_ratio {
        return None;
    }

    let sides = side_supports(quad, prepared);
    let weakest_side = sides.iter().copied().fold(f64::INFINITY, f64::min);
    if weakest_side < cfg.min_edge_support {
        return None;
    }
    let mean_support = sides.iter().sum::<f64>() / 4.0;

    let coverage = (ratio / FULL_COVERAGE).min(1.0);
    let aspect = aspect_score(quad);
    let orthogonality = orthogonality_score(quad);
    let support = 0.5 * mean_support + 0.5 * weakest_side;

    let total = W_COVERAGE * coverage + W_ASPECT * aspect + W_ORTHO * orthogonality + W_SUPPORT * support;

    Some(ScoreBreakdown {
        coverage,
        aspect,
        orthogonality,
        support,
        weakest_side,
        total: total.clamp(0.0, 1.0),
    })
}

fn inside_frame(quad: &Quadrilateral, w: f64, h: f64) -> bool {
    let (sx, sy) = (w * FRAME_SLACK, h * FRAME_SLACK);
    quad.corners()
        .iter()
        .all(|p| p.x() >= -sx && p.x() <= w + sx && p.y() >= -sy && p.y() <= h + sy)
}

fn aspect_score(quad: &Quadrilateral) -> f64 {
    let [top, right, bottom, left] = quad.side_lengths();
    let horizontal = (top + bottom) / 2.0;
    let vertical = (left + right) / 2.0;
    let short = horizontal.min(vertical);
    if short <= 0.0 {
        return 0.0;
    }
    let ratio = horizontal.max(vertical) / short;
    if ratio <= PLAIN_ASPECT {
        1.0
    } else {
        (1.0 - (ratio - PLAIN_ASPECT) / PLAIN_ASPECT).max(0.0)
    }
}

/// 1 for right angles everywhere, falling off with the mean |cos| of the
/// corner angles.
fn orthogonality_score(quad: &Quadrilateral) -> f64 {
    let mean_cos = quad
        .interior_angles()
        .iter()
        .map(|deg| deg.to_radians().cos().abs())
        .sum::<f64>()
        / 4.0;
    (1.0 - mean_cos).clamp(0.0, 1.0)
}

/// Fraction of edge-supported samples along each side, `[top, right, bottom, left]`.
pub fn side_supports(quad: &Quadrilateral, prepared: &PreparedImage) -> [f64; 4] {
    let c = quad.corners();
    [
        segment_support(c[0], c[1], prepared),
        segment_support(c[1], c[2], prepared),
        segment_support(c[2], c[3], prepared),
        segment_support(c[3], c[0], prepared),
    ]
}

fn segment_support(a: Point2D, b: Point2D, prepared: &PreparedImage) -> f64 {
    let len = a.distance_to(&b);
    let samples = ((len / 2.0) as usize).max(8);
    let mut hits = 0usize;
    for i in 0..samples {
        let t = SIDE_MARGIN + (1.0 - 2.0 * SIDE_MARGIN) * (i as f64 + 0.5) / samples as f64;
        let x = a.x() + t * (b.x() - a.x());
        let y = a.y() + t * (b.y() - a.y());
        if prepared.supported_at(x, y) {
            hits += 1;
        }
    }
    hits as f64 / samples as f64
}
