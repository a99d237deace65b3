// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Geometry primitives: points, quadrilaterals, and corner ordering.

pub mod point;
pub mod quad;

pub use point::{CoordinateSpace, Point2D};
pub use quad::{Corner, Quadrilateral, order_corners};

/// Twice the signed area of triangle `a`, `b`, `c`.
pub(crate) fn orient(a: Point2D, b: Point2D, c: Point2D) -> f64 {
    (b.x() - a.x()) * (c.y() - a.y()) - (b.y() - a.y()) * (c.x() - a.x())
}

/// Whether segments `a`-`b` and `c`-`d` cross at a single interior point.
/// Touching endpoints and collinear overlap do not count.
pub(crate) fn segments_cross(a: Point2D, b: Point2D, c: Point2D, d: Point2D) -> bool {
    let o1 = orient(a, b, c);
    let o2 = orient(a, b, d);
    let o3 = orient(c, d, a);
    let o4 = orient(c, d, b);
    o1 * o2 < 0.0 && o3 * o4 < 0.0
}
