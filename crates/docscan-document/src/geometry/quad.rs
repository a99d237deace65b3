// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Quadrilaterals with canonically ordered corners.

use docscan_core::error::{Result, ScanError};
use serde::{Deserialize, Serialize};

use super::point::{CoordinateSpace, Point2D};
use super::{orient, segments_cross};

/// Below this |sin| of the corner angle, three corners count as collinear.
const COLLINEAR_SIN_EPS: f64 = 1e-3;

/// Sides shorter than this are treated as coincident corners.
const MIN_SIDE_LEN: f64 = 1e-9;

/// Smallest accepted area as a fraction of the image area.
pub const MIN_AREA_FRACTION: f64 = 1e-4;

/// The four corner roles, in storage order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Corner {
    TopLeft,
    TopRight,
    BottomRight,
    BottomLeft,
}

impl Corner {
    pub const ALL: [Corner; 4] = [
        Corner::TopLeft,
        Corner::TopRight,
        Corner::BottomRight,
        Corner::BottomLeft,
    ];

    pub fn index(self) -> usize {
        self as usize
    }
}

/// A document boundary: four corners in top-left, top-right, bottom-right,
/// bottom-left order.
///
/// Construction orders and validates the corners, so every value of this
/// type is non-degenerate and simple. Edits return a new value.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "[Point2D; 4]", into = "[Point2D; 4]")]
pub struct Quadrilateral {
    corners: [Point2D; 4],
}

impl Quadrilateral {
    /// Order `points` canonically and validate the resulting polygon.
    pub fn new(points: [Point2D; 4]) -> Result<Self> {
        let space = points[0].space();
        if points.iter().any(|p| p.space() != space) {
            return Err(ScanError::DegenerateGeometry(
                "corners mix coordinate spaces".into(),
            ));
        }
        if points.iter().any(|p| !p.is_finite()) {
            return Err(ScanError::DegenerateGeometry("non-finite corner".into()));
        }

        let quad = Self {
            corners: order_corners(points),
        };
        quad.check_shape()?;
        Ok(quad)
    }

    /// Convenience constructor from pixel-space `(x, y)` pairs.
    pub fn from_pixel_coords(coords: [(f64, f64); 4]) -> Result<Self> {
        Self::new(coords.map(|(x, y)| Point2D::pixel(x, y)))
    }

    /// The quadrilateral spanning a whole `width` x `height` image.
    pub fn full_frame(width: u32, height: u32) -> Self {
        let w = width.max(1) as f64;
        let h = height.max(1) as f64;
        Self {
            corners: [
                Point2D::pixel(0.0, 0.0),
                Point2D::pixel(w, 0.0),
                Point2D::pixel(w, h),
                Point2D::pixel(0.0, h),
            ],
        }
    }

    // -- Accessors ------------------------------------------------------------

    pub fn corners(&self) -> &[Point2D; 4] {
        &self.corners
    }

    pub fn corner(&self, corner: Corner) -> Point2D {
        self.corners[corner.index()]
    }

    pub fn space(&self) -> CoordinateSpace {
        self.corners[0].space()
    }

    /// Corners as plain `(x, y)` pairs, in canonical order.
    pub fn to_array(&self) -> [(f64, f64); 4] {
        self.corners.map(|p| (p.x(), p.y()))
    }

    // -- Measurements ---------------------------------------------------------

    /// Shoelace area, signed by winding in the stored coordinates.
    pub fn signed_area(&self) -> f64 {
        let mut twice = 0.0;
        for i in 0..4 {
            let a = self.corners[i];
            let b = self.corners[(i + 1) % 4];
            twice += a.x() * b.y() - b.x() * a.y();
        }
        twice / 2.0
    }

    pub fn area(&self) -> f64 {
        self.signed_area().abs()
    }

    /// Side lengths as `[top, right, bottom, left]`.
    pub fn side_lengths(&self) -> [f64; 4] {
        let c = &self.corners;
        [
            c[0].distance_to(&c[1]),
            c[1].distance_to(&c[2]),
            c[2].distance_to(&c[3]),
            c[3].distance_to(&c[0]),
        ]
    }

    /// Interior angle at each corner, in degrees, in corner order.
    pub fn interior_angles(&self) -> [f64; 4] {
        let mut angles = [0.0; 4];
        for (i, angle) in angles.iter_mut().enumerate() {
            let prev = self.corners[(i + 3) % 4];
            let cur = self.corners[i];
            let next = self.corners[(i + 1) % 4];
            let (ax, ay) = (prev.x() - cur.x(), prev.y() - cur.y());
            let (bx, by) = (next.x() - cur.x(), next.y() - cur.y());
            let cos = (ax * bx + ay * by) / (ax.hypot(ay) * bx.hypot(by));
            *angle = cos.clamp(-1.0, 1.0).acos().to_degrees();
        }
        angles
    }

    pub fn is_convex(&self) -> bool {
        let turns: Vec<f64> = (0..4)
            .map(|i| {
                orient(
                    self.corners[i],
                    self.corners[(i + 1) % 4],
                    self.corners[(i + 2) % 4],
                )
            })
            .collect();
        turns.iter().all(|t| *t > 0.0) || turns.iter().all(|t| *t < 0.0)
    }

    /// Reject quadrilaterals too small to be meaningful in a
    /// `width` x `height` image.
    pub fn validate_for(&self, width: u32, height: u32) -> Result<()> {
        let frame = width as f64 * height as f64;
        if frame <= 0.0 {
            return Err(ScanError::DegenerateGeometry(format!(
                "empty {width}x{height} frame"
            )));
        }
        let area = self.area();
        if area < MIN_AREA_FRACTION * frame {
            return Err(ScanError::DegenerateGeometry(format!(
                "area {area:.3} is negligible for a {width}x{height} image"
            )));
        }
        Ok(())
    }

    // -- Derived quadrilaterals -----------------------------------------------

    pub fn to_cartesian(&self, height: f64) -> Self {
        Self {
            corners: self.corners.map(|p| p.to_cartesian(height)),
        }
    }

    pub fn to_pixel(&self, height: f64) -> Self {
        Self {
            corners: self.corners.map(|p| p.to_pixel(height)),
        }
    }

    /// Uniformly scale about the origin. Non-positive factors are clamped to
    /// a tiny positive value so the corner roles survive.
    pub fn scaled(&self, factor: f64) -> Self {
        let factor = factor.max(f64::MIN_POSITIVE);
        Self {
            corners: self.corners.map(|p| p.scaled(factor, factor)),
        }
    }

    /// Move one corner, as a corner editor would.
    pub fn with_corner(&self, corner: Corner, point: Point2D) -> Result<Self> {
        let mut points = self.corners;
        points[corner.index()] = point;
        Self::new(points)
    }

    fn check_shape(&self) -> Result<()> {
        for (i, corner) in Corner::ALL.iter().enumerate() {
            let prev = self.corners[(i + 3) % 4];
            let cur = self.corners[i];
            let next = self.corners[(i + 1) % 4];
            let la = prev.distance_to(&cur);
            let lb = next.distance_to(&cur);
            if la < MIN_SIDE_LEN || lb < MIN_SIDE_LEN {
                return Err(ScanError::DegenerateGeometry(format!(
                    "coincident corners at {corner:?}"
                )));
            }
            let sin = orient(prev, cur, next).abs() / (la * lb);
            if sin < COLLINEAR_SIN_EPS {
                return Err(ScanError::DegenerateGeometry(format!(
                    "corners are collinear around {corner:?}"
                )));
            }
        }

        let c = &self.corners;
        if segments_cross(c[0], c[1], c[2], c[3]) || segments_cross(c[1], c[2], c[3], c[0]) {
            return Err(ScanError::DegenerateGeometry(
                "edges cross each other".into(),
            ));
        }
        Ok(())
    }
}

impl TryFrom<[Point2D; 4]> for Quadrilateral {
    type Error = ScanError;

    fn try_from(points: [Point2D; 4]) -> Result<Self> {
        Self::new(points)
    }
}

impl From<Quadrilateral> for [Point2D; 4] {
    fn from(quad: Quadrilateral) -> Self {
        quad.corners
    }
}

// -- Corner ordering ----------------------------------------------------------

/// Assign the four points to top-left, top-right, bottom-right, bottom-left.
///
/// Top-left has the smallest `x + y`, bottom-right the largest; top-right has
/// the largest `x - y`, bottom-left the smallest (with `y` measured downward).
/// Ties go to the lower input index. An input that already satisfies these
/// rules is returned unchanged. When the rules pick the same point twice
/// (e.g. a square rotated by 45 degrees) the points are ordered clockwise
/// around their centroid, starting from the top-left pick.
pub fn order_corners(points: [Point2D; 4]) -> [Point2D; 4] {
    let sum = |p: &Point2D| p.x() + p.y_down();
    let diff = |p: &Point2D| p.x() - p.y_down();

    if is_canonical(&points, sum, diff) {
        return points;
    }

    let tl = arg_extreme(&points, sum, std::cmp::Ordering::Less);
    let tr = arg_extreme(&points, diff, std::cmp::Ordering::Greater);
    let br = arg_extreme(&points, sum, std::cmp::Ordering::Greater);
    let bl = arg_extreme(&points, diff, std::cmp::Ordering::Less);

    let picks = [tl, tr, br, bl];
    let distinct = (0..4).all(|i| (i + 1..4).all(|j| picks[i] != picks[j]));
    if distinct {
        picks.map(|i| points[i])
    } else {
        clockwise_from(points, tl)
    }
}

fn is_canonical(
    points: &[Point2D; 4],
    sum: impl Fn(&Point2D) -> f64,
    diff: impl Fn(&Point2D) -> f64,
) -> bool {
    let s = points.map(|p| sum(&p));
    let d = points.map(|p| diff(&p));
    s.iter().all(|v| s[0] <= *v)
        && s.iter().all(|v| s[2] >= *v)
        && d.iter().all(|v| d[1] >= *v)
        && d.iter().all(|v| d[3] <= *v)
}

fn arg_extreme(
    points: &[Point2D; 4],
    key: impl Fn(&Point2D) -> f64,
    want: std::cmp::Ordering,
) -> usize {
    let mut best = 0;
    for i in 1..4 {
        if key(&points[i]).partial_cmp(&key(&points[best])) == Some(want) {
            best = i;
        }
    }
    best
}

fn clockwise_from(points: [Point2D; 4], start: usize) -> [Point2D; 4] {
    let cx = points.iter().map(|p| p.x()).sum::<f64>() / 4.0;
    let cy = points.iter().map(|p| p.y_down()).sum::<f64>() / 4.0;
    // With y pointing down, increasing atan2 sweeps clockwise on screen.
    let angle = |p: &Point2D| (p.y_down() - cy).atan2(p.x() - cx);

    let mut order = [0usize, 1, 2, 3];
    order.sort_by(|&a, &b| angle(&points[a]).total_cmp(&angle(&points[b])));
    let pos = order.iter().position(|&i| i == start).unwrap_or(0);
    order.rotate_left(pos);
    order.map(|i| points[i])
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn px(coords: [(f64, f64); 4]) -> [Point2D; 4] {
        coords.map(|(x, y)| Point2D::pixel(x, y))
    }

    #[test]
    fn orders_shuffled_corners() {
        let quad = Quadrilateral::new(px([
            (90.0, 110.0),
            (10.0, 5.0),
            (5.0, 100.0),
            (95.0, 8.0),
        ]))
        .unwrap();
        assert_eq!(
            quad.to_array(),
            [(10.0, 5.0), (95.0, 8.0), (90.0, 110.0), (5.0, 100.0)]
        );
    }

    #[test]
    fn ordering_is_idempotent() {
        let shuffled = px([(300.0, 20.0), (40.0, 380.0), (10.0, 30.0), (310.0, 400.0)]);
        let once = order_corners(shuffled);
        assert_eq!(order_corners(once), once);
    }

    #[test]
    fn diamond_falls_back_to_clockwise_order() {
        let diamond = px([(5.0, 0.0), (10.0, 5.0), (5.0, 10.0), (0.0, 5.0)]);
        let ordered = order_corners(diamond);
        assert_eq!(ordered, diamond);
        assert_eq!(order_corners(ordered), ordered);
        assert!(Quadrilateral::new(diamond).is_ok());
    }

    #[test]
    fn cartesian_top_means_larger_y() {
        let quad = Quadrilateral::new([
            Point2D::cartesian(0.0, 0.0),
            Point2D::cartesian(10.0, 20.0),
            Point2D::cartesian(0.0, 20.0),
            Point2D::cartesian(10.0, 0.0),
        ])
        .unwrap();
        assert_eq!(quad.corner(Corner::TopLeft), Point2D::cartesian(0.0, 20.0));
        assert_eq!(quad.corner(Corner::BottomRight), Point2D::cartesian(10.0, 0.0));
    }

    #[test]
    fn cartesian_round_trip() {
        let quad = Quadrilateral::from_pixel_coords([
            (12.5, 40.0),
            (300.25, 35.0),
            (310.0, 420.75),
            (8.0, 415.0),
        ])
        .unwrap();
        let back = quad.to_cartesian(480.0).to_pixel(480.0);
        for (a, b) in quad.corners().iter().zip(back.corners()) {
            assert_relative_eq!(a.x(), b.x(), epsilon = 1e-9);
            assert_relative_eq!(a.y(), b.y(), epsilon = 1e-9);
        }
        let cart = quad.to_cartesian(480.0);
        assert_eq!(cart.space(), CoordinateSpace::Cartesian);
        assert_eq!(order_corners(*cart.corners()), *cart.corners());
    }

    #[test]
    fn rejects_collinear_corners() {
        let err = Quadrilateral::from_pixel_coords([
            (0.0, 0.0),
            (50.0, 0.0),
            (100.0, 0.0),
            (50.0, 80.0),
        ])
        .unwrap_err();
        assert!(matches!(err, ScanError::DegenerateGeometry(_)));
    }

    #[test]
    fn rejects_coincident_corners() {
        let err = Quadrilateral::from_pixel_coords([
            (0.0, 0.0),
            (0.0, 0.0),
            (10.0, 10.0),
            (0.0, 10.0),
        ])
        .unwrap_err();
        assert!(matches!(err, ScanError::DegenerateGeometry(_)));
    }

    #[test]
    fn rejects_mixed_spaces_and_nan() {
        let mixed = [
            Point2D::pixel(0.0, 0.0),
            Point2D::cartesian(10.0, 0.0),
            Point2D::pixel(10.0, 10.0),
            Point2D::pixel(0.0, 10.0),
        ];
        assert!(Quadrilateral::new(mixed).is_err());
        assert!(Quadrilateral::from_pixel_coords([
            (0.0, 0.0),
            (f64::NAN, 0.0),
            (10.0, 10.0),
            (0.0, 10.0),
        ])
        .is_err());
    }

    #[test]
    fn untwists_bow_tie_input() {
        let quad = Quadrilateral::from_pixel_coords([
            (0.0, 0.0),
            (10.0, 10.0),
            (10.0, 0.0),
            (0.0, 10.0),
        ])
        .unwrap();
        assert!(quad.is_convex());
        assert_relative_eq!(quad.area(), 100.0);
    }

    #[test]
    fn concave_dart_is_valid_but_not_convex() {
        let quad = Quadrilateral::from_pixel_coords([
            (0.0, 0.0),
            (100.0, 0.0),
            (100.0, 100.0),
            (70.0, 30.0),
        ])
        .unwrap();
        assert!(!quad.is_convex());
    }

    #[test]
    fn full_frame_measurements() {
        let quad = Quadrilateral::full_frame(40, 30);
        assert_relative_eq!(quad.area(), 1200.0);
        assert_eq!(quad.side_lengths(), [40.0, 30.0, 40.0, 30.0]);
        for angle in quad.interior_angles() {
            assert_relative_eq!(angle, 90.0, epsilon = 1e-9);
        }
        assert!(quad.validate_for(40, 30).is_ok());
    }

    #[test]
    fn tiny_quad_fails_frame_validation() {
        let quad = Quadrilateral::from_pixel_coords([
            (0.0, 0.0),
            (1.0, 0.0),
            (1.0, 1.0),
            (0.0, 1.0),
        ])
        .unwrap();
        assert!(quad.validate_for(4000, 3000).is_err());
    }

    #[test]
    fn editing_a_corner_produces_a_new_quad() {
        let quad = Quadrilateral::full_frame(100, 100);
        let edited = quad
            .with_corner(Corner::TopLeft, Point2D::pixel(10.0, 12.0))
            .unwrap();
        assert_eq!(quad.corner(Corner::TopLeft), Point2D::pixel(0.0, 0.0));
        assert_eq!(edited.corner(Corner::TopLeft), Point2D::pixel(10.0, 12.0));
    }

    #[test]
    fn deserialization_validates() {
        let ok = serde_json::to_string(&Quadrilateral::full_frame(10, 10)).unwrap();
        let back: Quadrilateral = serde_json::from_str(&ok).unwrap();
        assert_eq!(back, Quadrilateral::full_frame(10, 10));

        let collinear = serde_json::to_string(&px([
            (0.0, 0.0),
            (5.0, 0.0),
            (10.0, 0.0),
            (5.0, 5.0),
        ]))
        .unwrap();
        assert!(serde_json::from_str::<Quadrilateral>(&collinear).is_err());
    }
}
