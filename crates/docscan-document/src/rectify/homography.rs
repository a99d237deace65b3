// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Planar homography from four point correspondences.

use docscan_core::error::{Result, ScanError};
use nalgebra::{Matrix3, SMatrix, SVector, Vector3};

/// Below this |det| the normalized transform is treated as singular.
const MIN_NORMALIZED_DET: f64 = 1e-8;

/// Below this |h33| the transform cannot be scaled to canonical form.
const MIN_H33: f64 = 1e-12;

/// Projective map `dst ~ H * src` in homogeneous coordinates, scaled so
/// that `h33 = 1`.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Homography {
    h: Matrix3<f64>,
}

impl Homography {
    pub fn new(h: Matrix3<f64>) -> Self {
        Self { h }
    }

    pub fn identity() -> Self {
        Self::new(Matrix3::identity())
    }

    pub fn matrix(&self) -> &Matrix3<f64> {
        &self.h
    }

    /// Solve for `H` with `dst[k] ~ H * src[k]`.
    ///
    /// Both point sets are Hartley-normalized, the eight unknowns (with
    /// `h33 = 1`) are solved from two rows per correspondence, and the result
    /// is denormalized. Fails with `DegenerateGeometry` when the system is
    /// singular or the solution cannot be normalized.
    pub fn from_4pt(src: &[(f64, f64); 4], dst: &[(f64, f64); 4]) -> Result<Self> {
        let (src_n, t_src) = normalize_points4(src);
        let (dst_n, t_dst) = normalize_points4(dst);

        let mut a = SMatrix::<f64, 8, 8>::zeros();
        let mut b = SVector::<f64, 8>::zeros();

        for k in 0..4 {
            let (x, y) = src_n[k];
            let (u, v) = dst_n[k];

            let r0 = 2 * k;
            a[(r0, 0)] = x;
            a[(r0, 1)] = y;
            a[(r0, 2)] = 1.0;
            a[(r0, 6)] = -u * x;
            a[(r0, 7)] = -u * y;
            b[r0] = u;

            let r1 = 2 * k + 1;
            a[(r1, 3)] = x;
            a[(r1, 4)] = y;
            a[(r1, 5)] = 1.0;
            a[(r1, 6)] = -v * x;
            a[(r1, 7)] = -v * y;
            b[r1] = v;
        }

        let x = a
            .lu()
            .solve(&b)
            .ok_or_else(|| singular("correspondence system is singular"))?;

        let hn = Matrix3::<f64>::new(
            x[0], x[1], x[2], //
            x[3], x[4], x[5], //
            x[6], x[7], 1.0,
        );
        let det = hn.determinant();
        if !det.is_finite() || det.abs() < MIN_NORMALIZED_DET {
            return Err(singular(&format!("normalized transform determinant {det:e}")));
        }

        let t_dst_inv = t_dst
            .try_inverse()
            .ok_or_else(|| singular("destination points are coincident"))?;
        let h = t_dst_inv * hn * t_src;

        let s = h[(2, 2)];
        if !s.is_finite() || s.abs() < MIN_H33 {
            return Err(singular("h33 vanishes"));
        }
        Ok(Self::new(h / s))
    }

    /// Map a point; `None` when it lands on the line at infinity.
    #[inline]
    pub fn apply(&self, x: f64, y: f64) -> Option<(f64, f64)> {
        let v = self.h * Vector3::new(x, y, 1.0);
        let w = v[2];
        if w.abs() < f64::EPSILON {
            return None;
        }
        Some((v[0] / w, v[1] / w))
    }
}

fn singular(detail: &str) -> ScanError {
    ScanError::DegenerateGeometry(format!("perspective transform is singular: {detail}"))
}

fn hartley_normalization(cx: f64, cy: f64, mean_dist: f64) -> Matrix3<f64> {
    let s = if mean_dist > 1e-12 {
        (2.0_f64).sqrt() / mean_dist
    } else {
        1.0
    };

    Matrix3::<f64>::new(s, 0.0, -s * cx, 0.0, s, -s * cy, 0.0, 0.0, 1.0)
}

/// Translate to the centroid and scale so the mean distance is sqrt(2).
fn normalize_points4(pts: &[(f64, f64); 4]) -> ([(f64, f64); 4], Matrix3<f64>) {
    let cx = pts.iter().map(|p| p.0).sum::<f64>() / 4.0;
    let cy = pts.iter().map(|p| p.1).sum::<f64>() / 4.0;
    let mean_dist = pts
        .iter()
        .map(|p| (p.0 - cx).hypot(p.1 - cy))
        .sum::<f64>()
        / 4.0;

    let t = hartley_normalization(cx, cy, mean_dist);
    let out = pts.map(|(x, y)| {
        let v = t * Vector3::new(x, y, 1.0);
        (v[0], v[1])
    });
    (out, t)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn assert_maps(h: &Homography, from: (f64, f64), to: (f64, f64)) {
        let (x, y) = h.apply(from.0, from.1).unwrap();
        assert_relative_eq!(x, to.0, epsilon = 1e-6);
        assert_relative_eq!(y, to.1, epsilon = 1e-6);
    }

    #[test]
    fn maps_the_correspondences() {
        let src = [(0.0, 0.0), (400.0, 0.0), (400.0, 600.0), (0.0, 600.0)];
        let dst = [(120.0, 80.0), (510.0, 95.0), (540.0, 700.0), (90.0, 650.0)];
        let h = Homography::from_4pt(&src, &dst).unwrap();
        for (s, d) in src.iter().zip(dst.iter()) {
            assert_maps(&h, *s, *d);
        }
        assert_relative_eq!(h.matrix()[(2, 2)], 1.0);
    }

    #[test]
    fn recovers_known_transform() {
        let truth = Homography::new(Matrix3::new(
            0.8, 0.05, 120.0, //
            -0.02, 1.1, 80.0, //
            0.0009, -0.0004, 1.0,
        ));
        let src = [(0.0, 0.0), (100.0, 0.0), (100.0, 100.0), (0.0, 100.0)];
        let dst = src.map(|(x, y)| truth.apply(x, y).unwrap());
        let h = Homography::from_4pt(&src, &dst).unwrap();
        for r in 0..3 {
            for c in 0..3 {
                assert_relative_eq!(h.matrix()[(r, c)], truth.matrix()[(r, c)], epsilon = 1e-6);
            }
        }
    }

    #[test]
    fn identical_rectangles_give_identity() {
        let pts = [(0.0, 0.0), (64.0, 0.0), (64.0, 48.0), (0.0, 48.0)];
        let h = Homography::from_4pt(&pts, &pts).unwrap();
        assert_maps(&h, (17.5, 33.25), (17.5, 33.25));
    }

    #[test]
    fn collinear_destination_is_degenerate() {
        let src = [(0.0, 0.0), (10.0, 0.0), (10.0, 10.0), (0.0, 10.0)];
        let dst = [(0.0, 0.0), (5.0, 0.0), (10.0, 0.0), (15.0, 0.0)];
        let err = Homography::from_4pt(&src, &dst).unwrap_err();
        assert!(matches!(err, ScanError::DegenerateGeometry(_)));
    }

    #[test]
    fn coincident_points_are_degenerate() {
        let src = [(0.0, 0.0), (10.0, 0.0), (10.0, 10.0), (0.0, 10.0)];
        let dst = [(3.0, 3.0); 4];
        assert!(Homography::from_4pt(&src, &dst).is_err());
    }
}
