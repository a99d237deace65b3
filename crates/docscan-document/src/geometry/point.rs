// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Points tagged with the coordinate space they live in.

use serde::{Deserialize, Serialize};

/// The frame a coordinate pair is expressed in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CoordinateSpace {
    /// Origin at the top-left pixel, y grows downward.
    Pixel,
    /// Origin at the bottom-left, y grows upward. Used by editing surfaces
    /// that follow the cartesian convention.
    Cartesian,
}

/// An immutable 2D point.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Point2D {
    x: f64,
    y: f64,
    space: CoordinateSpace,
}

impl Point2D {
    pub const fn new(x: f64, y: f64, space: CoordinateSpace) -> Self {
        Self { x, y, space }
    }

    /// A point in image-pixel space.
    pub const fn pixel(x: f64, y: f64) -> Self {
        Self::new(x, y, CoordinateSpace::Pixel)
    }

    /// A point in cartesian space.
    pub const fn cartesian(x: f64, y: f64) -> Self {
        Self::new(x, y, CoordinateSpace::Cartesian)
    }

    pub fn x(&self) -> f64 {
        self.x
    }

    pub fn y(&self) -> f64 {
        self.y
    }

    pub fn space(&self) -> CoordinateSpace {
        self.space
    }

    pub fn is_finite(&self) -> bool {
        self.x.is_finite() && self.y.is_finite()
    }

    /// Vertical coordinate measured downward from the top edge, whatever the
    /// space. Only differences of this value are meaningful for cartesian
    /// points, which is all corner ordering needs.
    pub(crate) fn y_down(&self) -> f64 {
        match self.space {
            CoordinateSpace::Pixel => self.y,
            CoordinateSpace::Cartesian => -self.y,
        }
    }

    /// Re-express this point in cartesian space for an image of `height`.
    pub fn to_cartesian(self, height: f64) -> Self {
        match self.space {
            CoordinateSpace::Pixel => Self::cartesian(self.x, height - self.y),
            CoordinateSpace::Cartesian => self,
        }
    }

    /// Re-express this point in pixel space for an image of `height`.
    pub fn to_pixel(self, height: f64) -> Self {
        match self.space {
            CoordinateSpace::Cartesian => Self::pixel(self.x, height - self.y),
            CoordinateSpace::Pixel => self,
        }
    }

    /// Scale both axes, keeping the space. Only meaningful in pixel space or
    /// when the cartesian origin scales along with the image.
    pub fn scaled(self, sx: f64, sy: f64) -> Self {
        Self::new(self.x * sx, self.y * sy, self.space)
    }

    pub fn distance_to(&self, other: &Self) -> f64 {
        (self.x - other.x).hypot(self.y - other.y)
    }
}
