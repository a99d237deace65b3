// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// docscan-document — Document geometry for the docscan engine.
//
// Provides coordinate-tagged points and canonically ordered quadrilaterals,
// document boundary detection (contour and Hough strategies), perspective
// rectification via a four-point homography, and page encoding with SHA-256
// fingerprints.

pub mod detect;
pub mod encode;
pub mod geometry;
pub mod image;
pub mod integrity;
pub mod rectify;

// Re-export the primary types so callers can use `docscan_document::Quadrilateral` etc.
pub use detect::{DetectionCandidate, DetectionStrategy, DocumentDetector, QuadDetector};
pub use encode::{EncodedImage, encode_image};
pub use geometry::{CoordinateSpace, Corner, Point2D, Quadrilateral, order_corners};
pub use crate::image::{ColorFormat, RasterImage};
pub use rectify::{Homography, PerspectiveRectifier};
