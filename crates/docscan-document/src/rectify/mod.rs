// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Perspective rectification: map a confirmed quadrilateral onto an upright
// rectangle.

pub mod homography;
mod warp;

use docscan_core::config::RectifyConfig;
use docscan_core::error::{Result, ScanError};
use image::DynamicImage;
use tracing::{debug, info, instrument};

pub use homography::Homography;

use crate::geometry::Quadrilateral;
use crate::image::RasterImage;
use warp::{warp_perspective, white};

/// Warps the region inside a quadrilateral to a flat page.
#[derive(Debug, Clone, Default)]
pub struct PerspectiveRectifier {
    config: RectifyConfig,
}

impl PerspectiveRectifier {
    pub fn new(config: RectifyConfig) -> Self {
        Self { config }
    }

    /// Output dimensions for `quad`: the longer of each pair of opposite
    /// sides, capped at `max_output_side` with the aspect ratio kept.
    pub fn output_size(&self, quad: &Quadrilateral) -> (u32, u32) {
        let [top, right, bottom, left] = quad.side_lengths();
        let w = top.max(bottom).round().max(1.0);
        let h = left.max(right).round().max(1.0);

        let cap = self.config.max_output_side.max(1) as f64;
        let longest = w.max(h);
        if longest <= cap {
            return (w as u32, h as u32);
        }
        let factor = cap / longest;
        (
            (w * factor).round().max(1.0) as u32,
            (h * factor).round().max(1.0) as u32,
        )
    }

    /// Rectify `image` to the page bounded by `quad`.
    ///
    /// Cartesian quadrilaterals are interpreted against the image height.
    /// Fails with `DegenerateGeometry`, producing nothing, when the quad is
    /// concave, negligible for the image, or yields a singular transform.
    #[instrument(skip_all, fields(width = image.width(), height = image.height()))]
    pub fn rectify(&self, image: RasterImage, quad: &Quadrilateral) -> Result<RasterImage> {
        let (src_w, src_h) = image.dimensions();
        let quad = quad.to_pixel(src_h as f64);

        if !quad.is_convex() {
            return Err(ScanError::DegenerateGeometry(
                "quadrilateral is not convex".into(),
            ));
        }
        quad.validate_for(src_w, src_h)?;

        let (out_w, out_h) = self.output_size(&quad);
        let (w, h) = (out_w as f64, out_h as f64);
        let rect = [(0.0, 0.0), (w, 0.0), (w, h), (0.0, h)];
        let src_from_dst = Homography::from_4pt(&rect, &quad.to_array())?;
        debug!(out_w, out_h, h = ?src_from_dst.matrix(), "Homography solved");

        let mode = self.config.interpolation;
        let warped = match image.into_dynamic() {
            DynamicImage::ImageLuma8(buf) => {
                DynamicImage::ImageLuma8(warp_perspective(&buf, &src_from_dst, out_w, out_h, mode, white()))
            }
            DynamicImage::ImageLumaA8(buf) => {
                DynamicImage::ImageLumaA8(warp_perspective(&buf, &src_from_dst, out_w, out_h, mode, white()))
            }
            DynamicImage::ImageRgb8(buf) => {
                DynamicImage::ImageRgb8(warp_perspective(&buf, &src_from_dst, out_w, out_h, mode, white()))
            }
            DynamicImage::ImageRgba8(buf) => {
                DynamicImage::ImageRgba8(warp_perspective(&buf, &src_from_dst, out_w, out_h, mode, white()))
            }
            other => DynamicImage::ImageRgba8(warp_perspective(
                &other.to_rgba8(),
                &src_from_dst,
                out_w,
                out_h,
                mode,
                white(),
            )),
        };

        info!(out_w, out_h, ?mode, "Perspective correction applied");
        RasterImage::from_dynamic(warped)
    }
}
