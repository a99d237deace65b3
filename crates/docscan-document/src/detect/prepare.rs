// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Working-image preparation shared by every detection strategy.

use docscan_core::config::DetectorConfig;
use image::{GrayImage, Luma};
use imageproc::distance_transform::Norm;
use imageproc::edges::canny;
use imageproc::filter::gaussian_blur_f32;
use imageproc::morphology::dilate;
use tracing::{debug, instrument};

use crate::image::RasterImage;

/// Radius (L-infinity) by which Canny edges are grown into the support map.
const SUPPORT_RADIUS: u8 = 2;

/// Downscaled, filtered views of an input image.
///
/// Coordinates in these images are "working" coordinates; multiplying by
/// `scale` maps them back onto the full-resolution source.
pub struct PreparedImage {
    /// Blurred grayscale.
    pub gray: GrayImage,
    /// Canny edge map.
    pub edges: GrayImage,
    /// Edge map dilated so that edges one or two pixels off still count.
    pub support: GrayImage,
    /// Otsu-binarized grayscale (foreground = 255).
    pub mask: GrayImage,
    /// Full-resolution pixels per working pixel.
    pub scale: f64,
}

impl PreparedImage {
    #[instrument(skip_all, fields(width = image.width(), height = image.height()))]
    pub fn new(image: &RasterImage, cfg: &DetectorConfig) -> Self {
        let (gray, scale) = image.working_gray(cfg.max_working_side);
        let blurred = gaussian_blur_f32(&gray, cfg.blur_sigma.max(0.1));
        let edges = canny(&blurred, cfg.canny_low, cfg.canny_high);
        let support = dilate(&edges, Norm::LInf, SUPPORT_RADIUS);

        let threshold = otsu_threshold(&blurred);
        let mask = binarize(&blurred, threshold);

        debug!(
            working_w = gray.width(),
            working_h = gray.height(),
            scale,
            threshold,
            "Working image prepared"
        );

        Self {
            gray: blurred,
            edges,
            support,
            mask,
            scale,
        }
    }

    pub fn width(&self) -> u32 {
        self.gray.width()
    }

    pub fn height(&self) -> u32 {
        self.gray.height()
    }

    /// Whether the support map has an edge at continuous position `(x, y)`.
    pub fn supported_at(&self, x: f64, y: f64) -> bool {
        if !(x >= 0.0 && y >= 0.0) {
            return false;
        }
        let (px, py) = (x.floor() as u32, y.floor() as u32);
        px < self.support.width() && py < self.support.height() && self.support.get_pixel(px, py).0[0] > 0
    }
}

/// Pixels at or above `threshold` become 255, the rest 0.
pub(crate) fn binarize(gray: &GrayImage, threshold: u8) -> GrayImage {
    let (width, height) = gray.dimensions();
    let mut output = GrayImage::new(width, height);
    for (x, y, pixel) in gray.enumerate_pixels() {
        let binary = if pixel.0[0] < threshold { 0u8 } else { 255u8 };
        output.put_pixel(x, y, Luma([binary]));
    }
    output
}

/// Swap foreground and background of a binary mask.
pub(crate) fn invert(mask: &GrayImage) -> GrayImage {
    let mut output = mask.clone();
    for pixel in output.pixels_mut() {
        pixel.0[0] = 255 - pixel.0[0];
    }
    output
}

/// Compute the Otsu threshold for a grayscale image.
///
/// Finds the threshold value that maximises the between-class variance of
/// the dark and bright pixel groups.
pub(crate) fn otsu_threshold(gray: &GrayImage) -> u8 {
    let mut histogram = [0u64; 256];
    for pixel in gray.pixels() {
        histogram[pixel.0[0] as usize] += 1;
    }

    let total_pixels = gray.width() as u64 * gray.height() as u64;
    if total_pixels == 0 {
        return 128;
    }

    let sum_total: f64 = histogram
        .iter()
        .enumerate()
        .map(|(i, &count)| i as f64 * count as f64)
        .sum();

    let mut sum_background: f64 = 0.0;
    let mut weight_background: u64 = 0;
    let mut max_variance: f64 = 0.0;
    let mut best_threshold: u8 = 0;

    for (t, &count) in histogram.iter().enumerate() {
        weight_background += count;
        if weight_background == 0 {
            continue;
        }
        let weight_foreground = total_pixels - weight_background;
        if weight_foreground == 0 {
            break;
        }

        sum_background += t as f64 * count as f64;
        let mean_background = sum_background / weight_background as f64;
        let mean_foreground = (sum_total - sum_background) / weight_foreground as f64;

        let between_variance = weight_background as f64
            * weight_foreground as f64
            * (mean_background - mean_foreground).powi(2);

        if between_variance > max_variance {
            max_variance = between_variance;
            // Pixels equal to `t` belong to the dark class.
            best_threshold = (t + 1).min(255) as u8;
        }
    }

    best_threshold
}
