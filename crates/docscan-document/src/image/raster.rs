// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Raster image wrapper shared by detection, rectification, and export.

use docscan_core::error::{Result, ScanError};
use image::{DynamicImage, GrayImage, imageops::FilterType};
use tracing::{debug, info, instrument};

/// Pixel layout of a raster image.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColorFormat {
    Luma8,
    LumaA8,
    Rgb8,
    Rgba8,
    /// 16-bit or float layouts; rectification converts these to `Rgba8`.
    Other,
}

/// A decoded image with non-zero dimensions.
///
/// Ownership moves through the pipeline: the acquirer produces it, the
/// detector borrows it, and the rectifier consumes it.
#[derive(Debug, Clone)]
pub struct RasterImage {
    image: DynamicImage,
}

impl RasterImage {
    // -- Construction ---------------------------------------------------------

    /// Wrap an already-decoded image, rejecting zero-sized ones.
    pub fn from_dynamic(image: DynamicImage) -> Result<Self> {
        let raster = Self { image };
        raster.validate()?;
        Ok(raster)
    }

    /// Decode raw encoded bytes (JPEG, PNG, etc.).
    #[instrument(skip(data), fields(data_len = data.len()))]
    pub fn from_bytes(data: &[u8]) -> Result<Self> {
        if data.is_empty() {
            return Err(ScanError::NoImageData);
        }
        let image = image::load_from_memory(data)
            .map_err(|err| ScanError::InvalidImage(format!("failed to decode image: {err}")))?;
        debug!(
            width = image.width(),
            height = image.height(),
            "Image decoded from bytes"
        );
        Self::from_dynamic(image)
    }

    /// Load and decode an image file.
    #[instrument(skip_all, fields(path = %path.as_ref().display()))]
    pub fn open(path: impl AsRef<std::path::Path>) -> Result<Self> {
        let image = image::open(path.as_ref()).map_err(|err| {
            ScanError::InvalidImage(format!(
                "failed to open {}: {}",
                path.as_ref().display(),
                err
            ))
        })?;
        info!(width = image.width(), height = image.height(), "Image loaded");
        Self::from_dynamic(image)
    }

    // -- Accessors ------------------------------------------------------------

    pub fn width(&self) -> u32 {
        self.image.width()
    }

    pub fn height(&self) -> u32 {
        self.image.height()
    }

    pub fn dimensions(&self) -> (u32, u32) {
        (self.width(), self.height())
    }

    pub fn color_format(&self) -> ColorFormat {
        match &self.image {
            DynamicImage::ImageLuma8(_) => ColorFormat::Luma8,
            DynamicImage::ImageLumaA8(_) => ColorFormat::LumaA8,
            DynamicImage::ImageRgb8(_) => ColorFormat::Rgb8,
            DynamicImage::ImageRgba8(_) => ColorFormat::Rgba8,
            _ => ColorFormat::Other,
        }
    }

    pub fn as_dynamic(&self) -> &DynamicImage {
        &self.image
    }

    pub fn into_dynamic(self) -> DynamicImage {
        self.image
    }

    /// Fails with `InvalidImage` when either dimension is zero.
    pub fn validate(&self) -> Result<()> {
        if self.width() == 0 || self.height() == 0 {
            return Err(ScanError::InvalidImage(format!(
                "image has zero dimension ({}x{})",
                self.width(),
                self.height()
            )));
        }
        Ok(())
    }

    // -- Derived images -------------------------------------------------------

    /// Grayscale copy, downscaled so the longer side is at most `max_side`.
    /// Returns the copy and the factor that maps its coordinates back to
    /// this image.
    pub fn working_gray(&self, max_side: u32) -> (GrayImage, f64) {
        let gray = self.image.to_luma8();
        let longest = self.width().max(self.height());
        if max_side == 0 || longest <= max_side {
            return (gray, 1.0);
        }

        let factor = max_side as f64 / longest as f64;
        let w = ((self.width() as f64 * factor).round() as u32).max(1);
        let h = ((self.height() as f64 * factor).round() as u32).max(1);
        debug!(from_w = self.width(), from_h = self.height(), w, h, "Downscaling for detection");
        let small = image::imageops::resize(&gray, w, h, FilterType::Triangle);
        (small, self.width() as f64 / w as f64)
    }
}

impl From<RasterImage> for DynamicImage {
    fn from(raster: RasterImage) -> Self {
        raster.image
    }
}
