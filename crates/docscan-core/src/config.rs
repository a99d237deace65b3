// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Scanner configuration.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::types::{InterpolationMode, OutputFormat};

/// Persistent scanner settings.
///
/// Every section falls back to its defaults when absent from the JSON file,
/// so a config only needs to name what it changes.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ScanConfig {
    pub detector: DetectorConfig,
    pub rectify: RectifyConfig,
    pub export: ExportConfig,
    pub permissions: PermissionConfig,
}

impl ScanConfig {
    /// Read a config from a JSON file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let data = std::fs::read_to_string(path.as_ref())?;
        Ok(serde_json::from_str(&data)?)
    }

    /// Write this config as pretty-printed JSON.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let json = serde_json::to_string_pretty(self)?;
        std::fs::write(path.as_ref(), json)?;
        Ok(())
    }
}

/// Tuning for the quadrilateral detector.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DetectorConfig {
    /// Longer side of the working image; larger inputs are downscaled first.
    pub max_working_side: u32,
    /// Gaussian blur sigma applied before edge detection.
    pub blur_sigma: f32,
    /// Canny hysteresis thresholds.
    pub canny_low: f32,
    pub canny_high: f32,
    /// Smallest accepted quadrilateral, as a fraction of the frame area.
    pub min_area_ratio: f64,
    /// Every side must have at least this fraction of edge-supported samples.
    pub min_edge_support: f64,
    /// Lowest composite score returned as a candidate.
    pub min_score: f64,
    /// Upper bound on Hough lines kept per orientation.
    pub max_lines_per_axis: usize,
    /// Hough vote threshold as a fraction of the shorter working side.
    pub hough_vote_fraction: f64,
    /// Douglas-Peucker tolerance as a fraction of the contour perimeter.
    pub polygon_epsilon_fraction: f64,
}

impl Default for DetectorConfig {
    fn default() -> Self {
        Self {
            max_working_side: 800,
            blur_sigma: 2.0,
            canny_low: 30.0,
            canny_high: 90.0,
            min_area_ratio: 0.10,
            min_edge_support: 0.25,
            min_score: 0.5,
            max_lines_per_axis: 12,
            hough_vote_fraction: 0.2,
            polygon_epsilon_fraction: 0.02,
        }
    }
}

/// Tuning for the perspective rectifier.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RectifyConfig {
    pub interpolation: InterpolationMode,
    /// Longer output side is capped here; both sides shrink proportionally.
    pub max_output_side: u32,
}

impl Default for RectifyConfig {
    fn default() -> Self {
        Self {
            interpolation: InterpolationMode::Bilinear,
            max_output_side: 10_000,
        }
    }
}

/// Encoding and persistence of the rectified page.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ExportConfig {
    pub format: OutputFormat,
    /// JPEG quality (1-100); ignored for PNG.
    pub jpeg_quality: u8,
    /// Re-read the stored file and compare its SHA-256 digest.
    pub verify_written: bool,
}

impl Default for ExportConfig {
    fn default() -> Self {
        Self {
            format: OutputFormat::Jpeg,
            jpeg_quality: 100,
            verify_written: true,
        }
    }
}

/// Permission precondition handling.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PermissionConfig {
    /// Ask the permission gate before starting a scan.
    pub check_before_scan: bool,
}

impl Default for PermissionConfig {
    fn default() -> Self {
        Self {
            check_before_scan: true,
        }
    }
}
