// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Command-line arguments.

use std::path::PathBuf;

use clap::{Parser, ValueEnum};
use docscan_core::config::ScanConfig;
use docscan_core::error::Result;
use docscan_core::types::{OutputFormat, ScanSource};
use docscan_document::Quadrilateral;

#[derive(Debug, Parser)]
#[command(name = "docscan")]
#[command(about = "Find the document in a photo, straighten it, and save the page")]
#[command(version)]
pub struct Cli {
    /// Photo to scan.
    pub image: PathBuf,

    /// Where the photo comes from. The desktop has no camera, so `camera`
    /// always fails; `select` picks the gallery.
    #[arg(long, value_enum, default_value_t = SourceArg::Gallery)]
    pub source: SourceArg,

    /// Directory for the scanned page [default: the docscan data directory].
    #[arg(long)]
    pub out_dir: Option<PathBuf>,

    /// Output format [default: from config, otherwise jpeg].
    #[arg(long, value_enum)]
    pub format: Option<FormatArg>,

    /// JPEG quality, 1-100.
    #[arg(long, value_parser = clap::value_parser!(u8).range(1..=100))]
    pub quality: Option<u8>,

    /// Use these corners instead of the detected ones: x,y,x,y,x,y,x,y in
    /// pixels, any order.
    #[arg(long, value_parser = parse_corners)]
    pub corners: Option<Quadrilateral>,

    /// JSON config file.
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Print the full result as JSON instead of just the path.
    #[arg(long)]
    pub json: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum SourceArg {
    Camera,
    Gallery,
    Select,
}

impl From<SourceArg> for ScanSource {
    fn from(arg: SourceArg) -> Self {
        match arg {
            SourceArg::Camera => Self::Camera,
            SourceArg::Gallery => Self::Gallery,
            SourceArg::Select => Self::Select,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum FormatArg {
    Jpeg,
    Png,
}

impl From<FormatArg> for OutputFormat {
    fn from(arg: FormatArg) -> Self {
        match arg {
            FormatArg::Jpeg => Self::Jpeg,
            FormatArg::Png => Self::Png,
        }
    }
}

impl Cli {
    /// The config file (or defaults) with command-line overrides applied.
    pub fn scan_config(&self) -> Result<ScanConfig> {
        let mut config = match &self.config {
            Some(path) => ScanConfig::load(path)?,
            None => ScanConfig::default(),
        };
        if let Some(format) = self.format {
            config.export.format = format.into();
        }
        if let Some(quality) = self.quality {
            config.export.jpeg_quality = quality;
        }
        Ok(config)
    }
}

fn parse_corners(arg: &str) -> std::result::Result<Quadrilateral, String> {
    let values = arg
        .split(',')
        .map(|v| v.trim().parse::<f64>().map_err(|e| format!("{v:?}: {e}")))
        .collect::<std::result::Result<Vec<_>, _>>()?;
    let &[x0, y0, x1, y1, x2, y2, x3, y3] = values.as_slice() else {
        return Err(format!("expected 8 comma-separated numbers, got {}", values.len()));
    };
    Quadrilateral::from_pixel_coords([(x0, y0), (x1, y1), (x2, y2), (x3, y3)]).map_err(|e| e.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let cli = Cli::try_parse_from(["docscan", "photo.jpg"]).unwrap();
        assert_eq!(cli.image, PathBuf::from("photo.jpg"));
        assert_eq!(cli.source, SourceArg::Gallery);
        assert!(cli.corners.is_none() && cli.out_dir.is_none() && !cli.json);

        let config = cli.scan_config().unwrap();
        assert_eq!(config.export.format, OutputFormat::Jpeg);
        assert_eq!(config.export.jpeg_quality, 100);
    }

    #[test]
    fn overrides_apply_on_top_of_the_config_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("docscan.json");
        std::fs::write(&path, r#"{ "export": { "format": "png", "verify_written": false } }"#).unwrap();

        let cli = Cli::try_parse_from([
            "docscan",
            "photo.jpg",
            "--config",
            path.to_str().unwrap(),
            "--quality",
            "85",
        ])
        .unwrap();
        let config = cli.scan_config().unwrap();
        assert_eq!(config.export.format, OutputFormat::Png);
        assert_eq!(config.export.jpeg_quality, 85);
        assert!(!config.export.verify_written);

        let cli = Cli::try_parse_from(["docscan", "p.jpg", "--config", path.to_str().unwrap(), "--format", "jpeg"])
            .unwrap();
        assert_eq!(cli.scan_config().unwrap().export.format, OutputFormat::Jpeg);
    }

    #[test]
    fn quality_is_range_checked() {
        assert!(Cli::try_parse_from(["docscan", "p.jpg", "--quality", "0"]).is_err());
        assert!(Cli::try_parse_from(["docscan", "p.jpg", "--quality", "101"]).is_err());
    }

    #[test]
    fn corners_in_any_order() {
        let cli = Cli::try_parse_from(["docscan", "p.jpg", "--corners", "300,400, 10,400, 300,20, 10,20"]).unwrap();
        let quad = cli.corners.unwrap();
        assert_eq!(quad.to_array(), [(10.0, 20.0), (300.0, 20.0), (300.0, 400.0), (10.0, 400.0)]);
    }

    #[test]
    fn bad_corners_are_rejected() {
        assert!(parse_corners("1,2,3").is_err());
        assert!(parse_corners("a,0,10,0,10,10,0,10").is_err());
        assert!(parse_corners("0,0,5,5,10,10,15,15").is_err());
    }

    #[test]
    fn unknown_source_is_a_usage_error() {
        assert!(Cli::try_parse_from(["docscan", "p.jpg", "--source", "scanner"]).is_err());
        let cli = Cli::try_parse_from(["docscan", "p.jpg", "--source", "select"]).unwrap();
        assert_eq!(ScanSource::from(cli.source), ScanSource::Select);
    }
}
