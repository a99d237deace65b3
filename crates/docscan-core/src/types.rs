// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Core domain types for the document scanner.

use std::str::FromStr;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::ScanError;

/// Unique identifier for a scan request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ScanId(pub Uuid);

impl ScanId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for ScanId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for ScanId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Where the caller wants the photograph to come from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ScanSource {
    /// Live camera capture.
    Camera,
    /// Pick an existing photo.
    Gallery,
    /// Ask the user at runtime.
    Select,
}

impl ScanSource {
    /// The concrete source, if it was fixed up front.
    pub fn preselected(&self) -> Option<AcquireSource> {
        match self {
            Self::Camera => Some(AcquireSource::Camera),
            Self::Gallery => Some(AcquireSource::Gallery),
            Self::Select => None,
        }
    }

    /// Capabilities that must be granted before a scan from this source.
    pub fn required_capabilities(&self) -> &'static [Capability] {
        match self {
            Self::Camera => &[Capability::Camera, Capability::WriteStorage],
            Self::Gallery => &[Capability::ReadStorage, Capability::WriteStorage],
            Self::Select => &[
                Capability::Camera,
                Capability::ReadStorage,
                Capability::WriteStorage,
            ],
        }
    }
}

impl FromStr for ScanSource {
    type Err = ScanError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "camera" => Ok(Self::Camera),
            "gallery" => Ok(Self::Gallery),
            "select" => Ok(Self::Select),
            _ => Err(ScanError::InvalidSource(s.to_owned())),
        }
    }
}

impl std::fmt::Display for ScanSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Self::Camera => "camera",
            Self::Gallery => "gallery",
            Self::Select => "select",
        };
        f.write_str(name)
    }
}

/// A concrete acquisition source, after any runtime choice has been made.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AcquireSource {
    Camera,
    Gallery,
}

/// Device capabilities a scan may need.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Capability {
    Camera,
    ReadStorage,
    WriteStorage,
}

/// Lifecycle stages of a scan session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ScanStage {
    /// Created, nothing requested yet.
    Idle,
    /// Waiting for the user to pick camera or gallery.
    SourceSelection,
    /// Waiting for the camera or gallery to hand over an image.
    Acquiring,
    /// Searching the image for a document boundary.
    Detecting,
    /// Waiting for the user to accept or edit the corners.
    AwaitingConfirmation,
    /// Applying the perspective correction.
    Rectifying,
    /// Encoding and persisting the corrected image.
    Exporting,
    /// Path delivered.
    Completed,
    /// Error delivered.
    Failed,
    /// User backed out.
    Cancelled,
    /// Required permissions were not granted.
    Aborted,
}

impl ScanStage {
    /// Whether the completion slot has been (or is being) filled.
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            Self::Completed | Self::Failed | Self::Cancelled | Self::Aborted
        )
    }
}

/// Encoded output format for the rectified page.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    #[default]
    Jpeg,
    Png,
}

impl OutputFormat {
    /// File extension without the dot.
    pub fn extension(&self) -> &'static str {
        match self {
            Self::Jpeg => "jpg",
            Self::Png => "png",
        }
    }
}

/// Sampling used when rasterizing the rectified page.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum InterpolationMode {
    Nearest,
    #[default]
    Bilinear,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_known_sources_case_insensitively() {
        assert_eq!("camera".parse::<ScanSource>().unwrap(), ScanSource::Camera);
        assert_eq!(" Gallery ".parse::<ScanSource>().unwrap(), ScanSource::Gallery);
        assert_eq!("SELECT".parse::<ScanSource>().unwrap(), ScanSource::Select);
    }

    #[test]
    fn rejects_unknown_source() {
        let err = "scanner".parse::<ScanSource>().unwrap_err();
        assert!(matches!(err, ScanError::InvalidSource(ref s) if s == "scanner"));
    }

    #[test]
    fn select_needs_every_capability() {
        let caps = ScanSource::Select.required_capabilities();
        assert_eq!(caps.len(), 3);
        assert!(!ScanSource::Camera
            .required_capabilities()
            .contains(&Capability::ReadStorage));
    }

    #[test]
    fn terminal_stages() {
        for stage in [
            ScanStage::Completed,
            ScanStage::Failed,
            ScanStage::Cancelled,
            ScanStage::Aborted,
        ] {
            assert!(stage.is_terminal(), "{stage:?}");
        }
        assert!(!ScanStage::Exporting.is_terminal());
    }

    #[test]
    fn output_format_extensions() {
        assert_eq!(OutputFormat::default().extension(), "jpg");
        assert_eq!(OutputFormat::Png.extension(), "png");
    }
}
