// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// What a scan request finally delivers.

use std::path::PathBuf;

use docscan_core::error::{Result, ScanError};
use docscan_core::types::{OutputFormat, ScanId};
use docscan_document::Quadrilateral;
use serde::Serialize;

/// Code reported when the user backs out at any interactive step.
pub const CANCELLED_CODE: &str = "E_PICKER_CANCELLED";

/// Code reported when the permission gate says no.
pub const PERMISSION_DENIED_CODE: &str = "E_PERMISSION_DENIED";

/// A rectified page that was written and verified.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScanResult {
    pub id: ScanId,
    pub path: PathBuf,
    pub width: u32,
    pub height: u32,
    pub format: OutputFormat,
    /// Lowercase hex SHA-256 of the stored file.
    pub sha256: String,
    /// `false` when no boundary was found and the full frame was offered.
    pub auto_detected: bool,
    pub detection_score: Option<f64>,
    /// Corners the page was rectified from, in source pixel space.
    pub quad: Quadrilateral,
}

/// The single terminal result of a scan request.
#[derive(Debug)]
pub enum ScanOutcome {
    Completed(ScanResult),
    Failed(ScanError),
    /// The user dismissed a dialog, the camera, the gallery or the editor,
    /// or the caller cancelled.
    Cancelled,
    PermissionDenied,
}

impl ScanOutcome {
    /// Stable code for every non-success outcome.
    pub fn code(&self) -> Option<&'static str> {
        match self {
            Self::Completed(_) => None,
            Self::Failed(err) => Some(err.code()),
            Self::Cancelled => Some(CANCELLED_CODE),
            Self::PermissionDenied => Some(PERMISSION_DENIED_CODE),
        }
    }

    pub fn is_completed(&self) -> bool {
        matches!(self, Self::Completed(_))
    }

    /// Collapse to the convenience form: the result, nothing for the two
    /// quiet endings, or the error.
    pub fn into_result(self) -> Result<Option<ScanResult>> {
        match self {
            Self::Completed(result) => Ok(Some(result)),
            Self::Cancelled | Self::PermissionDenied => Ok(None),
            Self::Failed(err) => Err(err),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn codes() {
        assert_eq!(ScanOutcome::Cancelled.code(), Some("E_PICKER_CANCELLED"));
        assert_eq!(ScanOutcome::PermissionDenied.code(), Some("E_PERMISSION_DENIED"));
        assert_eq!(
            ScanOutcome::Failed(ScanError::DegenerateGeometry("flat".into())).code(),
            Some("E_DEGENERATE_GEOMETRY")
        );
    }

    #[test]
    fn quiet_endings_are_not_errors() {
        assert!(ScanOutcome::Cancelled.into_result().unwrap().is_none());
        assert!(ScanOutcome::PermissionDenied.into_result().unwrap().is_none());
        assert!(ScanOutcome::Failed(ScanError::NoImageData).into_result().is_err());
    }

    #[test]
    fn result_serializes_to_json() {
        let result = ScanResult {
            id: ScanId::new(),
            path: PathBuf::from("/tmp/scan-1.jpg"),
            width: 100,
            height: 140,
            format: OutputFormat::Jpeg,
            sha256: "ab".repeat(32),
            auto_detected: true,
            detection_score: Some(0.9),
            quad: Quadrilateral::full_frame(100, 140),
        };
        let json = serde_json::to_value(&result).unwrap();
        assert_eq!(json["format"], "jpeg");
        assert_eq!(json["auto_detected"], true);
        assert!(json["quad"].is_array());
        assert_eq!(ScanOutcome::Completed(result).code(), None);
    }
}
