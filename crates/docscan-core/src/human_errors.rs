// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Human-readable error messages for the scanning UI.
//
// Every technical error is mapped to plain English with a clear suggestion.
// The severity drives how a UI presents the failure.

use crate::error::ScanError;

/// Severity of an error from the user's perspective.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    /// Worth simply trying again.
    Transient,
    /// User must do something first (grant access, pick another photo).
    ActionRequired,
    /// Retrying the same input will not help.
    Permanent,
}

/// A human-readable error with plain English message and actionable suggestion.
#[derive(Debug, Clone)]
pub struct HumanError {
    /// Plain English summary (shown as a heading).
    pub message: String,
    /// What the user should try (shown as body text).
    pub suggestion: String,
    /// Whether offering a "Try again" button makes sense.
    pub retriable: bool,
    /// Severity level (drives icon/colour in UI).
    pub severity: Severity,
}

/// Convert a `ScanError` into a `HumanError`.
pub fn humanize_error(err: &ScanError) -> HumanError {
    match err {
        // -- Input --
        ScanError::InvalidImage(_) => HumanError {
            message: "We couldn't read this photo.".into(),
            suggestion: "The image may be damaged or in an unusual format. Try taking the photo again or choosing a JPEG or PNG.".into(),
            retriable: false,
            severity: Severity::Permanent,
        },

        ScanError::InvalidSource(source) => HumanError {
            message: "That isn't a place we can scan from.".into(),
            suggestion: format!("Choose the camera, the gallery, or let us ask. (Requested: {source})"),
            retriable: false,
            severity: Severity::Permanent,
        },

        // -- Geometry --
        ScanError::DegenerateGeometry(_) => HumanError {
            message: "The page corners don't make a usable shape.".into(),
            suggestion: "Drag the corners so they sit on the four corners of the page, without crossing each other.".into(),
            retriable: false,
            severity: Severity::ActionRequired,
        },

        // -- Acquisition --
        ScanError::Acquisition(_) => HumanError {
            message: "We couldn't get a photo.".into(),
            suggestion: "Try again. If you're using the camera, make sure no other app is using it.".into(),
            retriable: true,
            severity: Severity::Transient,
        },

        ScanError::NoImageData => HumanError {
            message: "The photo came back empty.".into(),
            suggestion: "Try taking the photo again.".into(),
            retriable: true,
            severity: Severity::Transient,
        },

        ScanError::SurfaceUnavailable => HumanError {
            message: "The scanner couldn't open.".into(),
            suggestion: "Return to the app and try scanning again.".into(),
            retriable: true,
            severity: Severity::Transient,
        },

        ScanError::PlatformUnavailable => HumanError {
            message: "This feature isn't available on your device.".into(),
            suggestion: "Try choosing a photo from the gallery instead.".into(),
            retriable: false,
            severity: Severity::Permanent,
        },

        ScanError::PermissionDenied(_) => HumanError {
            message: "The scanner isn't allowed to use the camera or photos.".into(),
            suggestion: "Open your device settings and allow camera and photo access for this app.".into(),
            retriable: false,
            severity: Severity::ActionRequired,
        },

        // -- Export --
        ScanError::Encoding(_) => HumanError {
            message: "We couldn't save the scanned page as an image.".into(),
            suggestion: "Try again, or switch the output format to PNG in the settings.".into(),
            retriable: true,
            severity: Severity::Transient,
        },

        ScanError::Storage(_) | ScanError::IntegrityMismatch { .. } => HumanError {
            message: "We couldn't save the scanned page.".into(),
            suggestion: "Try again. If this keeps happening, your device's storage may be full.".into(),
            retriable: true,
            severity: Severity::Transient,
        },

        ScanError::Io(io_err) => {
            if io_err.kind() == std::io::ErrorKind::PermissionDenied {
                HumanError {
                    message: "The app doesn't have permission to write the scan.".into(),
                    suggestion: "Check that the output folder is writable, or choose a different one.".into(),
                    retriable: false,
                    severity: Severity::ActionRequired,
                }
            } else {
                HumanError {
                    message: "There was a problem reading or writing a file.".into(),
                    suggestion: "Try again. If this keeps happening, your device's storage may be full.".into(),
                    retriable: true,
                    severity: Severity::Transient,
                }
            }
        }

        // -- Configuration --
        ScanError::Serialization(_) => HumanError {
            message: "The scanner settings file couldn't be read.".into(),
            suggestion: "Fix or delete the settings file to go back to the defaults.".into(),
            retriable: false,
            severity: Severity::ActionRequired,
        },

        // -- Session --
        ScanError::InvalidTransition { .. } | ScanError::Internal(_) => HumanError {
            message: "The scanner had an internal problem.".into(),
            suggestion: "Try again. If this keeps happening, please report it.".into(),
            retriable: true,
            severity: Severity::Transient,
        },
    }
}
