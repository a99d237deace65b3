// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Unified error types for docscan.

use thiserror::Error;

use crate::types::ScanStage;

/// Top-level error type for all docscan operations.
///
/// Cancellation is deliberately absent: a user backing out of a scan is an
/// outcome, not a failure.
#[derive(Debug, Error)]
pub enum ScanError {
    // -- Input --
    #[error("invalid image: {0}")]
    InvalidImage(String),

    #[error("unrecognised scan source: {0:?} (expected camera, gallery or select)")]
    InvalidSource(String),

    // -- Geometry --
    #[error("degenerate geometry: {0}")]
    DegenerateGeometry(String),

    // -- Acquisition --
    #[error("image acquisition failed: {0}")]
    Acquisition(String),

    #[error("no image data found")]
    NoImageData,

    #[error("no interactive surface available to present on")]
    SurfaceUnavailable,

    #[error("feature not available on this platform")]
    PlatformUnavailable,

    #[error("permission denied: {0}")]
    PermissionDenied(String),

    // -- Export --
    #[error("image encoding failed: {0}")]
    Encoding(String),

    #[error("storage failed: {0}")]
    Storage(String),

    #[error("written file does not match: expected {expected}, got {actual}")]
    IntegrityMismatch { expected: String, actual: String },

    #[error("file I/O error: {0}")]
    Io(#[from] std::io::Error),

    // -- Configuration --
    #[error("configuration error: {0}")]
    Serialization(#[from] serde_json::Error),

    // -- Session --
    #[error("invalid transition: {event} while {from:?}")]
    InvalidTransition { from: ScanStage, event: String },

    #[error("internal error: {0}")]
    Internal(String),
}

/// Machine-readable classification of a [`ScanError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    InvalidImage,
    InvalidSource,
    DegenerateGeometry,
    AcquisitionError,
    PermissionDenied,
    EncodingError,
    StorageError,
    Config,
    Internal,
}

impl ErrorKind {
    /// Stable error code handed across the caller boundary.
    pub fn code(&self) -> &'static str {
        match self {
            Self::InvalidImage => "E_INVALID_IMAGE",
            Self::InvalidSource => "E_INVALID_SOURCE",
            Self::DegenerateGeometry => "E_DEGENERATE_GEOMETRY",
            Self::AcquisitionError => "E_ACQUISITION",
            Self::PermissionDenied => "E_PERMISSION_DENIED",
            Self::EncodingError => "E_ENCODING",
            Self::StorageError => "E_STORAGE",
            Self::Config => "E_CONFIG",
            Self::Internal => "E_INTERNAL",
        }
    }
}

impl ScanError {
    /// Classify this error.
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::InvalidImage(_) => ErrorKind::InvalidImage,
            Self::InvalidSource(_) => ErrorKind::InvalidSource,
            Self::DegenerateGeometry(_) => ErrorKind::DegenerateGeometry,
            Self::Acquisition(_)
            | Self::NoImageData
            | Self::SurfaceUnavailable
            | Self::PlatformUnavailable => ErrorKind::AcquisitionError,
            Self::PermissionDenied(_) => ErrorKind::PermissionDenied,
            Self::Encoding(_) => ErrorKind::EncodingError,
            Self::Storage(_) | Self::IntegrityMismatch { .. } | Self::Io(_) => {
                ErrorKind::StorageError
            }
            Self::Serialization(_) => ErrorKind::Config,
            Self::InvalidTransition { .. } | Self::Internal(_) => ErrorKind::Internal,
        }
    }

    /// The variant's own code where it has one, otherwise the kind's
    /// code.
    pub fn code(&self) -> &'static str {
        match self {
            Self::NoImageData => "E_NO_IMAGE_DATA_FOUND",
            Self::SurfaceUnavailable => "E_SURFACE_UNAVAILABLE",
            Self::PlatformUnavailable => "E_PLATFORM_UNAVAILABLE",
            other => other.kind().code(),
        }
    }
}

/// Alias used throughout the codebase.
pub type Result<T> = std::result::Result<T, ScanError>;
