// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Platform-agnostic trait definitions for the scan collaborators.
//
// A scan session only ever talks to the outside world through these traits:
// a dialog that picks the source, a camera or gallery that hands over an
// image, a corner editor, a storage location, and the permission system.

use std::future::Future;
use std::path::PathBuf;

use docscan_core::error::Result;
use docscan_core::types::{AcquireSource, Capability};
use docscan_document::{Quadrilateral, RasterImage};

/// Unified bridge that groups every collaborator a scan needs.
///
/// Platforms implement each capability trait; a platform that lacks one
/// (e.g. no camera on a desktop) returns `ScanError::PlatformUnavailable`.
pub trait ScanBridge:
    SourcePicker + ImageAcquirer + QuadConfirmer + ScanStorage + PermissionGate + Send + Sync + 'static
{
    /// Human-readable platform name (e.g. "Desktop", "iOS 17").
    fn platform_name(&self) -> &str;
}

/// Ask the user whether to use the camera or the gallery.
pub trait SourcePicker {
    /// `Ok(None)` if the user dismissed the dialog.
    fn choose_source(&self) -> impl Future<Output = Result<Option<AcquireSource>>> + Send;
}

/// What an acquisition surface handed back.
#[derive(Debug)]
pub enum Acquisition {
    Image(RasterImage),
    /// The user closed the camera or gallery without choosing.
    Cancelled,
}

/// Obtain a decoded photograph from the camera or the gallery.
pub trait ImageAcquirer {
    fn acquire(&self, source: AcquireSource) -> impl Future<Output = Result<Acquisition>> + Send;
}

/// The user's answer to a proposed boundary.
#[derive(Debug, Clone, PartialEq)]
pub enum Confirmation {
    /// Proposed corners kept as-is.
    Accepted(Quadrilateral),
    /// Corners moved in the editor; may be in cartesian space.
    Edited(Quadrilateral),
    Cancelled,
}

impl Confirmation {
    /// The final quadrilateral, unless the user cancelled.
    pub fn quad(&self) -> Option<&Quadrilateral> {
        match self {
            Self::Accepted(q) | Self::Edited(q) => Some(q),
            Self::Cancelled => None,
        }
    }
}

/// Present the image with a proposed boundary and let the user adjust it.
pub trait QuadConfirmer {
    fn confirm(
        &self,
        image: &RasterImage,
        proposed: &Quadrilateral,
    ) -> impl Future<Output = Result<Confirmation>> + Send;
}

/// Persist encoded bytes and report where they went.
pub trait ScanStorage {
    /// Write `bytes` to a fresh location with extension `extension` (no dot).
    /// A failed write must not leave a file at the returned path.
    fn allocate_and_write(
        &self,
        bytes: Vec<u8>,
        extension: &str,
    ) -> impl Future<Output = Result<PathBuf>> + Send;
}

/// Check (and if needed request) device permissions.
pub trait PermissionGate {
    /// `Ok(true)` when every capability is granted.
    fn ensure_granted(&self, capabilities: &[Capability]) -> impl Future<Output = Result<bool>> + Send;
}
