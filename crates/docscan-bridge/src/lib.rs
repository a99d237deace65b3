// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// docscan-bridge — Collaborator abstractions for the scan session.
//
// The session never touches a camera, a dialog, or the filesystem directly.
// It goes through the traits defined here; `DesktopBridge` is the
// filesystem-backed implementation used by the CLI and in CI.

pub mod desktop;
pub mod storage;
pub mod traits;

pub use desktop::DesktopBridge;
pub use storage::TempDirStorage;
pub use traits::{
    Acquisition, Confirmation, ImageAcquirer, PermissionGate, QuadConfirmer, ScanBridge, ScanStorage,
    SourcePicker,
};
