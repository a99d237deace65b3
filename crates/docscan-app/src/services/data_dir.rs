// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Default output location for scanned pages.

use std::io;
use std::path::{Path, PathBuf};

/// `$XDG_DATA_HOME/docscan/scans`, or the same under `~/.local/share`,
/// created if missing.
pub fn default_scan_dir() -> io::Result<PathBuf> {
    scan_dir_under(&data_home())
}

fn scan_dir_under(base: &Path) -> io::Result<PathBuf> {
    let dir = base.join("docscan").join("scans");
    std::fs::create_dir_all(&dir)?;
    Ok(dir)
}

fn data_home() -> PathBuf {
    std::env::var_os("XDG_DATA_HOME")
        .filter(|xdg| !xdg.is_empty())
        .map(PathBuf::from)
        .or_else(|| std::env::var_os("HOME").map(|home| PathBuf::from(home).join(".local").join("share")))
        .unwrap_or_else(std::env::temp_dir)
}
