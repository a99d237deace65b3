// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Directory-backed scan storage with write-then-rename discipline.

use std::future::Future;
use std::io::Write;
use std::path::{Path, PathBuf};

use docscan_core::error::{Result, ScanError};
use tracing::{debug, instrument};
use uuid::Uuid;

use crate::traits::ScanStorage;

/// Writes each scan to `scan-<uuid>.<ext>` inside a directory.
///
/// Bytes go to a hidden temporary file in the same directory first, are
/// synced, and only then renamed into place, so a reader never sees a
/// partial page at the final path.
#[derive(Debug, Clone)]
pub struct TempDirStorage {
    dir: PathBuf,
}

impl TempDirStorage {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }
}

impl ScanStorage for TempDirStorage {
    fn allocate_and_write(
        &self,
        bytes: Vec<u8>,
        extension: &str,
    ) -> impl Future<Output = Result<PathBuf>> + Send {
        let dir = self.dir.clone();
        let extension = extension.to_owned();
        async move {
            tokio::task::spawn_blocking(move || write_atomically(&dir, &bytes, &extension))
                .await
                .map_err(|err| ScanError::Internal(format!("storage worker failed: {err}")))?
        }
    }
}

#[instrument(skip(bytes), fields(len = bytes.len()))]
fn write_atomically(dir: &Path, bytes: &[u8], extension: &str) -> Result<PathBuf> {
    if extension.is_empty() || !extension.chars().all(|c| c.is_ascii_alphanumeric()) {
        return Err(ScanError::Storage(format!("unusable file extension {extension:?}")));
    }

    std::fs::create_dir_all(dir)
        .map_err(|err| ScanError::Storage(format!("cannot create {}: {err}", dir.display())))?;

    let mut tmp = tempfile::Builder::new()
        .prefix(".scan-")
        .suffix(".part")
        .tempfile_in(dir)
        .map_err(|err| ScanError::Storage(format!("cannot allocate in {}: {err}", dir.display())))?;
    tmp.write_all(bytes)
        .and_then(|()| tmp.as_file().sync_all())
        .map_err(|err| ScanError::Storage(format!("write failed: {err}")))?;

    let path = dir.join(format!("scan-{}.{}", Uuid::new_v4(), extension));
    // On failure the temporary file is dropped and removed.
    tmp.persist_noclobber(&path)
        .map_err(|err| ScanError::Storage(format!("cannot move scan into place: {}", err.error)))?;

    debug!(path = %path.display(), "Scan written");
    Ok(path)
}
