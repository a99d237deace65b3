// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Export adapter: encode the rectified page, hand it to storage, and check
// what landed on disk.

use std::path::{Path, PathBuf};

use docscan_bridge::ScanStorage;
use docscan_core::config::ExportConfig;
use docscan_core::error::{Result, ScanError};
use docscan_core::types::OutputFormat;
use docscan_document::integrity::hash_file;
use docscan_document::{RasterImage, encode_image};
use tracing::{info, instrument, warn};

/// A page that storage accepted and that matched on re-read.
#[derive(Debug, Clone, PartialEq)]
pub struct StoredScan {
    pub path: PathBuf,
    pub sha256: String,
    pub width: u32,
    pub height: u32,
    pub format: OutputFormat,
}

#[derive(Debug, Clone, Default)]
pub struct ExportAdapter {
    config: ExportConfig,
}

impl ExportAdapter {
    pub fn new(config: ExportConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &ExportConfig {
        &self.config
    }

    /// Encode `image` on a blocking worker and persist it through `storage`.
    ///
    /// The written file must have the encoded length and, with
    /// `verify_written`, the encoded digest. Otherwise it is removed and the
    /// export fails with a storage-kind error. Once storage has returned a
    /// path, the file is either handed back or removed.
    #[instrument(skip_all, fields(format = ?self.config.format))]
    pub async fn export<S>(&self, image: RasterImage, storage: &S) -> Result<StoredScan>
    where
        S: ScanStorage + Sync,
    {
        let format = self.config.format;
        let quality = self.config.jpeg_quality;
        let encoded = tokio::task::spawn_blocking(move || encode_image(&image, format, quality))
            .await
            .map_err(|err| ScanError::Internal(format!("encode worker failed: {err}")))??;

        let expected_len = encoded.bytes.len() as u64;
        let sha256 = encoded.sha256;
        let (width, height) = (encoded.width, encoded.height);

        let path = storage
            .allocate_and_write(encoded.bytes, format.extension())
            .await?;

        if let Err(err) = self.check_written(&path, expected_len, &sha256).await {
            discard(&path).await;
            return Err(err);
        }

        info!(path = %path.display(), len = expected_len, sha256 = %sha256, "Scan exported");
        Ok(StoredScan {
            path,
            sha256,
            width,
            height,
            format,
        })
    }

    async fn check_written(&self, path: &Path, expected_len: u64, sha256: &str) -> Result<()> {
        let written_len = tokio::fs::metadata(path)
            .await
            .map_err(|err| ScanError::Storage(format!("cannot stat {}: {err}", path.display())))?
            .len();
        if written_len != expected_len {
            return Err(ScanError::Storage(format!(
                "short write: {written_len} of {expected_len} bytes at {}",
                path.display()
            )));
        }

        if self.config.verify_written {
            let target = path.to_path_buf();
            let actual = tokio::task::spawn_blocking(move || hash_file(&target))
                .await
                .map_err(|err| ScanError::Internal(format!("hash worker failed: {err}")))??;
            if actual != sha256 {
                return Err(ScanError::IntegrityMismatch {
                    expected: sha256.to_owned(),
                    actual,
                });
            }
        }
        Ok(())
    }
}

/// Remove a page nobody will receive.
pub(crate) async fn discard(path: &Path) {
    if let Err(err) = tokio::fs::remove_file(path).await {
        warn!(path = %path.display(), error = %err, "Failed to remove rejected scan");
    }
}
