// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Desktop bridge for CLI and CI use.
//
// There is no camera and no interactive surface: the "gallery" is an image
// file given up front, and confirmation either accepts the proposed corners
// or substitutes corners supplied in advance.

use std::future::Future;
use std::path::PathBuf;

use docscan_core::error::{Result, ScanError};
use docscan_core::types::{AcquireSource, Capability};
use docscan_document::{Quadrilateral, RasterImage};
use tracing::{debug, info, warn};

use crate::storage::TempDirStorage;
use crate::traits::*;

/// Bridge backed by the local filesystem.
#[derive(Debug, Clone)]
pub struct DesktopBridge {
    gallery_image: Option<PathBuf>,
    preset_corners: Option<Quadrilateral>,
    storage: TempDirStorage,
}

impl DesktopBridge {
    pub fn new(storage: TempDirStorage) -> Self {
        Self {
            gallery_image: None,
            preset_corners: None,
            storage,
        }
    }

    /// The file the gallery "picker" returns.
    pub fn with_gallery_image(mut self, path: impl Into<PathBuf>) -> Self {
        self.gallery_image = Some(path.into());
        self
    }

    /// Corners to report as the user's edit instead of accepting the proposal.
    pub fn with_corners(mut self, quad: Quadrilateral) -> Self {
        self.preset_corners = Some(quad);
        self
    }
}

impl ScanBridge for DesktopBridge {
    fn platform_name(&self) -> &str {
        "Desktop"
    }
}

impl SourcePicker for DesktopBridge {
    fn choose_source(&self) -> impl Future<Output = Result<Option<AcquireSource>>> + Send {
        let has_image = self.gallery_image.is_some();
        async move {
            if has_image {
                debug!("Desktop source selection: gallery");
                Ok(Some(AcquireSource::Gallery))
            } else {
                Ok(None)
            }
        }
    }
}

impl ImageAcquirer for DesktopBridge {
    fn acquire(&self, source: AcquireSource) -> impl Future<Output = Result<Acquisition>> + Send {
        let path = self.gallery_image.clone();
        async move {
            match (source, path) {
                (AcquireSource::Camera, _) => {
                    warn!("ImageAcquirer::acquire(camera) called on desktop bridge");
                    Err(ScanError::PlatformUnavailable)
                }
                (AcquireSource::Gallery, None) => Ok(Acquisition::Cancelled),
                (AcquireSource::Gallery, Some(path)) => {
                    let bytes = tokio::fs::read(&path).await.map_err(|err| {
                        ScanError::Acquisition(format!("cannot read {}: {err}", path.display()))
                    })?;
                    info!(path = %path.display(), len = bytes.len(), "Gallery image read");
                    let image = tokio::task::spawn_blocking(move || RasterImage::from_bytes(&bytes))
                        .await
                        .map_err(|err| ScanError::Internal(format!("decode worker failed: {err}")))??;
                    Ok(Acquisition::Image(image))
                }
            }
        }
    }
}

impl QuadConfirmer for DesktopBridge {
    fn confirm(
        &self,
        _image: &RasterImage,
        proposed: &Quadrilateral,
    ) -> impl Future<Output = Result<Confirmation>> + Send {
        let answer = match self.preset_corners {
            Some(preset) => Confirmation::Edited(preset),
            None => Confirmation::Accepted(*proposed),
        };
        async move { Ok(answer) }
    }
}

impl ScanStorage for DesktopBridge {
    fn allocate_and_write(
        &self,
        bytes: Vec<u8>,
        extension: &str,
    ) -> impl Future<Output = Result<PathBuf>> + Send {
        self.storage.allocate_and_write(bytes, extension)
    }
}

impl PermissionGate for DesktopBridge {
    fn ensure_granted(&self, capabilities: &[Capability]) -> impl Future<Output = Result<bool>> + Send {
        debug!(?capabilities, "Desktop grants every capability");
        async { Ok(true) }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{DynamicImage, RgbImage};

    fn bridge_in(dir: &std::path::Path) -> DesktopBridge {
        DesktopBridge::new(TempDirStorage::new(dir.join("out")))
    }

    #[tokio::test]
    async fn camera_is_unavailable() {
        let dir = tempfile::tempdir().unwrap();
        let err = bridge_in(dir.path())
            .acquire(AcquireSource::Camera)
            .await
            .unwrap_err();
        assert!(matches!(err, ScanError::PlatformUnavailable));
    }

    #[tokio::test]
    async fn gallery_reads_the_configured_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("photo.png");
        DynamicImage::ImageRgb8(RgbImage::new(12, 9)).save(&path).unwrap();

        let bridge = bridge_in(dir.path()).with_gallery_image(&path);
        assert_eq!(bridge.choose_source().await.unwrap(), Some(AcquireSource::Gallery));
        match bridge.acquire(AcquireSource::Gallery).await.unwrap() {
            Acquisition::Image(image) => assert_eq!(image.dimensions(), (12, 9)),
            Acquisition::Cancelled => panic!("expected an image"),
        }
    }

    #[tokio::test]
    async fn no_gallery_image_means_cancelled() {
        let dir = tempfile::tempdir().unwrap();
        let bridge = bridge_in(dir.path());
        assert_eq!(bridge.choose_source().await.unwrap(), None);
        assert!(matches!(
            bridge.acquire(AcquireSource::Gallery).await.unwrap(),
            Acquisition::Cancelled
        ));
    }

    #[tokio::test]
    async fn empty_file_has_no_image_data() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("empty.jpg");
        std::fs::write(&path, b"").unwrap();
        let err = bridge_in(dir.path())
            .with_gallery_image(&path)
            .acquire(AcquireSource::Gallery)
            .await
            .unwrap_err();
        assert_eq!(err.code(), "E_NO_IMAGE_DATA_FOUND");
    }

    #[tokio::test]
    async fn preset_corners_count_as_an_edit() {
        let dir = tempfile::tempdir().unwrap();
        let image = RasterImage::from_dynamic(DynamicImage::new_rgb8(100, 100)).unwrap();
        let full = Quadrilateral::full_frame(100, 100);
        let preset = Quadrilateral::from_pixel_coords([(5.0, 5.0), (95.0, 5.0), (95.0, 95.0), (5.0, 95.0)]).unwrap();

        let accepted = bridge_in(dir.path()).confirm(&image, &full).await.unwrap();
        assert_eq!(accepted, Confirmation::Accepted(full));

        let edited = bridge_in(dir.path())
            .with_corners(preset)
            .confirm(&image, &full)
            .await
            .unwrap();
        assert_eq!(edited, Confirmation::Edited(preset));
        assert_eq!(edited.quad(), Some(&preset));
    }
}
