// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Encoding of rectified pages to JPEG or PNG bytes.

use docscan_core::error::{Result, ScanError};
use docscan_core::types::OutputFormat;
use image::codecs::jpeg::JpegEncoder;
use image::{DynamicImage, ImageFormat};
use tracing::{debug, instrument};

use crate::image::RasterImage;
use crate::integrity::hash_bytes;

/// An encoded page and its SHA-256 digest.
#[derive(Debug, Clone)]
pub struct EncodedImage {
    pub bytes: Vec<u8>,
    pub format: OutputFormat,
    pub sha256: String,
    pub width: u32,
    pub height: u32,
}

/// Encode `image` in `format`. `jpeg_quality` is clamped to 1..=100 and
/// ignored for PNG.
#[instrument(skip(image), fields(width = image.width(), height = image.height()))]
pub fn encode_image(image: &RasterImage, format: OutputFormat, jpeg_quality: u8) -> Result<EncodedImage> {
    let bytes = match format {
        OutputFormat::Jpeg => to_jpeg_bytes(image.as_dynamic(), jpeg_quality.clamp(1, 100))?,
        OutputFormat::Png => to_png_bytes(image.as_dynamic())?,
    };
    if bytes.is_empty() {
        return Err(ScanError::Encoding("encoder produced no data".into()));
    }

    let sha256 = hash_bytes(&bytes);
    debug!(len = bytes.len(), ?format, sha256 = %sha256, "Page encoded");
    Ok(EncodedImage {
        bytes,
        format,
        sha256,
        width: image.width(),
        height: image.height(),
    })
}

fn to_jpeg_bytes(image: &DynamicImage, quality: u8) -> Result<Vec<u8>> {
    let mut buffer = Vec::new();
    // JPEG has no alpha channel.
    let rgb = image.to_rgb8();
    let encoder = JpegEncoder::new_with_quality(&mut buffer, quality);
    rgb.write_with_encoder(encoder)
        .map_err(|err| ScanError::Encoding(format!("JPEG encoding failed: {err}")))?;
    Ok(buffer)
}

fn to_png_bytes(image: &DynamicImage) -> Result<Vec<u8>> {
    let mut buffer = Vec::new();
    let mut cursor = std::io::Cursor::new(&mut buffer);
    image
        .write_to(&mut cursor, ImageFormat::Png)
        .map_err(|err| ScanError::Encoding(format!("PNG encoding failed: {err}")))?;
    Ok(buffer)
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{Rgba, RgbaImage};

    fn sample() -> RasterImage {
        RasterImage::from_dynamic(DynamicImage::ImageRgba8(RgbaImage::from_fn(32, 24, |x, y| {
            Rgba([(x * 8) as u8, (y * 10) as u8, 90, 200])
        })))
        .unwrap()
    }

    #[test]
    fn jpeg_bytes_decode_back() {
        let encoded = encode_image(&sample(), OutputFormat::Jpeg, 100).unwrap();
        assert_eq!(&encoded.bytes[..2], &[0xFF, 0xD8]);
        assert_eq!(encoded.sha256, hash_bytes(&encoded.bytes));
        let back = RasterImage::from_bytes(&encoded.bytes).unwrap();
        assert_eq!(back.dimensions(), (32, 24));
    }

    #[test]
    fn png_is_lossless() {
        let image = sample();
        let encoded = encode_image(&image, OutputFormat::Png, 0).unwrap();
        let back = RasterImage::from_bytes(&encoded.bytes).unwrap();
        assert_eq!(back.as_dynamic().to_rgba8(), image.as_dynamic().to_rgba8());
    }
}
