// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Inverse-mapping warp with nearest or bilinear sampling.

use docscan_core::types::InterpolationMode;
use image::{ImageBuffer, Pixel};

use super::homography::Homography;

/// Opaque white in any 8-bit layout.
pub(crate) fn white<P: Pixel<Subpixel = u8>>() -> P {
    let full = [u8::MAX; 4];
    *P::from_slice(&full[..P::CHANNEL_COUNT as usize])
}

/// Render an `out_w` x `out_h` image by mapping each destination pixel
/// centre through `src_from_dst` and sampling `src` there.
///
/// Samples that fall outside the source frame keep `background`.
pub(crate) fn warp_perspective<P>(
    src: &ImageBuffer<P, Vec<u8>>,
    src_from_dst: &Homography,
    out_w: u32,
    out_h: u32,
    mode: InterpolationMode,
    background: P,
) -> ImageBuffer<P, Vec<u8>>
where
    P: Pixel<Subpixel = u8>,
{
    let (w, h) = (src.width() as f64, src.height() as f64);
    let mut out = ImageBuffer::from_pixel(out_w, out_h, background);

    for y in 0..out_h {
        for x in 0..out_w {
            let Some((sx, sy)) = src_from_dst.apply(x as f64 + 0.5, y as f64 + 0.5) else {
                continue;
            };
            if !(sx >= 0.0 && sy >= 0.0 && sx <= w && sy <= h) {
                continue;
            }
            // Continuous coordinates to pixel-index space.
            let (ix, iy) = (sx - 0.5, sy - 0.5);
            let pixel = match mode {
                InterpolationMode::Nearest => sample_nearest(src, ix, iy),
                InterpolationMode::Bilinear => sample_bilinear(src, ix, iy),
            };
            out.put_pixel(x, y, pixel);
        }
    }
    out
}

#[inline]
fn clamped<P: Pixel<Subpixel = u8>>(src: &ImageBuffer<P, Vec<u8>>, x: i64, y: i64) -> P {
    let cx = x.clamp(0, src.width() as i64 - 1) as u32;
    let cy = y.clamp(0, src.height() as i64 - 1) as u32;
    *src.get_pixel(cx, cy)
}

fn sample_nearest<P: Pixel<Subpixel = u8>>(src: &ImageBuffer<P, Vec<u8>>, x: f64, y: f64) -> P {
    clamped(src, x.round() as i64, y.round() as i64)
}

fn sample_bilinear<P: Pixel<Subpixel = u8>>(src: &ImageBuffer<P, Vec<u8>>, x: f64, y: f64) -> P {
    let x0 = x.floor();
    let y0 = y.floor();
    let fx = x - x0;
    let fy = y - y0;
    let (x0, y0) = (x0 as i64, y0 as i64);

    let p00 = clamped(src, x0, y0);
    let p10 = clamped(src, x0 + 1, y0);
    let p01 = clamped(src, x0, y0 + 1);
    let p11 = clamped(src, x0 + 1, y0 + 1);

    let mut out = p00;
    for (c, channel) in out.channels_mut().iter_mut().enumerate() {
        let v00 = p00.channels()[c] as f64;
        let v10 = p10.channels()[c] as f64;
        let v01 = p01.channels()[c] as f64;
        let v11 = p11.channels()[c] as f64;

        let a = v00 + fx * (v10 - v00);
        let b = v01 + fx * (v11 - v01);
        let v = a + fy * (b - a);
        *channel = v.round().clamp(0.0, 255.0) as u8;
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{GrayImage, Luma, Rgba, RgbaImage};

    #[test]
    fn white_fills_every_channel() {
        assert_eq!(white::<Luma<u8>>(), Luma([255]));
        assert_eq!(white::<Rgba<u8>>(), Rgba([255, 255, 255, 255]));
    }

    #[test]
    fn bilinear_midpoint_averages() {
        let mut img = GrayImage::new(2, 1);
        img.put_pixel(0, 0, Luma([0]));
        img.put_pixel(1, 0, Luma([200]));
        assert_eq!(sample_bilinear(&img, 0.5, 0.0), Luma([100]));
        assert_eq!(sample_nearest(&img, 0.4, 0.0), Luma([0]));
    }

    #[test]
    fn identity_warp_copies() {
        let img = RgbaImage::from_fn(5, 4, |x, y| Rgba([x as u8 * 40, y as u8 * 50, 7, 255]));
        let out = warp_perspective(&img, &Homography::identity(), 5, 4, InterpolationMode::Bilinear, white());
        assert_eq!(out, img);
    }

    #[test]
    fn outside_samples_are_background() {
        let img = GrayImage::from_pixel(4, 4, Luma([10]));
        let shift = Homography::new(nalgebra::Matrix3::new(
            1.0, 0.0, 100.0, //
            0.0, 1.0, 0.0, //
            0.0, 0.0, 1.0,
        ));
        let out = warp_perspective(&img, &shift, 4, 4, InterpolationMode::Nearest, white());
        assert!(out.pixels().all(|p| *p == Luma([255])));
    }
}
