use image::RgbImage;

use crate::foundation::error::{ReelError, ReelResult};

/// Sigma OpenCV derives for a Gaussian of odd size `kernel` when none is given.
pub fn sigma_for_kernel(kernel: u32) -> f32 {
    0.3 * ((kernel as f32 - 1.0) * 0.5 - 1.0) + 0.8
}

/// Separable Gaussian blur of an RGB raster with an odd `kernel` size.
///
/// Edges clamp to the nearest pixel, so the raster is blurred in isolation from whatever
/// surrounds it. `kernel <= 1` returns an unchanged copy.
pub fn gaussian_blur_rgb(src: &RgbImage, kernel: u32) -> ReelResult<RgbImage> {
    if kernel <= 1 || src.width() == 0 || src.height() == 0 {
        return Ok(src.clone());
    }
    if kernel.is_multiple_of(2) {
        return Err(ReelError::validation("blur kernel size must be odd"));
    }

    let (width, height) = src.dimensions();
    let weights = gaussian_kernel_q16(kernel / 2, sigma_for_kernel(kernel))?;
    let mut tmp = vec![0u8; src.as_raw().len()];
    let mut out = vec![0u8; src.as_raw().len()];

    horizontal_pass(src.as_raw(), &mut tmp, width, height, &weights);
    vertical_pass(&tmp, &mut out, width, height, &weights);
    RgbImage::from_raw(width, height, out)
        .ok_or_else(|| ReelError::render("blur output buffer size mismatch"))
}

fn gaussian_kernel_q16(radius: u32, sigma: f32) -> ReelResult<Vec<u32>> {
    if radius == 0 {
        return Ok(vec![1 << 16]);
    }
    if !sigma.is_finite() || sigma <= 0.0 {
        return Err(ReelError::validation("blur sigma must be > 0"));
    }

    let r = radius as i32;
    let mut weights_f = Vec::<f64>::with_capacity((2 * r + 1) as usize);
    let mut sum = 0.0f64;
    let sigma = sigma as f64;
    let denom = 2.0 * sigma * sigma;
    for i in -r..=r {
        let x = i as f64;
        let w = (-x * x / denom).exp();
        weights_f.push(w);
        sum += w;
    }

    let mut weights = Vec::<u32>::with_capacity(weights_f.len());
    let mut acc: i64 = 0;
    for &wf in &weights_f {
        let q = ((wf / sum) * 65536.0).round() as i64;
        let q = q.clamp(0, 65536);
        weights.push(q as u32);
        acc += q;
    }
    // Rounding drift goes to the centre tap so the kernel sums to exactly 1.0 in Q16.
    let delta = 65536 - acc;
    if delta != 0 {
        let mid = weights.len() / 2;
        weights[mid] = (i64::from(weights[mid]) + delta).clamp(0, 65536) as u32;
    }

    Ok(weights)
}

const CHANNELS: usize = 3;

fn horizontal_pass(src: &[u8], dst: &mut [u8], width: u32, height: u32, k: &[u32]) {
    let radius = (k.len() / 2) as i32;
    let w = width as i32;
    for y in 0..height as i32 {
        for x in 0..w {
            let mut acc = [0u64; CHANNELS];
            for (ki, &kw) in k.iter().enumerate() {
                let sx = (x + ki as i32 - radius).clamp(0, w - 1);
                let idx = ((y * w + sx) as usize) * CHANNELS;
                for c in 0..CHANNELS {
                    acc[c] += u64::from(kw) * u64::from(src[idx + c]);
                }
            }
            let out_idx = ((y * w + x) as usize) * CHANNELS;
            for c in 0..CHANNELS {
                dst[out_idx + c] = q16_to_u8(acc[c]);
            }
        }
    }
}

fn vertical_pass(src: &[u8], dst: &mut [u8], width: u32, height: u32, k: &[u32]) {
    let radius = (k.len() / 2) as i32;
    let w = width as i32;
    let h = height as i32;
    for y in 0..h {
        for x in 0..w {
            let mut acc = [0u64; CHANNELS];
            for (ki, &kw) in k.iter().enumerate() {
                let sy = (y + ki as i32 - radius).clamp(0, h - 1);
                let idx = ((sy * w + x) as usize) * CHANNELS;
                for c in 0..CHANNELS {
                    acc[c] += u64::from(kw) * u64::from(src[idx + c]);
                }
            }
            let out_idx = ((y * w + x) as usize) * CHANNELS;
            for c in 0..CHANNELS {
                dst[out_idx + c] = q16_to_u8(acc[c]);
            }
        }
    }
}

fn q16_to_u8(acc: u64) -> u8 {
    ((acc + 32768) >> 16).min(255) as u8
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn opencv_sigma_for_15_tap_kernel() {
        assert!((sigma_for_kernel(15) - 2.6).abs() < 1e-6);
    }

    #[test]
    fn kernel_sums_to_one() {
        let k = gaussian_kernel_q16(7, 2.6).unwrap();
        assert_eq!(k.len(), 15);
        assert_eq!(k.iter().map(|&w| u64::from(w)).sum::<u64>(), 65536);
    }

    #[test]
    fn kernel_1_is_identity() {
        let src = RgbImage::from_fn(3, 2, |x, y| image::Rgb([x as u8, y as u8, 7]));
        assert_eq!(gaussian_blur_rgb(&src, 1).unwrap(), src);
    }

    #[test]
    fn even_kernel_is_rejected() {
        let src = RgbImage::new(2, 2);
        assert!(gaussian_blur_rgb(&src, 4).is_err());
    }

    #[test]
    fn constant_image_is_unchanged() {
        let src = RgbImage::from_pixel(9, 5, image::Rgb([10, 20, 30]));
        assert_eq!(gaussian_blur_rgb(&src, 15).unwrap(), src);
    }

    #[test]
    fn blur_spreads_a_single_bright_pixel() {
        let mut src = RgbImage::new(9, 9);
        src.put_pixel(4, 4, image::Rgb([255, 255, 255]));
        let out = gaussian_blur_rgb(&src, 5).unwrap();

        assert!(out.get_pixel(4, 4).0[0] < 255);
        let lit = out.pixels().filter(|p| p.0[0] != 0).count();
        assert!(lit > 1);
    }
}
