use image::RgbImage;

use crate::foundation::core::{PixelPoint, PixelRect, PixelSize};
use crate::foundation::error::{ReelError, ReelResult};
use crate::foundation::math::{mul_div255_u8, unit_to_u8_weight};

/// Mix every pixel toward `color`: `out = src * (1 - t) + color * t`.
pub fn mix_toward(img: &mut RgbImage, color: [u8; 3], t: f32) {
    let tt = unit_to_u8_weight(t);
    let it = 255u16 - tt;
    for px in img.pixels_mut() {
        for (c, &target) in px.0.iter_mut().zip(&color) {
            let a = mul_div255_u8(u16::from(*c), it);
            let b = mul_div255_u8(u16::from(target), tt);
            *c = a.saturating_add(b);
        }
    }
}

/// Source-over composite of a premultiplied RGBA8 buffer onto an opaque RGB raster.
///
/// `src_premul` is `size.width * size.height * 4` bytes; its top-left lands at `at` and parts
/// outside `dst` are dropped.
pub fn premul_over_rgb(
    dst: &mut RgbImage,
    at: PixelPoint,
    src_premul: &[u8],
    size: PixelSize,
) -> ReelResult<()> {
    let expected = (size.width as usize) * (size.height as usize) * 4;
    if src_premul.len() != expected {
        return Err(ReelError::render(
            "premul_over_rgb expects src matching width*height*4",
        ));
    }
    let Some(r) = PixelRect::at(at, size).clip_to(PixelSize::new(dst.width(), dst.height()))
    else {
        return Ok(());
    };

    for y in r.y..r.bottom() {
        for x in r.x..r.right() {
            let sx = (x - at.x) as usize;
            let sy = (y - at.y) as usize;
            let si = (sy * size.width as usize + sx) * 4;
            let s = &src_premul[si..si + 4];
            let a = u16::from(s[3]);
            if a == 0 {
                continue;
            }
            let inv = 255u16 - a;
            let d = dst.get_pixel_mut(x as u32, y as u32);
            for c in 0..3 {
                let dc = mul_div255_u8(u16::from(d.0[c]), inv);
                d.0[c] = s[c].saturating_add(dc);
            }
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn half_mix_with_white() {
        let mut img = RgbImage::from_pixel(1, 1, image::Rgb([0, 100, 255]));
        mix_toward(&mut img, [255, 255, 255], 0.5);
        assert_eq!(img.get_pixel(0, 0).0, [128, 178, 255]);
    }

    #[test]
    fn mix_0_is_noop_and_mix_1_is_target() {
        let mut img = RgbImage::from_pixel(2, 1, image::Rgb([9, 8, 7]));
        mix_toward(&mut img, [255, 255, 255], 0.0);
        assert_eq!(img.get_pixel(1, 0).0, [9, 8, 7]);
        mix_toward(&mut img, [1, 2, 3], 1.0);
        assert_eq!(img.get_pixel(1, 0).0, [1, 2, 3]);
    }

    #[test]
    fn over_opaque_replaces_and_transparent_keeps() {
        let mut img = RgbImage::from_pixel(2, 1, image::Rgb([50, 50, 50]));
        let src = [255u8, 0, 0, 255, 0, 0, 0, 0];
        premul_over_rgb(&mut img, PixelPoint::new(0, 0), &src, PixelSize::new(2, 1)).unwrap();
        assert_eq!(img.get_pixel(0, 0).0, [255, 0, 0]);
        assert_eq!(img.get_pixel(1, 0).0, [50, 50, 50]);
    }

    #[test]
    fn over_half_alpha_black_darkens_white() {
        let mut img = RgbImage::from_pixel(1, 1, image::Rgb([255, 255, 255]));
        premul_over_rgb(
            &mut img,
            PixelPoint::new(0, 0),
            &[0, 0, 0, 128],
            PixelSize::new(1, 1),
        )
        .unwrap();
        assert_eq!(img.get_pixel(0, 0).0, [127, 127, 127]);
    }

    #[test]
    fn over_clips_offscreen_source() {
        let mut img = RgbImage::from_pixel(1, 1, image::Rgb([1, 1, 1]));
        let src = [9u8, 9, 9, 255].repeat(4);
        premul_over_rgb(&mut img, PixelPoint::new(-1, -1), &src, PixelSize::new(2, 2)).unwrap();
        assert_eq!(img.get_pixel(0, 0).0, [9, 9, 9]);
        assert!(premul_over_rgb(&mut img, PixelPoint::new(0, 0), &src, PixelSize::new(3, 3)).is_err());
    }
}
