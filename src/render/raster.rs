//! Clipped pixel operations on opaque RGB rasters.

use image::{Rgb, RgbImage};

use crate::config::Divider;
use crate::foundation::core::{PixelPoint, PixelRect, PixelSize};

pub fn size_of(img: &RgbImage) -> PixelSize {
    PixelSize::new(img.width(), img.height())
}

/// Allocate a raster filled with `color`.
pub fn filled(size: PixelSize, color: [u8; 3]) -> RgbImage {
    RgbImage::from_pixel(size.width, size.height, Rgb(color))
}

/// Copy `src` onto `dst` with its top-left corner at `at`, unscaled. Parts outside `dst` are
/// dropped.
pub fn paste(dst: &mut RgbImage, src: &RgbImage, at: PixelPoint) {
    image::imageops::replace(dst, src, at.x, at.y);
}

/// Fill the part of `rect` that lies inside `dst`.
pub fn fill_rect(dst: &mut RgbImage, rect: PixelRect, color: [u8; 3]) {
    let Some(r) = rect.clip_to(size_of(dst)) else {
        return;
    };
    for y in r.y..r.bottom() {
        for x in r.x..r.right() {
            dst.put_pixel(x as u32, y as u32, Rgb(color));
        }
    }
}

/// Copy out the part of `rect` that lies inside `src`, with the clipped rectangle it came from.
pub fn extract(src: &RgbImage, rect: PixelRect) -> Option<(PixelRect, RgbImage)> {
    let r = rect.clip_to(size_of(src))?;
    let sub = image::imageops::crop_imm(src, r.x as u32, r.y as u32, r.width, r.height).to_image();
    Some((r, sub))
}

/// Pixel footprint of an axis-aligned divider, including half-thickness end caps.
pub fn divider_rect(d: &Divider) -> PixelRect {
    let t = i64::from(d.thickness);
    let half = t / 2;
    let (x0, x1) = (d.from.x.min(d.to.x), d.from.x.max(d.to.x));
    let (y0, y1) = (d.from.y.min(d.to.y), d.from.y.max(d.to.y));
    if y0 == y1 {
        PixelRect::new(x0 - half, y0 - half, (x1 - x0 + 2 * half + 1) as u32, d.thickness)
    } else {
        PixelRect::new(x0 - half, y0 - half, d.thickness, (y1 - y0 + 2 * half + 1) as u32)
    }
}

pub fn draw_divider(dst: &mut RgbImage, d: &Divider, color: [u8; 3]) {
    fill_rect(dst, divider_rect(d), color);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn paste_clips_at_edges() {
        let mut dst = filled(PixelSize::new(4, 4), [255, 255, 255]);
        let src = filled(PixelSize::new(3, 3), [0, 0, 0]);
        paste(&mut dst, &src, PixelPoint::new(2, -1));

        assert_eq!(dst.get_pixel(2, 0).0, [0, 0, 0]);
        assert_eq!(dst.get_pixel(3, 1).0, [0, 0, 0]);
        assert_eq!(dst.get_pixel(3, 2).0, [255, 255, 255]);
        assert_eq!(dst.get_pixel(1, 0).0, [255, 255, 255]);
    }

    #[test]
    fn extract_returns_clipped_rect() {
        let src = filled(PixelSize::new(10, 10), [1, 2, 3]);
        let (r, sub) = extract(&src, PixelRect::new(-2, 8, 5, 5)).unwrap();
        assert_eq!(r, PixelRect::new(0, 8, 3, 2));
        assert_eq!(sub.dimensions(), (3, 2));
        assert!(extract(&src, PixelRect::new(10, 0, 2, 2)).is_none());
    }

    #[test]
    fn horizontal_divider_is_centred_on_its_row() {
        let d = Divider {
            from: PixelPoint::new(0, 850),
            to: PixelPoint::new(1500, 850),
            thickness: 5,
        };
        let r = divider_rect(&d);
        assert_eq!((r.y, r.bottom()), (848, 853));
        assert!(r.x < 0 && r.right() > 1500);
    }

    #[test]
    fn vertical_divider_is_centred_on_its_column() {
        let d = Divider {
            from: PixelPoint::new(750, 850),
            to: PixelPoint::new(750, 1650),
            thickness: 5,
        };
        let mut img = filled(PixelSize::new(1500, 1650), [255, 255, 255]);
        draw_divider(&mut img, &d, [0, 0, 0]);
        for x in 748..753 {
            assert_eq!(img.get_pixel(x, 1200).0, [0, 0, 0]);
        }
        assert_eq!(img.get_pixel(747, 1200).0, [255, 255, 255]);
        assert_eq!(img.get_pixel(753, 1200).0, [255, 255, 255]);
        assert_eq!(img.get_pixel(750, 847).0, [255, 255, 255]);
    }
}
