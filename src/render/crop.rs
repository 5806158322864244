use image::RgbImage;

use crate::foundation::core::{PixelRect, PixelSize};
use crate::foundation::error::{ReelError, ReelResult};

/// Window of a source image that lands in a panel: bottom-anchored, horizontally centred.
///
/// Columns `[(W - w) / 2, (W - w) / 2 + w)`, rows `[H - h, H)`; a pure function of the source
/// and target sizes.
pub fn bottom_center_window(src: PixelSize, target: PixelSize) -> ReelResult<PixelRect> {
    if src.width < target.width || src.height < target.height {
        return Err(ReelError::invalid_source(format!(
            "source is {}x{} but the crop window needs at least {}x{}",
            src.width, src.height, target.width, target.height
        )));
    }
    let x = (src.width - target.width) / 2;
    let y = src.height - target.height;
    Ok(PixelRect::new(
        i64::from(x),
        i64::from(y),
        target.width,
        target.height,
    ))
}

pub fn crop_bottom_center(src: &RgbImage, target: PixelSize) -> ReelResult<RgbImage> {
    let w = bottom_center_window(PixelSize::new(src.width(), src.height()), target)?;
    Ok(image::imageops::crop_imm(src, w.x as u32, w.y as u32, w.width, w.height).to_image())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn config_window_is_bottom_centre() {
        let w = bottom_center_window(PixelSize::new(1600, 900), PixelSize::new(1500, 850)).unwrap();
        assert_eq!(w, PixelRect::new(50, 50, 1500, 850));
    }

    #[test]
    fn odd_excess_width_rounds_down() {
        let w = bottom_center_window(PixelSize::new(753, 800), PixelSize::new(750, 800)).unwrap();
        assert_eq!((w.x, w.y), (1, 0));
    }

    #[test]
    fn window_is_pure_in_sizes() {
        for (sw, sh) in [(1500, 850), (1920, 1080), (2001, 999)] {
            let a = bottom_center_window(PixelSize::new(sw, sh), PixelSize::new(1500, 850)).unwrap();
            let b = bottom_center_window(PixelSize::new(sw, sh), PixelSize::new(1500, 850)).unwrap();
            assert_eq!(a, b);
            assert_eq!(a.x, i64::from((sw - 1500) / 2));
            assert_eq!(a.bottom(), i64::from(sh));
        }
    }

    #[test]
    fn undersized_source_is_rejected() {
        let err = bottom_center_window(PixelSize::new(1499, 900), PixelSize::new(1500, 850))
            .unwrap_err();
        assert!(matches!(err, ReelError::InvalidSourceImage(_)));
        assert!(
            bottom_center_window(PixelSize::new(1500, 849), PixelSize::new(1500, 850)).is_err()
        );
    }

    #[test]
    fn crop_takes_bottom_rows() {
        let mut src = RgbImage::from_pixel(4, 4, image::Rgb([0, 0, 0]));
        for x in 0..4 {
            src.put_pixel(x, 3, image::Rgb([255, 0, 0]));
        }
        let out = crop_bottom_center(&src, PixelSize::new(2, 1)).unwrap();
        assert_eq!(out.dimensions(), (2, 1));
        assert_eq!(out.get_pixel(0, 0).0, [255, 0, 0]);
    }
}
