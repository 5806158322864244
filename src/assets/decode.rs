use std::path::Path;

use anyhow::Context;

use crate::foundation::error::{ReelError, ReelResult};

/// Decode an encoded image held in memory into 8-bit RGB.
///
/// Alpha, if present, is dropped: every raster in a reel is opaque.
pub fn decode_rgb(bytes: &[u8]) -> ReelResult<image::RgbImage> {
    let dyn_img = image::load_from_memory(bytes).context("decode image from memory")?;
    Ok(dyn_img.to_rgb8())
}

/// Read and decode an image file into 8-bit RGB.
pub fn read_rgb(path: &Path) -> ReelResult<image::RgbImage> {
    let bytes = std::fs::read(path).with_context(|| format!("read image '{}'", path.display()))?;
    decode_rgb(&bytes)
        .map_err(|e| ReelError::Other(anyhow::anyhow!("decode image '{}': {e}", path.display())))
}

#[cfg(test)]
mod tests {
    use std::io::Cursor;

    use super::*;

    #[test]
    fn decode_png_drops_alpha() {
        let src = image::RgbaImage::from_raw(1, 1, vec![100u8, 50, 200, 128]).unwrap();
        let mut buf = Vec::new();
        image::DynamicImage::ImageRgba8(src)
            .write_to(&mut Cursor::new(&mut buf), image::ImageFormat::Png)
            .unwrap();

        let rgb = decode_rgb(&buf).unwrap();
        assert_eq!(rgb.dimensions(), (1, 1));
        assert_eq!(rgb.get_pixel(0, 0).0, [100, 50, 200]);
    }

    #[test]
    fn decode_garbage_fails() {
        assert!(decode_rgb(b"not an image").is_err());
    }

    #[test]
    fn read_missing_file_names_path() {
        let err = read_rgb(Path::new("/definitely/not/here.png")).unwrap_err();
        assert!(err.to_string().contains("/definitely/not/here.png"));
    }
}
