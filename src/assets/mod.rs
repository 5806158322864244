//! Run-wide assets: the legend image and the annotation font.
//!
//! Both are loaded once before any frame is composited; a failure here is fatal for the run.

pub mod decode;

use std::path::Path;

use image::imageops::FilterType;

use crate::foundation::core::PixelSize;
use crate::foundation::error::{ReelError, ReelResult};

/// Load the color-scale legend and resize it to exactly `size`.
///
/// The resize is a single bilinear pass, so the result is a pure function of the file contents.
pub fn load_legend(path: &Path, size: PixelSize) -> ReelResult<image::RgbImage> {
    if size.is_empty() {
        return Err(ReelError::validation("legend size must be non-zero"));
    }
    let bytes = std::fs::read(path).map_err(|e| ReelError::asset_load(path, e))?;
    let img = decode::decode_rgb(&bytes).map_err(|e| ReelError::asset_load(path, e))?;
    let resized = image::imageops::resize(&img, size.width, size.height, FilterType::Triangle);
    tracing::info!(
        path = %path.display(),
        src_w = img.width(),
        src_h = img.height(),
        w = size.width,
        h = size.height,
        "loaded legend"
    );
    Ok(resized)
}

/// Read font bytes for the text renderer.
pub fn load_font(path: &Path) -> ReelResult<Vec<u8>> {
    let bytes = std::fs::read(path).map_err(|e| ReelError::asset_load(path, e))?;
    if bytes.is_empty() {
        return Err(ReelError::asset_load(path, "font file is empty"));
    }
    tracing::info!(path = %path.display(), bytes = bytes.len(), "loaded font");
    Ok(bytes)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn temp_dir(name: &str) -> std::path::PathBuf {
        std::env::temp_dir().join(format!(
            "simreel_{name}_{}_{}",
            std::process::id(),
            std::time::SystemTime::now()
                .duration_since(std::time::UNIX_EPOCH)
                .unwrap()
                .as_nanos()
        ))
    }

    #[test]
    fn legend_is_resized_to_footprint() {
        let tmp = temp_dir("legend_resize");
        std::fs::create_dir_all(&tmp).unwrap();
        let path = tmp.join("R.png");
        image::RgbImage::from_pixel(640, 96, image::Rgb([10, 200, 30]))
            .save(&path)
            .unwrap();

        let legend = load_legend(&path, PixelSize::new(200, 30)).unwrap();
        assert_eq!(legend.dimensions(), (200, 30));
        assert_eq!(legend.get_pixel(100, 15).0, [10, 200, 30]);

        std::fs::remove_dir_all(&tmp).ok();
    }

    #[test]
    fn missing_legend_is_asset_load_error() {
        let err = load_legend(Path::new("/nope/R.png"), PixelSize::new(200, 30)).unwrap_err();
        assert!(matches!(err, ReelError::AssetLoad(_)));
    }

    #[test]
    fn undecodable_legend_is_asset_load_error() {
        let tmp = temp_dir("legend_garbage");
        std::fs::create_dir_all(&tmp).unwrap();
        let path = tmp.join("R.png");
        std::fs::write(&path, b"garbage").unwrap();

        let err = load_legend(&path, PixelSize::new(200, 30)).unwrap_err();
        assert!(matches!(err, ReelError::AssetLoad(_)));

        std::fs::remove_dir_all(&tmp).ok();
    }

    #[test]
    fn empty_font_is_rejected() {
        let tmp = temp_dir("font_empty");
        std::fs::create_dir_all(&tmp).unwrap();
        let path = tmp.join("empty.ttf");
        std::fs::write(&path, b"").unwrap();

        assert!(matches!(load_font(&path), Err(ReelError::AssetLoad(_))));

        std::fs::remove_dir_all(&tmp).ok();
    }
}
