#![allow(dead_code)]

use std::path::{Path, PathBuf};

use simreel::ReelConfig;

/// Fresh per-test directory under the system temp dir.
pub fn temp_root(name: &str) -> PathBuf {
    let dir = std::env::temp_dir().join(format!("simreel_it_{name}_{}", std::process::id()));
    let _ = std::fs::remove_dir_all(&dir);
    std::fs::create_dir_all(&dir).unwrap();
    dir
}

fn save(path: &Path, w: u32, h: u32, rgb: [u8; 3]) {
    std::fs::create_dir_all(path.parent().unwrap()).unwrap();
    image::RgbImage::from_pixel(w, h, image::Rgb(rgb))
        .save(path)
        .unwrap();
}

/// Write source frames for `indices` in the given categories, plus the legend.
///
/// Sizes match the default layout: 1600x900 configuration, 800x850 field renders.
pub fn write_sources(root: &Path, config: &[u64], stress: &[u64], temperature: &[u64]) {
    let cfg = ReelConfig::default();
    for &i in config {
        let idx = simreel::FrameIndex(i);
        save(&cfg.input.config.path_for(root, idx), 1600, 900, [200, 30, 30]);
    }
    for &i in stress {
        let idx = simreel::FrameIndex(i);
        save(&cfg.input.stress.path_for(root, idx), 800, 850, [30, 200, 30]);
    }
    for &i in temperature {
        let idx = simreel::FrameIndex(i);
        save(&cfg.input.temperature.path_for(root, idx), 800, 850, [30, 30, 200]);
    }
    save(&root.join(&cfg.input.legend), 256, 16, [0, 0, 255]);
}

/// Default configuration rooted at `root`, probing `frame_count` indices.
pub fn config_for(root: &Path, frame_count: u64) -> ReelConfig {
    let mut cfg = ReelConfig::default();
    cfg.root = root.to_path_buf();
    cfg.input.frame_count = frame_count;
    cfg
}
