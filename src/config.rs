//! Run configuration.
//!
//! Every layout constant, caption, and path of a reel run lives in [`ReelConfig`]. The defaults
//! reproduce the impact-penetration presentation layout (1500x1650 canvas, 10 fps); a JSON file
//! only needs to name the fields it changes.

use std::path::{Path, PathBuf};

use anyhow::Context as _;
use serde::{Deserialize, Serialize};

use crate::enumerate::{AlignmentPolicy, FramePattern};
use crate::foundation::core::{Fps, PixelPoint, PixelRect, PixelSize};
use crate::foundation::error::{ReelError, ReelResult};

/// Top-level configuration of one reel run.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ReelConfig {
    /// Directory every relative input and output path is resolved against.
    pub root: PathBuf,
    pub input: InputConfig,
    pub output: OutputConfig,
    pub timing: TimingConfig,
    pub font: FontConfig,
    pub layout: LayoutConfig,
    pub threading: ThreadingConfig,
}

impl Default for ReelConfig {
    fn default() -> Self {
        Self {
            root: PathBuf::from("."),
            input: InputConfig::default(),
            output: OutputConfig::default(),
            timing: TimingConfig::default(),
            font: FontConfig::default(),
            layout: LayoutConfig::default(),
            threading: ThreadingConfig::default(),
        }
    }
}

/// Source frame locations.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct InputConfig {
    /// Frame indices `0..frame_count` are looked up in each category.
    pub frame_count: u64,
    pub config: FramePattern,
    pub stress: FramePattern,
    pub temperature: FramePattern,
    /// Color-scale legend image overlaid on both field panels.
    pub legend: PathBuf,
    pub alignment: AlignmentPolicy,
}

impl Default for InputConfig {
    fn default() -> Self {
        Self {
            frame_count: 202,
            config: FramePattern::new("config", "config", "jpg"),
            stress: FramePattern::new("vms", "vms", "jpg"),
            temperature: FramePattern::new("temp", "temp", "jpg"),
            legend: PathBuf::from("R.png"),
            alignment: AlignmentPolicy::default(),
        }
    }
}

/// Where composited frames and the video are written.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct OutputConfig {
    pub frames_dir: PathBuf,
    pub frame_prefix: String,
    /// `jpg`/`jpeg` or `png`.
    pub frame_extension: String,
    pub jpeg_quality: u8,
    pub video_path: PathBuf,
    /// Overwrite an existing video file.
    pub overwrite: bool,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            frames_dir: PathBuf::from("processed_images"),
            frame_prefix: "processed".to_string(),
            frame_extension: "jpg".to_string(),
            jpeg_quality: 95,
            video_path: PathBuf::from("output_combined_video.mp4"),
            overwrite: true,
        }
    }
}

impl OutputConfig {
    /// File name of the composited frame for `index`, e.g. `processed_007.jpg`.
    pub fn frame_file_name(&self, index: u64) -> String {
        format!("{}_{index:03}.{}", self.frame_prefix, self.frame_extension)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct TimingConfig {
    pub fps: Fps,
    /// Simulation seconds between consecutive frame indices.
    pub dt: f64,
}

impl Default for TimingConfig {
    fn default() -> Self {
        Self {
            fps: Fps { num: 10, den: 1 },
            dt: 1e-7,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct FontConfig {
    /// TrueType/OpenType file used for every label and title.
    pub path: PathBuf,
    pub size_px: f32,
    pub label_color: [u8; 3],
    pub title_color: [u8; 3],
}

impl Default for FontConfig {
    fn default() -> Self {
        Self {
            path: PathBuf::from("fonts/annotation.ttf"),
            size_px: 22.0,
            label_color: [0, 0, 0],
            title_color: [255, 255, 255],
        }
    }
}

/// Text anchored at the left end of its baseline.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Label {
    pub text: String,
    pub at: PixelPoint,
}

impl Label {
    pub fn new(text: impl Into<String>, x: i64, y: i64) -> Self {
        Self {
            text: text.into(),
            at: PixelPoint::new(x, y),
        }
    }
}

/// Blurred, whitened backdrop drawn behind every label.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct LabelStyle {
    /// Margin around the measured text box.
    pub padding: u32,
    /// Gaussian kernel size (odd). `0` or `1` disables the blur.
    pub blur_kernel: u32,
    /// Weight of white in the backdrop blend.
    pub white_mix: f32,
}

impl Default for LabelStyle {
    fn default() -> Self {
        Self {
            padding: 10,
            blur_kernel: 15,
            white_mix: 0.5,
        }
    }
}

/// Legend image plus its caption and scale endpoints.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct LegendOverlay {
    pub at: PixelPoint,
    pub title: Label,
    pub low: Label,
    pub high: Label,
}

/// One source image cropped bottom-centre into a fixed canvas region.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Panel {
    pub origin: PixelPoint,
    pub crop: PixelSize,
    #[serde(default)]
    pub legend: Option<LegendOverlay>,
}

impl Panel {
    pub fn region(&self) -> PixelRect {
        PixelRect::at(self.origin, self.crop)
    }
}

/// Axis-aligned line, `thickness` pixels wide, centred on the segment.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Divider {
    pub from: PixelPoint,
    pub to: PixelPoint,
    pub thickness: u32,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Corner {
    TopLeft,
    TopRight,
    BottomLeft,
    BottomRight,
}

/// Filled caption box pinned to a canvas corner.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct TitleBox {
    pub text: String,
    pub corner: Corner,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct TitleBoxStyle {
    /// Distance from the canvas edges.
    pub margin: u32,
    pub padding_x: u32,
    pub padding_y: u32,
    pub fill: [u8; 3],
}

impl Default for TitleBoxStyle {
    fn default() -> Self {
        Self {
            margin: 10,
            padding_x: 5,
            padding_y: 10,
            fill: [0, 0, 0],
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct LayoutConfig {
    pub canvas: PixelSize,
    pub background: [u8; 3],
    pub config_panel: Panel,
    pub stress_panel: Panel,
    pub temperature_panel: Panel,
    /// Footprint the legend image is resized to.
    pub legend_size: PixelSize,
    /// Static captions drawn over the configuration panel.
    pub annotations: Vec<Label>,
    /// Baseline anchor of the `t = ... s` label.
    pub time_label_at: PixelPoint,
    pub label_style: LabelStyle,
    pub dividers: Vec<Divider>,
    pub divider_color: [u8; 3],
    pub title_boxes: Vec<TitleBox>,
    pub title_box_style: TitleBoxStyle,
}

impl Default for LayoutConfig {
    fn default() -> Self {
        Self {
            canvas: PixelSize::new(1500, 1650),
            background: [255, 255, 255],
            config_panel: Panel {
                origin: PixelPoint::new(0, 0),
                crop: PixelSize::new(1500, 850),
                legend: None,
            },
            stress_panel: Panel {
                origin: PixelPoint::new(0, 850),
                crop: PixelSize::new(750, 800),
                legend: Some(LegendOverlay {
                    at: PixelPoint::new(275, 1560),
                    title: Label::new("Von Mises Stress (MPa)", 215, 1540),
                    low: Label::new("0", 225, 1580),
                    high: Label::new("300", 505, 1580),
                }),
            },
            temperature_panel: Panel {
                origin: PixelPoint::new(750, 850),
                crop: PixelSize::new(750, 800),
                legend: Some(LegendOverlay {
                    at: PixelPoint::new(1025, 1560),
                    title: Label::new("Temperature (K)", 1010, 1540),
                    low: Label::new("298", 955, 1580),
                    high: Label::new("398", 1255, 1580),
                }),
            },
            legend_size: PixelSize::new(200, 30),
            annotations: vec![
                Label::new("Impact Velocity: 1.2 km/s", 50, 125),
                Label::new("Plate Thickness: 9.5 mm", 50, 425),
                Label::new("Residual Velocity: 0.79 km/s", 50, 725),
            ],
            time_label_at: PixelPoint::new(1100, 725),
            label_style: LabelStyle::default(),
            dividers: vec![
                Divider {
                    from: PixelPoint::new(0, 850),
                    to: PixelPoint::new(1500, 850),
                    thickness: 5,
                },
                Divider {
                    from: PixelPoint::new(750, 850),
                    to: PixelPoint::new(750, 1650),
                    thickness: 5,
                },
            ],
            divider_color: [0, 0, 0],
            title_boxes: vec![
                TitleBox {
                    text: "Penetration of Solutionized A6 MgPlate".to_string(),
                    corner: Corner::TopLeft,
                },
                TitleBox {
                    text: "Sun Research Group, University of Kentucky".to_string(),
                    corner: Corner::TopRight,
                },
                TitleBox {
                    text: "Created by Rong Jin".to_string(),
                    corner: Corner::BottomRight,
                },
            ],
            title_box_style: TitleBoxStyle::default(),
        }
    }
}

impl LayoutConfig {
    /// Panels in paint order: configuration, stress, temperature.
    pub fn panels(&self) -> [&Panel; 3] {
        [&self.config_panel, &self.stress_panel, &self.temperature_panel]
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ThreadingConfig {
    /// Composite frames on a rayon pool instead of the calling thread.
    pub parallel: bool,
    /// Worker count; `None` lets rayon decide.
    pub threads: Option<usize>,
}

impl ReelConfig {
    /// Read a JSON configuration file. Fields absent from the file keep their defaults.
    pub fn load(path: &Path) -> ReelResult<Self> {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("read config '{}'", path.display()))?;
        Self::from_json_str(&text)
    }

    pub fn from_json_str(text: &str) -> ReelResult<Self> {
        serde_json::from_str(text)
            .map_err(|e| ReelError::validation(format!("invalid config JSON: {e}")))
    }

    pub fn to_json_pretty(&self) -> ReelResult<String> {
        Ok(serde_json::to_string_pretty(self).context("serialize config")?)
    }

    /// Resolve a configured path against [`ReelConfig::root`].
    pub fn resolve(&self, path: &Path) -> PathBuf {
        if path.is_absolute() {
            path.to_path_buf()
        } else {
            self.root.join(path)
        }
    }

    pub fn frames_dir(&self) -> PathBuf {
        self.resolve(&self.output.frames_dir)
    }

    pub fn frame_output_path(&self, index: u64) -> PathBuf {
        self.frames_dir().join(self.output.frame_file_name(index))
    }

    pub fn validate(&self) -> ReelResult<()> {
        let layout = &self.layout;
        let canvas = layout.canvas;
        if canvas.is_empty() {
            return Err(ReelError::validation("canvas width/height must be non-zero"));
        }
        if !canvas.width.is_multiple_of(2) || !canvas.height.is_multiple_of(2) {
            return Err(ReelError::validation(
                "canvas width/height must be even (required for yuv420p mp4 output)",
            ));
        }

        if self.input.frame_count == 0 {
            return Err(ReelError::validation("input frame_count must be > 0"));
        }
        for (name, pattern) in [
            ("config", &self.input.config),
            ("stress", &self.input.stress),
            ("temperature", &self.input.temperature),
        ] {
            if pattern.prefix.is_empty() || pattern.extension.is_empty() {
                return Err(ReelError::validation(format!(
                    "{name} frame pattern needs a prefix and an extension"
                )));
            }
        }

        Fps::new(self.timing.fps.num, self.timing.fps.den)?;
        if !self.timing.dt.is_finite() || self.timing.dt <= 0.0 {
            return Err(ReelError::validation("timing dt must be finite and > 0"));
        }

        if !self.font.size_px.is_finite() || self.font.size_px <= 0.0 {
            return Err(ReelError::validation("font size_px must be finite and > 0"));
        }

        let bounds = PixelRect::new(0, 0, canvas.width, canvas.height);
        let names = ["config_panel", "stress_panel", "temperature_panel"];
        for (name, panel) in names.into_iter().zip(layout.panels()) {
            if panel.crop.is_empty() {
                return Err(ReelError::validation(format!(
                    "{name} crop size must be non-zero"
                )));
            }
            if !bounds.contains_rect(panel.region()) {
                return Err(ReelError::validation(format!(
                    "{name} region {:?} does not fit the {}x{} canvas",
                    panel.region(),
                    canvas.width,
                    canvas.height
                )));
            }
            if let Some(legend) = &panel.legend {
                let rect = PixelRect::at(legend.at, layout.legend_size);
                if !bounds.contains_rect(rect) {
                    return Err(ReelError::validation(format!(
                        "{name} legend at ({}, {}) does not fit the canvas",
                        legend.at.x, legend.at.y
                    )));
                }
            }
        }
        if layout.legend_size.is_empty() {
            return Err(ReelError::validation("legend_size must be non-zero"));
        }

        let style = layout.label_style;
        if style.blur_kernel > 1 && style.blur_kernel.is_multiple_of(2) {
            return Err(ReelError::validation("label blur_kernel must be odd"));
        }
        if !(0.0..=1.0).contains(&style.white_mix) {
            return Err(ReelError::validation("label white_mix must be within [0, 1]"));
        }

        for d in &layout.dividers {
            if d.thickness == 0 {
                return Err(ReelError::validation("divider thickness must be > 0"));
            }
            if d.from.x != d.to.x && d.from.y != d.to.y {
                return Err(ReelError::validation(
                    "dividers must be horizontal or vertical",
                ));
            }
        }

        if !matches!(
            self.output.frame_extension.to_ascii_lowercase().as_str(),
            "jpg" | "jpeg" | "png"
        ) {
            return Err(ReelError::validation(format!(
                "unsupported frame_extension '{}' (expected jpg, jpeg or png)",
                self.output.frame_extension
            )));
        }
        if !(1..=100).contains(&self.output.jpeg_quality) {
            return Err(ReelError::validation("jpeg_quality must be within 1..=100"));
        }

        if self.threading.threads == Some(0) {
            return Err(ReelError::validation(
                "threading 'threads' must be >= 1 when set",
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_validate() {
        ReelConfig::default().validate().unwrap();
    }

    #[test]
    fn partial_json_keeps_other_defaults() {
        let cfg = ReelConfig::from_json_str(
            r#"{ "root": "/data/run", "timing": { "dt": 2e-7 }, "input": { "frame_count": 5 } }"#,
        )
        .unwrap();
        assert_eq!(cfg.root, PathBuf::from("/data/run"));
        assert_eq!(cfg.timing.dt, 2e-7);
        assert_eq!(cfg.timing.fps, Fps { num: 10, den: 1 });
        assert_eq!(cfg.input.frame_count, 5);
        assert_eq!(cfg.layout, LayoutConfig::default());
    }

    #[test]
    fn unknown_fields_are_rejected() {
        let err = ReelConfig::from_json_str(r#"{ "fsp": 10 }"#).unwrap_err();
        assert!(matches!(err, ReelError::Validation(_)));
    }

    #[test]
    fn json_round_trip_preserves_defaults() {
        let cfg = ReelConfig::default();
        let back = ReelConfig::from_json_str(&cfg.to_json_pretty().unwrap()).unwrap();
        assert_eq!(back, cfg);
    }

    #[test]
    fn validation_catches_bad_layouts() {
        let mut cfg = ReelConfig::default();
        cfg.layout.canvas = PixelSize::new(1501, 1650);
        assert!(cfg.validate().is_err());

        let mut cfg = ReelConfig::default();
        cfg.layout.temperature_panel.origin = PixelPoint::new(800, 850);
        let err = cfg.validate().unwrap_err().to_string();
        assert!(err.contains("temperature_panel"), "{err}");

        let mut cfg = ReelConfig::default();
        cfg.layout.label_style.blur_kernel = 14;
        assert!(cfg.validate().is_err());

        let mut cfg = ReelConfig::default();
        cfg.timing.dt = 0.0;
        assert!(cfg.validate().is_err());

        let mut cfg = ReelConfig::default();
        cfg.threading.threads = Some(0);
        assert!(cfg.validate().is_err());

        let mut cfg = ReelConfig::default();
        cfg.output.frame_extension = "bmp".to_string();
        assert!(cfg.validate().is_err());
    }

    #[test]
    fn panels_are_in_paint_order() {
        let layout = LayoutConfig::default();
        let origins: Vec<PixelPoint> = layout.panels().iter().map(|p| p.origin).collect();
        assert_eq!(
            origins,
            [
                PixelPoint::new(0, 0),
                PixelPoint::new(0, 850),
                PixelPoint::new(750, 850)
            ]
        );
    }

    #[test]
    fn frame_names_are_zero_padded() {
        let cfg = ReelConfig {
            root: PathBuf::from("/tmp/reel"),
            ..ReelConfig::default()
        };
        assert_eq!(
            cfg.frame_output_path(7),
            PathBuf::from("/tmp/reel/processed_images/processed_007.jpg")
        );
    }
}
