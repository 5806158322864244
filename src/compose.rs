//! Per-frame compositing: one canvas from one source triple.

use std::fs::File;
use std::io::{BufWriter, Write as _};
use std::path::{Path, PathBuf};

use anyhow::Context as _;
use image::{ImageEncoder as _, RgbImage};

use crate::assets::decode::read_rgb;
use crate::config::{Label, Panel, ReelConfig};
use crate::enumerate::FrameTriple;
use crate::foundation::core::{FrameIndex, time_for_index};
use crate::foundation::error::{ReelError, ReelResult};
use crate::render::{crop, raster};
use crate::text::{self, TextRenderer};

/// Decoded sources of one frame.
pub struct SourceImages<'a> {
    pub config: &'a RgbImage,
    pub stress: &'a RgbImage,
    pub temperature: &'a RgbImage,
}

/// Format like C's `%.{precision}e`: signed exponent with at least two digits.
pub fn format_scientific(value: f64, precision: usize) -> String {
    let s = format!("{value:.precision$e}");
    let Some((mantissa, exp)) = s.split_once('e') else {
        return s;
    };
    let (sign, digits) = match exp.strip_prefix('-') {
        Some(d) => ('-', d),
        None => ('+', exp),
    };
    format!("{mantissa}e{sign}{digits:0>2}")
}

/// `t = 1.00e-05 s` style label for a frame.
pub fn time_label(index: FrameIndex, dt: f64) -> String {
    format!("t = {} s", format_scientific(time_for_index(index, dt), 2))
}

/// Composites frames according to a validated [`ReelConfig`].
///
/// Holds only shared, read-only state, so one compositor can serve several worker threads as
/// long as each brings its own [`TextRenderer`].
pub struct FrameCompositor<'a> {
    cfg: &'a ReelConfig,
    legend: &'a RgbImage,
}

impl<'a> FrameCompositor<'a> {
    pub fn new(cfg: &'a ReelConfig, legend: &'a RgbImage) -> ReelResult<Self> {
        cfg.validate()?;
        let expected = cfg.layout.legend_size;
        if raster::size_of(legend) != expected {
            return Err(ReelError::validation(format!(
                "legend is {}x{} but the layout expects {}x{}",
                legend.width(),
                legend.height(),
                expected.width,
                expected.height
            )));
        }
        Ok(Self { cfg, legend })
    }

    /// Build the canvas for frame `index` from already decoded sources.
    pub fn compose_images(
        &self,
        index: FrameIndex,
        sources: &SourceImages<'_>,
        renderer: &mut dyn TextRenderer,
    ) -> ReelResult<RgbImage> {
        let layout = &self.cfg.layout;
        let font = &self.cfg.font;
        let style = &layout.label_style;
        let mut canvas = raster::filled(layout.canvas, layout.background);

        self.paint_panel(&mut canvas, &layout.config_panel, sources.config, "config", index, renderer)?;
        for label in &layout.annotations {
            text::draw_label(&mut canvas, renderer, label, style, font.label_color)?;
        }
        let time = Label {
            text: time_label(index, self.cfg.timing.dt),
            at: layout.time_label_at,
        };
        text::draw_label(&mut canvas, renderer, &time, style, font.label_color)?;

        self.paint_panel(&mut canvas, &layout.stress_panel, sources.stress, "stress", index, renderer)?;
        self.paint_panel(
            &mut canvas,
            &layout.temperature_panel,
            sources.temperature,
            "temperature",
            index,
            renderer,
        )?;

        for divider in &layout.dividers {
            raster::draw_divider(&mut canvas, divider, layout.divider_color);
        }
        for title in &layout.title_boxes {
            text::draw_title_box(
                &mut canvas,
                renderer,
                title,
                &layout.title_box_style,
                font.title_color,
            )?;
        }
        Ok(canvas)
    }

    fn paint_panel(
        &self,
        canvas: &mut RgbImage,
        panel: &Panel,
        src: &RgbImage,
        category: &str,
        index: FrameIndex,
        renderer: &mut dyn TextRenderer,
    ) -> ReelResult<()> {
        let cropped = crop::crop_bottom_center(src, panel.crop).map_err(|e| {
            ReelError::invalid_source(format!("{category} frame {index}: {e}"))
        })?;
        raster::paste(canvas, &cropped, panel.origin);

        if let Some(legend) = &panel.legend {
            raster::paste(canvas, self.legend, legend.at);
            let layout = &self.cfg.layout;
            for label in [&legend.title, &legend.low, &legend.high] {
                text::draw_label(
                    canvas,
                    renderer,
                    label,
                    &layout.label_style,
                    self.cfg.font.label_color,
                )?;
            }
        }
        Ok(())
    }

    /// Decode the triple's sources and build its canvas.
    #[tracing::instrument(skip_all, fields(index = triple.index.0))]
    pub fn compose(
        &self,
        triple: &FrameTriple,
        renderer: &mut dyn TextRenderer,
    ) -> ReelResult<RgbImage> {
        let load = |category: &str, path: &Path| {
            read_rgb(path).map_err(|e| {
                ReelError::invalid_source(format!(
                    "{category} frame {}: {e}",
                    triple.index
                ))
            })
        };
        let config = load("config", &triple.config)?;
        let stress = load("stress", &triple.stress)?;
        let temperature = load("temperature", &triple.temperature)?;
        tracing::debug!(
            config = ?(config.width(), config.height()),
            stress = ?(stress.width(), stress.height()),
            temperature = ?(temperature.width(), temperature.height()),
            "decoded sources"
        );

        self.compose_images(
            triple.index,
            &SourceImages {
                config: &config,
                stress: &stress,
                temperature: &temperature,
            },
            renderer,
        )
    }

    /// Compose the triple and write it to its output path; returns that path.
    pub fn compose_to_file(
        &self,
        triple: &FrameTriple,
        renderer: &mut dyn TextRenderer,
    ) -> ReelResult<PathBuf> {
        let canvas = self.compose(triple, renderer)?;
        let path = self.cfg.frame_output_path(triple.index.0);
        write_frame(&canvas, &path, self.cfg.output.jpeg_quality)?;
        tracing::debug!(index = triple.index.0, path = %path.display(), "wrote frame");
        Ok(path)
    }
}

/// Encode `img` as JPEG (at `jpeg_quality`) or PNG, chosen by the file extension.
pub fn write_frame(img: &RgbImage, path: &Path, jpeg_quality: u8) -> ReelResult<()> {
    let format = image::ImageFormat::from_path(path)
        .with_context(|| format!("unknown image format for '{}'", path.display()))?;
    let file =
        File::create(path).with_context(|| format!("create frame '{}'", path.display()))?;
    let mut out = BufWriter::new(file);
    match format {
        image::ImageFormat::Jpeg => {
            image::codecs::jpeg::JpegEncoder::new_with_quality(&mut out, jpeg_quality)
                .write_image(
                    img.as_raw(),
                    img.width(),
                    img.height(),
                    image::ExtendedColorType::Rgb8,
                )
                .with_context(|| format!("encode jpeg '{}'", path.display()))?;
        }
        image::ImageFormat::Png => {
            img.write_to(&mut out, image::ImageFormat::Png)
                .with_context(|| format!("encode png '{}'", path.display()))?;
        }
        other => {
            return Err(ReelError::validation(format!(
                "unsupported frame format {other:?} for '{}'",
                path.display()
            )));
        }
    }
    out.flush()
        .with_context(|| format!("flush frame '{}'", path.display()))?;
    Ok(())
}
