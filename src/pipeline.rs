//! End-to-end runs: enumerate, composite, assemble.

use std::path::{Path, PathBuf};

use anyhow::Context as _;
use rayon::prelude::*;

use crate::assemble::assemble_video;
use crate::assets::{load_font, load_legend};
use crate::compose::{FrameCompositor, write_frame};
use crate::config::ReelConfig;
use crate::encode::ffmpeg::{FfmpegSink, FfmpegSinkOpts, ensure_parent_dir};
use crate::encode::sink::FrameSink;
use crate::enumerate::{FrameTriple, enumerate_frames};
use crate::foundation::core::FrameIndex;
use crate::foundation::error::{ReelError, ReelResult};
use crate::text::{BlockTextRenderer, FontTextRenderer, TextRenderer};

/// Builds one [`TextRenderer`] per compositing thread.
pub type RendererFactory<'a> = dyn Fn() -> ReelResult<Box<dyn TextRenderer>> + Sync + 'a;

/// Outcome of a run.
#[derive(Clone, Debug, Default)]
pub struct RunReport {
    /// Written frame files, in frame order.
    pub frames: Vec<PathBuf>,
    /// Indices missing from at least one category.
    pub skipped: Vec<FrameIndex>,
    /// Video output path, when a video was assembled.
    pub video: Option<PathBuf>,
    pub video_frames: usize,
}

/// Load the configured font once and hand out renderers built from it.
pub fn font_renderer_factory(
    cfg: &ReelConfig,
) -> ReelResult<impl Fn() -> ReelResult<Box<dyn TextRenderer>> + Sync + use<>> {
    let path = cfg.resolve(&cfg.font.path);
    let bytes = load_font(&path)?;
    let size_px = cfg.font.size_px;
    // Reject non-font files before any frame work starts.
    let checked = FontTextRenderer::new(bytes.clone(), size_px)
        .map_err(|e| ReelError::asset_load(&path, e))?;
    tracing::info!(family = checked.family_name(), size_px, "font ready");

    Ok(move || {
        let renderer = FontTextRenderer::new(bytes.clone(), size_px)?;
        Ok(Box::new(renderer) as Box<dyn TextRenderer>)
    })
}

/// Renderers that draw solid glyph blocks; needs no font file.
pub fn block_renderer_factory() -> impl Fn() -> ReelResult<Box<dyn TextRenderer>> + Sync {
    || Ok(Box::new(BlockTextRenderer::default()) as Box<dyn TextRenderer>)
}

/// Full run with the configured font, writing the MP4 through `ffmpeg`.
pub fn run(cfg: &ReelConfig) -> ReelResult<RunReport> {
    cfg.validate()?;
    let make_renderer = font_renderer_factory(cfg)?;
    run_with_renderer(cfg, &make_renderer)
}

/// Full run with caller-provided renderers, writing the MP4 through `ffmpeg`.
pub fn run_with_renderer(
    cfg: &ReelConfig,
    make_renderer: &RendererFactory<'_>,
) -> ReelResult<RunReport> {
    let video = cfg.resolve(&cfg.output.video_path);
    let mut opts = FfmpegSinkOpts::new(&video);
    opts.overwrite = cfg.output.overwrite;
    let mut sink = FfmpegSink::new(opts);

    let mut report = render_to_sink(cfg, make_renderer, &mut sink)?;
    report.video = Some(video);
    Ok(report)
}

/// Composite every aligned frame, then assemble them into `sink`.
pub fn render_to_sink(
    cfg: &ReelConfig,
    make_renderer: &RendererFactory<'_>,
    sink: &mut dyn FrameSink,
) -> ReelResult<RunReport> {
    let mut report = composite_frames(cfg, make_renderer)?;
    report.video_frames = assemble_video(&report.frames, cfg.timing.fps, sink)?;
    tracing::info!(frames = report.video_frames, "video assembled");
    Ok(report)
}

/// Composite every aligned frame into the frames directory; no video.
pub fn composite_frames(
    cfg: &ReelConfig,
    make_renderer: &RendererFactory<'_>,
) -> ReelResult<RunReport> {
    cfg.validate()?;
    let legend = load_legend(&cfg.resolve(&cfg.input.legend), cfg.layout.legend_size)?;
    let compositor = FrameCompositor::new(cfg, &legend)?;

    let enumeration = enumerate_frames(cfg)?;
    let frames_dir = cfg.frames_dir();
    std::fs::create_dir_all(&frames_dir).with_context(|| {
        format!("failed to create frames directory '{}'", frames_dir.display())
    })?;

    tracing::info!(
        frames = enumeration.frames.len(),
        skipped = enumeration.skipped.len(),
        parallel = cfg.threading.parallel,
        out = %frames_dir.display(),
        "compositing frames"
    );
    let written = if cfg.threading.parallel {
        composite_parallel(&compositor, &enumeration.frames, make_renderer, cfg.threading.threads)?
    } else {
        composite_sequential(&compositor, &enumeration.frames, make_renderer)?
    };
    tracing::info!(frames = written.len(), "frames written");

    Ok(RunReport {
        frames: written,
        skipped: enumeration.skipped,
        video: None,
        video_frames: 0,
    })
}

fn composite_sequential(
    compositor: &FrameCompositor<'_>,
    frames: &[FrameTriple],
    make_renderer: &RendererFactory<'_>,
) -> ReelResult<Vec<PathBuf>> {
    let mut renderer = make_renderer()?;
    frames
        .iter()
        .map(|triple| compositor.compose_to_file(triple, &mut *renderer))
        .collect()
}

fn composite_parallel(
    compositor: &FrameCompositor<'_>,
    frames: &[FrameTriple],
    make_renderer: &RendererFactory<'_>,
    threads: Option<usize>,
) -> ReelResult<Vec<PathBuf>> {
    let pool = build_thread_pool(threads)?;
    // Collecting into a `Result` stops handing out frames after the first error.
    pool.install(|| {
        frames
            .par_iter()
            .map_init(make_renderer, |renderer, triple| -> ReelResult<PathBuf> {
                let renderer = renderer.as_mut().map_err(|e| {
                    ReelError::render(format!("text renderer init failed: {e}"))
                })?;
                compositor.compose_to_file(triple, &mut **renderer)
            })
            .collect::<ReelResult<Vec<PathBuf>>>()
    })
}

fn build_thread_pool(threads: Option<usize>) -> ReelResult<rayon::ThreadPool> {
    if let Some(n) = threads
        && n == 0
    {
        return Err(ReelError::validation(
            "threading 'threads' must be >= 1 when set",
        ));
    }

    let mut builder = rayon::ThreadPoolBuilder::new();
    if let Some(n) = threads {
        builder = builder.num_threads(n);
    }
    builder
        .build()
        .map_err(|e| ReelError::render(format!("failed to build rayon thread pool: {e}")))
}

/// Composite frame `index` alone and write it to `out`.
///
/// All three sources must exist for `index`; a missing one is [`ReelError::MissingFrameFile`].
pub fn composite_single_frame(
    cfg: &ReelConfig,
    index: FrameIndex,
    out: &Path,
    make_renderer: &RendererFactory<'_>,
) -> ReelResult<PathBuf> {
    cfg.validate()?;
    let legend = load_legend(&cfg.resolve(&cfg.input.legend), cfg.layout.legend_size)?;
    let compositor = FrameCompositor::new(cfg, &legend)?;

    let root = cfg.root.as_path();
    let input = &cfg.input;
    let locate = |category: &str, pattern: &crate::enumerate::FramePattern| {
        let path = pattern.path_for(root, index);
        if path.is_file() {
            Ok(path)
        } else {
            Err(ReelError::missing_frame(category, index))
        }
    };
    let triple = FrameTriple {
        index,
        config: locate("config", &input.config)?,
        stress: locate("stress", &input.stress)?,
        temperature: locate("temperature", &input.temperature)?,
    };

    let mut renderer = make_renderer()?;
    let canvas = compositor.compose(&triple, &mut *renderer)?;
    ensure_parent_dir(out)?;
    write_frame(&canvas, out, cfg.output.jpeg_quality)?;
    tracing::info!(index = index.0, out = %out.display(), "wrote frame");
    Ok(out.to_path_buf())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn thread_pool_rejects_zero_threads() {
        assert!(matches!(
            build_thread_pool(Some(0)),
            Err(ReelError::Validation(_))
        ));
        assert!(build_thread_pool(Some(2)).is_ok());
    }

    #[test]
    fn missing_font_is_an_asset_error() {
        let mut cfg = ReelConfig::default();
        cfg.root = std::env::temp_dir().join(format!("simreel_no_font_{}", std::process::id()));
        let err = font_renderer_factory(&cfg).err().unwrap();
        assert!(matches!(err, ReelError::AssetLoad(_)));
    }

    #[test]
    fn block_factory_builds_renderers() {
        let make = block_renderer_factory();
        let mut r = make().unwrap();
        assert!(r.measure("abc").unwrap().width > 0);
    }
}
