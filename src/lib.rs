//! Simreel turns per-timestep simulation snapshots into an annotated presentation video.
//!
//! Each time step contributes three images (configuration, von-Mises stress, temperature).
//! A run:
//!
//! - enumerates and aligns the three image sequences by frame index
//! - composites every aligned triple onto one annotated canvas and writes it to disk
//! - reads the written frames back in order and streams them into a [`FrameSink`]
//!
//! [`run`] drives the whole thing from a [`ReelConfig`]; the stages are public for callers that
//! want only part of it.
#![forbid(unsafe_code)]

pub mod assemble;
pub mod assets;
pub mod compose;
pub mod config;
/// Frame sinks (in-memory and `ffmpeg`).
pub mod encode;
pub mod enumerate;
mod foundation;
pub mod pipeline;
/// Raster primitives used by the compositor.
pub mod render;
pub mod text;

pub use crate::foundation::core::{
    Fps, FrameIndex, PixelPoint, PixelRect, PixelSize, time_for_index,
};
pub use crate::foundation::error::{ReelError, ReelResult};

pub use crate::assemble::assemble_video;
pub use crate::compose::{FrameCompositor, SourceImages, time_label, write_frame};
pub use crate::config::ReelConfig;
pub use crate::encode::ffmpeg::{FfmpegSink, FfmpegSinkOpts, is_ffmpeg_on_path};
pub use crate::encode::sink::{FrameRgb, FrameSink, InMemorySink, SinkConfig};
pub use crate::enumerate::{AlignmentPolicy, Enumeration, FramePattern, FrameTriple, enumerate_frames};
pub use crate::pipeline::{
    RendererFactory, RunReport, block_renderer_factory, composite_frames, composite_single_frame,
    font_renderer_factory, render_to_sink, run, run_with_renderer,
};
pub use crate::text::{BlockTextRenderer, FontTextRenderer, TextExtent, TextRenderer};
