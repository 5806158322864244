//! Encoding sinks.
//!
//! Sinks consume assembled frames in order; [`ffmpeg::FfmpegSink`] produces the MP4.

/// `ffmpeg`-based sink (MP4 output via system `ffmpeg`).
pub mod ffmpeg;
/// Generic frame sink trait and built-in sinks.
pub mod sink;
