//! Video assembly: read the written frames back in order and feed them to a [`FrameSink`].

use std::path::PathBuf;

use crate::assets::decode::read_rgb;
use crate::encode::sink::{FrameRgb, FrameSink, SinkConfig};
use crate::foundation::core::{Fps, FrameIndex};
use crate::foundation::error::{ReelError, ReelResult};

/// Push one video frame per path, in the given order. Returns the number of frames pushed.
///
/// Every frame must match the size of the first one. Any failure is reported as
/// [`ReelError::Encoding`].
pub fn assemble_video(frames: &[PathBuf], fps: Fps, sink: &mut dyn FrameSink) -> ReelResult<usize> {
    push_all(frames, fps, sink).map_err(ReelError::into_encoding)
}

fn push_all(frames: &[PathBuf], fps: Fps, sink: &mut dyn FrameSink) -> ReelResult<usize> {
    let Some(first_path) = frames.first() else {
        return Err(ReelError::encoding("no frames to assemble"));
    };
    let first = read_rgb(first_path)?;
    let (width, height) = first.dimensions();
    tracing::info!(frames = frames.len(), width, height, fps = fps.as_f64(), "assembling video");

    sink.begin(SinkConfig { width, height, fps })?;
    sink.push_frame(FrameIndex(0), &FrameRgb::from_image(first))?;
    for (i, path) in frames.iter().enumerate().skip(1) {
        let img = read_rgb(path)?;
        if img.dimensions() != (width, height) {
            return Err(ReelError::encoding(format!(
                "frame '{}' is {}x{}, expected {width}x{height}",
                path.display(),
                img.width(),
                img.height()
            )));
        }
        sink.push_frame(FrameIndex(i as u64), &FrameRgb::from_image(img))?;
    }
    sink.end()?;
    Ok(frames.len())
}
