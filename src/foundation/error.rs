use std::path::Path;

use crate::foundation::core::FrameIndex;

/// Result alias used across the crate.
pub type ReelResult<T> = Result<T, ReelError>;

/// Error taxonomy for a reel run.
///
/// Every variant except [`ReelError::Other`] carries a human-readable message; the display
/// prefixes are stable so callers (and the CLI) can tell the stages apart.
#[derive(thiserror::Error, Debug)]
pub enum ReelError {
    /// Configuration or argument rejected before any work started.
    #[error("validation error: {0}")]
    Validation(String),

    /// Legend image or font could not be loaded.
    #[error("asset load error: {0}")]
    AssetLoad(String),

    /// A source frame file is absent and the alignment policy does not allow gaps.
    #[error("missing frame file: {category} frame {index}")]
    MissingFrameFile {
        /// Category name (`config`, `stress`, `temperature`).
        category: String,
        /// Frame index that has no file.
        index: FrameIndex,
    },

    /// A source frame is undecodable or smaller than its crop window.
    #[error("invalid source image: {0}")]
    InvalidSourceImage(String),

    /// Text shaping or rasterization failed.
    #[error("render error: {0}")]
    Render(String),

    /// Video assembly failed.
    #[error("encoding error: {0}")]
    Encoding(String),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl ReelError {
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    pub fn asset_load(path: &Path, msg: impl std::fmt::Display) -> Self {
        Self::AssetLoad(format!("'{}': {msg}", path.display()))
    }

    pub fn missing_frame(category: impl Into<String>, index: FrameIndex) -> Self {
        Self::MissingFrameFile {
            category: category.into(),
            index,
        }
    }

    pub fn invalid_source(msg: impl Into<String>) -> Self {
        Self::InvalidSourceImage(msg.into())
    }

    pub fn render(msg: impl Into<String>) -> Self {
        Self::Render(msg.into())
    }

    pub fn encoding(msg: impl Into<String>) -> Self {
        Self::Encoding(msg.into())
    }

    /// Re-tag any error raised while assembling the video as [`ReelError::Encoding`].
    pub(crate) fn into_encoding(self) -> Self {
        match self {
            Self::Encoding(_) => self,
            other => Self::Encoding(other.to_string()),
        }
    }
}
