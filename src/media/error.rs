//! Per-asset failures.
//!
//! None of these abort a document: the rewriter logs them, counts the asset
//! as skipped and keeps its original text.

use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum MediaError {
    #[error("invalid base64 payload")]
    Base64(#[from] base64::DecodeError),

    #[error("unsupported image format `{0}`")]
    UnsupportedImage(String),

    #[error("image codec error")]
    Image(#[from] image::ImageError),

    #[error("SVG is not well-formed XML: {0}")]
    Svg(String),

    #[error("ffmpeg not found")]
    EncoderMissing,

    #[error("ffmpeg failed: {0}")]
    EncoderFailed(String),

    #[error("IO error on `{0}`")]
    Io(PathBuf, #[source] std::io::Error),
}
