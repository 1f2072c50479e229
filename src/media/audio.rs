//! Audio transcoding through ffmpeg.

use super::{Compression, MediaError, Optimised, Outcome, Status};
use crate::utils::{
    exec::{Cmd, SILENT_FILTER},
    mime::{essence, types},
};
use std::{
    fs,
    path::{Path, PathBuf},
};

/// Audio below this size is kept as is.
pub const MIN_AUDIO_BYTES: usize = 10 * 1024;

/// Resolve the encoder program on `PATH`.
pub fn find_encoder(program: &str) -> Option<PathBuf> {
    which::which(program).ok()
}

/// Re-encode to MP3 at `bitrate` kbps and keep the result when smaller.
///
/// `encoder` is the resolved ffmpeg binary; `None` skips the asset.
pub fn optimise_audio(data: &[u8], mime: &str, bitrate: u32, encoder: Option<&Path>) -> Outcome {
    let Some(encoder) = encoder else {
        return Outcome::skipped(Status::SkippedError, MediaError::EncoderMissing.to_string());
    };
    if data.len() < MIN_AUDIO_BYTES {
        return Outcome::skipped(Status::SkippedSmall, format!("Too small: {} bytes", data.len()));
    }

    match transcode(data, mime, bitrate, encoder) {
        Ok(bytes) if bytes.len() < data.len() => Outcome::optimised(
            Status::Processed,
            Optimised {
                bytes,
                mime: types::MP3.to_owned(),
                compression: Compression::None,
            },
        ),
        Ok(bytes) => Outcome::skipped(
            Status::SkippedNoReduction,
            format!("No size reduction: {} -> {} bytes", data.len(), bytes.len()),
        ),
        Err(e) => Outcome::skipped(Status::SkippedError, e.to_string()),
    }
}

/// Run ffmpeg on a temporary copy; the directory is removed on drop.
fn transcode(data: &[u8], mime: &str, bitrate: u32, encoder: &Path) -> Result<Vec<u8>, MediaError> {
    let dir = tempfile::Builder::new()
        .prefix("pubkit-audio-")
        .tempdir()
        .map_err(|e| MediaError::Io(std::env::temp_dir(), e))?;
    let input = dir.path().join(format!("input.{}", extension(mime)));
    let output = dir.path().join("output.mp3");

    fs::write(&input, data).map_err(|e| MediaError::Io(input.clone(), e))?;

    Cmd::new(encoder)
        .args(["-y", "-loglevel", "error", "-i"])
        .arg(&input)
        .args(["-b:a", &format!("{bitrate}k"), "-map", "0:a"])
        .arg(&output)
        .filter(&SILENT_FILTER)
        .run()
        .map_err(|e| MediaError::EncoderFailed(format!("{e:#}")))?;

    fs::read(&output).map_err(|e| MediaError::Io(output, e))
}

/// File extension ffmpeg can probe the input by.
fn extension(mime: &str) -> &'static str {
    match essence(mime).to_ascii_lowercase().as_str() {
        "audio/mpeg" | "audio/mp3" => "mp3",
        "audio/wav" | "audio/wave" | "audio/x-wav" => "wav",
        "audio/ogg" => "ogg",
        "audio/aac" => "aac",
        "audio/mp4" | "audio/x-m4a" => "m4a",
        "audio/flac" | "audio/x-flac" => "flac",
        "audio/webm" => "webm",
        _ => "bin",
    }
}
