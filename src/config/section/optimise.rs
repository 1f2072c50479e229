//! `[optimise]` section configuration.
//!
//! Shared by `optimise` and `png2jpeg`.
//!
//! # Example
//!
//! ```toml
//! [optimise]
//! image_quality = 80        # JPEG/WebP quality (1-100)
//! webp = false              # Convert images to WebP when smaller
//! max_dimension = 2048      # Resize images whose longer side exceeds this
//! audio_bitrate = 128       # kbps for ffmpeg
//! min_size = 1024           # Ignore payloads smaller than this (bytes)
//! min_ratio = 0.05          # Keep a change only if it saves at least 5%
//! base85 = false            # Encode deferred images as Base85
//! chunk_size = 10485760     # Segment size for --chunks
//! loader_text = "Loading ..."
//! ffmpeg = "ffmpeg"
//! jpeg_quality = 75         # png2jpeg quality
//! exclude = []              # png2jpeg: base64 prefixes left untouched
//! ```

use crate::config::{ConfigDiagnostics, FieldPath};
use serde::{Deserialize, Serialize};

/// Data URI optimisation settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct OptimiseConfig {
    pub image_quality: u8,
    pub webp: bool,
    pub max_dimension: Option<u32>,
    pub audio_bitrate: u32,
    pub min_size: usize,
    pub min_ratio: f64,
    pub base85: bool,
    pub chunk_size: usize,
    pub loader_text: String,

    /// Program name or path of the audio encoder.
    pub ffmpeg: String,

    pub jpeg_quality: u8,
    pub exclude: Vec<String>,
}

impl Default for OptimiseConfig {
    fn default() -> Self {
        Self {
            image_quality: 80,
            webp: false,
            max_dimension: None,
            audio_bitrate: 128,
            min_size: 1024,
            min_ratio: 0.05,
            base85: false,
            chunk_size: 10 * 1024 * 1024,
            loader_text: "Loading ...".into(),
            ffmpeg: "ffmpeg".into(),
            jpeg_quality: 75,
            exclude: Vec::new(),
        }
    }
}

impl OptimiseConfig {
    const IMAGE_QUALITY: FieldPath = FieldPath::new("optimise.image_quality");
    const JPEG_QUALITY: FieldPath = FieldPath::new("optimise.jpeg_quality");
    const MAX_DIMENSION: FieldPath = FieldPath::new("optimise.max_dimension");
    const AUDIO_BITRATE: FieldPath = FieldPath::new("optimise.audio_bitrate");
    const MIN_RATIO: FieldPath = FieldPath::new("optimise.min_ratio");
    const CHUNK_SIZE: FieldPath = FieldPath::new("optimise.chunk_size");
    const FFMPEG: FieldPath = FieldPath::new("optimise.ffmpeg");

    pub fn validate(&self, diag: &mut ConfigDiagnostics) {
        for (field, quality) in [
            (Self::IMAGE_QUALITY, self.image_quality),
            (Self::JPEG_QUALITY, self.jpeg_quality),
        ] {
            if !(1..=100).contains(&quality) {
                diag.error(field, format!("must be between 1 and 100, got {quality}"));
            }
        }

        if self.max_dimension == Some(0) {
            diag.error(Self::MAX_DIMENSION, "must be greater than 0");
        }
        if self.audio_bitrate == 0 {
            diag.error(Self::AUDIO_BITRATE, "must be greater than 0");
        }
        if !self.min_ratio.is_finite() || self.min_ratio >= 1.0 {
            diag.error_with_hint(
                Self::MIN_RATIO,
                format!("must be a finite number below 1.0, got {}", self.min_ratio),
                "0.05 keeps a change only when it saves at least 5%",
            );
        }
        if self.chunk_size == 0 {
            diag.error(Self::CHUNK_SIZE, "must be greater than 0");
        }
        if self.ffmpeg.is_empty() {
            diag.error(Self::FFMPEG, "must not be empty");
        }
    }
}

#[cfg(test)]
mod tests {
    use crate::config::{ConfigDiagnostics, test_parse_config};

    #[test]
    fn test_optimise_config() {
        let config = test_parse_config(
            "[optimise]\nwebp = true\nmax_dimension = 1600\nmin_ratio = 0.1\nexclude = [\"iVBOR\"]",
        );
        assert!(config.optimise.webp);
        assert_eq!(config.optimise.max_dimension, Some(1600));
        assert_eq!(config.optimise.min_ratio, 0.1);
        assert_eq!(config.optimise.exclude, vec!["iVBOR"]);
    }

    #[test]
    fn test_optimise_config_defaults() {
        let config = test_parse_config("");
        assert_eq!(config.optimise.image_quality, 80);
        assert_eq!(config.optimise.audio_bitrate, 128);
        assert_eq!(config.optimise.min_size, 1024);
        assert_eq!(config.optimise.chunk_size, 10 * 1024 * 1024);
        assert_eq!(config.optimise.jpeg_quality, 75);
        assert_eq!(config.optimise.loader_text, "Loading ...");
        assert!(config.optimise.max_dimension.is_none());
    }

    #[test]
    fn test_optimise_validate() {
        let config = test_parse_config(
            "[optimise]\nimage_quality = 0\njpeg_quality = 101\nmin_ratio = 1.0\nchunk_size = 0",
        );
        let mut diag = ConfigDiagnostics::new();
        config.optimise.validate(&mut diag);
        assert_eq!(diag.len(), 4);
    }

    #[test]
    fn test_negative_ratio_is_allowed() {
        let config = test_parse_config("[optimise]\nmin_ratio = -0.5");
        let mut diag = ConfigDiagnostics::new();
        config.optimise.validate(&mut diag);
        assert!(diag.is_empty());
    }
}
