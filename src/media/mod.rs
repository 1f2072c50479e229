//! Data URI media optimisation.
//!
//! # Module Structure
//!
//! - `uri` - `data:<mime>;base64,` parsing and encoding
//! - `base85` - RFC 1924 payload encoding for deferred assets
//! - `image` - raster re-encoding, resizing, WebP, PNG to JPEG
//! - `svg` - minification and gzip
//! - `audio` - MP3 transcoding through ffmpeg
//! - `stats` - statuses and summaries
//!
//! # Flow
//!
//! ```text
//! data URI ─► decode ─► size gate ─► optimiser ─► encode ─► ratio gate ─► replacement
//!                                        │
//!                                        └─► AssetDetail (stats)
//! ```

pub mod audio;
pub mod base85;
mod error;
pub mod image;
pub mod stats;
pub mod svg;
mod uri;

pub use error::MediaError;
pub use stats::{AssetDetail, KindStats, MediaStats, SizeReport, Status};
pub use uri::{BASE64, DataUri, to_data_uri};

use self::image::ImageOptions;
use crate::{
    config::OptimiseConfig,
    debug, log,
    utils::mime::{MediaKind, essence, types},
};
use base64::Engine;
use std::path::PathBuf;

/// Payload text encoding of a deferred asset.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Encoding {
    Base64,
    Base85,
}

impl Encoding {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Base64 => "base64",
            Self::Base85 => "base85",
        }
    }
}

/// Compression applied before encoding.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Compression {
    None,
    Gzip,
}

impl Compression {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::None => "none",
            Self::Gzip => "gzip",
        }
    }
}

/// Where a data URI sits in the document.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SiteKind {
    /// `<img src>`
    Img,
    /// `<source srcset>`
    Srcset,
    /// `<source src>` / `<audio src>`
    Audio,
    /// `background-image: url(...)`
    Css,
}

impl SiteKind {
    /// Deferred sites are restored by the injected decoder, so they may use
    /// Base85 and gzip.
    pub const fn is_deferred(self) -> bool {
        matches!(self, Self::Img | Self::Srcset)
    }
}

/// Bytes produced by an optimiser.
#[derive(Debug, Clone)]
pub struct Optimised {
    pub bytes: Vec<u8>,
    pub mime: String,
    pub compression: Compression,
}

/// Result of one optimiser run.
#[derive(Debug)]
pub struct Outcome {
    pub status: Status,
    pub reason: Option<String>,
    pub optimised: Option<Optimised>,
}

impl Outcome {
    pub fn optimised(status: Status, optimised: Optimised) -> Self {
        Self {
            status,
            reason: None,
            optimised: Some(optimised),
        }
    }

    pub fn skipped(status: Status, reason: impl Into<String>) -> Self {
        Self {
            status,
            reason: Some(reason.into()),
            optimised: None,
        }
    }
}

/// Encoded replacement payload for one site.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Encoded {
    pub payload: String,
    pub mime: String,
    pub encoding: Encoding,
    pub compression: Compression,
}

/// What the rewriter gets back for one site.
#[derive(Debug, Default)]
pub struct SiteOutcome {
    /// `None` keeps the original text.
    pub encoded: Option<Encoded>,
    /// `None` for assets that are not counted.
    pub record: Option<(MediaKind, AssetDetail)>,
}

#[derive(Debug, Clone)]
pub enum Mode {
    Optimise,
    PngToJpeg { quality: u8, exclude: Vec<String> },
}

/// Run-wide optimisation settings.
#[derive(Debug, Clone)]
pub struct MediaOptions {
    pub mode: Mode,
    pub image: ImageOptions,
    pub audio_bitrate: u32,
    /// Resolved ffmpeg binary, for audio and lossy WebP.
    pub encoder: Option<PathBuf>,
    pub min_size: usize,
    pub min_ratio: f64,
    pub base85: bool,
    /// Empty means every kind.
    pub only: Vec<MediaKind>,
}

impl MediaOptions {
    /// Settings of the `optimise` command. ffmpeg is resolved here, once.
    pub fn optimise(config: &OptimiseConfig, only: &[MediaKind]) -> Self {
        let mut opts = Self::base(config, Mode::Optimise);
        opts.only = only.to_vec();
        let audio = opts.allows(MediaKind::Audio);
        let webp = opts.image.webp && opts.allows(MediaKind::Image);
        if audio || webp {
            opts.encoder = audio::find_encoder(&config.ffmpeg);
        }
        if opts.encoder.is_none() {
            if audio {
                log!("warning"; "`{}` not found, audio will be left unchanged", config.ffmpeg);
            }
            if webp {
                log!("warning"; "`{}` not found, WebP will be lossless", config.ffmpeg);
            }
        }
        opts
    }

    /// Settings of the `png2jpeg` command.
    pub fn png_to_jpeg(config: &OptimiseConfig) -> Self {
        let mode = Mode::PngToJpeg {
            quality: config.jpeg_quality,
            exclude: config.exclude.clone(),
        };
        Self {
            base85: false,
            ..Self::base(config, mode)
        }
    }

    fn base(config: &OptimiseConfig, mode: Mode) -> Self {
        Self {
            mode,
            image: ImageOptions {
                quality: config.image_quality,
                webp: config.webp,
                max_dimension: config.max_dimension,
            },
            audio_bitrate: config.audio_bitrate,
            encoder: None,
            min_size: config.min_size,
            min_ratio: config.min_ratio,
            base85: config.base85,
            only: Vec::new(),
        }
    }

    pub fn allows(&self, kind: MediaKind) -> bool {
        self.only.is_empty() || self.only.contains(&kind)
    }

    fn encoding_for(&self, kind: MediaKind, site: SiteKind) -> Encoding {
        if self.base85 && kind != MediaKind::Audio && site.is_deferred() {
            Encoding::Base85
        } else {
            Encoding::Base64
        }
    }
}

/// Optimise the data URI `text` found at a `site`.
pub fn process_data_uri(text: &str, site: SiteKind, opts: &MediaOptions) -> SiteOutcome {
    let Some(uri) = DataUri::parse(text) else {
        return SiteOutcome::default();
    };
    let Some(kind) = MediaKind::of(uri.mime) else {
        return SiteOutcome::default();
    };
    if !opts.allows(kind) {
        return SiteOutcome::default();
    }

    let data = match uri.decode() {
        Ok(data) => data,
        Err(_) => {
            log!("warning"; "invalid base64 data found for {}", uri.mime);
            return SiteOutcome::default();
        }
    };
    if data.len() < opts.min_size {
        return SiteOutcome::default();
    }

    match &opts.mode {
        Mode::Optimise => optimise_site(&uri, kind, data, site, opts),
        Mode::PngToJpeg { quality, exclude } => convert_site(&uri, &data, *quality, exclude),
    }
}

fn optimise_site(
    uri: &DataUri<'_>,
    kind: MediaKind,
    data: Vec<u8>,
    site: SiteKind,
    opts: &MediaOptions,
) -> SiteOutcome {
    let outcome = match kind {
        MediaKind::Image => image::optimise_image(&data, &opts.image, opts.encoder.as_deref()),
        MediaKind::Svg => svg::optimise_svg(&data, site.is_deferred()),
        MediaKind::Audio => audio::optimise_audio(
            &data,
            uri.mime,
            opts.audio_bitrate,
            opts.encoder.as_deref(),
        ),
    };

    let mut detail = AssetDetail {
        mime: uri.mime.to_owned(),
        size: data.len(),
        status: outcome.status,
        reason: outcome.reason,
        sizes: outcome
            .optimised
            .as_ref()
            .map(|optimised| (data.len(), optimised.bytes.len())),
    };
    if detail.status.is_failure() {
        debug!("optimise"; "{} left unchanged: {}", uri.mime, detail.reason.as_deref().unwrap_or_default());
        return SiteOutcome {
            encoded: None,
            record: Some((kind, detail)),
        };
    }

    // A declined optimisation still re-encodes the original bytes, so
    // Base85 alone can pass the ratio gate.
    let candidate = outcome.optimised.unwrap_or_else(|| Optimised {
        bytes: data,
        mime: uri.mime.to_owned(),
        compression: Compression::None,
    });
    let encoded = encode(candidate, opts.encoding_for(kind, site));

    if meets_ratio(uri.payload.len(), encoded.payload.len(), opts.min_ratio) {
        return SiteOutcome {
            encoded: Some(encoded),
            record: Some((kind, detail)),
        };
    }

    if detail.status.is_processed() {
        detail.status = Status::SkippedNoReduction;
        detail.reason = Some(format!("Below minimum ratio of {:.2}", opts.min_ratio));
    }
    SiteOutcome {
        encoded: None,
        record: Some((kind, detail)),
    }
}

fn convert_site(uri: &DataUri<'_>, data: &[u8], quality: u8, exclude: &[String]) -> SiteOutcome {
    if !essence(uri.mime).eq_ignore_ascii_case(types::PNG) {
        return SiteOutcome::default();
    }
    if is_excluded(uri.payload, exclude) {
        debug!("png2jpeg"; "skipping excluded PNG: {}...", excluded_head(uri.payload));
        return SiteOutcome::default();
    }

    let detail = |status, reason, sizes| AssetDetail {
        mime: uri.mime.to_owned(),
        size: data.len(),
        status,
        reason,
        sizes,
    };

    match image::convert_png_to_jpeg(data, quality) {
        Ok(jpeg) => {
            let record = detail(Status::Processed, None, Some((data.len(), jpeg.len())));
            let encoded = encode(
                Optimised {
                    bytes: jpeg,
                    mime: types::JPEG.to_owned(),
                    compression: Compression::None,
                },
                Encoding::Base64,
            );
            SiteOutcome {
                encoded: Some(encoded),
                record: Some((MediaKind::Image, record)),
            }
        }
        Err(e) => SiteOutcome {
            encoded: None,
            record: Some((
                MediaKind::Image,
                detail(Status::SkippedInvalid, Some(format!("Exception: {e}")), None),
            )),
        },
    }
}

/// Base64 prefixes are compared within the first 26 characters.
const EXCLUDE_WINDOW: usize = 26;

fn excluded_head(payload: &str) -> &str {
    payload
        .char_indices()
        .nth(EXCLUDE_WINDOW)
        .map_or(payload, |(end, _)| &payload[..end])
}

fn is_excluded(payload: &str, exclude: &[String]) -> bool {
    let head = excluded_head(payload);
    exclude
        .iter()
        .any(|prefix| !prefix.is_empty() && head.starts_with(prefix.as_str()))
}

fn encode(candidate: Optimised, encoding: Encoding) -> Encoded {
    let payload = match encoding {
        Encoding::Base64 => BASE64.encode(&candidate.bytes),
        Encoding::Base85 => base85::encode(&candidate.bytes),
    };
    Encoded {
        payload,
        mime: candidate.mime,
        encoding,
        compression: candidate.compression,
    }
}

/// `(original - new) / original >= min_ratio`, measured on encoded text.
fn meets_ratio(original: usize, new: usize, min_ratio: f64) -> bool {
    original > 0 && (original as f64 - new as f64) / original as f64 >= min_ratio
}
