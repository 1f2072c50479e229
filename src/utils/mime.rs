//! MIME type helpers for embedded media.
//!
//! Data URIs carry their own media type, so the helpers here classify that
//! string instead of guessing from file extensions.

/// Common MIME type constants.
pub mod types {
    // Images
    pub const PNG: &str = "image/png";
    pub const JPEG: &str = "image/jpeg";
    pub const GIF: &str = "image/gif";
    pub const WEBP: &str = "image/webp";
    pub const SVG: &str = "image/svg+xml";
    pub const BMP: &str = "image/bmp";

    // Audio
    pub const MP3: &str = "audio/mpeg";
}

/// Asset kind as counted in the optimisation summary.
///
/// SVG is counted with images but optimised separately.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, clap::ValueEnum)]
pub enum MediaKind {
    Image,
    Svg,
    Audio,
}

impl MediaKind {
    /// Classify a data URI media type. `None` for anything not optimised.
    pub fn of(mime: &str) -> Option<Self> {
        let mime = essence(mime);
        if mime.eq_ignore_ascii_case(types::SVG) {
            Some(Self::Svg)
        } else if is_image(mime) {
            Some(Self::Image)
        } else if is_audio(mime) {
            Some(Self::Audio)
        } else {
            None
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Self::Image => "image",
            Self::Svg => "svg",
            Self::Audio => "audio",
        }
    }
}

/// Strip parameters: `image/svg+xml;charset=utf-8` -> `image/svg+xml`.
pub fn essence(mime: &str) -> &str {
    mime.split(';').next().unwrap_or(mime).trim()
}

/// Check if the MIME type represents an image.
pub fn is_image(mime: &str) -> bool {
    has_prefix(mime, "image/")
}

/// Check if the MIME type represents audio.
pub fn is_audio(mime: &str) -> bool {
    has_prefix(mime, "audio/")
}

/// ASCII case-insensitive prefix check that never splits a character.
fn has_prefix(mime: &str, prefix: &str) -> bool {
    mime.get(..prefix.len())
        .is_some_and(|head| head.eq_ignore_ascii_case(prefix))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_media_kind() {
        assert_eq!(MediaKind::of(types::PNG), Some(MediaKind::Image));
        assert_eq!(MediaKind::of("IMAGE/JPEG"), Some(MediaKind::Image));
        assert_eq!(MediaKind::of(types::SVG), Some(MediaKind::Svg));
        assert_eq!(MediaKind::of("image/svg+xml;charset=utf-8"), Some(MediaKind::Svg));
        assert_eq!(MediaKind::of("audio/wav"), Some(MediaKind::Audio));
        assert_eq!(MediaKind::of("font/woff2"), None);
        assert_eq!(MediaKind::of("text"), None);
    }

    #[test]
    fn test_non_ascii_mime() {
        assert_eq!(MediaKind::of("imageé/png"), None);
        assert_eq!(MediaKind::of("audiö/wav"), None);
        assert!(!is_image("ïmage"));
        assert!(!is_audio("é"));
    }

    #[test]
    fn test_essence() {
        assert_eq!(essence("image/png"), "image/png");
        assert_eq!(essence("image/svg+xml; charset=utf-8"), "image/svg+xml");
    }
}
