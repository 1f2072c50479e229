//! Config field path.

use crate::logger::paint;
use owo_colors::{Stream, Style};
use std::fmt;

/// Dotted path of a config field, as written in `pubkit.toml`.
///
/// # Example
///
/// ```ignore
/// const QUALITY: FieldPath = FieldPath::new("optimise.image_quality");
/// diag.error(QUALITY, "must be between 1 and 100");
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FieldPath(pub &'static str);

impl FieldPath {
    #[inline]
    pub const fn new(path: &'static str) -> Self {
        Self(path)
    }

    #[inline]
    pub const fn as_str(&self) -> &'static str {
        self.0
    }
}

impl fmt::Display for FieldPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let path = format!("`{}`", self.0);
        write!(f, "{}", paint(Stream::Stderr, path, Style::new().bright_blue()))
    }
}
