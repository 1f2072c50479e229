//! Path helpers for output naming and display.

use std::path::{Path, PathBuf};

/// Build `<dir>/<stem><suffix>.<ext>` next to `input`.
///
/// # Example
/// ```ignore
/// let out = sibling_with_suffix(Path::new("book/page.html"), "-optimised");
/// assert_eq!(out, PathBuf::from("book/page-optimised.html"));
/// ```
pub fn sibling_with_suffix(input: &Path, suffix: &str) -> PathBuf {
    let stem = input
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default();
    let name = match input.extension() {
        Some(ext) => format!("{stem}{suffix}.{}", ext.to_string_lossy()),
        None => format!("{stem}{suffix}"),
    };
    input.with_file_name(name)
}

/// Append a suffix to the whole file name: `out.html` -> `out.html.temp`.
pub fn with_appended(path: &Path, suffix: &str) -> PathBuf {
    let mut name = path.as_os_str().to_owned();
    name.push(suffix);
    PathBuf::from(name)
}

/// File name for log lines, falling back to the full path.
pub fn display_name(path: &Path) -> String {
    path.file_name()
        .map_or_else(|| path.display().to_string(), |n| n.to_string_lossy().into_owned())
}
