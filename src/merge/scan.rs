//! Publication page discovery.

use anyhow::{Context, Result};
use regex::Regex;
use std::{
    fs,
    path::{Path, PathBuf},
};

/// One per-page export, e.g. `publication-3.html`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PublicationPage {
    pub number: u32,
    pub path: PathBuf,
}

/// Find files ending in `<prefix>-<n>.html` in `dir`, sorted by page number.
///
/// The name may carry anything before the prefix (`my-publication-3.html`).
/// Sorting is numeric, so `-10` comes after `-9`.
pub fn find_publication_files(dir: &Path, prefix: &str) -> Result<Vec<PublicationPage>> {
    let pattern = Regex::new(&format!(r"{}-(\d+)\.html$", regex::escape(prefix)))
        .context("invalid publication prefix")?;

    let entries =
        fs::read_dir(dir).with_context(|| format!("failed to read directory {}", dir.display()))?;

    let mut pages: Vec<_> = entries
        .filter_map(|entry| entry.ok().map(|e| e.path()))
        .filter(|path| path.is_file())
        .filter_map(|path| {
            let name = path.file_name()?.to_str()?;
            let number = pattern.captures(name)?.get(1)?.as_str().parse().ok()?;
            Some(PublicationPage { number, path })
        })
        .collect();

    pages.sort_by_key(|page| page.number);
    Ok(pages)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_numeric_order() {
        let dir = TempDir::new().unwrap();
        for name in [
            "publication-10.html",
            "publication-2.html",
            "publication-1.html",
            "publication-x.html",
            "publication-3.htm",
            "other-4.html",
            "merged-publication.html",
        ] {
            fs::write(dir.path().join(name), "").unwrap();
        }

        let pages = find_publication_files(dir.path(), "publication").unwrap();
        let numbers: Vec<_> = pages.iter().map(|p| p.number).collect();
        assert_eq!(numbers, vec![1, 2, 10]);
        assert_eq!(pages[2].path, dir.path().join("publication-10.html"));
    }

    #[test]
    fn test_prefix_is_literal() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("page.v2-1.html"), "").unwrap();
        fs::write(dir.path().join("pageXv2-2.html"), "").unwrap();

        let pages = find_publication_files(dir.path(), "page.v2").unwrap();
        assert_eq!(pages.len(), 1);
        assert_eq!(pages[0].number, 1);
    }

    #[test]
    fn test_prefix_may_be_preceded() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("my-publication-3.html"), "").unwrap();
        fs::write(dir.path().join("publication-1.html"), "").unwrap();
        fs::write(dir.path().join("publication-2.html.bak"), "").unwrap();

        let pages = find_publication_files(dir.path(), "publication").unwrap();
        let numbers: Vec<_> = pages.iter().map(|p| p.number).collect();
        assert_eq!(numbers, vec![1, 3]);
        assert_eq!(pages[1].path, dir.path().join("my-publication-3.html"));
    }

    #[test]
    fn test_empty_dir() {
        let dir = TempDir::new().unwrap();
        assert!(find_publication_files(dir.path(), "publication").unwrap().is_empty());
    }
}
