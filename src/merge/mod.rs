//! Publication merging.
//!
//! # Module Structure
//!
//! - `scan` - find `<prefix>-<n>.html` exports in numeric order
//! - `extract` - pull the page container out of each export
//! - `render` - emit the merged shell with navigation between pages
//!
//! # Flow
//!
//! ```text
//! publication-1.html ─┐
//! publication-2.html ─┼─► extract page node ─► render ─► merged-publication.html
//! publication-10.html ┘
//! ```

mod extract;
mod render;
mod scan;

pub use extract::{Selector, SelectorError, extract_page};
pub use render::{MergeSettings, MergedPage, render_document};
pub use scan::{PublicationPage, find_publication_files};

use crate::{
    config::MergeConfig,
    log,
    utils::{path::display_name, plural::plural_count},
};
use anyhow::{Context, Result};
use rayon::prelude::*;
use std::{
    fs,
    path::{Path, PathBuf},
};

/// Result of [`merge_pages`].
#[derive(Debug)]
pub struct MergedDocument {
    pub html: String,
    /// Page numbers that made it into the document.
    pub merged: Vec<u32>,
    /// Page numbers without a matching page node.
    pub skipped: Vec<u32>,
}

impl MergeSettings {
    pub fn from_config(config: &MergeConfig) -> Self {
        Self {
            prefix: config.prefix.clone(),
            lang: config.lang.clone(),
            title: config.title.clone(),
            stylesheet: config.stylesheet.clone(),
            script: config.script.clone(),
            page_width: config.page_width,
            page_height: config.page_height,
            zoom_button: config.zoom_button,
        }
    }
}

/// Read every page, extract its node and render the merged document.
///
/// A page without a matching node is skipped with a warning; the others keep
/// their numbers.
pub fn merge_pages(
    pages: &[PublicationPage],
    selector: &Selector,
    settings: &MergeSettings,
) -> Result<MergedDocument> {
    let extracted: Vec<(u32, Option<String>)> = pages
        .par_iter()
        .map(|page| {
            let html = fs::read_to_string(&page.path)
                .with_context(|| format!("failed to read {}", page.path.display()))?;
            Ok((page.number, extract_page(&html, selector)))
        })
        .collect::<Result<_>>()?;

    let mut merged_pages = Vec::with_capacity(extracted.len());
    let mut skipped = Vec::new();
    for ((number, content), page) in extracted.into_iter().zip(pages) {
        match content {
            Some(content) => merged_pages.push(MergedPage { number, content }),
            None => {
                log!("warning"; "no page content found in {}, skipping", display_name(&page.path));
                skipped.push(number);
            }
        }
    }

    let html = render_document(&merged_pages, pages.len(), settings);
    Ok(MergedDocument {
        html,
        merged: merged_pages.iter().map(|p| p.number).collect(),
        skipped,
    })
}

/// Merge all exports in `dir` into `dir/<output>`.
///
/// Returns `None` (and writes nothing) when no exports exist.
pub fn merge_publications(dir: &Path, config: &MergeConfig) -> Result<Option<PathBuf>> {
    let selector = Selector::parse(&config.selector)?;
    let pages = find_publication_files(dir, &config.prefix)?;

    if pages.is_empty() {
        log!(
            "merge";
            "no publication files found matching the pattern '{}-[number].html'",
            config.prefix
        );
        return Ok(None);
    }

    log!("merge"; "found {} to merge:", plural_count(pages.len(), "publication file"));
    for page in &pages {
        log!("merge"; "  - {}", display_name(&page.path));
    }

    let document = merge_pages(&pages, &selector, &MergeSettings::from_config(config))?;

    let output = dir.join(&config.output);
    fs::write(&output, &document.html)
        .with_context(|| format!("failed to write {}", output.display()))?;

    log!("merge"; "merged HTML file created at: {}", output.display());
    log!("summary"; "Total publications merged: {}", document.merged.len());
    Ok(Some(output))
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn export(number: u32) -> String {
        format!(
            r#"<!DOCTYPE html><html><head><title>p{number}</title></head><body>
<div style="width:840px;height:600px;position:absolute;overflow:hidden;"><p>Page {number}</p></div>
</body></html>"#
        )
    }

    #[test]
    fn test_merge_publications() {
        let dir = TempDir::new().unwrap();
        for n in [2, 1, 10] {
            fs::write(dir.path().join(format!("publication-{n}.html")), export(n)).unwrap();
        }
        fs::write(dir.path().join("publication-3.html"), "<html><body><p>cover</p></body></html>")
            .unwrap();

        let output = merge_publications(dir.path(), &MergeConfig::default())
            .unwrap()
            .unwrap();
        assert_eq!(output, dir.path().join("merged-publication.html"));

        let html = fs::read_to_string(&output).unwrap();
        let first = html.find("<p>Page 1</p>").unwrap();
        let second = html.find("<p>Page 2</p>").unwrap();
        let tenth = html.find("<p>Page 10</p>").unwrap();
        assert!(first < second && second < tenth);
        assert!(!html.contains("cover"));
        assert!(html.contains("id=\"publication-10\""));
        assert!(html.contains("max=\"4\""));
    }

    #[test]
    fn test_merge_pages_reports_skipped() {
        let dir = TempDir::new().unwrap();
        let good = dir.path().join("publication-1.html");
        let bad = dir.path().join("publication-2.html");
        fs::write(&good, export(1)).unwrap();
        fs::write(&bad, "<html><body></body></html>").unwrap();

        let pages = vec![
            PublicationPage { number: 1, path: good },
            PublicationPage { number: 2, path: bad },
        ];
        let selector = Selector::parse(&MergeConfig::default().selector).unwrap();
        let settings = MergeSettings::from_config(&MergeConfig::default());
        let document = merge_pages(&pages, &selector, &settings).unwrap();

        assert_eq!(document.merged, vec![1]);
        assert_eq!(document.skipped, vec![2]);
        assert!(!document.html.contains("class=\"separator\""));
    }

    #[test]
    fn test_no_files_writes_nothing() {
        let dir = TempDir::new().unwrap();
        let result = merge_publications(dir.path(), &MergeConfig::default()).unwrap();
        assert!(result.is_none());
        assert!(!dir.path().join("merged-publication.html").exists());
    }
}
