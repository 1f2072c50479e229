//! `[merge]` section configuration.
//!
//! # Example
//!
//! ```toml
//! [merge]
//! prefix = "publication"                  # publication-1.html, publication-2.html, ...
//! output = "merged-publication.html"      # written next to the pages
//! selector = 'div[style*="position:absolute;overflow:hidden"]'
//! lang = "de-DE"
//! title = "HTML5 Publication"
//! page_width = 840
//! page_height = 600
//! zoom_button = true
//! ```

use crate::config::{ConfigDiagnostics, FieldPath};
use crate::merge::Selector;
use serde::{Deserialize, Serialize};

/// Publication merge settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct MergeConfig {
    /// File name prefix of the per-page exports.
    pub prefix: String,

    /// Output file name, relative to the publication directory.
    pub output: String,

    /// Selector of the page node extracted from each export.
    pub selector: String,

    /// `lang` attribute of the merged document.
    pub lang: String,

    /// Document title.
    pub title: String,

    /// Stylesheet generated by the authoring tool.
    pub stylesheet: String,

    /// Script generated by the authoring tool.
    pub script: String,

    /// Page box width in pixels.
    pub page_width: u32,

    /// Page box height in pixels.
    pub page_height: u32,

    /// Floating zoom-reset button for touch devices.
    pub zoom_button: bool,
}

impl Default for MergeConfig {
    fn default() -> Self {
        Self {
            prefix: "publication".into(),
            output: "merged-publication.html".into(),
            selector: r#"div[style*="position:absolute;overflow:hidden"]"#.into(),
            lang: "de-DE".into(),
            title: "HTML5 Publication".into(),
            stylesheet: "../css/idGeneratedStyles.css".into(),
            script: "../script/idGeneratedScript.js".into(),
            page_width: 840,
            page_height: 600,
            zoom_button: true,
        }
    }
}

impl MergeConfig {
    const PREFIX: FieldPath = FieldPath::new("merge.prefix");
    const OUTPUT: FieldPath = FieldPath::new("merge.output");
    const SELECTOR: FieldPath = FieldPath::new("merge.selector");
    const PAGE_WIDTH: FieldPath = FieldPath::new("merge.page_width");
    const PAGE_HEIGHT: FieldPath = FieldPath::new("merge.page_height");

    pub fn validate(&self, diag: &mut ConfigDiagnostics) {
        if self.prefix.is_empty() {
            diag.error(Self::PREFIX, "must not be empty");
        }
        if self.output.is_empty() {
            diag.error(Self::OUTPUT, "must not be empty");
        }
        if let Err(e) = Selector::parse(&self.selector) {
            diag.error_with_hint(
                Self::SELECTOR,
                e.to_string(),
                r#"supported forms: tag, [attr], tag[attr="v"], tag[attr*="v"], tag[attr^="v"]"#,
            );
        }
        if self.page_width == 0 {
            diag.error(Self::PAGE_WIDTH, "must be greater than 0");
        }
        if self.page_height == 0 {
            diag.error(Self::PAGE_HEIGHT, "must be greater than 0");
        }
    }
}
