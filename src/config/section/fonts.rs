//! `[fonts]` section configuration.
//!
//! # Example
//!
//! ```toml
//! [fonts]
//! extensions = ["ttf", "otf"]
//!
//! [fonts.map]
//! segoeuib = "Segoe-UI-Bold.ttf"   # lower-cased source name = target name
//! ```

use crate::config::{ConfigDiagnostics, FieldPath};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Font renaming settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct FontsConfig {
    /// Extra or overriding entries for the built-in rename map.
    pub map: BTreeMap<String, String>,

    /// File extensions treated as fonts (case-insensitive).
    pub extensions: Vec<String>,
}

impl Default for FontsConfig {
    fn default() -> Self {
        Self {
            map: BTreeMap::new(),
            extensions: vec!["ttf".into(), "otf".into()],
        }
    }
}

impl FontsConfig {
    const MAP: FieldPath = FieldPath::new("fonts.map");
    const EXTENSIONS: FieldPath = FieldPath::new("fonts.extensions");

    pub fn validate(&self, diag: &mut ConfigDiagnostics) {
        if self.extensions.is_empty() {
            diag.error_with_hint(
                Self::EXTENSIONS,
                "at least one extension is required",
                r#"extensions = ["ttf", "otf"]"#,
            );
        }

        for (source, target) in &self.map {
            if target.is_empty() || target.contains(['/', '\\']) {
                diag.error(
                    Self::MAP,
                    format!("target for `{source}` must be a plain file name, got `{target}`"),
                );
            }
        }
    }
}
