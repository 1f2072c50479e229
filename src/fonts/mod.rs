//! Font file renaming.
//!
//! Desktop-publishing exports ship system fonts under their short Windows
//! file names (`calibrib.ttf`, `arialbi.ttf`, ...). Stylesheets generated
//! alongside them reference family-style names instead, so the files are
//! renamed in place through a fixed lookup table.

use crate::{log, utils::path::display_name};
use anyhow::{Result, bail};
use std::{
    collections::BTreeMap,
    fs,
    path::{Path, PathBuf},
};

/// Built-in rename table: lower-cased source name -> target name.
const BUILTIN_FONTS: &[(&str, &str)] = &[
    ("calibrib.ttf", "Calibri-Bold.ttf"),
    ("calibrii.ttf", "Calibri-Italic.ttf"),
    ("calibribi.ttf", "Calibri-BoldItalic.ttf"),
    ("arialbd.ttf", "Arial-Bold.ttf"),
    ("ariali.ttf", "Arial-Italic.ttf"),
    ("arialbi.ttf", "Arial-BoldItalic.ttf"),
    ("timesbd.ttf", "Times-New-Roman-Bold.ttf"),
    ("timesi.ttf", "Times-New-Roman-Italic.ttf"),
    ("timesbi.ttf", "Times-New-Roman-BoldItalic.ttf"),
    ("verdanab.ttf", "Verdana-Bold.ttf"),
    ("verdanai.ttf", "Verdana-Italic.ttf"),
    ("verdanabi.ttf", "Verdana-BoldItalic.ttf"),
    ("georgiabd.ttf", "Georgia-Bold.ttf"),
    ("georgiai.ttf", "Georgia-Italic.ttf"),
    ("georgiabi.ttf", "Georgia-BoldItalic.ttf"),
];

/// Case-insensitive font name lookup.
#[derive(Debug, Clone)]
pub struct FontMap {
    entries: BTreeMap<String, String>,
}

impl Default for FontMap {
    fn default() -> Self {
        Self {
            entries: BUILTIN_FONTS
                .iter()
                .map(|(from, to)| ((*from).to_owned(), (*to).to_owned()))
                .collect(),
        }
    }
}

impl FontMap {
    /// Built-in table extended (or overridden) by `extra`.
    pub fn with_overrides<'a>(extra: impl IntoIterator<Item = (&'a String, &'a String)>) -> Self {
        let mut map = Self::default();
        for (from, to) in extra {
            map.entries.insert(from.to_lowercase(), to.clone());
        }
        map
    }

    /// Target name for `file_name`, matched case-insensitively.
    pub fn lookup(&self, file_name: &str) -> Option<&str> {
        self.entries.get(&file_name.to_lowercase()).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }
}

/// Options for [`rename_fonts`].
#[derive(Debug, Clone)]
pub struct RenameOptions {
    /// Extensions treated as fonts (case-insensitive, without the dot).
    pub extensions: Vec<String>,
    /// Report without renaming.
    pub dry_run: bool,
}

impl Default for RenameOptions {
    fn default() -> Self {
        Self {
            extensions: vec!["ttf".into(), "otf".into()],
            dry_run: false,
        }
    }
}

/// Outcome counts of a rename run.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct RenameReport {
    pub renamed: usize,
    pub skipped: usize,
    pub failed: usize,
}

impl RenameReport {
    /// `Summary: N renamed, M skipped[, K failed]`
    pub fn summary(&self) -> String {
        let mut line = format!("Summary: {} renamed, {} skipped", self.renamed, self.skipped);
        if self.failed > 0 {
            line.push_str(&format!(", {} failed", self.failed));
        }
        line
    }
}

/// Rename every mapped font file in `dir`.
///
/// A file whose target already exists is skipped; a failed rename is logged
/// and counted without stopping the run.
pub fn rename_fonts(dir: &Path, map: &FontMap, options: &RenameOptions) -> Result<RenameReport> {
    if !dir.exists() {
        bail!("directory '{}' does not exist", dir.display());
    }
    if !dir.is_dir() {
        bail!("'{}' is not a directory", dir.display());
    }

    let mut report = RenameReport::default();
    for path in font_files(dir, &options.extensions)? {
        let name = display_name(&path);
        let Some(target_name) = map.lookup(&name) else {
            continue;
        };
        let target = dir.join(target_name);

        if target.exists() {
            log!("fonts"; "Skipping: {} → {} (target already exists)", name, target_name);
            report.skipped += 1;
            continue;
        }

        if options.dry_run {
            log!("fonts"; "Would rename: {} → {}", name, target_name);
            report.renamed += 1;
            continue;
        }

        match fs::rename(&path, &target) {
            Ok(()) => {
                log!("fonts"; "Renamed: {} → {}", name, target_name);
                report.renamed += 1;
            }
            Err(e) => {
                log!("error"; "Failed to rename {} → {}: {}", name, target_name, e);
                report.failed += 1;
            }
        }
    }

    Ok(report)
}

/// Regular files in `dir` with a font extension, sorted by name.
fn font_files(dir: &Path, extensions: &[String]) -> Result<Vec<PathBuf>> {
    let mut files: Vec<PathBuf> = fs::read_dir(dir)?
        .filter_map(|entry| entry.ok().map(|e| e.path()))
        .filter(|path| path.is_file() && has_extension(path, extensions))
        .collect();
    files.sort();
    Ok(files)
}

fn has_extension(path: &Path, extensions: &[String]) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .is_some_and(|ext| extensions.iter().any(|want| want.eq_ignore_ascii_case(ext)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn touch(dir: &Path, name: &str) {
        fs::write(dir.join(name), b"font").unwrap();
    }

    #[test]
    fn test_lookup_case_insensitive() {
        let map = FontMap::default();
        assert_eq!(map.len(), 15);
        assert_eq!(map.lookup("CALIBRIB.TTF"), Some("Calibri-Bold.ttf"));
        assert_eq!(map.lookup("georgiabi.ttf"), Some("Georgia-BoldItalic.ttf"));
        assert_eq!(map.lookup("calibri.ttf"), None);
    }

    #[test]
    fn test_overrides() {
        let extra: BTreeMap<String, String> = [
            ("SegoeUIB.ttf".to_owned(), "Segoe-UI-Bold.ttf".to_owned()),
            ("arialbd.ttf".to_owned(), "Arial-Heavy.ttf".to_owned()),
        ]
        .into();
        let map = FontMap::with_overrides(&extra);
        assert_eq!(map.len(), 16);
        assert_eq!(map.lookup("segoeuib.ttf"), Some("Segoe-UI-Bold.ttf"));
        assert_eq!(map.lookup("arialbd.ttf"), Some("Arial-Heavy.ttf"));
    }

    #[test]
    fn test_rename_fonts() {
        let dir = TempDir::new().unwrap();
        touch(dir.path(), "ArialBD.TTF");
        touch(dir.path(), "timesi.ttf");
        touch(dir.path(), "unknown.ttf");
        touch(dir.path(), "calibrib.woff");

        let report = rename_fonts(dir.path(), &FontMap::default(), &RenameOptions::default()).unwrap();
        assert_eq!(report, RenameReport { renamed: 2, skipped: 0, failed: 0 });
        assert!(dir.path().join("Arial-Bold.ttf").exists());
        assert!(dir.path().join("Times-New-Roman-Italic.ttf").exists());
        assert!(!dir.path().join("timesi.ttf").exists());
        assert!(dir.path().join("unknown.ttf").exists());
        assert!(dir.path().join("calibrib.woff").exists());
    }

    #[test]
    fn test_existing_target_skipped() {
        let dir = TempDir::new().unwrap();
        touch(dir.path(), "verdanab.ttf");
        fs::write(dir.path().join("Verdana-Bold.ttf"), b"keep").unwrap();

        let report = rename_fonts(dir.path(), &FontMap::default(), &RenameOptions::default()).unwrap();
        assert_eq!(report.skipped, 1);
        assert_eq!(report.renamed, 0);
        assert!(dir.path().join("verdanab.ttf").exists());
        assert_eq!(fs::read(dir.path().join("Verdana-Bold.ttf")).unwrap(), b"keep");
    }

    #[test]
    fn test_dry_run_leaves_files() {
        let dir = TempDir::new().unwrap();
        touch(dir.path(), "calibrii.ttf");

        let options = RenameOptions {
            dry_run: true,
            ..Default::default()
        };
        let report = rename_fonts(dir.path(), &FontMap::default(), &options).unwrap();
        assert_eq!(report.renamed, 1);
        assert!(dir.path().join("calibrii.ttf").exists());
        assert!(!dir.path().join("Calibri-Italic.ttf").exists());
    }

    #[test]
    fn test_missing_or_file_dir() {
        let dir = TempDir::new().unwrap();
        let missing = dir.path().join("nope");
        let err = rename_fonts(&missing, &FontMap::default(), &RenameOptions::default()).unwrap_err();
        assert!(err.to_string().contains("does not exist"));

        touch(dir.path(), "file.ttf");
        let err = rename_fonts(&dir.path().join("file.ttf"), &FontMap::default(), &RenameOptions::default())
            .unwrap_err();
        assert!(err.to_string().contains("not a directory"));
    }

    #[test]
    fn test_summary_line() {
        let report = RenameReport { renamed: 3, skipped: 1, failed: 0 };
        assert_eq!(report.summary(), "Summary: 3 renamed, 1 skipped");
        let report = RenameReport { failed: 2, ..report };
        assert_eq!(report.summary(), "Summary: 3 renamed, 1 skipped, 2 failed");
    }
}
