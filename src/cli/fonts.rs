//! `fonts` command.

use crate::{
    config::PubConfig,
    fonts::{FontMap, RenameOptions, rename_fonts},
    log,
};
use anyhow::Result;
use std::path::Path;

/// Rename the fonts in `dir` with the built-in map plus `[fonts.map]`.
pub fn run_fonts(dir: &Path, dry_run: bool, config: &PubConfig) -> Result<()> {
    let map = FontMap::with_overrides(&config.fonts.map);
    let options = RenameOptions {
        extensions: config.fonts.extensions.clone(),
        dry_run,
    };

    let report = rename_fonts(dir, &map, &options)?;
    log!("summary"; "{}", report.summary());
    Ok(())
}
