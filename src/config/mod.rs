//! Configuration management for `pubkit.toml`.
//!
//! # Module Structure
//!
//! ```text
//! config/
//! ├── section/       # Configuration section definitions
//! │   ├── fonts      # [fonts]
//! │   ├── merge      # [merge]
//! │   └── optimise   # [optimise]
//! ├── types/         # Utility types
//! │   ├── error      # ConfigError, ConfigDiagnostics
//! │   └── field      # FieldPath
//! └── mod.rs         # PubConfig (this file)
//! ```
//!
//! The config file is optional. Every field has a default, and command-line
//! flags override whatever the file sets.

pub mod section;
pub mod types;
mod util;

use util::find_config_file;

pub use section::{FontsConfig, MergeConfig, OptimiseConfig};
pub use types::{ConfigDiagnostics, ConfigError, FieldPath};

use crate::{
    cli::{Cli, Commands, RewriteArgs},
    log,
};
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::{
    fs,
    path::{Path, PathBuf},
};

// ============================================================================
// root configuration
// ============================================================================

/// Root configuration structure representing pubkit.toml
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PubConfig {
    /// Absolute path to the config file, if one was found (internal use only)
    #[serde(skip)]
    pub config_path: Option<PathBuf>,

    /// Font renaming settings
    #[serde(default)]
    pub fonts: FontsConfig,

    /// Publication merge settings
    #[serde(default)]
    pub merge: MergeConfig,

    /// Data URI optimisation settings
    #[serde(default)]
    pub optimise: OptimiseConfig,
}

impl PubConfig {
    /// Load configuration for the parsed command line.
    ///
    /// Searches upward from cwd for the config file, falls back to defaults
    /// when none exists, then applies CLI overrides and validates.
    pub fn load(cli: &Cli) -> Result<Self> {
        let cwd = std::env::current_dir().context("Failed to get current working directory")?;

        let mut config = match find_config_file(&cli.config, &cwd) {
            Some(path) => {
                let mut config = Self::from_path(&path)?;
                config.config_path = Some(path);
                config
            }
            None => Self::default(),
        };

        config.apply_command_options(cli);
        config.validate()?;
        Ok(config)
    }

    /// Load configuration from file path with unknown field detection.
    fn from_path(path: &Path) -> Result<Self> {
        let content =
            fs::read_to_string(path).map_err(|err| ConfigError::Io(path.to_path_buf(), err))?;

        let (config, ignored) = Self::parse_with_ignored(&content)?;
        if !ignored.is_empty() {
            Self::print_unknown_fields_warning(&ignored, path);
        }

        Ok(config)
    }

    /// Parse TOML content, collecting any unknown fields.
    fn parse_with_ignored(content: &str) -> Result<(Self, Vec<String>)> {
        let mut ignored = Vec::new();
        let deserializer = toml::Deserializer::new(content);
        let config = serde_ignored::deserialize(deserializer, |path: serde_ignored::Path| {
            ignored.push(path.to_string());
        })
        .map_err(ConfigError::Toml)?;
        Ok((config, ignored))
    }

    /// Print warning about unknown fields.
    fn print_unknown_fields_warning(fields: &[String], path: &Path) {
        let display_path = crate::utils::path::display_name(path);
        log!("warning"; "unknown fields in {}, ignoring:", display_path);
        for field in fields {
            eprintln!("- {}", field);
        }
    }

    // ========================================================================
    // command-line overrides
    // ========================================================================

    /// Apply command-specific CLI options.
    fn apply_command_options(&mut self, cli: &Cli) {
        match &cli.command {
            Commands::Fonts { .. } => {}
            Commands::Merge { args } => {
                Self::update_option(&mut self.merge.output, args.output.as_ref());
                Self::update_option(&mut self.merge.prefix, args.prefix.as_ref());
                if args.no_zoom_button {
                    self.merge.zoom_button = false;
                }
            }
            Commands::Optimise { args } => {
                let opts = &mut self.optimise;
                Self::update_option(&mut opts.image_quality, args.image_quality.as_ref());
                Self::update_option(&mut opts.webp, args.webp.as_ref());
                Self::update_option(&mut opts.audio_bitrate, args.audio_bitrate.as_ref());
                Self::update_option(&mut opts.base85, args.base85.as_ref());
                if args.max_dimension.is_some() {
                    opts.max_dimension = args.max_dimension;
                }
                self.apply_rewrite_args(&args.common);
            }
            Commands::Png2jpeg { args } => {
                Self::update_option(&mut self.optimise.jpeg_quality, args.jpeg_quality.as_ref());
                if !args.exclude.is_empty() {
                    self.optimise.exclude.clone_from(&args.exclude);
                }
                self.apply_rewrite_args(&args.common);
            }
        }
    }

    fn apply_rewrite_args(&mut self, args: &RewriteArgs) {
        Self::update_option(&mut self.optimise.min_size, args.min_size.as_ref());
        Self::update_option(&mut self.optimise.min_ratio, args.min_ratio.as_ref());
    }

    /// Update config option if CLI value is provided.
    fn update_option<T: Clone>(config_option: &mut T, cli_option: Option<&T>) {
        if let Some(option) = cli_option {
            *config_option = option.clone();
        }
    }

    // ========================================================================
    // validation
    // ========================================================================

    /// Validate all sections.
    ///
    /// Collects all validation errors and returns them at once.
    pub fn validate(&self) -> Result<()> {
        let mut diag = ConfigDiagnostics::new();

        self.fonts.validate(&mut diag);
        self.merge.validate(&mut diag);
        self.optimise.validate(&mut diag);

        diag.into_result()
            .map_err(|e| ConfigError::Diagnostics(e).into())
    }
}

// ============================================================================
// Test Helpers (available to all modules via `use crate::config::test_*`)
// ============================================================================

/// Parse config text.
/// Panics if there are unknown fields (to catch config typos in tests).
#[cfg(test)]
pub fn test_parse_config(content: &str) -> PubConfig {
    let (parsed, ignored) = PubConfig::parse_with_ignored(content).unwrap();
    assert!(
        ignored.is_empty(),
        "test config has unknown fields: {:?}",
        ignored
    );
    parsed
}

// ============================================================================
// tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;

    #[test]
    fn test_invalid_toml() {
        let result = PubConfig::parse_with_ignored("[merge\nprefix = \"p\"");
        assert!(result.is_err());
    }

    #[test]
    fn test_unknown_fields_detected() {
        let content = "[merge]\nprefix = \"page\"\nzoom = true\n[unknown_section]\nfield = 1";
        let (config, ignored) = PubConfig::parse_with_ignored(content).unwrap();

        assert_eq!(config.merge.prefix, "page");
        assert!(ignored.iter().any(|f| f == "merge.zoom"));
        assert!(ignored.iter().any(|f| f.contains("unknown_section")));
    }

    #[test]
    fn test_default_validates() {
        assert!(PubConfig::default().validate().is_ok());
    }

    #[test]
    fn test_cli_overrides_optimise() {
        let cli = Cli::parse_from([
            "pubkit", "optimise", "a.html", "-i", "60", "-d", "1200", "-r", "0.2", "--base85",
        ]);
        let mut config = test_parse_config("[optimise]\nimage_quality = 90\nmin_size = 4096");
        config.apply_command_options(&cli);

        assert_eq!(config.optimise.image_quality, 60);
        assert_eq!(config.optimise.max_dimension, Some(1200));
        assert_eq!(config.optimise.min_ratio, 0.2);
        assert!(config.optimise.base85);
        // not given on the command line, file value stays
        assert_eq!(config.optimise.min_size, 4096);
        assert!(!config.optimise.webp);
    }

    #[test]
    fn test_cli_overrides_merge() {
        let cli = Cli::parse_from(["pubkit", "merge", "out", "-p", "page", "--no-zoom-button"]);
        let mut config = PubConfig::default();
        config.apply_command_options(&cli);

        assert_eq!(config.merge.prefix, "page");
        assert_eq!(config.merge.output, "merged-publication.html");
        assert!(!config.merge.zoom_button);
    }

    #[test]
    fn test_cli_overrides_png2jpeg() {
        let cli = Cli::parse_from(["pubkit", "png2jpeg", "a.html", "-e", "iVBOR", "-j", "50"]);
        let mut config = test_parse_config("[optimise]\nexclude = [\"R0lGOD\"]");
        config.apply_command_options(&cli);

        assert_eq!(config.optimise.exclude, vec!["iVBOR"]);
        assert_eq!(config.optimise.jpeg_quality, 50);
    }

    #[test]
    fn test_validate_collects_all_sections() {
        let mut config = PubConfig::default();
        config.fonts.extensions.clear();
        config.merge.page_width = 0;
        config.optimise.min_ratio = f64::NAN;

        let err = config.validate().unwrap_err();
        let Some(ConfigError::Diagnostics(diag)) = err.downcast_ref::<ConfigError>() else {
            panic!("expected diagnostics");
        };
        assert_eq!(diag.len(), 3);
    }
}
