//! Command-line interface definitions.

use crate::utils::mime::MediaKind;
use clap::{ColorChoice, Parser, Subcommand};
use std::path::PathBuf;

/// Post-processing tools for desktop-publishing HTML exports
#[derive(Parser, Debug, Clone)]
#[command(version, about, long_about = None, arg_required_else_help = true)]
pub struct Cli {
    /// Control colored output (auto, always, never)
    #[arg(long, global = true, default_value = "auto")]
    pub color: ColorChoice,

    /// Config file path (default: pubkit.toml, searched upward from cwd)
    #[arg(short = 'C', long, global = true, default_value = "pubkit.toml", value_hint = clap::ValueHint::FilePath)]
    pub config: PathBuf,

    /// subcommands
    #[command(subcommand)]
    pub command: Commands,
}

/// Available subcommands
#[derive(Subcommand, Debug, Clone)]
pub enum Commands {
    /// Rename exported font files to their family-style names
    #[command(visible_alias = "f")]
    Fonts {
        /// Directory containing the font files (e.g., ./fonts)
        #[arg(value_hint = clap::ValueHint::DirPath)]
        dir: PathBuf,

        /// Report what would be renamed without touching the disk
        #[arg(short = 'n', long)]
        dry_run: bool,
    },

    /// Merge per-page publication exports into one navigable HTML file
    #[command(visible_alias = "m")]
    Merge {
        #[command(flatten)]
        args: MergeArgs,
    },

    /// Optimise base64-embedded images, SVG and audio inside an HTML file
    #[command(visible_alias = "o")]
    Optimise {
        #[command(flatten)]
        args: OptimiseArgs,
    },

    /// Convert base64-embedded PNG images to JPEG inside an HTML file
    #[command(visible_alias = "j")]
    Png2jpeg {
        #[command(flatten)]
        args: Png2JpegArgs,
    },
}

/// Merge command arguments.
#[derive(clap::Args, Debug, Clone)]
pub struct MergeArgs {
    /// Directory containing the publication-N.html files
    #[arg(default_value = ".", value_hint = clap::ValueHint::DirPath)]
    pub dir: PathBuf,

    /// Output file name, written inside the directory
    #[arg(short, long)]
    pub output: Option<String>,

    /// File name prefix of the per-page exports
    #[arg(short, long)]
    pub prefix: Option<String>,

    /// Omit the floating zoom-reset button
    #[arg(long)]
    pub no_zoom_button: bool,
}

/// Arguments shared by the data URI rewriting commands.
#[derive(clap::Args, Debug, Clone)]
pub struct RewriteArgs {
    /// Input HTML file path
    #[arg(value_hint = clap::ValueHint::FilePath)]
    pub input: PathBuf,

    /// Output HTML file path (default: next to the input, with a suffix)
    #[arg(short, long, value_hint = clap::ValueHint::FilePath)]
    pub output: Option<PathBuf>,

    /// Minimum decoded size in bytes to consider for optimisation
    #[arg(short, long)]
    pub min_size: Option<usize>,

    /// Minimum size reduction ratio to apply changes
    #[arg(short = 'r', long)]
    pub min_ratio: Option<f64>,

    /// Process the file in chunks (for very large files)
    #[arg(short, long)]
    pub chunks: bool,

    /// Print per-asset details
    #[arg(short, long)]
    pub verbose: bool,
}

/// Optimise command arguments.
#[derive(clap::Args, Debug, Clone)]
pub struct OptimiseArgs {
    #[command(flatten)]
    pub common: RewriteArgs,

    /// Image quality (1-100)
    #[arg(short = 'i', long, value_parser = clap::value_parser!(u8).range(1..=100))]
    pub image_quality: Option<u8>,

    /// Convert images to WebP when smaller
    #[arg(short, long, action = clap::ArgAction::Set, num_args = 0..=1, default_missing_value = "true", require_equals = true)]
    pub webp: Option<bool>,

    /// Maximum image dimension (larger images are resized)
    #[arg(short = 'd', long)]
    pub max_dimension: Option<u32>,

    /// Audio bitrate in kbps
    #[arg(short = 'a', long)]
    pub audio_bitrate: Option<u32>,

    /// Use Base85 instead of base64 for deferred images
    #[arg(long, action = clap::ArgAction::Set, num_args = 0..=1, default_missing_value = "true", require_equals = true)]
    pub base85: Option<bool>,

    /// Only process these asset kinds; others pass through untouched
    #[arg(long, value_enum, value_delimiter = ',')]
    pub only: Vec<MediaKind>,
}

/// PNG to JPEG command arguments.
#[derive(clap::Args, Debug, Clone)]
pub struct Png2JpegArgs {
    #[command(flatten)]
    pub common: RewriteArgs,

    /// JPEG quality for converted PNG images (1-100)
    #[arg(short = 'j', long, value_parser = clap::value_parser!(u8).range(1..=100))]
    pub jpeg_quality: Option<u8>,

    /// Base64 prefixes (first 26 chars) to exclude from conversion
    #[arg(short, long, num_args = 1..)]
    pub exclude: Vec<String>,
}

impl Cli {
    /// Verbose flag of the rewriting commands.
    pub const fn is_verbose(&self) -> bool {
        match &self.command {
            Commands::Optimise { args } => args.common.verbose,
            Commands::Png2jpeg { args } => args.common.verbose,
            _ => false,
        }
    }
}
