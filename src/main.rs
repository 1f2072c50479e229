//! pubkit - post-processing tools for desktop-publishing HTML exports.

#![allow(dead_code)]

mod cli;
mod config;
mod embed;
mod fonts;
mod logger;
mod media;
mod merge;
mod rewrite;
mod utils;

use anyhow::Result;
use clap::{ColorChoice, Parser};
use cli::{Cli, Commands};
use config::PubConfig;

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Set global color override based on CLI option
    match cli.color {
        ColorChoice::Always => owo_colors::set_override(true),
        ColorChoice::Never => owo_colors::set_override(false),
        ColorChoice::Auto => {} // owo-colors auto-detects TTY
    }
    logger::set_verbose(cli.is_verbose());

    let config = PubConfig::load(&cli)?;

    match &cli.command {
        Commands::Fonts { dir, dry_run } => cli::fonts::run_fonts(dir, *dry_run, &config),
        Commands::Merge { args } => cli::merge::run_merge(args, &config),
        Commands::Optimise { args } => cli::optimise::run_optimise(args, &config),
        Commands::Png2jpeg { args } => cli::optimise::run_png2jpeg(args, &config),
    }
}
