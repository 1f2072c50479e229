//! `optimise` and `png2jpeg` commands.

use super::{OptimiseArgs, Png2JpegArgs, RewriteArgs};
use crate::{
    config::PubConfig,
    debug_do, log,
    media::{KindStats, MediaOptions},
    rewrite::{RewriteReport, RewriteSettings, rewrite_file},
    utils::path::{display_name, sibling_with_suffix},
};
use anyhow::Result;
use std::path::PathBuf;

pub fn run_optimise(args: &OptimiseArgs, config: &PubConfig) -> Result<()> {
    let opts = MediaOptions::optimise(&config.optimise, &args.only);
    let report = run_rewrite("optimise", &args.common, "-optimised", &opts, config)?;
    print_report(&report, true);
    Ok(())
}

pub fn run_png2jpeg(args: &Png2JpegArgs, config: &PubConfig) -> Result<()> {
    let opts = MediaOptions::png_to_jpeg(&config.optimise);
    let report = run_rewrite("png2jpeg", &args.common, "-jpeg_converted", &opts, config)?;
    print_report(&report, false);
    Ok(())
}

fn run_rewrite(
    module: &'static str,
    common: &RewriteArgs,
    default_suffix: &str,
    opts: &MediaOptions,
    config: &PubConfig,
) -> Result<RewriteReport> {
    let output = output_path(common, default_suffix);
    let settings = RewriteSettings {
        chunk_size: common.chunks.then_some(config.optimise.chunk_size),
        loader_text: config.optimise.loader_text.clone(),
        progress: (!common.chunks).then_some(module),
    };

    if common.chunks {
        log!(module; "processing {} in chunks of {} bytes", display_name(&common.input), config.optimise.chunk_size);
    } else {
        log!(module; "processing {}", display_name(&common.input));
    }

    let report = rewrite_file(&common.input, &output, opts, &settings)?;
    log!(module; "optimised file written to: {}", output.display());
    Ok(report)
}

fn output_path(common: &RewriteArgs, default_suffix: &str) -> PathBuf {
    common
        .output
        .clone()
        .unwrap_or_else(|| sibling_with_suffix(&common.input, default_suffix))
}

fn print_report(report: &RewriteReport, with_audio: bool) {
    for line in report.sizes.lines() {
        log!("summary"; "{}", line);
    }

    print_kind(&report.stats.image, "image");
    if with_audio {
        print_kind(&report.stats.audio, "audio");
    }
}

/// Per-asset details only show with `--verbose`.
fn print_kind(stats: &KindStats, label: &str) {
    for line in stats.summary(label) {
        log!("summary"; "{}", line);
    }
    debug_do! {
        for line in stats.detail_lines(label) {
            log!("summary"; "{}", line);
        }
    }
}
