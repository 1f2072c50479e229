//! Command-line interface module.

mod args;
pub mod fonts;
pub mod merge;
pub mod optimise;

pub use args::{Cli, Commands, MergeArgs, OptimiseArgs, Png2JpegArgs, RewriteArgs};
