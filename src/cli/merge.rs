//! `merge` command.

use super::MergeArgs;
use crate::{config::PubConfig, merge::merge_publications};
use anyhow::Result;

pub fn run_merge(args: &MergeArgs, config: &PubConfig) -> Result<()> {
    merge_publications(&args.dir, &config.merge).map(|_| ())
}
