//! Show snapshots and what the retention policy would do with them

use crate::settings::{RetentionArgs, Settings};
use crate::util;
use anyhow::{Context, Result};
use bkang_core::{Clock, Timestamp};
use owo_colors::OwoColorize;

pub async fn run(settings: &Settings, overrides: &RetentionArgs, clock: &dyn Clock) -> Result<()> {
    let policy = settings.policy(overrides)?;
    let plan = settings
        .archive
        .plan_prune(&policy)
        .context("Failed to list snapshots")?;

    if plan.keep.is_empty() {
        println!(
            "{}",
            format!("No snapshots in {}", settings.archive.snapshots_path().display()).dimmed()
        );
        return Ok(());
    }

    let now = Timestamp::now_with(clock)?;
    let mut all: Vec<_> = plan.keep.iter().chain(plan.prune.iter()).collect();
    all.sort();

    for snapshot in all {
        let ts = &snapshot.timestamp;
        let tiers = plan.retention.tiers_keeping(ts);
        let verdict = if tiers.is_empty() {
            "prune".red().to_string()
        } else {
            util::format_tiers(&tiers).green().to_string()
        };
        println!(
            "{}  {}  {:<16}  {}",
            ts.render().yellow(),
            ts.pretty(),
            util::format_age(now - *ts).dimmed(),
            verdict
        );
    }

    println!();
    println!(
        "{} kept, {} to prune",
        plan.keep.len().to_string().green(),
        plan.prune.len().to_string().red()
    );
    Ok(())
}
