//! Delete snapshots the retention policy no longer keeps

use crate::exec::Executor;
use crate::settings::{RetentionArgs, Settings};
use anyhow::{Context, Result};
use archive::{PrunePlan, Snapshot};
use owo_colors::OwoColorize;

/// Compute the prune set and print, list, or execute the deletions
pub async fn run(settings: &Settings, overrides: &RetentionArgs, list_only: bool) -> Result<PrunePlan> {
    let policy = settings.policy(overrides)?;

    // The lock is held from listing through deletion so the plan matches what gets removed
    let executor: Option<Executor> = if list_only { None } else { Some(settings.executor()?) };
    let _lock = match &executor {
        Some(executor) => executor.lock("prune")?,
        None => None,
    };

    let plan = settings
        .archive
        .plan_prune(&policy)
        .context("Failed to list snapshots")?;

    tracing::info!(
        keep = plan.keep.len(),
        prune = plan.prune.len(),
        "Planned prune"
    );

    if settings.verbose > 0 {
        print_section("Snapshots to prune:", &plan.prune);
        print_section("Snapshots to keep:", &plan.keep);
    }

    let Some(executor) = executor else {
        for snapshot in &plan.prune {
            println!("{}", snapshot.path.display());
        }
        return Ok(plan);
    };

    let commands: Vec<_> = plan
        .prune
        .iter()
        .map(|s| settings.backend.delete_snapshot_command(&s.path))
        .collect();
    let deleted = executor.run_all(&commands).await?;

    if !executor.is_dry_run() {
        eprintln!(
            "{} Pruned {} snapshot(s), kept {}",
            "✓".green(),
            deleted.to_string().yellow(),
            plan.keep.len()
        );
    }
    Ok(plan)
}

fn print_section(title: &str, snapshots: &[Snapshot]) {
    eprintln!("{}", title.bold());
    for snapshot in snapshots {
        eprintln!("\t{}", snapshot.path.display());
    }
    eprintln!();
}
