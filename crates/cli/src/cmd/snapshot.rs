//! Freeze the staging directory into a dated snapshot

use crate::settings::Settings;
use anyhow::Result;
use bkang_core::{Clock, Timestamp};
use owo_colors::OwoColorize;

/// Create `snapshots/<now>` from `current/`; returns the new snapshot's name
pub async fn run(settings: &Settings, clock: &dyn Clock) -> Result<Timestamp> {
    let archive = &settings.archive;
    let ts = Timestamp::now_with(clock)?;
    let target = archive.snapshot_path(&ts);

    let command = settings.backend.create_snapshot_command(archive, &ts);

    let executor = settings.executor()?;
    let _lock = executor.lock("snapshot")?;

    if !executor.is_dry_run() {
        if target.exists() {
            anyhow::bail!("Snapshot {} already exists", target.display());
        }
        if !archive.current_path().is_dir() {
            anyhow::bail!(
                "Staging directory {} does not exist (run 'bkang init')",
                archive.current_path().display()
            );
        }
    }

    executor.run(&command).await?;

    if !executor.is_dry_run() {
        eprintln!("{} Created snapshot {}", "✓".green(), ts.render().yellow());
    }
    Ok(ts)
}
