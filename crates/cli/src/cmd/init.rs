//! Create the archive directory layout

use crate::settings::Settings;
use anyhow::{Context, Result};
use owo_colors::OwoColorize;

pub async fn run(settings: &Settings) -> Result<()> {
    let archive = &settings.archive;

    archive
        .init_dirs()
        .context("Failed to initialize archive")?;

    println!(
        "{} Initialized archive at {}",
        "✓".green(),
        archive.root().display().to_string().cyan()
    );
    println!("  - {}    (staging tree)", archive.current_path().display());
    println!("  - {}  (dated snapshots)", archive.snapshots_path().display());

    let missing = archive.missing_requirements();
    if !missing.is_empty() {
        println!();
        println!("{}", "Missing requirements for real runs:".yellow());
        for requirement in &missing {
            println!("  - {}", requirement);
        }
    }

    Ok(())
}
