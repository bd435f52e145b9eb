//! Configuration management command
//!
//! Provides CLI interface to view and edit the config file.

use crate::system_config::{self, KEYS};
use anyhow::{Context, Result};
use owo_colors::OwoColorize;

/// List all configuration values
pub async fn run_list() -> Result<()> {
    let config = system_config::load()?;
    let config_path =
        system_config::config_file_path().context("Could not determine config file path")?;

    println!("{}", "Configuration".bold());
    println!("{}: {}\n", "Location".dimmed(), config_path.display().dimmed());

    let mut section = "";
    for key in KEYS {
        let (table, name) = key.split_once('.').unwrap_or(("", *key));
        if table != section {
            if !section.is_empty() {
                println!();
            }
            println!("{}", format!("[{}]", table).yellow());
            section = table;
        }

        let value = config.get(key)?;
        if value == "-1" && table == "retention" {
            println!("  {} = {} {}", name.cyan(), value, "(unlimited)".dimmed());
        } else {
            println!("  {} = {}", name.cyan(), value);
        }
    }

    println!("\n{}", "Valid Values:".bold());
    println!("  archive.backend: btrfs, hardlinks");
    println!("  archive.current_name, archive.snapshots_name: single directory names");
    println!("  retention.*: -1 (unlimited) or a count >= 0, the oldest snapshot included");

    Ok(())
}

/// Get a single configuration value
pub async fn run_get(key: &str) -> Result<()> {
    let config = system_config::load()?;
    println!("{}", config.get(key)?);
    Ok(())
}

/// Set a configuration value
pub async fn run_set(key: &str, value: &str) -> Result<()> {
    let mut config = system_config::load()?;

    config.set(key, value)?;

    // Validate before saving
    config.validate().context("Invalid configuration value")?;

    system_config::save(&config)?;

    println!("{} {} = {}", "✓".green(), key.cyan(), value);
    Ok(())
}

/// Show the config file path and optionally create it
pub async fn run_path(create: bool) -> Result<()> {
    let config_path =
        system_config::config_file_path().context("Could not determine config file path")?;

    if create && !config_path.exists() {
        system_config::init_if_missing()?;
        println!("{} Created config file at: {}", "✓".green(), config_path.display());
    } else if config_path.exists() {
        println!("{}", config_path.display());
    } else {
        println!("{}", config_path.display());
        println!("{}", "File does not exist. Use --create to create it.".yellow());
    }

    Ok(())
}

/// Show example configuration
pub async fn run_example() -> Result<()> {
    let example = system_config::example_config();
    println!("{}", example);
    Ok(())
}
