//! Config file editing through `bkang config`

use crate::common::TestArchive;
use anyhow::Result;

#[test]
fn test_set_then_get() -> Result<()> {
    let archive = TestArchive::with_snapshots(&[])?;

    archive
        .bare_command()
        .args(&["config", "set", "retention.hourly", "48"])
        .assert_success()?;
    archive
        .bare_command()
        .args(&["config", "set", "retention.yearly", "-1"])
        .assert_success()?;

    let result = archive
        .bare_command()
        .args(&["config", "get", "retention.hourly"])
        .assert_success()?;
    assert_eq!(result.stdout.trim(), "48");

    let saved = std::fs::read_to_string(archive.config_path())?;
    assert!(saved.contains("hourly = 48"));
    Ok(())
}

#[test]
fn test_invalid_values_not_saved() -> Result<()> {
    let archive = TestArchive::with_snapshots(&[])?;

    archive
        .bare_command()
        .args(&["config", "set", "archive.backend", "zfs"])
        .assert_failure()?;
    archive
        .bare_command()
        .args(&["config", "set", "archive.snapshots_name", "a/b"])
        .assert_failure()?;
    archive
        .bare_command()
        .args(&["config", "set", "nope.key", "1"])
        .assert_failure()?;

    assert!(!archive.config_path().exists());
    Ok(())
}

#[test]
fn test_config_drives_archive_commands() -> Result<()> {
    let archive = TestArchive::with_snapshots(&[
        "2024-01-01-00-00-00",
        "2024-01-01-00-30-00",
    ])?;

    for (key, value) in [
        ("archive.root", archive.archive_root()),
        ("archive.backend", "hardlinks".to_string()),
    ] {
        archive
            .bare_command()
            .args(&["config", "set", key, &value])
            .assert_success()?;
    }

    let result = archive.bare_command().args(&["prune"]).assert_success()?;
    assert_eq!(
        result.stdout_lines(),
        vec![format!("rm -Rf {}/2024-01-01-00-30-00", archive.snapshots_path().display()).as_str()]
    );
    Ok(())
}

#[test]
fn test_path_create_and_example() -> Result<()> {
    let archive = TestArchive::with_snapshots(&[])?;

    archive
        .bare_command()
        .args(&["config", "path", "--create"])
        .assert_success()?;
    assert!(archive.config_path().exists());

    let result = archive
        .bare_command()
        .args(&["config", "example"])
        .assert_success()?;
    assert!(result.stdout.contains("[retention]"));
    Ok(())
}
