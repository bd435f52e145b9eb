//! Prune planning, dry runs and real deletion

use crate::common::TestArchive;
use anyhow::Result;

const HISTORY: [&str; 4] = [
    "2024-01-01-00-00-00",
    "2024-01-01-01-00-00",
    "2024-01-01-02-00-00",
    "2024-01-02-00-00-00",
];

const POLICY: [&str; 12] = [
    "--yearly", "0", "--monthly", "0", "--weekly", "0", "--daily", "2", "--hourly", "2",
    "--minute", "0",
];

fn prune_args<'a>(extra: &[&'a str]) -> Vec<&'a str> {
    let mut args = vec!["prune"];
    args.extend_from_slice(&POLICY);
    args.extend_from_slice(extra);
    args
}

#[test]
fn test_dry_run_prints_delete_commands() -> Result<()> {
    let archive = TestArchive::with_snapshots(&HISTORY)?;

    let result = archive.command().args(&prune_args(&[])).assert_success()?;

    let expected = format!(
        "btrfs subvolume delete {}/2024-01-01-02-00-00",
        archive.snapshots_path().display()
    );
    assert_eq!(result.stdout_lines(), vec![expected.as_str()]);
    assert_eq!(archive.snapshot_names()?.len(), 4);
    Ok(())
}

#[test]
fn test_list_mode_prints_paths() -> Result<()> {
    let archive = TestArchive::with_snapshots(&HISTORY)?;

    let result = archive
        .command()
        .args(&prune_args(&["--list"]))
        .assert_success()?;

    let expected = archive
        .snapshots_path()
        .join("2024-01-01-02-00-00")
        .to_string_lossy()
        .into_owned();
    assert_eq!(result.stdout_lines(), vec![expected.as_str()]);
    Ok(())
}

#[test]
fn test_verbose_lists_decisions_on_stderr() -> Result<()> {
    let archive = TestArchive::with_snapshots(&HISTORY)?;

    let result = archive
        .command()
        .args(&prune_args(&["-v"]))
        .assert_success()?;

    assert!(result.stderr.contains("Snapshots to prune:"));
    assert!(result.stderr.contains("Snapshots to keep:"));
    assert!(result.stderr.contains("2024-01-02-00-00-00"));
    Ok(())
}

#[test]
fn test_hardlink_backend_deletes_for_real() -> Result<()> {
    let archive = TestArchive::with_snapshots(&HISTORY)?;
    std::fs::write(archive.snapshots_path().join("2024-01-01-02-00-00/file"), b"x")?;

    archive
        .command()
        .args(&["--backend", "hardlinks", "--no-dry-run"])
        .args(&prune_args(&[]))
        .assert_success()?;

    assert_eq!(
        archive.snapshot_names()?,
        vec!["2024-01-01-00-00-00", "2024-01-01-01-00-00", "2024-01-02-00-00-00"]
    );

    // A second run finds nothing left to prune
    let result = archive
        .command()
        .args(&["--backend", "hardlinks"])
        .args(&prune_args(&[]))
        .assert_success()?;
    assert!(result.stdout_lines().is_empty());
    Ok(())
}

#[test]
fn test_no_dry_run_requires_absolute_root() -> Result<()> {
    let archive = TestArchive::with_snapshots(&HISTORY)?;

    let result = archive
        .bare_command()
        .args(&["--archive-root", "archive", "--backend", "hardlinks", "--no-dry-run"])
        .args(&prune_args(&[]))
        .assert_failure()?;

    assert!(result.stderr.contains("absolute"));
    assert_eq!(archive.snapshot_names()?.len(), 4);
    Ok(())
}

#[test]
fn test_unparsable_entries_are_ignored() -> Result<()> {
    let archive = TestArchive::with_snapshots(&["2024-01-01-00-00-00", "lost+found", "tmp-copy"])?;

    let result = archive.command().args(&prune_args(&[])).assert_success()?;
    assert!(result.stdout_lines().is_empty());
    Ok(())
}

#[test]
fn test_invalid_keep_count_rejected() -> Result<()> {
    let archive = TestArchive::with_snapshots(&HISTORY)?;
    let result = archive
        .command()
        .args(&["prune", "--daily", "-7"])
        .assert_failure()?;
    assert!(result.stderr.contains("--daily"));
    Ok(())
}

#[test]
fn test_list_shows_tiers() -> Result<()> {
    let archive = TestArchive::with_snapshots(&HISTORY)?;

    let mut args = vec!["list"];
    args.extend_from_slice(&POLICY);
    let result = archive.command().args(&args).assert_success()?;

    let line = result
        .stdout
        .lines()
        .find(|l| l.contains("2024-01-01-02-00-00"))
        .unwrap();
    assert!(line.contains("prune"));
    let line = result
        .stdout
        .lines()
        .find(|l| l.contains("2024-01-02-00-00-00"))
        .unwrap();
    assert!(line.contains("daily"));
    assert!(result.stdout.contains("Mon 01 Jan 2024 00:00"));
    Ok(())
}
