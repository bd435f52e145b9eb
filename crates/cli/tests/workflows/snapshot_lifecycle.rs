//! Archive initialization, snapshot creation and sync command output

use crate::common::TestArchive;
use anyhow::Result;
use bkang_core::Timestamp;

#[test]
fn test_init_creates_layout() -> Result<()> {
    let archive = TestArchive::with_snapshots(&[])?;
    let root = archive.root().join("fresh");

    archive
        .bare_command()
        .args(&["--archive-root", &root.to_string_lossy(), "init"])
        .assert_success()?;

    assert!(root.join("current").is_dir());
    assert!(root.join("snapshots").is_dir());
    Ok(())
}

#[test]
fn test_snapshot_dry_run_prints_command() -> Result<()> {
    let archive = TestArchive::with_snapshots(&[])?;

    let result = crate::bk!(archive, "snapshot").assert_success()?;

    let lines = result.stdout_lines();
    assert_eq!(lines.len(), 1);
    let prefix = format!(
        "btrfs subvolume snapshot {} {}/",
        archive.current_path().display(),
        archive.snapshots_path().display()
    );
    assert!(lines[0].starts_with(&prefix), "{}", lines[0]);
    let name = &lines[0][prefix.len()..];
    assert!(Timestamp::is_valid(name), "{}", name);
    assert!(archive.snapshot_names()?.is_empty());
    Ok(())
}

#[test]
fn test_hardlink_snapshot_for_real() -> Result<()> {
    let archive = TestArchive::with_snapshots(&[])?;
    std::fs::write(archive.current_path().join("notes.txt"), b"hello")?;

    crate::bk!(archive, "--backend", "hardlinks", "--no-dry-run", "snapshot").assert_success()?;

    let names = archive.snapshot_names()?;
    assert_eq!(names.len(), 1);
    assert!(Timestamp::is_valid(&names[0]));
    let copied = std::fs::read(archive.snapshots_path().join(&names[0]).join("notes.txt"))?;
    assert_eq!(copied, b"hello");
    Ok(())
}

#[test]
fn test_sync_dry_run_prints_rsync() -> Result<()> {
    let archive = TestArchive::with_snapshots(&[])?;

    let result = crate::bk!(archive, "sync", "--source", "/home/", "--address", "backup-host")
        .assert_success()?;

    assert_eq!(
        result.stdout_lines(),
        vec![format!(
            "rsync -aAXH --delete /home/ backup-host:{}/current/home/",
            archive.archive_root()
        )
        .as_str()]
    );
    Ok(())
}
