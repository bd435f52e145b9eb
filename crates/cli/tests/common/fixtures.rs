//! Temporary archives for integration tests

use super::cli::BkCommand;
use anyhow::Result;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

/// An archive under a temp dir with its own config file
pub struct TestArchive {
    temp_dir: TempDir,
}

impl TestArchive {
    /// Archive with `current/` and `snapshots/` populated by `names`
    pub fn with_snapshots(names: &[&str]) -> Result<Self> {
        let archive = Self {
            temp_dir: TempDir::new()?,
        };
        std::fs::create_dir_all(archive.current_path())?;
        std::fs::create_dir_all(archive.snapshots_path())?;
        for name in names {
            std::fs::create_dir(archive.snapshots_path().join(name))?;
        }
        Ok(archive)
    }

    pub fn root(&self) -> &Path {
        self.temp_dir.path()
    }

    pub fn config_path(&self) -> PathBuf {
        self.root().join("config.toml")
    }

    pub fn current_path(&self) -> PathBuf {
        self.root().join("archive/current")
    }

    pub fn snapshots_path(&self) -> PathBuf {
        self.root().join("archive/snapshots")
    }

    /// Archive root as passed to `--archive-root`
    pub fn archive_root(&self) -> String {
        self.root().join("archive").to_string_lossy().into_owned()
    }

    /// Snapshot directory names present on disk, sorted
    pub fn snapshot_names(&self) -> Result<Vec<String>> {
        let mut names = Vec::new();
        for entry in std::fs::read_dir(self.snapshots_path())? {
            names.push(entry?.file_name().to_string_lossy().into_owned());
        }
        names.sort();
        Ok(names)
    }

    /// `bkang --archive-root <root>` with an isolated config
    pub fn command(&self) -> BkCommand {
        let mut cmd = BkCommand::new(self.root(), self.config_path());
        cmd.args(&["--archive-root", &self.archive_root()]);
        cmd
    }

    /// `bkang` without archive flags
    pub fn bare_command(&self) -> BkCommand {
        BkCommand::new(self.root(), self.config_path())
    }
}
