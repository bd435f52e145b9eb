//! On-disk archive layout and snapshot listing

use crate::policy::RetentionPolicy;
use crate::retention::{compute_retention, Retention};
use bkang_core::Timestamp;
use std::fmt;
use std::io;
use std::path::{Path, PathBuf};

pub const DEFAULT_CURRENT_NAME: &str = "current";
pub const DEFAULT_SNAPSHOTS_NAME: &str = "snapshots";

/// Tool the synchronizer shells out to
pub const SYNC_TOOL: &str = "rsync";

#[derive(Debug, thiserror::Error)]
pub enum ArchiveError {
    #[error("failed to {action} {}: {source}", path.display())]
    Io {
        action: &'static str,
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

impl ArchiveError {
    fn io<'a>(action: &'static str, path: &'a Path) -> impl FnOnce(io::Error) -> Self + 'a {
        move |source| ArchiveError::Io {
            action,
            path: path.to_path_buf(),
            source,
        }
    }
}

/// A snapshot directory and the timestamp parsed from its name
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
pub struct Snapshot {
    pub timestamp: Timestamp,
    pub path: PathBuf,
}

/// Something the archive needs before it can run for real
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Requirement {
    UnixPlatform,
    Tool(&'static str),
    Directory(PathBuf),
}

impl fmt::Display for Requirement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Requirement::UnixPlatform => write!(f, "a unix platform"),
            Requirement::Tool(tool) => write!(f, "`{}` on PATH", tool),
            Requirement::Directory(path) => write!(f, "directory {}", path.display()),
        }
    }
}

/// Snapshots split by a retention decision
#[derive(Debug, Clone)]
pub struct PrunePlan {
    /// Kept snapshots, oldest first
    pub keep: Vec<Snapshot>,
    /// Snapshots to delete, oldest first
    pub prune: Vec<Snapshot>,
    pub retention: Retention,
}

/// Archive directory structure
///
/// ```text
/// <root>/
///   current/                  staging tree, target of the synchronizer
///   snapshots/
///     2024-01-01-00-00-00/    frozen copies of current/
///     2024-01-01-01-00-00/
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Archive {
    root: PathBuf,
    current_name: String,
    snapshots_name: String,
}

impl Archive {
    pub fn new(
        root: impl Into<PathBuf>,
        current_name: impl Into<String>,
        snapshots_name: impl Into<String>,
    ) -> Self {
        let current_name: String = current_name.into();
        let snapshots_name: String = snapshots_name.into();
        Self {
            root: root.into(),
            current_name: trim_trailing_slashes(&current_name).to_string(),
            snapshots_name: trim_trailing_slashes(&snapshots_name).to_string(),
        }
    }

    /// Archive with the default `current` and `snapshots` names
    pub fn with_defaults(root: impl Into<PathBuf>) -> Self {
        Self::new(root, DEFAULT_CURRENT_NAME, DEFAULT_SNAPSHOTS_NAME)
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn current_name(&self) -> &str {
        &self.current_name
    }

    pub fn snapshots_name(&self) -> &str {
        &self.snapshots_name
    }

    /// Where the synchronizer accumulates the live tree
    pub fn current_path(&self) -> PathBuf {
        self.root.join(&self.current_name)
    }

    pub fn snapshots_path(&self) -> PathBuf {
        self.root.join(&self.snapshots_name)
    }

    pub fn snapshot_path(&self, ts: &Timestamp) -> PathBuf {
        self.snapshots_path().join(ts.render())
    }

    /// Destructive operations are only allowed on absolute roots
    pub fn is_absolute(&self) -> bool {
        self.root.is_absolute()
    }

    /// Create root, current and snapshots directories
    pub fn init_dirs(&self) -> Result<(), ArchiveError> {
        for dir in [self.root.clone(), self.current_path(), self.snapshots_path()] {
            std::fs::create_dir_all(&dir).map_err(ArchiveError::io("create directory", &dir))?;
        }
        tracing::info!(root = %self.root.display(), "Initialized archive directories");
        Ok(())
    }

    /// Everything missing for a real run (empty when ready)
    pub fn missing_requirements(&self) -> Vec<Requirement> {
        let mut missing = Vec::new();

        if !cfg!(unix) {
            missing.push(Requirement::UnixPlatform);
        }
        if find_on_path(SYNC_TOOL).is_none() {
            missing.push(Requirement::Tool(SYNC_TOOL));
        }
        for dir in [self.root.clone(), self.current_path(), self.snapshots_path()] {
            if !dir.is_dir() {
                missing.push(Requirement::Directory(dir));
            }
        }

        missing
    }

    /// Snapshot directories, oldest first
    ///
    /// Entries that are not directories or whose name is not a canonical
    /// timestamp are skipped.
    pub fn list_snapshots(&self) -> Result<Vec<Snapshot>, ArchiveError> {
        let dir = self.snapshots_path();
        let entries = std::fs::read_dir(&dir).map_err(ArchiveError::io("read directory", &dir))?;

        let mut snapshots = Vec::new();
        for entry in entries {
            let entry = entry.map_err(ArchiveError::io("read directory", &dir))?;
            let path = entry.path();

            let Ok(timestamp) = Timestamp::from_path(&path) else {
                tracing::debug!(path = %path.display(), "Skipping non-snapshot entry");
                continue;
            };
            if !path.is_dir() {
                tracing::debug!(path = %path.display(), "Skipping snapshot name that is not a directory");
                continue;
            }

            snapshots.push(Snapshot { timestamp, path });
        }

        snapshots.sort();
        Ok(snapshots)
    }

    /// List snapshots and split them by `policy`
    pub fn plan_prune(&self, policy: &RetentionPolicy) -> Result<PrunePlan, ArchiveError> {
        let snapshots = self.list_snapshots()?;
        let retention = compute_retention(snapshots.iter().map(|s| s.timestamp), policy);

        let (keep, prune): (Vec<Snapshot>, Vec<Snapshot>) = snapshots
            .into_iter()
            .partition(|s| retention.is_kept(&s.timestamp));

        Ok(PrunePlan {
            keep,
            prune,
            retention,
        })
    }
}

pub(crate) fn trim_trailing_slashes(s: &str) -> &str {
    let trimmed = s.trim_end_matches('/');
    if trimmed.is_empty() && !s.is_empty() {
        "/"
    } else {
        trimmed
    }
}

fn find_on_path(tool: &str) -> Option<PathBuf> {
    let path_var = std::env::var_os("PATH")?;
    std::env::split_paths(&path_var)
        .map(|dir| dir.join(tool))
        .find(|candidate| is_executable(candidate))
}

#[cfg(unix)]
fn is_executable(path: &Path) -> bool {
    use std::os::unix::fs::PermissionsExt;

    path.metadata()
        .map(|meta| meta.is_file() && meta.permissions().mode() & 0o111 != 0)
        .unwrap_or(false)
}

#[cfg(not(unix))]
fn is_executable(path: &Path) -> bool {
    path.is_file()
}
