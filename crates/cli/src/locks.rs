//! Lock files keeping mutating operations exclusive per archive
//!
//! A second `prune` (or `snapshot`, `sync`) against the same archive while
//! one is running fails immediately. There is no waiting and no retry.

use anyhow::{Context, Result};
use archive::Archive;
use serde::{Deserialize, Serialize};
use std::fs::{File, OpenOptions};
use std::io::{Read, Seek, SeekFrom, Write};
use std::path::{Component, Path, PathBuf};

/// Held exclusive lock for one named operation
///
/// Released when dropped (closing the file releases the `flock`).
pub struct OperationLock {
    name: String,
    path: PathBuf,
    #[allow(dead_code)]
    file: File,
}

/// Lock file content
#[derive(Debug, Serialize, Deserialize)]
struct LockContent {
    pid: u32,
    started_at: u64,
}

impl OperationLock {
    /// Acquire the lock for `name` in `lock_dir` without blocking
    ///
    /// Returns error if:
    /// - Another process (or another handle in this process) holds it
    /// - The lock file cannot be created
    pub fn try_acquire(lock_dir: &Path, name: &str) -> Result<Self> {
        std::fs::create_dir_all(lock_dir).context("Failed to create locks directory")?;

        let path = lock_dir.join(format!("{}.lock", name));
        let mut file = OpenOptions::new()
            .create(true)
            .truncate(false)
            .read(true)
            .write(true)
            .open(&path)
            .with_context(|| format!("Failed to open lock file {}", path.display()))?;

        if !try_flock_exclusive(&file)? {
            let holder = Self::read_lock_content(&mut file)
                .map(|c| format!(" by pid {}", c.pid))
                .unwrap_or_default();
            anyhow::bail!("{} already running (lock {} held{})", name, path.display(), holder);
        }

        Self::write_lock_content(&mut file)?;
        tracing::info!(lock = name, "Lock acquired");

        Ok(Self {
            name: name.to_string(),
            path,
            file,
        })
    }

    /// Acquire the lock for `name` scoped to `archive`
    pub fn for_archive(archive: &Archive, name: &str) -> Result<Self> {
        Self::try_acquire(&lock_dir_for(archive), name)
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Write lock content (PID + timestamp)
    fn write_lock_content(file: &mut File) -> Result<()> {
        let content = LockContent {
            pid: std::process::id(),
            started_at: current_timestamp_ms(),
        };

        let serialized =
            serde_json::to_string(&content).context("Failed to serialize lock content")?;

        file.set_len(0)?;
        file.seek(SeekFrom::Start(0))?;
        file.write_all(serialized.as_bytes())?;
        file.sync_all()?;
        Ok(())
    }

    /// Read lock content from file
    fn read_lock_content(file: &mut File) -> Result<LockContent> {
        file.seek(SeekFrom::Start(0))?;
        let mut contents = String::new();
        file.read_to_string(&mut contents)?;
        let content: LockContent =
            serde_json::from_str(&contents).context("Failed to deserialize lock content")?;
        Ok(content)
    }
}

impl Drop for OperationLock {
    fn drop(&mut self) {
        tracing::debug!(lock = %self.name, "Lock released");
    }
}

/// Per-archive lock directory under the system temp dir
///
/// Kept outside the archive so that locking also works when the archive
/// root lives on another host (remote `sync`). Every spelling of one root
/// (trailing `/`, `//`, `.`, symlinks when it exists) maps to one directory.
pub fn lock_dir_for(archive: &Archive) -> PathBuf {
    let root = archive
        .root()
        .canonicalize()
        .unwrap_or_else(|_| normalize_lexically(archive.root()));
    let key: String = root
        .to_string_lossy()
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() || c == '-' || c == '_' || c == '.' { c } else { '%' })
        .collect();
    std::env::temp_dir().join("bkang-locks").join(key)
}

/// Resolve `.` and `..` and drop redundant separators without touching the disk
fn normalize_lexically(path: &Path) -> PathBuf {
    let mut normalized = PathBuf::new();
    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                if !normalized.pop() {
                    normalized.push(component.as_os_str());
                }
            }
            other => normalized.push(other.as_os_str()),
        }
    }
    normalized
}

/// Try to acquire exclusive file lock (non-blocking)
#[cfg(unix)]
fn try_flock_exclusive(file: &File) -> Result<bool> {
    use nix::fcntl::{flock, FlockArg};
    use std::os::unix::io::AsRawFd;

    match flock(file.as_raw_fd(), FlockArg::LockExclusiveNonblock) {
        Ok(_) => Ok(true),
        Err(nix::errno::Errno::EWOULDBLOCK) => Ok(false),
        Err(e) => Err(e.into()),
    }
}

#[cfg(not(unix))]
fn try_flock_exclusive(_file: &File) -> Result<bool> {
    anyhow::bail!("Operation locks require a unix platform")
}

/// Get current timestamp in milliseconds
fn current_timestamp_ms() -> u64 {
    std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .map(|d| d.as_millis() as u64)
        .unwrap_or(0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_lock_acquisition() {
        let temp_dir = TempDir::new().unwrap();
        let lock_dir = temp_dir.path();

        // First lock should succeed
        let lock1 = OperationLock::try_acquire(lock_dir, "prune");
        assert!(lock1.is_ok());

        // Second lock should fail immediately (lock is held)
        let lock2 = OperationLock::try_acquire(lock_dir, "prune");
        let err = lock2.err().unwrap().to_string();
        assert!(err.contains("prune already running"), "{}", err);
        assert!(err.contains(&format!("pid {}", std::process::id())), "{}", err);

        // Release first lock
        drop(lock1);

        // Now second lock should succeed
        let lock3 = OperationLock::try_acquire(lock_dir, "prune");
        assert!(lock3.is_ok());
    }

    #[test]
    fn test_locks_scoped_by_name() {
        let temp_dir = TempDir::new().unwrap();
        let _prune = OperationLock::try_acquire(temp_dir.path(), "prune").unwrap();
        let snapshot = OperationLock::try_acquire(temp_dir.path(), "snapshot");
        assert!(snapshot.is_ok());
    }

    #[test]
    fn test_lock_content() {
        let temp_dir = TempDir::new().unwrap();
        let lock = OperationLock::try_acquire(temp_dir.path(), "sync").unwrap();

        let mut file = File::open(lock.path()).unwrap();
        let content = OperationLock::read_lock_content(&mut file).unwrap();

        assert_eq!(content.pid, std::process::id());
        assert!(content.started_at > 0);
    }

    #[test]
    fn test_lock_dir_per_archive() {
        let a = lock_dir_for(&Archive::with_defaults("/mnt/backup"));
        let b = lock_dir_for(&Archive::with_defaults("/mnt/other"));
        assert_ne!(a, b);
        assert!(a.starts_with(std::env::temp_dir()));
        assert_eq!(a.file_name().unwrap(), "%mnt%backup");
    }

    #[test]
    fn test_lock_dir_ignores_root_spelling() {
        let expected = lock_dir_for(&Archive::with_defaults("/nonexistent-bkang/backup"));
        for spelling in [
            "/nonexistent-bkang/backup/",
            "/nonexistent-bkang//backup",
            "/nonexistent-bkang/./backup/.",
            "/nonexistent-bkang/other/../backup",
        ] {
            assert_eq!(lock_dir_for(&Archive::with_defaults(spelling)), expected, "{spelling}");
        }
    }

    #[test]
    fn test_same_archive_contends_across_spellings() {
        let temp_dir = TempDir::new().unwrap();
        let root = temp_dir.path().join("archive");
        std::fs::create_dir(&root).unwrap();

        let plain = Archive::with_defaults(&root);
        let _held = OperationLock::for_archive(&plain, "prune").unwrap();

        for spelling in [
            format!("{}/", root.display()),
            format!("{}/./archive", temp_dir.path().display()),
            format!("{}//archive//", temp_dir.path().display()),
        ] {
            let other = Archive::with_defaults(spelling.as_str());
            assert_eq!(lock_dir_for(&other), lock_dir_for(&plain), "{spelling}");
            let err = OperationLock::for_archive(&other, "prune").err().unwrap().to_string();
            assert!(err.contains("prune already running"), "{spelling}: {err}");
        }
    }
}
