//! Storage backends and the external commands they issue

use crate::layout::{trim_trailing_slashes, Archive, SYNC_TOOL};
use bkang_core::Timestamp;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::Path;
use std::str::FromStr;

/// How snapshots are materialized on disk
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Backend {
    /// Copy-on-write btrfs subvolumes
    #[default]
    Btrfs,
    /// Hardlinked directory trees (`cp --link`)
    #[serde(rename = "hardlinks", alias = "hardlink")]
    Hardlink,
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown backend {0:?}: expected \"btrfs\" or \"hardlinks\"")]
pub struct UnknownBackend(pub String);

impl Backend {
    pub const fn name(&self) -> &'static str {
        match self {
            Backend::Btrfs => "btrfs",
            Backend::Hardlink => "hardlinks",
        }
    }

    /// Freeze `current/` into `snapshots/<ts>`
    pub fn create_snapshot_command(&self, archive: &Archive, ts: &Timestamp) -> ExternalCommand {
        let source = archive.current_path();
        let target = archive.snapshot_path(ts);
        match self {
            Backend::Btrfs => ExternalCommand::new("btrfs")
                .arg("subvolume")
                .arg("snapshot")
                .path_arg(&source)
                .path_arg(&target),
            Backend::Hardlink => ExternalCommand::new("cp")
                .arg("--link")
                .arg("-a")
                .path_arg(&source)
                .path_arg(&target),
        }
    }

    pub fn delete_snapshot_command(&self, snapshot: &Path) -> ExternalCommand {
        match self {
            Backend::Btrfs => ExternalCommand::new("btrfs")
                .arg("subvolume")
                .arg("delete")
                .path_arg(snapshot),
            Backend::Hardlink => ExternalCommand::new("rm").arg("-Rf").path_arg(snapshot),
        }
    }
}

impl fmt::Display for Backend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Backend {
    type Err = UnknownBackend;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "btrfs" => Ok(Backend::Btrfs),
            "hardlinks" | "hardlink" => Ok(Backend::Hardlink),
            other => Err(UnknownBackend(other.to_string())),
        }
    }
}

/// Mirror `source` into the archive's `current/` tree
///
/// The source path is recreated under `current/`, so `/home` lands in
/// `current/home/`. An empty `address` targets a local archive; otherwise
/// the destination is `address:root`.
pub fn sync_command(source: &str, address: &str, archive: &Archive) -> ExternalCommand {
    let source = trim_trailing_slashes(source);
    let source = if source == "/" { "" } else { source };
    let root = trim_trailing_slashes(&archive.root().to_string_lossy()).to_string();

    let destination = format!("{}/{}{}/", root, archive.current_name(), source);
    let destination = if address.is_empty() {
        destination
    } else {
        format!("{}:{}", address, destination)
    };

    ExternalCommand::new(SYNC_TOOL)
        .arg("-aAXH")
        .arg("--delete")
        .arg(format!("{}/", source))
        .arg(destination)
}

/// A program and its arguments, run without a shell
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExternalCommand {
    program: String,
    args: Vec<String>,
}

impl ExternalCommand {
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
            args: Vec::new(),
        }
    }

    pub fn arg(mut self, arg: impl Into<String>) -> Self {
        self.args.push(arg.into());
        self
    }

    pub fn path_arg(self, path: &Path) -> Self {
        self.arg(path.to_string_lossy().into_owned())
    }

    pub fn program(&self) -> &str {
        &self.program
    }

    pub fn args(&self) -> &[String] {
        &self.args
    }
}

/// Shell-style rendering used for dry runs and logs
impl fmt::Display for ExternalCommand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", shell_quote(&self.program))?;
        for arg in &self.args {
            write!(f, " {}", shell_quote(arg))?;
        }
        Ok(())
    }
}

fn shell_quote(word: &str) -> String {
    let plain = !word.is_empty()
        && word
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || "-_./:=@%+,".contains(c));
    if plain {
        word.to_string()
    } else {
        format!("'{}'", word.replace('\'', r"'\''"))
    }
}
