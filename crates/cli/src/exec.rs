//! Running (or printing) external commands
//!
//! Dry run is the default: commands go to stdout and nothing is touched.
//! Real execution needs an explicit opt-in and an absolute archive root.

use crate::locks::OperationLock;
use anyhow::{Context, Result};
use archive::{Archive, ExternalCommand};

pub struct Executor {
    archive: Archive,
    dry_run: bool,
}

impl Executor {
    pub fn new(archive: &Archive, dry_run: bool) -> Result<Self> {
        if !dry_run && !archive.is_absolute() {
            anyhow::bail!(
                "Only absolute archive roots are allowed when not dry running (got {})",
                archive.root().display()
            );
        }
        Ok(Self {
            archive: archive.clone(),
            dry_run,
        })
    }

    pub fn is_dry_run(&self) -> bool {
        self.dry_run
    }

    /// Take the fail-fast lock for `operation`; dry runs need none
    pub fn lock(&self, operation: &str) -> Result<Option<OperationLock>> {
        if self.dry_run {
            return Ok(None);
        }
        OperationLock::for_archive(&self.archive, operation).map(Some)
    }

    /// Print the command, or run it and fail on a non-zero exit
    pub async fn run(&self, command: &ExternalCommand) -> Result<()> {
        if self.dry_run {
            println!("{}", command);
            return Ok(());
        }

        tracing::info!(command = %command, "Running");
        let status = tokio::process::Command::new(command.program())
            .args(command.args())
            .status()
            .await
            .with_context(|| format!("Failed to start {}", command.program()))?;

        if !status.success() {
            anyhow::bail!("Command failed ({}): {}", status, command);
        }
        Ok(())
    }

    /// Run commands in order, stopping at the first failure
    pub async fn run_all<'a, I>(&self, commands: I) -> Result<usize>
    where
        I: IntoIterator<Item = &'a ExternalCommand>,
    {
        let mut done = 0;
        for command in commands {
            self.run(command).await?;
            done += 1;
        }
        Ok(done)
    }
}
