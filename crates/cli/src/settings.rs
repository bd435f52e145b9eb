//! Effective settings for one invocation: config file overlaid with flags

use crate::exec::Executor;
use crate::system_config::{RetentionConfig, SystemConfig};
use anyhow::{Context, Result};
use archive::{Archive, Backend, KeepCount, RetentionPolicy, Tier};
use clap::Args;
use std::path::PathBuf;

/// Flags shared by every archive command
#[derive(Args, Debug, Clone, Default)]
pub struct GlobalArgs {
    /// Archive root holding current/ and snapshots/ (default: from config)
    #[arg(long, global = true)]
    pub archive_root: Option<PathBuf>,

    /// Name of the staging directory under the archive root
    #[arg(long, global = true)]
    pub current_name: Option<String>,

    /// Name of the snapshot directory under the archive root
    #[arg(long, global = true)]
    pub snapshots_name: Option<String>,

    /// Snapshot backend: btrfs or hardlinks
    #[arg(long, global = true)]
    pub backend: Option<Backend>,

    /// Execute commands instead of printing them (requires an absolute archive root)
    #[arg(long, global = true)]
    pub no_dry_run: bool,

    /// Increase output (-v lists decisions and logs progress, -vv debug logs)
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    pub verbose: u8,
}

/// Per-run keep count overrides, `-1` for unlimited
#[derive(Args, Debug, Clone, Default)]
pub struct RetentionArgs {
    #[arg(long, allow_negative_numbers = true)]
    pub yearly: Option<i64>,
    #[arg(long, allow_negative_numbers = true)]
    pub monthly: Option<i64>,
    #[arg(long, allow_negative_numbers = true)]
    pub weekly: Option<i64>,
    #[arg(long, allow_negative_numbers = true)]
    pub daily: Option<i64>,
    #[arg(long, allow_negative_numbers = true)]
    pub hourly: Option<i64>,
    #[arg(long, allow_negative_numbers = true)]
    pub minute: Option<i64>,
}

impl RetentionArgs {
    fn get(&self, tier: Tier) -> Option<i64> {
        match tier {
            Tier::Yearly => self.yearly,
            Tier::Monthly => self.monthly,
            Tier::Weekly => self.weekly,
            Tier::Daily => self.daily,
            Tier::Hourly => self.hourly,
            Tier::Minute => self.minute,
        }
    }
}

#[derive(Debug, Clone)]
pub struct Settings {
    pub archive: Archive,
    pub backend: Backend,
    pub address: String,
    pub backup_src: String,
    pub retention: RetentionConfig,
    pub dry_run: bool,
    pub verbose: u8,
}

impl Settings {
    pub fn resolve(config: &SystemConfig, args: &GlobalArgs) -> Self {
        let root = args
            .archive_root
            .clone()
            .unwrap_or_else(|| config.archive.root.clone());
        let current_name = args
            .current_name
            .clone()
            .unwrap_or_else(|| config.archive.current_name.clone());
        let snapshots_name = args
            .snapshots_name
            .clone()
            .unwrap_or_else(|| config.archive.snapshots_name.clone());

        Self {
            archive: Archive::new(root, current_name, snapshots_name),
            backend: args.backend.unwrap_or(config.archive.backend),
            address: config.archive.address.clone(),
            backup_src: config.archive.backup_src.clone(),
            retention: config.retention,
            dry_run: !args.no_dry_run,
            verbose: args.verbose,
        }
    }

    /// Configured policy with per-run overrides applied
    pub fn policy(&self, overrides: &RetentionArgs) -> Result<RetentionPolicy> {
        let mut counts = self.retention;
        for tier in Tier::ALL {
            if let Some(raw) = overrides.get(tier) {
                let keep = KeepCount::from_raw(raw)
                    .with_context(|| format!("Invalid --{} value", tier))?;
                counts.set(tier, keep);
            }
        }

        let policy = counts.to_policy();
        archive::validate_policy(&policy).context("Invalid retention policy")?;
        if !policy.is_conventionally_ordered() {
            tracing::warn!("Retention tier spacings are not ordered from yearly down to minute");
        }
        Ok(policy)
    }

    /// Executor honouring the dry-run gate
    pub fn executor(&self) -> Result<Executor> {
        Executor::new(&self.archive, self.dry_run)
    }
}
