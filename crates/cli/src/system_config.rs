//! System configuration file
//!
//! Stored as TOML at `$BKANG_CONFIG`, or `<config dir>/bkang/config.toml`
//! when the variable is unset. A missing file means all defaults.

use anyhow::{Context, Result};
use archive::{Backend, KeepCount, RetentionPolicy, Tier};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Environment variable overriding the config file location
pub const CONFIG_ENV: &str = "BKANG_CONFIG";

/// Dotted keys accepted by `get` and `set`
pub const KEYS: &[&str] = &[
    "archive.root",
    "archive.current_name",
    "archive.snapshots_name",
    "archive.address",
    "archive.backup_src",
    "archive.backend",
    "retention.yearly",
    "retention.monthly",
    "retention.weekly",
    "retention.daily",
    "retention.hourly",
    "retention.minute",
];

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct SystemConfig {
    pub archive: ArchiveConfig,
    pub retention: RetentionConfig,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ArchiveConfig {
    /// Directory holding `current/` and `snapshots/`
    pub root: PathBuf,
    pub current_name: String,
    pub snapshots_name: String,
    /// Host the archive lives on, as seen by rsync (empty = local)
    pub address: String,
    /// Live tree mirrored into `current/`
    pub backup_src: String,
    pub backend: Backend,
}

impl Default for ArchiveConfig {
    fn default() -> Self {
        Self {
            root: PathBuf::from("/mnt/backup"),
            current_name: archive::layout::DEFAULT_CURRENT_NAME.to_string(),
            snapshots_name: archive::layout::DEFAULT_SNAPSHOTS_NAME.to_string(),
            address: "127.0.0.1".to_string(),
            backup_src: "/home/".to_string(),
            backend: Backend::Btrfs,
        }
    }
}

/// Keep counts per tier, `-1` for unlimited
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RetentionConfig {
    pub yearly: KeepCount,
    pub monthly: KeepCount,
    pub weekly: KeepCount,
    pub daily: KeepCount,
    pub hourly: KeepCount,
    pub minute: KeepCount,
}

impl Default for RetentionConfig {
    fn default() -> Self {
        let policy = RetentionPolicy::default();
        Self {
            yearly: policy.yearly.keep,
            monthly: policy.monthly.keep,
            weekly: policy.weekly.keep,
            daily: policy.daily.keep,
            hourly: policy.hourly.keep,
            minute: policy.minute.keep,
        }
    }
}

impl RetentionConfig {
    pub fn get(&self, tier: Tier) -> KeepCount {
        match tier {
            Tier::Yearly => self.yearly,
            Tier::Monthly => self.monthly,
            Tier::Weekly => self.weekly,
            Tier::Daily => self.daily,
            Tier::Hourly => self.hourly,
            Tier::Minute => self.minute,
        }
    }

    pub fn set(&mut self, tier: Tier, keep: KeepCount) {
        let slot = match tier {
            Tier::Yearly => &mut self.yearly,
            Tier::Monthly => &mut self.monthly,
            Tier::Weekly => &mut self.weekly,
            Tier::Daily => &mut self.daily,
            Tier::Hourly => &mut self.hourly,
            Tier::Minute => &mut self.minute,
        };
        *slot = keep;
    }

    pub fn to_policy(&self) -> RetentionPolicy {
        RetentionPolicy::from_counts(
            self.yearly,
            self.monthly,
            self.weekly,
            self.daily,
            self.hourly,
            self.minute,
        )
    }
}

impl SystemConfig {
    /// Check values that parse but make no sense
    pub fn validate(&self) -> Result<()> {
        for (key, name) in [
            ("archive.current_name", &self.archive.current_name),
            ("archive.snapshots_name", &self.archive.snapshots_name),
        ] {
            if name.is_empty() {
                anyhow::bail!("{} must not be empty", key);
            }
            if name.contains('/') {
                anyhow::bail!("{} must be a single directory name, got {:?}", key, name);
            }
        }
        if self.archive.current_name == self.archive.snapshots_name {
            anyhow::bail!("archive.current_name and archive.snapshots_name must differ");
        }
        if self.archive.root.as_os_str().is_empty() {
            anyhow::bail!("archive.root must not be empty");
        }

        archive::validate_policy(&self.retention.to_policy())?;
        Ok(())
    }

    /// Read one value by dotted key
    pub fn get(&self, key: &str) -> Result<String> {
        let value = match key {
            "archive.root" => self.archive.root.display().to_string(),
            "archive.current_name" => self.archive.current_name.clone(),
            "archive.snapshots_name" => self.archive.snapshots_name.clone(),
            "archive.address" => self.archive.address.clone(),
            "archive.backup_src" => self.archive.backup_src.clone(),
            "archive.backend" => self.archive.backend.to_string(),
            _ => match retention_tier(key) {
                Some(tier) => self.retention.get(tier).to_raw().to_string(),
                None => unknown_key(key)?,
            },
        };
        Ok(value)
    }

    /// Update one value by dotted key (not validated, call `validate` after)
    pub fn set(&mut self, key: &str, value: &str) -> Result<()> {
        match key {
            "archive.root" => self.archive.root = PathBuf::from(value),
            "archive.current_name" => self.archive.current_name = value.to_string(),
            "archive.snapshots_name" => self.archive.snapshots_name = value.to_string(),
            "archive.address" => self.archive.address = value.to_string(),
            "archive.backup_src" => self.archive.backup_src = value.to_string(),
            "archive.backend" => {
                self.archive.backend = value.parse().context("Invalid value")?;
            }
            _ => match retention_tier(key) {
                Some(tier) => {
                    let raw: i64 = value
                        .parse()
                        .context("Invalid value: must be an integer (-1 for unlimited)")?;
                    let keep = KeepCount::from_raw(raw).context("Invalid value")?;
                    self.retention.set(tier, keep);
                }
                None => unknown_key(key)?,
            },
        }
        Ok(())
    }
}

fn retention_tier(key: &str) -> Option<Tier> {
    key.strip_prefix("retention.")?.parse().ok()
}

fn unknown_key<T>(key: &str) -> Result<T> {
    anyhow::bail!(
        "Unknown config key: {}. Use 'bkang config list' to see available keys.",
        key
    )
}

/// Location of the config file
pub fn config_file_path() -> Option<PathBuf> {
    if let Some(path) = std::env::var_os(CONFIG_ENV) {
        return Some(PathBuf::from(path));
    }
    dirs::config_dir().map(|dir| dir.join("bkang").join("config.toml"))
}

/// Load the config file, falling back to defaults when it does not exist
pub fn load() -> Result<SystemConfig> {
    match config_file_path() {
        Some(path) => load_from(&path),
        None => {
            tracing::warn!("No config directory available, using defaults");
            Ok(SystemConfig::default())
        }
    }
}

pub fn load_from(path: &Path) -> Result<SystemConfig> {
    if !path.exists() {
        tracing::debug!(path = %path.display(), "Config file missing, using defaults");
        return Ok(SystemConfig::default());
    }

    let contents = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file {}", path.display()))?;
    let config: SystemConfig = toml::from_str(&contents)
        .with_context(|| format!("Failed to parse config file {}", path.display()))?;
    config
        .validate()
        .with_context(|| format!("Invalid config file {}", path.display()))?;
    Ok(config)
}

pub fn save(config: &SystemConfig) -> Result<()> {
    let path = config_file_path().context("Could not determine config file path")?;
    save_to(config, &path)
}

pub fn save_to(config: &SystemConfig, path: &Path) -> Result<()> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).context("Failed to create config directory")?;
    }
    let serialized = toml::to_string_pretty(config).context("Failed to serialize config")?;
    std::fs::write(path, serialized)
        .with_context(|| format!("Failed to write config file {}", path.display()))?;
    tracing::info!(path = %path.display(), "Saved config");
    Ok(())
}

/// Write the default config if no file exists yet
pub fn init_if_missing() -> Result<PathBuf> {
    let path = config_file_path().context("Could not determine config file path")?;
    if !path.exists() {
        save_to(&SystemConfig::default(), &path)?;
    }
    Ok(path)
}

/// Annotated example file
pub fn example_config() -> String {
    r#"# bkang configuration

[archive]
# Directory holding current/ and snapshots/ (must be absolute for real runs)
root = "/mnt/backup"
current_name = "current"
snapshots_name = "snapshots"
# Host the archive lives on, as seen by rsync ("" for a local archive)
address = "127.0.0.1"
# Live tree mirrored into current/
backup_src = "/home/"
# "btrfs" (subvolume snapshots) or "hardlinks" (cp --link)
backend = "btrfs"

[retention]
# Snapshots kept per tier, the oldest snapshot included; -1 = unlimited
yearly = -1
monthly = 12
weekly = 5
daily = 7
hourly = 24
minute = 0
"#
    .to_string()
}
