//! Snapshot archive management
//!
//! This crate provides:
//! - Tiered retention policies
//! - The retention engine (keep/prune decision)
//! - Archive layout and snapshot listing
//! - Storage backends (btrfs subvolumes, hardlink trees) and their commands

pub mod backend;
pub mod layout;
pub mod policy;
pub mod retention;

// Re-exports
pub use backend::{sync_command, Backend, ExternalCommand, UnknownBackend};
pub use layout::{Archive, ArchiveError, PrunePlan, Requirement, Snapshot};
pub use policy::{validate_policy, KeepCount, PolicyError, RetentionPolicy, Tier, TierRule};
pub use retention::{compute_retention, Retention};
