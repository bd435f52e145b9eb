//! CLI command implementations

pub mod config;
pub mod init;
pub mod list;
pub mod prune;
pub mod snapshot;
pub mod sync;
