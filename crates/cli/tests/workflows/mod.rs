//! Workflow integration tests
//!
//! Tests for complete workflows that exercise multiple commands
//! and validate end-to-end behavior.

pub mod config_editing;
pub mod prune_lifecycle;
pub mod snapshot_lifecycle;
