//! bkang core - time primitives for snapshot naming and retention
//!
//! This crate provides:
//! - `Timestamp`: second-resolution instant named `YYYY-MM-DD-HH-MM-SS`
//! - `Duration`: signed distance between two timestamps
//! - `Clock`: injectable time source (system or fixed)

pub mod clock;
pub mod duration;
pub mod timestamp;

// Re-export main types for convenience
pub use clock::{Clock, FixedClock, SystemClock};
pub use duration::Duration;
pub use timestamp::{Timestamp, TimestampError, CANONICAL_FORMAT};
