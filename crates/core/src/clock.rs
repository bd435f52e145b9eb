//! Time sources

use crate::timestamp::{Timestamp, TimestampError};
use chrono::Local;

/// Source of the current time
///
/// Everything that needs "now" takes a `&dyn Clock` so tests can pin it.
/// Fails only when the time is outside the years a snapshot name can hold.
pub trait Clock: Send + Sync {
    fn now(&self) -> Result<Timestamp, TimestampError>;
}

/// Local wall-clock time (snapshot names are local time)
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> Result<Timestamp, TimestampError> {
        Timestamp::from_naive(Local::now().naive_local())
    }
}

/// Always returns the same instant
#[derive(Debug, Clone, Copy)]
pub struct FixedClock(Timestamp);

impl FixedClock {
    pub fn new(at: Timestamp) -> Self {
        Self(at)
    }
}

impl Clock for FixedClock {
    fn now(&self) -> Result<Timestamp, TimestampError> {
        Ok(self.0)
    }
}
