//! Snapshot timestamps and their canonical `YYYY-MM-DD-HH-MM-SS` names

use crate::clock::{Clock, SystemClock};
use crate::duration::Duration;
use chrono::{DateTime, Datelike, NaiveDateTime, Timelike};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::ops::Sub;
use std::path::Path;
use std::str::FromStr;

/// `strftime` pattern of a snapshot directory name
pub const CANONICAL_FORMAT: &str = "%Y-%m-%d-%H-%M-%S";

/// Human-readable form used in listings, e.g. `Mon 01 Jan 2024 00:00`
const PRETTY_FORMAT: &str = "%a %d %b %Y %H:%M";

/// Byte length of a canonical name
const CANONICAL_LEN: usize = 19;

/// Positions of the `-` separators in a canonical name
const SEPARATORS: [usize; 5] = [4, 7, 10, 13, 16];

/// Years whose `%Y` rendering is exactly four digits
const YEARS: std::ops::RangeInclusive<i32> = 0..=9999;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TimestampError {
    #[error("invalid timestamp {0:?}: expected YYYY-MM-DD-HH-MM-SS")]
    InvalidFormat(String),

    #[error("timestamp out of range (epoch seconds {0}): years 0000-9999 only")]
    OutOfRange(i64),
}

/// A point in time with second resolution
///
/// Naive calendar time without a timezone, limited to years 0000-9999.
/// The canonical text form is the snapshot directory name and round-trips
/// exactly: `Timestamp::parse(&t.to_string()) == Ok(t)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Timestamp(NaiveDateTime);

impl Timestamp {
    /// Parse a canonical name
    ///
    /// Strict: every field must be zero-padded to its full width, the
    /// separators must all be `-`, the calendar fields must form a real
    /// date and time, and nothing may trail the seconds.
    pub fn parse(s: &str) -> Result<Self, TimestampError> {
        let invalid = || TimestampError::InvalidFormat(s.to_string());

        let bytes = s.as_bytes();
        if bytes.len() != CANONICAL_LEN {
            return Err(invalid());
        }
        for (i, &b) in bytes.iter().enumerate() {
            let ok = if SEPARATORS.contains(&i) {
                b == b'-'
            } else {
                b.is_ascii_digit()
            };
            if !ok {
                return Err(invalid());
            }
        }

        let naive = NaiveDateTime::parse_from_str(s, CANONICAL_FORMAT).map_err(|_| invalid())?;
        // chrono encodes a leap second `:60` as an overflowing nanosecond field
        if naive.nanosecond() != 0 {
            return Err(invalid());
        }
        Ok(Self(naive))
    }

    /// Check whether `s` is a canonical name
    pub fn is_valid(s: &str) -> bool {
        Self::parse(s).is_ok()
    }

    /// Parse the final component of a snapshot path
    pub fn from_path(path: &Path) -> Result<Self, TimestampError> {
        let name = path
            .file_name()
            .and_then(|n| n.to_str())
            .ok_or_else(|| TimestampError::InvalidFormat(path.display().to_string()))?;
        Self::parse(name)
    }

    /// Current wall-clock time
    pub fn now() -> Result<Self, TimestampError> {
        SystemClock.now()
    }

    /// Current time according to `clock`
    pub fn now_with(clock: &dyn Clock) -> Result<Self, TimestampError> {
        clock.now()
    }

    /// Build from a calendar value, dropping sub-second precision
    pub fn from_naive(naive: NaiveDateTime) -> Result<Self, TimestampError> {
        let naive = naive.with_nanosecond(0).unwrap_or(naive);
        Self::in_range(naive)
            .ok_or_else(|| TimestampError::OutOfRange(naive.and_utc().timestamp()))
    }

    fn in_range(naive: NaiveDateTime) -> Option<Self> {
        YEARS.contains(&naive.year()).then_some(Self(naive))
    }

    /// Build from seconds since the Unix epoch
    ///
    /// The naive calendar is read as UTC, so this is the exact inverse of
    /// [`Timestamp::epoch_seconds`].
    pub fn from_epoch_seconds(secs: i64) -> Result<Self, TimestampError> {
        DateTime::from_timestamp(secs, 0)
            .and_then(|dt| Self::in_range(dt.naive_utc()))
            .ok_or(TimestampError::OutOfRange(secs))
    }

    pub fn epoch_seconds(&self) -> i64 {
        self.0.and_utc().timestamp()
    }

    pub fn as_naive(&self) -> NaiveDateTime {
        self.0
    }

    /// Canonical name, e.g. `2024-01-31-23-05-09`
    pub fn render(&self) -> String {
        self.0.format(CANONICAL_FORMAT).to_string()
    }

    /// Listing form, e.g. `Wed 31 Jan 2024 23:05`
    pub fn pretty(&self) -> String {
        self.0.format(PRETTY_FORMAT).to_string()
    }

    /// Signed distance from `earlier` to `self`
    pub fn duration_since(&self, earlier: &Timestamp) -> Duration {
        *self - *earlier
    }

    pub fn checked_add(&self, d: Duration) -> Option<Timestamp> {
        self.0
            .checked_add_signed(chrono::TimeDelta::try_seconds(d.as_seconds())?)
            .and_then(Self::in_range)
    }

    pub fn checked_sub(&self, d: Duration) -> Option<Timestamp> {
        self.0
            .checked_sub_signed(chrono::TimeDelta::try_seconds(d.as_seconds())?)
            .and_then(Self::in_range)
    }
}

impl Sub for Timestamp {
    type Output = Duration;

    fn sub(self, rhs: Timestamp) -> Duration {
        Duration::seconds((self.0 - rhs.0).num_seconds())
    }
}

impl fmt::Display for Timestamp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.render())
    }
}

impl FromStr for Timestamp {
    type Err = TimestampError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl TryFrom<&str> for Timestamp {
    type Error = TimestampError;

    fn try_from(s: &str) -> Result<Self, Self::Error> {
        Self::parse(s)
    }
}

impl Serialize for Timestamp {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.render())
    }
}

impl<'de> Deserialize<'de> for Timestamp {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        Self::parse(&s).map_err(serde::de::Error::custom)
    }
}
