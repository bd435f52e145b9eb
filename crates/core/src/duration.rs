//! Signed durations between timestamps

use std::fmt;
use std::ops::{Add, Neg, Sub};

const SECS_PER_MINUTE: i64 = 60;
const SECS_PER_HOUR: i64 = 60 * SECS_PER_MINUTE;
const SECS_PER_DAY: i64 = 24 * SECS_PER_HOUR;

/// Signed span of time with second resolution
///
/// Produced by subtracting two [`Timestamp`](crate::Timestamp)s. Kept apart
/// from `Timestamp` so that an absolute instant and a distance can never be
/// mixed up (adding two instants does not type-check).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct Duration(i64);

impl Duration {
    pub const ZERO: Duration = Duration(0);

    pub const fn seconds(secs: i64) -> Self {
        Self(secs)
    }

    pub const fn minutes(minutes: i64) -> Self {
        Self(minutes * SECS_PER_MINUTE)
    }

    pub const fn hours(hours: i64) -> Self {
        Self(hours * SECS_PER_HOUR)
    }

    pub const fn days(days: i64) -> Self {
        Self(days * SECS_PER_DAY)
    }

    /// Total length in seconds (negative when the span runs backwards)
    pub const fn as_seconds(&self) -> i64 {
        self.0
    }

    pub const fn is_positive(&self) -> bool {
        self.0 > 0
    }

    pub const fn is_negative(&self) -> bool {
        self.0 < 0
    }

    pub fn checked_add(self, other: Duration) -> Option<Duration> {
        self.0.checked_add(other.0).map(Duration)
    }

    pub fn checked_sub(self, other: Duration) -> Option<Duration> {
        self.0.checked_sub(other.0).map(Duration)
    }
}

impl Add for Duration {
    type Output = Duration;

    fn add(self, rhs: Duration) -> Duration {
        Duration(self.0.saturating_add(rhs.0))
    }
}

impl Sub for Duration {
    type Output = Duration;

    fn sub(self, rhs: Duration) -> Duration {
        Duration(self.0.saturating_sub(rhs.0))
    }
}

impl Neg for Duration {
    type Output = Duration;

    fn neg(self) -> Duration {
        Duration(self.0.saturating_neg())
    }
}

/// Compact human form, e.g. `30d`, `1d 2h`, `-5m 3s`
impl fmt::Display for Duration {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.0 == 0 {
            return write!(f, "0s");
        }
        if self.0 < 0 {
            write!(f, "-")?;
        }

        let mut rest = self.0.unsigned_abs();
        let mut parts = Vec::with_capacity(4);
        for (unit, suffix) in [
            (SECS_PER_DAY as u64, "d"),
            (SECS_PER_HOUR as u64, "h"),
            (SECS_PER_MINUTE as u64, "m"),
            (1, "s"),
        ] {
            let amount = rest / unit;
            rest %= unit;
            if amount > 0 {
                parts.push(format!("{}{}", amount, suffix));
            }
        }
        write!(f, "{}", parts.join(" "))
    }
}
