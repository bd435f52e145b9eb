//! Tiered retention policy

use bkang_core::Duration;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// One resolution level of the retention policy
///
/// Declaration order runs from coarsest to finest and matches [`Tier::ALL`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Tier {
    Yearly,
    Monthly,
    Weekly,
    Daily,
    Hourly,
    Minute,
}

impl Tier {
    pub const ALL: [Tier; 6] = [
        Tier::Yearly,
        Tier::Monthly,
        Tier::Weekly,
        Tier::Daily,
        Tier::Hourly,
        Tier::Minute,
    ];

    pub const fn name(&self) -> &'static str {
        match self {
            Tier::Yearly => "yearly",
            Tier::Monthly => "monthly",
            Tier::Weekly => "weekly",
            Tier::Daily => "daily",
            Tier::Hourly => "hourly",
            Tier::Minute => "minute",
        }
    }

    /// Fixed-length spacing for the tier
    ///
    /// Years and months are not calendar-aware: a year is 365 days and a
    /// month is 30 days.
    pub const fn default_spacing(&self) -> Duration {
        match self {
            Tier::Yearly => Duration::days(365),
            Tier::Monthly => Duration::days(30),
            Tier::Weekly => Duration::days(7),
            Tier::Daily => Duration::days(1),
            Tier::Hourly => Duration::hours(1),
            Tier::Minute => Duration::minutes(1),
        }
    }

    pub(crate) const fn index(&self) -> usize {
        *self as usize
    }
}

impl fmt::Display for Tier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Tier {
    type Err = PolicyError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Tier::ALL
            .into_iter()
            .find(|t| t.name() == s)
            .ok_or_else(|| PolicyError::UnknownTier(s.to_string()))
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PolicyError {
    #[error("invalid keep count {0}: must be -1 (unlimited) or >= 0")]
    InvalidKeepCount(i64),

    #[error("{tier} tier spacing must be positive, got {spacing}")]
    NonPositiveSpacing { tier: Tier, spacing: Duration },

    #[error("unknown tier {0:?}")]
    UnknownTier(String),
}

/// How many snapshots a tier may keep, the oldest snapshot included
///
/// Stored in configuration as an integer where `-1` means unlimited.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "i64", into = "i64")]
pub enum KeepCount {
    Unlimited,
    Limited(usize),
}

impl KeepCount {
    pub const UNLIMITED_RAW: i64 = -1;

    pub fn from_raw(raw: i64) -> Result<Self, PolicyError> {
        match raw {
            Self::UNLIMITED_RAW => Ok(KeepCount::Unlimited),
            n if n >= 0 => usize::try_from(n)
                .map(KeepCount::Limited)
                .map_err(|_| PolicyError::InvalidKeepCount(raw)),
            _ => Err(PolicyError::InvalidKeepCount(raw)),
        }
    }

    pub fn to_raw(&self) -> i64 {
        match self {
            KeepCount::Unlimited => Self::UNLIMITED_RAW,
            KeepCount::Limited(n) => i64::try_from(*n).unwrap_or(i64::MAX),
        }
    }

    /// Whether a tier that already holds `held` snapshots may take another
    pub fn admits(&self, held: usize) -> bool {
        match self {
            KeepCount::Unlimited => true,
            KeepCount::Limited(n) => held < *n,
        }
    }
}

impl TryFrom<i64> for KeepCount {
    type Error = PolicyError;

    fn try_from(raw: i64) -> Result<Self, Self::Error> {
        Self::from_raw(raw)
    }
}

impl From<KeepCount> for i64 {
    fn from(k: KeepCount) -> i64 {
        k.to_raw()
    }
}

impl fmt::Display for KeepCount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            KeepCount::Unlimited => f.write_str("unlimited"),
            KeepCount::Limited(n) => write!(f, "{}", n),
        }
    }
}

/// Keep count and minimum spacing of one tier
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TierRule {
    pub keep: KeepCount,
    /// Two snapshots kept by this tier are never closer than this
    pub min_spacing: Duration,
}

impl TierRule {
    pub fn new(keep: KeepCount, min_spacing: Duration) -> Self {
        Self { keep, min_spacing }
    }
}

/// Retention policy configuration
///
/// Every tier is a required field; there is no implicit fallback for a
/// missing tier.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetentionPolicy {
    pub yearly: TierRule,
    pub monthly: TierRule,
    pub weekly: TierRule,
    pub daily: TierRule,
    pub hourly: TierRule,
    pub minute: TierRule,
}

impl Default for RetentionPolicy {
    fn default() -> Self {
        Self::from_counts(
            KeepCount::Unlimited,
            KeepCount::Limited(12),
            KeepCount::Limited(5),
            KeepCount::Limited(7),
            KeepCount::Limited(24),
            KeepCount::Limited(0),
        )
    }
}

impl RetentionPolicy {
    /// Build a policy from keep counts using each tier's default spacing
    pub fn from_counts(
        yearly: KeepCount,
        monthly: KeepCount,
        weekly: KeepCount,
        daily: KeepCount,
        hourly: KeepCount,
        minute: KeepCount,
    ) -> Self {
        let rule = |tier: Tier, keep| TierRule::new(keep, tier.default_spacing());
        Self {
            yearly: rule(Tier::Yearly, yearly),
            monthly: rule(Tier::Monthly, monthly),
            weekly: rule(Tier::Weekly, weekly),
            daily: rule(Tier::Daily, daily),
            hourly: rule(Tier::Hourly, hourly),
            minute: rule(Tier::Minute, minute),
        }
    }

    /// A policy where no tier keeps anything beyond the oldest snapshot
    pub fn keep_none() -> Self {
        let none = KeepCount::Limited(0);
        Self::from_counts(none, none, none, none, none, none)
    }

    pub fn rule(&self, tier: Tier) -> &TierRule {
        match tier {
            Tier::Yearly => &self.yearly,
            Tier::Monthly => &self.monthly,
            Tier::Weekly => &self.weekly,
            Tier::Daily => &self.daily,
            Tier::Hourly => &self.hourly,
            Tier::Minute => &self.minute,
        }
    }

    pub fn rule_mut(&mut self, tier: Tier) -> &mut TierRule {
        match tier {
            Tier::Yearly => &mut self.yearly,
            Tier::Monthly => &mut self.monthly,
            Tier::Weekly => &mut self.weekly,
            Tier::Daily => &mut self.daily,
            Tier::Hourly => &mut self.hourly,
            Tier::Minute => &mut self.minute,
        }
    }

    /// Iterate tiers coarsest first
    pub fn rules(&self) -> impl Iterator<Item = (Tier, &TierRule)> {
        Tier::ALL.into_iter().map(move |t| (t, self.rule(t)))
    }

    pub fn with_keep(mut self, tier: Tier, keep: KeepCount) -> Self {
        self.rule_mut(tier).keep = keep;
        self
    }

    pub fn with_spacing(mut self, tier: Tier, min_spacing: Duration) -> Self {
        self.rule_mut(tier).min_spacing = min_spacing;
        self
    }

    /// Reject policies the engine cannot give a meaningful answer for
    pub fn validate(&self) -> Result<(), PolicyError> {
        for (tier, rule) in self.rules() {
            if !rule.min_spacing.is_positive() {
                return Err(PolicyError::NonPositiveSpacing {
                    tier,
                    spacing: rule.min_spacing,
                });
            }
        }
        Ok(())
    }

    /// Spacing strictly shrinks from yearly down to minute
    ///
    /// Not required by the engine (tiers are independent) but anything
    /// else is almost certainly a configuration mistake.
    pub fn is_conventionally_ordered(&self) -> bool {
        let spacings: Vec<Duration> = self.rules().map(|(_, r)| r.min_spacing).collect();
        spacings.windows(2).all(|w| w[0] > w[1])
    }
}

/// Free-function form of [`RetentionPolicy::validate`]
pub fn validate_policy(policy: &RetentionPolicy) -> Result<(), PolicyError> {
    policy.validate()
}
