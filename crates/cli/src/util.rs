//! Shared utilities for CLI commands

use archive::Tier;
use bkang_core::Duration;

/// Format a snapshot age as relative time ("2 hours ago")
pub fn format_age(age: Duration) -> String {
    if age.is_negative() {
        return "in the future".to_string();
    }

    let seconds = age.as_seconds();
    if seconds < 60 {
        format!("{} seconds ago", seconds)
    } else if seconds < 3600 {
        format!("{} minutes ago", seconds / 60)
    } else if seconds < 86400 {
        format!("{} hours ago", seconds / 3600)
    } else if seconds < 604800 {
        format!("{} days ago", seconds / 86400)
    } else {
        format!("{} weeks ago", seconds / 604800)
    }
}

/// Comma-separated tier names, e.g. `monthly,daily`
pub fn format_tiers(tiers: &[Tier]) -> String {
    tiers
        .iter()
        .map(|t| t.name())
        .collect::<Vec<_>>()
        .join(",")
}
