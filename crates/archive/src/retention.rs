//! Retention engine: decide which snapshots survive a prune
//!
//! Single ascending pass over the snapshots. Each tier keeps an anchor (the
//! last snapshot it selected, initially the oldest) and takes the next
//! snapshot that is at least `min_spacing` past that anchor, until its keep
//! count is used up. A snapshot survives when any tier selected it.

use crate::policy::{RetentionPolicy, Tier};
use bkang_core::Timestamp;
use std::collections::BTreeSet;

/// Keep/prune partition of a snapshot set
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Retention {
    keep: BTreeSet<Timestamp>,
    prune: BTreeSet<Timestamp>,
    /// Per-tier selections in ascending order, indexed like `Tier::ALL`
    selections: [Vec<Timestamp>; 6],
}

impl Retention {
    pub fn keep(&self) -> &BTreeSet<Timestamp> {
        &self.keep
    }

    pub fn prune(&self) -> &BTreeSet<Timestamp> {
        &self.prune
    }

    /// Snapshots selected by one tier, oldest first
    pub fn tier_selection(&self, tier: Tier) -> &[Timestamp] {
        &self.selections[tier.index()]
    }

    /// Tiers that selected `ts`, coarsest first
    pub fn tiers_keeping(&self, ts: &Timestamp) -> Vec<Tier> {
        Tier::ALL
            .into_iter()
            .filter(|t| self.selections[t.index()].binary_search(ts).is_ok())
            .collect()
    }

    pub fn is_kept(&self, ts: &Timestamp) -> bool {
        self.keep.contains(ts)
    }

    pub fn into_parts(self) -> (BTreeSet<Timestamp>, BTreeSet<Timestamp>) {
        (self.keep, self.prune)
    }
}

/// Partition `snapshots` into the ones to keep and the ones to prune
///
/// Duplicates collapse. Empty input gives an empty partition. The oldest
/// snapshot is always kept.
pub fn compute_retention<I>(snapshots: I, policy: &RetentionPolicy) -> Retention
where
    I: IntoIterator<Item = Timestamp>,
{
    let sorted: BTreeSet<Timestamp> = snapshots.into_iter().collect();

    let mut ascending = sorted.iter().copied();
    let Some(oldest) = ascending.next() else {
        return Retention::default();
    };

    let mut selections: [Vec<Timestamp>; 6] = std::array::from_fn(|_| vec![oldest]);

    for snapshot in ascending {
        for (tier, rule) in policy.rules() {
            let selected = &mut selections[tier.index()];
            let Some(&anchor) = selected.last() else {
                continue;
            };
            if rule.keep.admits(selected.len()) && snapshot - anchor >= rule.min_spacing {
                selected.push(snapshot);
            }
        }
    }

    let keep: BTreeSet<Timestamp> = selections.iter().flatten().copied().collect();
    let prune: BTreeSet<Timestamp> = sorted.difference(&keep).copied().collect();

    tracing::debug!(
        total = sorted.len(),
        keep = keep.len(),
        prune = prune.len(),
        "Computed retention"
    );

    Retention {
        keep,
        prune,
        selections,
    }
}
