//! Source priority merging
//!
//! When two providers cover the same entity-period, the primary provider wins
//! outright: the secondary row is dropped, never averaged in.

use super::RawObservation;
use std::collections::HashSet;

/// Granularity at which two sources are considered to overlap
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MergeKey {
    /// Same entity, year and month
    Month,
    /// Same entity and year (annual population series)
    Year,
}

impl MergeKey {
    fn of<'a>(&self, obs: &'a RawObservation) -> (&'a str, i32, Option<u32>) {
        match self {
            MergeKey::Month => (obs.entity.as_str(), obs.year, Some(obs.month)),
            MergeKey::Year => (obs.entity.as_str(), obs.year, None),
        }
    }
}

/// Combine two sources, preferring `primary` for every key both cover.
///
/// Output is sorted by `(Entity, Year, Month)`.
pub fn merge_by_priority(
    primary: Vec<RawObservation>,
    secondary: Vec<RawObservation>,
    key: MergeKey,
) -> Vec<RawObservation> {
    let secondary_total = secondary.len();
    let kept: Vec<RawObservation> = {
        let covered: HashSet<_> = primary.iter().map(|obs| key.of(obs)).collect();
        secondary
            .into_iter()
            .filter(|obs| !covered.contains(&key.of(obs)))
            .collect()
    };

    log::debug!(
        "Priority merge kept {} of {} secondary rows ({} primary rows)",
        kept.len(),
        secondary_total,
        primary.len()
    );

    let mut merged: Vec<RawObservation> = primary.into_iter().chain(kept).collect();
    merged.sort_by(|a, b| a.entity.cmp(&b.entity).then_with(|| a.key().cmp(&b.key())));
    merged
}
