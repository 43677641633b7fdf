//! Raw per-entity observations as handed over by the source loaders
//!
//! A table holds either births or childbearing-age population for many
//! entities. Rows may be sparse; the series builders fill the gaps.

mod merge;
pub mod loader;

pub use loader::{load_observations, load_observations_from_reader};
pub use merge::{merge_by_priority, MergeKey};

use crate::calendar::{MonthKey, MAX_YEAR, MIN_YEAR};
use crate::error::{EngineError, Result};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashSet};

/// Which measurement a raw table carries
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ObservationKind {
    /// Monthly live births
    Births,
    /// Female population aged 15-44
    Population,
}

impl ObservationKind {
    /// Column name of the value in raw and output tables
    pub fn value_column(&self) -> &'static str {
        match self {
            ObservationKind::Births => "Births",
            ObservationKind::Population => "childbearing_population",
        }
    }

    /// Granularity at which a secondary source yields to the primary.
    ///
    /// Population providers publish annual counts at different months, so any
    /// primary row in a year covers the whole year.
    pub fn merge_key(&self) -> MergeKey {
        match self {
            ObservationKind::Births => MergeKey::Month,
            ObservationKind::Population => MergeKey::Year,
        }
    }
}

/// One raw row: `(Entity, Year, Month, value?, Source)`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawObservation {
    /// Country or state display name
    pub entity: String,
    /// Calendar year
    pub year: i32,
    /// Month of year (1-12)
    pub month: u32,
    /// Births or population; `None` where the source row has no value
    pub value: Option<f64>,
    /// Data provider label (HMD, UN, CDC, ...)
    pub source: Option<String>,
}

impl RawObservation {
    /// Create an observation with a known source
    pub fn new(
        entity: impl Into<String>,
        year: i32,
        month: u32,
        value: Option<f64>,
        source: impl Into<String>,
    ) -> Self {
        Self {
            entity: entity.into(),
            year,
            month,
            value,
            source: Some(source.into()),
        }
    }

    /// Calendar month of the observation
    pub fn key(&self) -> MonthKey {
        MonthKey::new(self.year, self.month)
    }
}

/// Reject rows that would corrupt downstream metrics.
///
/// Checks entity names, month and year ranges, value sanity (finite, non-negative)
/// and duplicate `(Entity, Year, Month)` keys. Source overlaps must be resolved
/// by the loaders (see [`merge_by_priority`]) before rows reach the engine.
pub fn validate_observations(rows: &[RawObservation], kind: ObservationKind) -> Result<()> {
    let column = kind.value_column();
    let mut seen: HashSet<(&str, i32, u32)> = HashSet::with_capacity(rows.len());

    for (row, obs) in rows.iter().enumerate() {
        if obs.entity.trim().is_empty() {
            return Err(EngineError::EmptyEntity { row });
        }
        if !obs.key().is_valid_month() {
            return Err(EngineError::MonthOutOfRange {
                entity: obs.entity.clone(),
                year: obs.year,
                month: obs.month,
            });
        }
        if !(MIN_YEAR..=MAX_YEAR).contains(&obs.year) {
            return Err(EngineError::YearOutOfRange {
                entity: obs.entity.clone(),
                year: obs.year,
                min: MIN_YEAR,
                max: MAX_YEAR,
            });
        }
        if let Some(value) = obs.value {
            if !value.is_finite() || value < 0.0 {
                return Err(EngineError::InvalidValue {
                    column,
                    entity: obs.entity.clone(),
                    year: obs.year,
                    month: obs.month,
                    value,
                });
            }
        }
        if !seen.insert((obs.entity.as_str(), obs.year, obs.month)) {
            return Err(EngineError::DuplicateObservation {
                column,
                entity: obs.entity.clone(),
                year: obs.year,
                month: obs.month,
            });
        }
    }

    Ok(())
}

/// Group rows by entity, each group sorted chronologically.
///
/// `BTreeMap` keeps entity order deterministic across runs.
pub fn group_by_entity(rows: &[RawObservation]) -> BTreeMap<&str, Vec<&RawObservation>> {
    let mut groups: BTreeMap<&str, Vec<&RawObservation>> = BTreeMap::new();
    for obs in rows {
        groups.entry(obs.entity.as_str()).or_default().push(obs);
    }
    for group in groups.values_mut() {
        group.sort_by_key(|obs| obs.key());
    }
    groups
}
