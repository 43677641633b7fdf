//! Canonical monthly series per entity
//!
//! Every entity's records form a gapless, strictly increasing run of calendar
//! months. Derived metric fields start as `None` and are filled in by the
//! calculators in [`crate::metrics`].

mod index;
mod interpolation;

pub use index::build_monthly_index;
pub use interpolation::{interpolate_population, PopulationSpan};

use crate::calendar::{MonthKey, MAX_YEAR, MIN_YEAR};
use crate::error::{EngineError, Result};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// How a population value came to exist
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Provenance {
    /// Taken directly from a census/survey/estimate row
    Observed,
    /// Linear interpolation between two observed months
    Interpolated,
    /// Copied from the nearest observation at the series edge
    Held,
}

/// One entity-month of the births branch with all derived metrics
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MonthlyRecord {
    // Timing
    pub year: i32,
    pub month: u32,
    pub days_in_month: u32,
    pub date: NaiveDate,

    // Births
    pub births: Option<f64>,
    pub source: Option<String>,

    // Population (joined)
    pub childbearing_population: Option<f64>,
    pub population_source: Option<String>,
    pub population_provenance: Option<Provenance>,

    // Fertility
    pub births_per_day: Option<f64>,
    pub daily_fertility_rate: Option<f64>,

    // Seasonality
    pub dfr_t12m_ma: Option<f64>,
    pub seasonality_ratio_t12m: Option<f64>,
    pub seasonality_ratio_annual: Option<f64>,
    pub seasonality_percentage_annual: Option<f64>,
    pub seasonality_percentage_normalized: Option<f64>,

    // Conception
    pub future_births: Option<f64>,
    pub future_days_in_month: Option<u32>,
    pub future_births_per_day: Option<f64>,
    pub daily_conception_rate: Option<f64>,
}

impl MonthlyRecord {
    /// Create an empty record for a month; all measurements start as `None`
    pub fn new(key: MonthKey, date: NaiveDate) -> Self {
        Self {
            year: key.year,
            month: key.month,
            days_in_month: key.days_in_month(),
            date,
            births: None,
            source: None,
            childbearing_population: None,
            population_source: None,
            population_provenance: None,
            births_per_day: None,
            daily_fertility_rate: None,
            dfr_t12m_ma: None,
            seasonality_ratio_t12m: None,
            seasonality_ratio_annual: None,
            seasonality_percentage_annual: None,
            seasonality_percentage_normalized: None,
            future_births: None,
            future_days_in_month: None,
            future_births_per_day: None,
            daily_conception_rate: None,
        }
    }

    /// Calendar month of the record
    pub fn key(&self) -> MonthKey {
        MonthKey::new(self.year, self.month)
    }
}

/// Gapless monthly records for one entity
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EntitySeries {
    /// Country or state display name
    pub entity: String,
    /// One record per month, oldest first
    pub records: Vec<MonthlyRecord>,
}

impl EntitySeries {
    /// First month of the series
    pub fn start(&self) -> Option<MonthKey> {
        self.records.first().map(MonthlyRecord::key)
    }

    /// Last month of the series
    pub fn end(&self) -> Option<MonthKey> {
        self.records.last().map(MonthlyRecord::key)
    }

    /// Position of `key` in `records`, by month-index offset from the start
    pub fn position(&self, key: MonthKey) -> Option<usize> {
        position_in(self.start()?, self.records.len(), key)
    }

    /// Record for a given month
    pub fn get(&self, key: MonthKey) -> Option<&MonthlyRecord> {
        self.position(key).map(|i| &self.records[i])
    }

    /// Distinct sources in order of first appearance
    pub fn sources(&self) -> Vec<String> {
        let mut sources: Vec<String> = Vec::new();
        for source in self.records.iter().filter_map(|r| r.source.as_ref()) {
            if !sources.contains(source) {
                sources.push(source.clone());
            }
        }
        sources
    }
}

/// One entity-month of the population grid
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PopulationPoint {
    pub year: i32,
    pub month: u32,
    pub date: NaiveDate,
    pub childbearing_population: Option<f64>,
    pub source: Option<String>,
    /// `None` when no population value could be derived
    pub provenance: Option<Provenance>,
}

impl PopulationPoint {
    /// Calendar month of the point
    pub fn key(&self) -> MonthKey {
        MonthKey::new(self.year, self.month)
    }
}

/// Monthly population grid for one entity
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PopulationSeries {
    /// Country or state display name
    pub entity: String,
    /// One point per month, oldest first
    pub points: Vec<PopulationPoint>,
}

impl PopulationSeries {
    /// First month of the grid
    pub fn start(&self) -> Option<MonthKey> {
        self.points.first().map(PopulationPoint::key)
    }

    /// Population point for a given month
    pub fn get(&self, key: MonthKey) -> Option<&PopulationPoint> {
        position_in(self.start()?, self.points.len(), key).map(|i| &self.points[i])
    }
}

/// First-of-month date, or a range error for years chrono cannot represent
pub(crate) fn month_date(entity: &str, key: MonthKey) -> Result<NaiveDate> {
    key.first_day().ok_or_else(|| EngineError::YearOutOfRange {
        entity: entity.to_string(),
        year: key.year,
        min: MIN_YEAR,
        max: MAX_YEAR,
    })
}

/// Offset of `key` within a gapless run of `len` months beginning at `start`
fn position_in(start: MonthKey, len: usize, key: MonthKey) -> Option<usize> {
    let offset = start.months_until(key);
    if offset < 0 || offset as usize >= len {
        None
    } else {
        Some(offset as usize)
    }
}
