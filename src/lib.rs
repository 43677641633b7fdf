//! Fertility Series - monthly demographic time-series engine
//!
//! This library provides:
//! - Gapless monthly births series and interpolated childbearing-age population
//! - Daily fertility rates, birth seasonality and conception rates
//! - Data coverage statistics and the publication filter
//! - CSV loading of combined raw tables and CSV export of the derived tables

pub mod calendar;
pub mod coverage;
pub mod error;
pub mod export;
pub mod metrics;
pub mod observation;
pub mod pipeline;
pub mod series;

#[cfg(test)]
mod testing;

// Re-export commonly used types
pub use calendar::MonthKey;
pub use coverage::{EntityReport, FilterThresholds, InclusionDecision};
pub use error::{EngineError, Result};
pub use observation::{ObservationKind, RawObservation};
pub use pipeline::{EngineConfig, Pipeline, PipelineResult};
pub use series::{EntitySeries, MonthlyRecord, PopulationSeries, PopulationSpan};
