//! Data coverage: extent statistics, complete years and the inclusion filter

mod filter;
mod report;
mod stats;

pub use filter::{apply_inclusion_filter, evaluate_inclusion, ExclusionReason, InclusionDecision};
pub(crate) use filter::retain_included;
pub use report::{births_before_population, entity_report, trim_nulls, EntityReport, LateStart};
pub use stats::{births_extent_stats, combined_extent_stats, population_extent_stats, ExtentStats, PopulationExtent};

use crate::series::EntitySeries;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Thresholds an entity must meet to be published
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct FilterThresholds {
    /// Minimum number of years with a fertility rate in all 12 months
    pub min_complete_years: u32,
    /// Floor on the smallest non-null monthly births count
    pub min_monthly_births: u32,
}

impl Default for FilterThresholds {
    fn default() -> Self {
        Self {
            min_complete_years: 25,
            min_monthly_births: 200,
        }
    }
}

impl FilterThresholds {
    /// U.S. states are published regardless of history length or size.
    ///
    /// A zero births floor always passes, so a state with no births at all is
    /// still included.
    pub fn states() -> Self {
        Self {
            min_complete_years: 0,
            min_monthly_births: 0,
        }
    }
}

/// Years in which all 12 months carry a `daily_fertility_rate`.
///
/// Stricter than the seasonality gate, which only needs births.
pub fn complete_years(series: &EntitySeries) -> Vec<i32> {
    let mut per_year: BTreeMap<i32, u32> = BTreeMap::new();
    for record in &series.records {
        if record.daily_fertility_rate.is_some() {
            *per_year.entry(record.year).or_default() += 1;
        }
    }
    per_year
        .into_iter()
        .filter(|(_, months)| *months == 12)
        .map(|(year, _)| year)
        .collect()
}

/// Smallest non-null births count across the entity's months
pub fn min_monthly_births(series: &EntitySeries) -> Option<f64> {
    series.records.iter().filter_map(|r| r.births).reduce(f64::min)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::metrics::apply_fertility_rates;
    use crate::series::{build_monthly_index, interpolate_population, PopulationSpan};
    use crate::testing::{sample_births, sample_population};

    #[test]
    fn test_complete_years_need_rates_not_just_births() {
        let mut series = build_monthly_index(&sample_births()).unwrap();
        // Observed span ends in July 2021, so only 2020 has a full year of rates
        let population = interpolate_population(&sample_population(), PopulationSpan::ObservedMonths).unwrap();
        let france = &mut series[0];
        apply_fertility_rates(france, population.iter().find(|p| p.entity == "France"));

        assert_eq!(complete_years(france), vec![2020]);
        assert_eq!(min_monthly_births(france), Some(54000.0));
    }

    #[test]
    fn test_default_and_state_thresholds() {
        let defaults = FilterThresholds::default();
        assert_eq!(defaults.min_complete_years, 25);
        assert_eq!(defaults.min_monthly_births, 200);
        assert_eq!(FilterThresholds::states().min_complete_years, 0);
        assert_eq!(FilterThresholds::states().min_monthly_births, 0);
    }
}
