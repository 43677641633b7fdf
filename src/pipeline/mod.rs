//! End-to-end processing of one dataset (countries or states)

mod result;

pub use result::{PipelineResult, PipelineSummary};

use crate::coverage::{
    births_before_population, combined_extent_stats, entity_report, evaluate_inclusion, retain_included,
    EntityReport, FilterThresholds, InclusionDecision,
};
use crate::error::Result;
use crate::metrics::derive_metrics;
use crate::observation::RawObservation;
use crate::series::{build_monthly_index, interpolate_population, EntitySeries, PopulationSeries, PopulationSpan};
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Configuration for a pipeline run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct EngineConfig {
    /// Inclusion thresholds (use [`FilterThresholds::states`] for U.S. states)
    pub thresholds: FilterThresholds,

    /// Extent of the monthly population grid
    pub population_span: PopulationSpan,
}

impl EngineConfig {
    /// Configuration for the U.S. states dataset
    pub fn states() -> Self {
        Self {
            thresholds: FilterThresholds::states(),
            ..Self::default()
        }
    }
}

/// Derived outputs for one entity before filtering
struct EntityOutcome {
    series: EntitySeries,
    decision: InclusionDecision,
    report: EntityReport,
}

/// Pipeline wiring the series builders, metric calculators and filter
#[derive(Debug, Clone, Default)]
pub struct Pipeline {
    config: EngineConfig,
}

impl Pipeline {
    pub fn new(config: EngineConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Single-threaded reference run
    pub fn run(&self, births: &[RawObservation], population: &[RawObservation]) -> Result<PipelineResult> {
        let (series, population) = self.prepare(births, population)?;
        let lookup = population_lookup(&population);

        let outcomes: Vec<EntityOutcome> = series
            .into_iter()
            .map(|s| {
                let pop = lookup.get(s.entity.as_str()).copied();
                self.derive_entity(s, pop)
            })
            .collect();

        Ok(self.assemble(outcomes, population))
    }

    /// Same as [`run`](Self::run) with entities processed on the rayon pool.
    ///
    /// Entities share no data, so the output is identical to `run`.
    pub fn run_parallel(&self, births: &[RawObservation], population: &[RawObservation]) -> Result<PipelineResult> {
        let (series, population) = self.prepare(births, population)?;
        let lookup = population_lookup(&population);

        let outcomes: Vec<EntityOutcome> = series
            .into_par_iter()
            .map(|s| {
                let pop = lookup.get(s.entity.as_str()).copied();
                self.derive_entity(s, pop)
            })
            .collect();

        Ok(self.assemble(outcomes, population))
    }

    fn prepare(
        &self,
        births: &[RawObservation],
        population: &[RawObservation],
    ) -> Result<(Vec<EntitySeries>, Vec<PopulationSeries>)> {
        let series = build_monthly_index(births)?;
        let population = interpolate_population(population, self.config.population_span)?;
        log::debug!(
            "Indexed {} births entities, {} population entities",
            series.len(),
            population.len()
        );
        Ok((series, population))
    }

    fn derive_entity(&self, mut series: EntitySeries, population: Option<&PopulationSeries>) -> EntityOutcome {
        if population.is_none() {
            log::warn!("{}: births without population; rates will be null", series.entity);
        }
        derive_metrics(&mut series, population);

        let decision = evaluate_inclusion(&series, self.config.thresholds);
        let report = entity_report(&series, decision.clone());
        EntityOutcome {
            series,
            decision,
            report,
        }
    }

    fn assemble(&self, outcomes: Vec<EntityOutcome>, population: Vec<PopulationSeries>) -> PipelineResult {
        let mut all_series = Vec::with_capacity(outcomes.len());
        let mut decisions = Vec::with_capacity(outcomes.len());
        let mut reports = Vec::with_capacity(outcomes.len());
        for outcome in outcomes {
            all_series.push(outcome.series);
            decisions.push(outcome.decision);
            reports.push(outcome.report);
        }

        // Coverage describes everything that was loaded, not just what survives
        let stats = combined_extent_stats(&all_series, &population);
        let late_starts = births_before_population(&all_series, &population);

        let births = retain_included(all_series, &decisions);
        let population = population
            .into_iter()
            .filter(|p| births.iter().any(|s| s.entity == p.entity))
            .collect();

        PipelineResult {
            births,
            population,
            stats,
            decisions,
            reports,
            late_starts,
        }
    }
}

fn population_lookup(population: &[PopulationSeries]) -> HashMap<&str, &PopulationSeries> {
    population.iter().map(|p| (p.entity.as_str(), p)).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::calendar::MonthKey;
    use crate::testing::{flat_births, flat_population, sample_births, sample_population};

    #[test]
    fn test_parallel_matches_sequential() {
        let mut births = sample_births();
        births.extend(flat_births("Chile", 4, 20000.0));
        let mut population = sample_population();
        population.extend(flat_population("Chile", 4, 3e6));

        let pipeline = Pipeline::new(EngineConfig::states());
        let sequential = pipeline.run(&births, &population).unwrap();
        let parallel = pipeline.run_parallel(&births, &population).unwrap();
        assert_eq!(sequential, parallel);
        assert_eq!(sequential.births.len(), 3);
    }

    #[test]
    fn test_default_thresholds_exclude_short_histories() {
        let pipeline = Pipeline::default();
        let result = pipeline.run(&sample_births(), &sample_population()).unwrap();

        assert!(result.births.is_empty());
        assert!(result.population.is_empty());
        assert_eq!(result.decisions.len(), 2);
        assert!(result.decisions.iter().all(|d| !d.included));
        // Stats still cover every loaded entity
        assert_eq!(result.stats.len(), 2);
    }

    #[test]
    fn test_states_run_derives_all_metrics() {
        let pipeline = Pipeline::new(EngineConfig {
            population_span: PopulationSpan::CalendarYears,
            ..EngineConfig::states()
        });
        let result = pipeline.run(&sample_births(), &sample_population()).unwrap();
        assert_eq!(result.births.len(), 2);

        let france = &result.births[0];
        let jan = france.get(MonthKey::new(2020, 1)).unwrap();
        assert!((jan.daily_fertility_rate.unwrap() - 2000.0 / 8_500_000.0 * 100_000.0).abs() < 1e-9);
        assert!(jan.daily_conception_rate.is_some());
        assert!(france.get(MonthKey::new(2021, 12)).unwrap().dfr_t12m_ma.is_some());

        assert_eq!(result.reports[0].complete_years, 2);
        assert!(result.late_starts.is_empty());
    }

    #[test]
    fn test_malformed_input_aborts_run() {
        let mut births = sample_births();
        births.push(RawObservation::new("France", 2020, 1, Some(1.0), "UN"));
        assert!(Pipeline::default().run(&births, &sample_population()).is_err());
        assert!(Pipeline::default().run_parallel(&births, &sample_population()).is_err());
    }
}
