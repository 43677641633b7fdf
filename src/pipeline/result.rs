//! Pipeline output structures

use crate::coverage::{EntityReport, ExtentStats, InclusionDecision, LateStart};
use crate::series::{EntitySeries, PopulationSeries};
use serde::{Deserialize, Serialize};

/// Everything produced by one pipeline run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PipelineResult {
    /// Births-metric series for included entities
    pub births: Vec<EntitySeries>,
    /// Monthly population for included entities
    pub population: Vec<PopulationSeries>,
    /// Coverage statistics for every loaded entity
    pub stats: Vec<ExtentStats>,
    /// Filter decision for every loaded entity
    pub decisions: Vec<InclusionDecision>,
    pub reports: Vec<EntityReport>,
    pub late_starts: Vec<LateStart>,
}

impl PipelineResult {
    /// Report for a single entity, included or not
    pub fn report(&self, entity: &str) -> Option<&EntityReport> {
        self.reports.iter().find(|r| r.entity == entity)
    }

    /// Get summary statistics
    pub fn summary(&self) -> PipelineSummary {
        let included = self.decisions.iter().filter(|d| d.included).count();
        let months_total: usize = self.births.iter().map(|s| s.records.len()).sum();
        let months_with_rate = self
            .births
            .iter()
            .flat_map(|s| &s.records)
            .filter(|r| r.daily_fertility_rate.is_some())
            .count();
        let population_months = self.population.iter().map(|p| p.points.len()).sum();

        PipelineSummary {
            entities_loaded: self.decisions.len(),
            entities_included: included,
            entities_excluded: self.decisions.len() - included,
            months_total,
            months_with_rate,
            population_months,
            first_year: self.births.iter().filter_map(|s| s.start()).map(|k| k.year).min(),
            last_year: self.births.iter().filter_map(|s| s.end()).map(|k| k.year).max(),
            births_before_population: self.late_starts.len(),
        }
    }
}

/// Summary statistics for a pipeline run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PipelineSummary {
    pub entities_loaded: usize,
    pub entities_included: usize,
    pub entities_excluded: usize,
    pub months_total: usize,
    pub months_with_rate: usize,
    pub population_months: usize,
    pub first_year: Option<i32>,
    pub last_year: Option<i32>,
    pub births_before_population: usize,
}
