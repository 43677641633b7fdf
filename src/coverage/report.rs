//! Per-entity export report and loader diagnostics

use super::{complete_years, InclusionDecision};
use crate::series::{EntitySeries, MonthlyRecord, PopulationSeries};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// What the exporters and chart renderer need to know about one entity
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EntityReport {
    pub entity: String,
    /// First and last year with a fertility rate
    pub first_year: Option<i32>,
    pub last_year: Option<i32>,
    /// Births sources for attribution, in order of first use
    pub sources: Vec<String>,
    pub complete_years: u32,
    pub conception_first_year: Option<i32>,
    pub conception_last_year: Option<i32>,
    pub inclusion: InclusionDecision,
}

/// Records between the first and last month where `metric` is present.
///
/// Interior gaps are kept; an all-null series yields an empty slice.
pub fn trim_nulls<F>(records: &[MonthlyRecord], metric: F) -> &[MonthlyRecord]
where
    F: Fn(&MonthlyRecord) -> Option<f64>,
{
    let first = records.iter().position(|r| metric(r).is_some());
    let last = records.iter().rposition(|r| metric(r).is_some());
    match (first, last) {
        (Some(first), Some(last)) => &records[first..=last],
        _ => &[],
    }
}

fn year_range(records: &[MonthlyRecord]) -> (Option<i32>, Option<i32>) {
    (records.first().map(|r| r.year), records.last().map(|r| r.year))
}

/// Assemble the report for one entity with all metrics applied
pub fn entity_report(series: &EntitySeries, inclusion: InclusionDecision) -> EntityReport {
    let (first_year, last_year) = year_range(trim_nulls(&series.records, |r| r.daily_fertility_rate));
    let (conception_first_year, conception_last_year) =
        year_range(trim_nulls(&series.records, |r| r.daily_conception_rate));

    EntityReport {
        entity: series.entity.clone(),
        first_year,
        last_year,
        sources: series.sources(),
        complete_years: complete_years(series).len() as u32,
        conception_first_year,
        conception_last_year,
        inclusion,
    }
}

/// Entity whose births start before any population is available
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LateStart {
    pub entity: String,
    pub first_births_year: i32,
    /// `None` when the entity has no population at all
    pub first_population_year: Option<i32>,
}

/// Entities whose births history begins before their population history
pub fn births_before_population(births: &[EntitySeries], population: &[PopulationSeries]) -> Vec<LateStart> {
    let first_population: HashMap<&str, i32> = population
        .iter()
        .filter_map(|p| {
            p.points
                .iter()
                .find(|pt| pt.childbearing_population.is_some())
                .map(|pt| (p.entity.as_str(), pt.year))
        })
        .collect();

    let mut out = Vec::new();
    for s in births {
        let Some(first_births_year) = s.records.iter().find(|r| r.births.is_some()).map(|r| r.year) else {
            continue;
        };
        let first_population_year = first_population.get(s.entity.as_str()).copied();
        if first_population_year.map_or(true, |year| first_births_year < year) {
            log::warn!(
                "{}: births from {} but population from {}",
                s.entity,
                first_births_year,
                first_population_year.map_or_else(|| "never".to_string(), |y| y.to_string())
            );
            out.push(LateStart {
                entity: s.entity.clone(),
                first_births_year,
                first_population_year,
            });
        }
    }
    out
}
