//! CSV writers for the output tables
//!
//! Column names are the contract with the downstream schema validator and
//! chart builders; do not rename them.

use crate::coverage::{ExtentStats, InclusionDecision};
use crate::error::Result;
use crate::pipeline::PipelineResult;
use crate::series::{EntitySeries, PopulationSeries, Provenance};
use chrono::NaiveDate;
use csv::Writer;
use serde::Serialize;
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

pub const BIRTHS_FILE: &str = "births.csv";
pub const POPULATION_FILE: &str = "population.csv";
pub const STATS_FILE: &str = "stats.csv";
pub const INCLUSION_FILE: &str = "inclusion.csv";

#[derive(Debug, Serialize)]
struct BirthsRow<'a> {
    #[serde(rename = "Entity")]
    entity: &'a str,
    #[serde(rename = "Year")]
    year: i32,
    #[serde(rename = "Month")]
    month: u32,
    days_in_month: u32,
    #[serde(rename = "Date")]
    date: NaiveDate,
    #[serde(rename = "Births")]
    births: Option<f64>,
    #[serde(rename = "Source")]
    source: Option<&'a str>,
    childbearing_population: Option<f64>,
    #[serde(rename = "Source_population")]
    population_source: Option<&'a str>,
    #[serde(rename = "Date_population")]
    population_date: Option<NaiveDate>,
    population_provenance: Option<Provenance>,
    births_per_day: Option<f64>,
    daily_fertility_rate: Option<f64>,
    dfr_t12m_ma: Option<f64>,
    seasonality_ratio_t12m: Option<f64>,
    seasonality_ratio_annual: Option<f64>,
    seasonality_percentage_annual: Option<f64>,
    seasonality_percentage_normalized: Option<f64>,
    future_births: Option<f64>,
    future_days_in_month: Option<u32>,
    future_births_per_day: Option<f64>,
    daily_conception_rate: Option<f64>,
}

#[derive(Debug, Serialize)]
struct PopulationRow<'a> {
    #[serde(rename = "Entity")]
    entity: &'a str,
    #[serde(rename = "Year")]
    year: i32,
    #[serde(rename = "Month")]
    month: u32,
    childbearing_population: Option<f64>,
    #[serde(rename = "Source")]
    source: Option<&'a str>,
    #[serde(rename = "Date")]
    date: NaiveDate,
    provenance: Option<Provenance>,
}

#[derive(Debug, Serialize)]
struct InclusionRow<'a> {
    #[serde(rename = "Entity")]
    entity: &'a str,
    complete_years: u32,
    min_monthly_births: Option<f64>,
    included: bool,
    min_complete_years_threshold: u32,
    min_monthly_births_threshold: u32,
    reasons: String,
}

/// Write one row per entity-month of the births-metric table
pub fn write_births<W: Write>(writer: W, series: &[EntitySeries]) -> Result<()> {
    let mut wtr = Writer::from_writer(writer);
    for s in series {
        for r in &s.records {
            wtr.serialize(BirthsRow {
                entity: &s.entity,
                year: r.year,
                month: r.month,
                days_in_month: r.days_in_month,
                date: r.date,
                births: r.births,
                source: r.source.as_deref(),
                childbearing_population: r.childbearing_population,
                population_source: r.population_source.as_deref(),
                population_date: r.population_provenance.map(|_| r.date),
                population_provenance: r.population_provenance,
                births_per_day: r.births_per_day,
                daily_fertility_rate: r.daily_fertility_rate,
                dfr_t12m_ma: r.dfr_t12m_ma,
                seasonality_ratio_t12m: r.seasonality_ratio_t12m,
                seasonality_ratio_annual: r.seasonality_ratio_annual,
                seasonality_percentage_annual: r.seasonality_percentage_annual,
                seasonality_percentage_normalized: r.seasonality_percentage_normalized,
                future_births: r.future_births,
                future_days_in_month: r.future_days_in_month,
                future_births_per_day: r.future_births_per_day,
                daily_conception_rate: r.daily_conception_rate,
            })?;
        }
    }
    wtr.flush()?;
    Ok(())
}

/// Write the monthly population table
pub fn write_population<W: Write>(writer: W, population: &[PopulationSeries]) -> Result<()> {
    let mut wtr = Writer::from_writer(writer);
    for p in population {
        for pt in &p.points {
            wtr.serialize(PopulationRow {
                entity: &p.entity,
                year: pt.year,
                month: pt.month,
                childbearing_population: pt.childbearing_population,
                source: pt.source.as_deref(),
                date: pt.date,
                provenance: pt.provenance,
            })?;
        }
    }
    wtr.flush()?;
    Ok(())
}

/// Write the coverage statistics table
pub fn write_stats<W: Write>(writer: W, stats: &[ExtentStats]) -> Result<()> {
    let mut wtr = Writer::from_writer(writer);
    for row in stats {
        wtr.serialize(row)?;
    }
    wtr.flush()?;
    Ok(())
}

/// Write one filter decision per entity
pub fn write_inclusion<W: Write>(writer: W, decisions: &[InclusionDecision]) -> Result<()> {
    let mut wtr = Writer::from_writer(writer);
    for d in decisions {
        wtr.serialize(InclusionRow {
            entity: &d.entity,
            complete_years: d.complete_years,
            min_monthly_births: d.min_monthly_births,
            included: d.included,
            min_complete_years_threshold: d.thresholds.min_complete_years,
            min_monthly_births_threshold: d.thresholds.min_monthly_births,
            reasons: d.reason_text(),
        })?;
    }
    wtr.flush()?;
    Ok(())
}

/// Write all four tables into `dir`, creating it if needed.
///
/// Returns the paths written.
pub fn write_all<P: AsRef<Path>>(dir: P, result: &PipelineResult) -> Result<Vec<PathBuf>> {
    let dir = dir.as_ref();
    fs::create_dir_all(dir)?;

    let births = dir.join(BIRTHS_FILE);
    write_births(fs::File::create(&births)?, &result.births)?;
    let population = dir.join(POPULATION_FILE);
    write_population(fs::File::create(&population)?, &result.population)?;
    let stats = dir.join(STATS_FILE);
    write_stats(fs::File::create(&stats)?, &result.stats)?;
    let inclusion = dir.join(INCLUSION_FILE);
    write_inclusion(fs::File::create(&inclusion)?, &result.decisions)?;

    log::info!("Wrote output tables to {}", dir.display());
    Ok(vec![births, population, stats, inclusion])
}
