//! Fertility Series CLI
//!
//! Runs the full pipeline over a combined births table and a combined
//! population table and writes the derived tables as CSV. Optional secondary
//! tables fill in only what the primary ones do not cover.

use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};
use fertility_series::export;
use fertility_series::observation::{load_observations, merge_by_priority};
use fertility_series::{EngineConfig, FilterThresholds, ObservationKind, Pipeline, PopulationSpan, RawObservation};
use serde::Serialize;
use std::path::{Path, PathBuf};
use std::time::Instant;

#[derive(Parser, Debug)]
#[command(name = "fertility_series")]
#[command(about = "Monthly fertility, seasonality and conception series", long_about = None)]
#[command(version)]
struct Cli {
    /// Combined births CSV (Entity,Year,Month,Births,Source)
    #[arg(long)]
    births: PathBuf,

    /// Combined population CSV (Entity,Year,Month,childbearing_population,Source)
    #[arg(long)]
    population: PathBuf,

    /// Lower-priority births CSV; rows for months the primary covers are dropped
    #[arg(long)]
    secondary_births: Option<PathBuf>,

    /// Lower-priority population CSV; rows for years the primary covers are dropped
    #[arg(long)]
    secondary_population: Option<PathBuf>,

    /// Directory for the output tables
    #[arg(long, default_value = "output")]
    out_dir: PathBuf,

    /// Minimum number of complete years
    #[arg(long, env = "FERTILITY_MIN_COMPLETE_YEARS")]
    min_complete_years: Option<u32>,

    /// Minimum monthly births
    #[arg(long, env = "FERTILITY_MIN_MONTHLY_BIRTHS")]
    min_monthly_births: Option<u32>,

    /// U.S. states dataset: both thresholds default to 0
    #[arg(long)]
    states: bool,

    /// Extent of the monthly population grid
    #[arg(long, value_enum, default_value_t = SpanArg::Observed)]
    population_span: SpanArg,

    /// Process entities on all cores
    #[arg(long)]
    parallel: bool,

    /// Print the run summary as JSON
    #[arg(long)]
    json: bool,
}

#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
enum SpanArg {
    /// First to last observed month
    Observed,
    /// Whole calendar years of the first and last observation
    Calendar,
}

impl From<SpanArg> for PopulationSpan {
    fn from(arg: SpanArg) -> Self {
        match arg {
            SpanArg::Observed => PopulationSpan::ObservedMonths,
            SpanArg::Calendar => PopulationSpan::CalendarYears,
        }
    }
}

impl Cli {
    fn config(&self) -> EngineConfig {
        let base = if self.states {
            FilterThresholds::states()
        } else {
            FilterThresholds::default()
        };
        EngineConfig {
            thresholds: FilterThresholds {
                min_complete_years: self.min_complete_years.unwrap_or(base.min_complete_years),
                min_monthly_births: self.min_monthly_births.unwrap_or(base.min_monthly_births),
            },
            population_span: self.population_span.into(),
        }
    }
}

#[derive(Serialize)]
struct RunResponse {
    config: EngineConfig,
    summary: fertility_series::pipeline::PipelineSummary,
    excluded: Vec<Excluded>,
    files: Vec<String>,
    execution_time_ms: u64,
}

#[derive(Serialize)]
struct Excluded {
    entity: String,
    reasons: String,
}

/// Load a primary table and merge in an optional secondary one
fn load_sources(primary: &Path, secondary: Option<&Path>, kind: ObservationKind) -> Result<Vec<RawObservation>> {
    let rows = load_observations(primary, kind)
        .with_context(|| format!("loading {} from {}", kind.value_column(), primary.display()))?;
    let Some(secondary) = secondary else {
        return Ok(rows);
    };
    let fallback = load_observations(secondary, kind)
        .with_context(|| format!("loading {} from {}", kind.value_column(), secondary.display()))?;
    Ok(merge_by_priority(rows, fallback, kind.merge_key()))
}

fn main() -> Result<()> {
    env_logger::init();
    let cli = Cli::parse();
    let start = Instant::now();

    let births = load_sources(&cli.births, cli.secondary_births.as_deref(), ObservationKind::Births)?;
    let population = load_sources(
        &cli.population,
        cli.secondary_population.as_deref(),
        ObservationKind::Population,
    )?;

    let config = cli.config();
    let pipeline = Pipeline::new(config);
    let result = if cli.parallel {
        pipeline.run_parallel(&births, &population)
    } else {
        pipeline.run(&births, &population)
    }
    .context("pipeline run failed")?;

    let files = export::write_all(&cli.out_dir, &result)
        .with_context(|| format!("writing tables to {}", cli.out_dir.display()))?;

    let summary = result.summary();
    let excluded: Vec<Excluded> = result
        .decisions
        .iter()
        .filter(|d| !d.included)
        .map(|d| Excluded {
            entity: d.entity.clone(),
            reasons: d.reason_text(),
        })
        .collect();

    if cli.json {
        let response = RunResponse {
            config,
            summary,
            excluded,
            files: files.iter().map(|p| p.display().to_string()).collect(),
            execution_time_ms: start.elapsed().as_millis() as u64,
        };
        println!("{}", serde_json::to_string_pretty(&response)?);
        return Ok(());
    }

    println!("Fertility Series v{}", env!("CARGO_PKG_VERSION"));
    println!("======================\n");
    println!(
        "Thresholds: {} complete years, {} monthly births",
        config.thresholds.min_complete_years, config.thresholds.min_monthly_births
    );
    println!("\nSummary:");
    println!("  Entities loaded:   {}", summary.entities_loaded);
    println!("  Entities included: {}", summary.entities_included);
    println!("  Entity-months:     {}", summary.months_total);
    println!("  Months with rate:  {}", summary.months_with_rate);
    if let (Some(first), Some(last)) = (summary.first_year, summary.last_year) {
        println!("  Years:             {}-{}", first, last);
    }
    if summary.births_before_population > 0 {
        println!("  Births before population: {} entities", summary.births_before_population);
    }

    if !excluded.is_empty() {
        println!("\nExcluded:");
        for e in &excluded {
            println!("  {:<24} {}", e.entity, e.reasons);
        }
    }

    println!("\nOutput:");
    for path in &files {
        println!("  {}", path.display());
    }
    println!("\nTotal time: {:?}", start.elapsed());
    Ok(())
}
