//! Data extent report
//!
//! Prints births coverage per entity and source, the population date range
//! joined onto it, and entities whose births start before any population.

use anyhow::{Context, Result};
use clap::Parser;
use fertility_series::coverage::{births_before_population, combined_extent_stats, ExtentStats, LateStart};
use fertility_series::observation::load_observations;
use fertility_series::series::{build_monthly_index, interpolate_population};
use fertility_series::{ObservationKind, PopulationSpan};
use serde::Serialize;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "coverage_report")]
#[command(about = "Births and population coverage by entity", long_about = None)]
struct Cli {
    /// Combined births CSV
    #[arg(long)]
    births: PathBuf,

    /// Combined population CSV
    #[arg(long)]
    population: PathBuf,

    /// Only show rows with missing months
    #[arg(long)]
    gaps_only: bool,

    /// Print as JSON
    #[arg(long)]
    json: bool,
}

#[derive(Serialize)]
struct CoverageResponse<'a> {
    stats: Vec<&'a ExtentStats>,
    births_before_population: &'a [LateStart],
}

fn main() -> Result<()> {
    env_logger::init();
    let cli = Cli::parse();

    let births = load_observations(&cli.births, ObservationKind::Births)
        .with_context(|| format!("loading births from {}", cli.births.display()))?;
    let population = load_observations(&cli.population, ObservationKind::Population)
        .with_context(|| format!("loading population from {}", cli.population.display()))?;

    let series = build_monthly_index(&births)?;
    let population = interpolate_population(&population, PopulationSpan::default())?;

    let stats = combined_extent_stats(&series, &population);
    let late = births_before_population(&series, &population);
    let shown: Vec<&ExtentStats> = stats
        .iter()
        .filter(|s| !cli.gaps_only || s.periods_missing > 0)
        .collect();

    if cli.json {
        let response = CoverageResponse {
            stats: shown,
            births_before_population: &late,
        };
        println!("{}", serde_json::to_string_pretty(&response)?);
        return Ok(());
    }

    println!(
        "{:<24} {:<10} {:>10} {:>10} {:>7} {:>7} {:>7} {:>10} {:>10}",
        "Entity", "Source", "From", "To", "Total", "Present", "Missing", "Pop from", "Pop to"
    );
    println!("{}", "-".repeat(104));
    for s in &shown {
        println!(
            "{:<24} {:<10} {:>10} {:>10} {:>7} {:>7} {:>7} {:>10} {:>10}",
            s.entity,
            s.source.as_deref().unwrap_or("-"),
            s.earliest_date,
            s.latest_date,
            s.periods_total,
            s.periods_present,
            s.periods_missing,
            s.earliest_date_population.map_or("-".to_string(), |d| d.to_string()),
            s.latest_date_population.map_or("-".to_string(), |d| d.to_string()),
        );
    }

    if !late.is_empty() {
        println!("\nBirths before population:");
        for l in &late {
            match l.first_population_year {
                Some(year) => println!("  {:<24} births {} / population {}", l.entity, l.first_births_year, year),
                None => println!("  {:<24} births {} / no population", l.entity, l.first_births_year),
            }
        }
    }
    Ok(())
}
