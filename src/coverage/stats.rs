//! Time-extent statistics per `(Entity, Source)`
//!
//! Each row also carries entity-level rollups over all of the entity's sources.
//! Population grids are interpolated and so never miss a period; only their
//! date range is reported.

use crate::series::{EntitySeries, PopulationSeries};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};

/// Births coverage for one entity-source pair, with population extent joined on
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExtentStats {
    #[serde(rename = "Entity")]
    pub entity: String,
    #[serde(rename = "Source")]
    pub source: Option<String>,
    pub earliest_date: NaiveDate,
    pub latest_date: NaiveDate,
    pub periods_total: u32,
    pub periods_present: u32,
    pub periods_missing: u32,
    pub earliest_date_entity: NaiveDate,
    pub latest_date_entity: NaiveDate,
    pub periods_present_entity: u32,
    pub periods_total_entity: u32,
    pub periods_missing_entity: u32,
    pub earliest_date_population: Option<NaiveDate>,
    pub latest_date_population: Option<NaiveDate>,
    pub earliest_date_entity_population: Option<NaiveDate>,
    pub latest_date_entity_population: Option<NaiveDate>,
}

/// Population date range for one entity-source pair
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PopulationExtent {
    #[serde(rename = "Entity")]
    pub entity: String,
    #[serde(rename = "Source")]
    pub source: Option<String>,
    pub earliest_date: NaiveDate,
    pub latest_date: NaiveDate,
    pub earliest_date_entity: NaiveDate,
    pub latest_date_entity: NaiveDate,
}

#[derive(Debug, Clone, Copy)]
struct Extent {
    earliest: NaiveDate,
    latest: NaiveDate,
    total: u32,
    present: u32,
}

impl Extent {
    fn start(date: NaiveDate) -> Self {
        Self {
            earliest: date,
            latest: date,
            total: 0,
            present: 0,
        }
    }

    fn add(&mut self, date: NaiveDate, present: bool) {
        self.earliest = self.earliest.min(date);
        self.latest = self.latest.max(date);
        self.total += 1;
        if present {
            self.present += 1;
        }
    }

    fn merge(&mut self, other: &Extent) {
        self.earliest = self.earliest.min(other.earliest);
        self.latest = self.latest.max(other.latest);
        self.total += other.total;
        self.present += other.present;
    }
}

/// Group dated rows by source, returning per-source extents and the entity rollup
fn extents<'a, I>(rows: I) -> Option<(BTreeMap<Option<&'a str>, Extent>, Extent)>
where
    I: IntoIterator<Item = (Option<&'a str>, NaiveDate, bool)>,
{
    let mut by_source: BTreeMap<Option<&str>, Extent> = BTreeMap::new();
    for (source, date, present) in rows {
        by_source
            .entry(source)
            .or_insert_with(|| Extent::start(date))
            .add(date, present);
    }

    let mut sources = by_source.values();
    let mut entity = *sources.next()?;
    for extent in sources {
        entity.merge(extent);
    }
    Some((by_source, entity))
}

/// Coverage of the gapless births series, one row per `(Entity, Source)`.
///
/// Counts run over the indexed months: a month is present when it has births.
pub fn births_extent_stats(series: &[EntitySeries]) -> Vec<ExtentStats> {
    let mut out = Vec::new();
    for s in series {
        let rows = s
            .records
            .iter()
            .map(|r| (r.source.as_deref(), r.date, r.births.is_some()));
        let Some((by_source, entity)) = extents(rows) else {
            continue;
        };

        for (source, extent) in by_source {
            out.push(ExtentStats {
                entity: s.entity.clone(),
                source: source.map(str::to_string),
                earliest_date: extent.earliest,
                latest_date: extent.latest,
                periods_total: extent.total,
                periods_present: extent.present,
                periods_missing: extent.total - extent.present,
                earliest_date_entity: entity.earliest,
                latest_date_entity: entity.latest,
                periods_present_entity: entity.present,
                periods_total_entity: entity.total,
                periods_missing_entity: entity.total - entity.present,
                earliest_date_population: None,
                latest_date_population: None,
                earliest_date_entity_population: None,
                latest_date_entity_population: None,
            });
        }
    }
    out.sort_by(|a, b| a.entity.cmp(&b.entity).then_with(|| a.source.cmp(&b.source)));
    out
}

/// Date range of each interpolated population grid by source
pub fn population_extent_stats(population: &[PopulationSeries]) -> Vec<PopulationExtent> {
    let mut out = Vec::new();
    for p in population {
        let rows = p
            .points
            .iter()
            .map(|pt| (pt.source.as_deref(), pt.date, pt.childbearing_population.is_some()));
        let Some((by_source, entity)) = extents(rows) else {
            continue;
        };

        for (source, extent) in by_source {
            out.push(PopulationExtent {
                entity: p.entity.clone(),
                source: source.map(str::to_string),
                earliest_date: extent.earliest,
                latest_date: extent.latest,
                earliest_date_entity: entity.earliest,
                latest_date_entity: entity.latest,
            });
        }
    }
    out.sort_by(|a, b| a.entity.cmp(&b.entity).then_with(|| a.source.cmp(&b.source)));
    out
}

/// Births stats with population extents left-joined on `(Entity, Source)`
pub fn combined_extent_stats(series: &[EntitySeries], population: &[PopulationSeries]) -> Vec<ExtentStats> {
    let population_stats = population_extent_stats(population);
    let lookup: HashMap<(&str, Option<&str>), &PopulationExtent> = population_stats
        .iter()
        .map(|p| ((p.entity.as_str(), p.source.as_deref()), p))
        .collect();

    let mut stats = births_extent_stats(series);
    for row in stats.iter_mut() {
        if let Some(p) = lookup.get(&(row.entity.as_str(), row.source.as_deref())) {
            row.earliest_date_population = Some(p.earliest_date);
            row.latest_date_population = Some(p.latest_date);
            row.earliest_date_entity_population = Some(p.earliest_date_entity);
            row.latest_date_entity_population = Some(p.latest_date_entity);
        }
    }
    stats
}
