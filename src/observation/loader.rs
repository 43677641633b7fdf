//! Load combined raw observation tables from CSV
//!
//! Expected header: `Entity,Year,Month,<Births|childbearing_population>,Source`.
//! `Country` is accepted in place of `Entity`. Empty value cells are null;
//! anything that does not parse as the column's type aborts the load.

use super::{validate_observations, ObservationKind, RawObservation};
use crate::error::{EngineError, Result};
use csv::Reader;
use serde::Deserialize;
use std::path::Path;

/// Raw CSV row matching the combined births/population tables
#[derive(Debug, Deserialize)]
struct CsvRow {
    #[serde(rename = "Entity", alias = "Country")]
    entity: String,
    #[serde(rename = "Year")]
    year: i32,
    #[serde(rename = "Month")]
    month: u32,
    #[serde(rename = "Births", alias = "childbearing_population")]
    value: Option<f64>,
    #[serde(rename = "Source", default)]
    source: Option<String>,
}

impl CsvRow {
    fn into_observation(self) -> RawObservation {
        RawObservation {
            entity: self.entity,
            year: self.year,
            month: self.month,
            value: self.value,
            source: self.source.filter(|s| !s.trim().is_empty()),
        }
    }
}

/// Load one observation table from a CSV file
pub fn load_observations<P: AsRef<Path>>(path: P, kind: ObservationKind) -> Result<Vec<RawObservation>> {
    let path = path.as_ref();
    let reader = Reader::from_path(path)?;
    let rows = read_rows(reader, kind, &path.display().to_string())?;
    log::debug!("Loaded {} {} rows from {}", rows.len(), kind.value_column(), path.display());
    Ok(rows)
}

/// Load observations from any reader (e.g., string buffer, network stream)
pub fn load_observations_from_reader<R: std::io::Read>(
    reader: R,
    kind: ObservationKind,
) -> Result<Vec<RawObservation>> {
    read_rows(Reader::from_reader(reader), kind, "<reader>")
}

fn read_rows<R: std::io::Read>(
    mut reader: Reader<R>,
    kind: ObservationKind,
    origin: &str,
) -> Result<Vec<RawObservation>> {
    check_headers(&mut reader, kind, origin)?;

    let mut rows = Vec::new();
    for result in reader.deserialize() {
        let row: CsvRow = result?;
        rows.push(row.into_observation());
    }

    validate_observations(&rows, kind)?;
    Ok(rows)
}

/// The value column must match the table kind, so a births file cannot be
/// loaded as population through the serde alias.
fn check_headers<R: std::io::Read>(reader: &mut Reader<R>, kind: ObservationKind, origin: &str) -> Result<()> {
    let headers = reader.headers()?.clone();
    let has = |name: &str| headers.iter().any(|h| h == name);

    let missing = |column: &str| EngineError::MissingColumn {
        column: column.to_string(),
        path: origin.to_string(),
    };

    if !has("Entity") && !has("Country") {
        return Err(missing("Entity"));
    }
    for column in ["Year", "Month", kind.value_column(), "Source"] {
        if !has(column) {
            return Err(missing(column));
        }
    }
    Ok(())
}
