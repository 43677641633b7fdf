//! Shared fixtures for unit tests: two countries, 2020-2021

use crate::observation::RawObservation;

pub const FRANCE_BIRTHS: [[f64; 12]; 2] = [
    [
        62000.0, 58000.0, 60000.0, 55000.0, 58000.0, 60000.0, 62000.0, 63000.0, 61000.0, 60000.0, 58000.0, 60000.0,
    ],
    [
        61000.0, 57000.0, 59000.0, 54000.0, 57000.0, 59000.0, 61000.0, 62000.0, 60000.0, 59000.0, 57000.0, 59000.0,
    ],
];

pub const JAPAN_BIRTHS: [[f64; 12]; 2] = [
    [
        73000.0, 68000.0, 72000.0, 65000.0, 70000.0, 72000.0, 75000.0, 76000.0, 74000.0, 73000.0, 70000.0, 72000.0,
    ],
    [
        72000.0, 67000.0, 71000.0, 64000.0, 69000.0, 71000.0, 74000.0, 75000.0, 73000.0, 72000.0, 69000.0, 71000.0,
    ],
];

/// Monthly births for France and Japan, every month observed
pub fn sample_births() -> Vec<RawObservation> {
    let mut rows = Vec::new();
    for (entity, table) in [("France", &FRANCE_BIRTHS), ("Japan", &JAPAN_BIRTHS)] {
        for (y, year) in table.iter().enumerate() {
            for (m, births) in year.iter().enumerate() {
                rows.push(RawObservation::new(
                    entity,
                    2020 + y as i32,
                    m as u32 + 1,
                    Some(*births),
                    "HMD",
                ));
            }
        }
    }
    rows
}

/// Semi-annual population counts (January and July)
pub fn sample_population() -> Vec<RawObservation> {
    let counts = [
        ("France", [8_500_000.0, 8_480_000.0, 8_450_000.0, 8_430_000.0]),
        ("Japan", [12_000_000.0, 11_950_000.0, 11_900_000.0, 11_850_000.0]),
    ];
    let mut rows = Vec::new();
    for (entity, values) in counts {
        for (i, value) in values.iter().enumerate() {
            let year = 2020 + (i / 2) as i32;
            let month = if i % 2 == 0 { 1 } else { 7 };
            rows.push(RawObservation::new(entity, year, month, Some(*value), "HMD"));
        }
    }
    rows
}

/// Births for one entity over `years` full years starting in 2000, constant per month
pub fn flat_births(entity: &str, years: i32, per_month: f64) -> Vec<RawObservation> {
    let mut rows = Vec::new();
    for year in 2000..2000 + years {
        for month in 1..=12 {
            rows.push(RawObservation::new(entity, year, month, Some(per_month), "UN"));
        }
    }
    rows
}

/// Constant population covering the same span as [`flat_births`]
pub fn flat_population(entity: &str, years: i32, value: f64) -> Vec<RawObservation> {
    vec![
        RawObservation::new(entity, 2000, 1, Some(value), "UN"),
        RawObservation::new(entity, 2000 + years - 1, 12, Some(value), "UN"),
    ]
}
