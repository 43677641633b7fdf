//! Error types for the time-series engine
//!
//! Only malformed input is an error. Missing values, zero populations and
//! unfilled rolling windows are represented as `None` in the output rows.

use thiserror::Error;

/// Result type for engine operations.
pub type Result<T> = std::result::Result<T, EngineError>;

/// Errors that abort a pipeline run.
#[derive(Debug, Error)]
pub enum EngineError {
    /// Entity name is empty or whitespace
    #[error("Empty entity name in observation row {row}")]
    EmptyEntity {
        /// Zero-based row position in the input table
        row: usize,
    },

    /// Month outside 1-12
    #[error("Month {month} out of range for {entity} {year} (expected 1-12)")]
    MonthOutOfRange {
        /// Entity the row belongs to
        entity: String,
        /// Year of the row
        year: i32,
        /// Offending month value
        month: u32,
    },

    /// Year outside the supported calendar range
    #[error("Year {year} out of range for {entity} (expected {min}-{max})")]
    YearOutOfRange {
        /// Entity the row belongs to
        entity: String,
        /// Offending year value
        year: i32,
        /// Smallest accepted year
        min: i32,
        /// Largest accepted year
        max: i32,
    },

    /// Negative, NaN or infinite measurement
    #[error("Invalid {column} value {value} for {entity} {year}-{month:02}")]
    InvalidValue {
        /// Column the value came from
        column: &'static str,
        /// Entity the row belongs to
        entity: String,
        /// Year of the row
        year: i32,
        /// Month of the row
        month: u32,
        /// Offending value
        value: f64,
    },

    /// Two rows for the same entity-month
    #[error("Duplicate {column} observation for {entity} {year}-{month:02}")]
    DuplicateObservation {
        /// Column of the table holding the duplicate
        column: &'static str,
        /// Entity the rows belong to
        entity: String,
        /// Year of the rows
        year: i32,
        /// Month of the rows
        month: u32,
    },

    /// Input file is missing a required column
    #[error("Missing required column '{column}' in {path}")]
    MissingColumn {
        /// Column name that was expected in the header
        column: String,
        /// File (or "<reader>") being read
        path: String,
    },

    /// CSV parse or type error (non-integer year, text in a numeric column, ...)
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// Filesystem error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}
