//! Error types for the data-loader crate.

use thiserror::Error;

/// Errors that can occur while obtaining the purchase-event snapshot.
///
/// These are the "upstream data unavailable" class of failures: the
/// engine never retries them, it just propagates them to the caller.
#[derive(Error, Debug)]
pub enum DataLoadError {
    /// File could not be found or opened
    #[error("Failed to open file: {path}")]
    FileNotFound { path: String },

    /// I/O error occurred while reading the export
    #[error("I/O error: {0}")]
    IoError(#[from] std::io::Error),

    /// The CSV reader rejected a record outright (wrong field count,
    /// broken quoting, undecodable field)
    #[error("CSV error: {0}")]
    CsvError(#[from] csv::Error),

    /// A field had a value we cannot work with even after cleaning
    #[error("Invalid value for {field}: {value}")]
    InvalidValue { field: String, value: String },
}

/// Convenience type alias for Results in this crate
pub type Result<T> = std::result::Result<T, DataLoadError>;
