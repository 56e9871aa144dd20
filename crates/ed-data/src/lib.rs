//! Data handling for the energy dashboard
//!
//! Loads the CSV every chart reads and evaluates the charts' declarative
//! transforms locally, so what a chart will show can be previewed and
//! checked without a browser.

pub mod config;
pub mod eval;
pub mod schema;
pub mod sources;

use arrow::datatypes::DataType;
use arrow::error::ArrowError;
use ed_core::ChartError;
use thiserror::Error;
use tokio::task::JoinError;

// Re-exports
pub use config::NullConfig;
pub use schema::{ColumnKind, SchemaCheck};
pub use sources::CsvSource;

/// Errors that can occur in data operations
#[derive(Error, Debug)]
pub enum DataError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Arrow error: {0}")]
    Arrow(ArrowError),

    #[error("CSV parsing error: {0}")]
    Csv(String),

    #[error("Missing column: {0}")]
    MissingColumn(String),

    #[error("Column {column} has unsupported type {data_type}")]
    UnsupportedType { column: String, data_type: DataType },

    #[error("Schema mismatch: {0}")]
    Schema(String),

    #[error(transparent)]
    Chart(#[from] ChartError),

    #[error("Join error: {0}")]
    Join(#[from] JoinError),
}

impl From<csv::Error> for DataError {
    fn from(error: csv::Error) -> Self {
        match error.kind() {
            csv::ErrorKind::Io(io_err) => DataError::Io(std::io::Error::new(io_err.kind(), error.to_string())),
            _ => DataError::Csv(error.to_string()),
        }
    }
}

impl From<ArrowError> for DataError {
    fn from(error: ArrowError) -> Self {
        DataError::Arrow(error)
    }
}
