//! Data-side stages for the host dashboard

pub mod cache;
pub mod config;
pub mod export;
pub mod filter;
pub mod geo;
pub mod sources;

use thiserror::Error;
use hv_core::StateParseError;

// Re-exports
pub use cache::MarkerCache;
pub use config::{CsvConfig, CsvQuoting, CsvTimeZone, EngineConfig, GraphStyle, MapConfig};
pub use export::{results_to_csv, CsvExport, QueryResult, Series};
pub use filter::{filter_and_sort, filter_hosts, sort_hosts};
pub use geo::{CoordinateSource, GeneratedCoordinate, GeoGenerator, LatLng, SeededCoordinates};
pub use sources::{HostSource, JsonHostSource, StaticHostSource, load_query_results};

/// Errors that can occur in data operations
#[derive(Error, Debug)]
pub enum DataError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("CSV writing error: {0}")]
    Csv(String),

    #[error("Malformed query result: {0}")]
    MalformedResult(String),

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error(transparent)]
    State(#[from] StateParseError),
}

impl From<csv::Error> for DataError {
    fn from(error: csv::Error) -> Self {
        match error.kind() {
            csv::ErrorKind::Io(io_err) => DataError::Io(std::io::Error::new(io_err.kind(), error.to_string())),
            _ => DataError::Csv(error.to_string()),
        }
    }
}
