//! Indicator data provider: source selection, loading, fallback and caching.

mod loader;
mod parser;
mod provider;
mod source;
mod status;

pub use loader::{BundledSeries, CsvFileLoader, HttpCsvLoader, SeriesLoader};
pub use parser::{parse_dataset, ParsedDataset};
pub use provider::{
    load_with_fallback, DataProvider, DataSourceInfo, LoadOutcome, LoadedSeries,
    SeriesValidation,
};
pub use source::{resolve_source, DataSourceKind, SourceOrigin};
pub use status::{DataStatusReport, DateRange, Freshness, SeriesStatus};

use std::time::Duration;

/// Failure while producing a series map from a source.
#[derive(Debug, thiserror::Error)]
pub enum DataLoadError {
    #[error("failed to read indicator data from {location}: {source}")]
    Io {
        location: String,
        source: std::io::Error,
    },
    #[error("indicator data request failed: {0}")]
    Http(#[from] reqwest::Error),
    #[error("indicator data request to {url} timed out after {}ms", .after.as_millis())]
    Timeout { url: String, after: Duration },
    #[error("indicator data request to {url} returned status {status}")]
    Status { url: String, status: u16 },
    #[error("invalid indicator CSV data: {0}")]
    Csv(#[from] csv::Error),
    #[error("invalid indicator CSV format: {0}")]
    InvalidFormat(String),
    #[error("primary load failed ({primary}) and fallback failed ({fallback})")]
    FallbackFailed {
        primary: Box<DataLoadError>,
        fallback: Box<DataLoadError>,
    },
}
