use super::parser::parse_dataset;
use super::DataLoadError;
use crate::series::SeriesMap;
use async_trait::async_trait;
use reqwest::Client;
use std::io::Cursor;
use std::path::PathBuf;
use std::time::Duration;
use tracing::info;

const BUNDLED_SERIES: &str = include_str!("../../assets/bundled_series.csv");

/// Anything that can produce a full series map in one shot.
#[async_trait]
pub trait SeriesLoader: Send + Sync {
    async fn load(&self) -> Result<SeriesMap, DataLoadError>;

    /// Human-readable location for logs and status output.
    fn describe(&self) -> String;
}

/// The static dataset compiled into the crate.
#[derive(Debug, Default, Clone, Copy)]
pub struct BundledSeries;

impl BundledSeries {
    pub fn parse() -> Result<SeriesMap, DataLoadError> {
        parse_dataset(Cursor::new(BUNDLED_SERIES)).map(|parsed| parsed.series)
    }
}

#[async_trait]
impl SeriesLoader for BundledSeries {
    async fn load(&self) -> Result<SeriesMap, DataLoadError> {
        Self::parse()
    }

    fn describe(&self) -> String {
        "bundled dataset".to_string()
    }
}

/// Reads the delimited export from local disk.
#[derive(Debug, Clone)]
pub struct CsvFileLoader {
    path: PathBuf,
}

impl CsvFileLoader {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

#[async_trait]
impl SeriesLoader for CsvFileLoader {
    async fn load(&self) -> Result<SeriesMap, DataLoadError> {
        let bytes = tokio::fs::read(&self.path)
            .await
            .map_err(|source| DataLoadError::Io {
                location: self.describe(),
                source,
            })?;
        let parsed = parse_dataset(Cursor::new(bytes))?;
        info!(
            location = %self.path.display(),
            series = parsed.series.len(),
            skipped_rows = parsed.skipped_rows,
            "parsed indicator export"
        );
        Ok(parsed.series)
    }

    fn describe(&self) -> String {
        self.path.display().to_string()
    }
}

/// Fetches the delimited export over HTTP with a fixed time budget.
#[derive(Debug, Clone)]
pub struct HttpCsvLoader {
    client: Client,
    url: String,
    timeout: Duration,
}

impl HttpCsvLoader {
    pub fn new(client: Client, url: impl Into<String>, timeout: Duration) -> Self {
        Self {
            client,
            url: url.into(),
            timeout,
        }
    }
}

#[async_trait]
impl SeriesLoader for HttpCsvLoader {
    async fn load(&self) -> Result<SeriesMap, DataLoadError> {
        let response = self
            .client
            .get(&self.url)
            .timeout(self.timeout)
            .send()
            .await
            .map_err(|err| self.classify(err))?;

        if !response.status().is_success() {
            return Err(DataLoadError::Status {
                url: self.url.clone(),
                status: response.status().as_u16(),
            });
        }

        let body = response.bytes().await.map_err(|err| self.classify(err))?;
        let parsed = parse_dataset(Cursor::new(body))?;
        info!(
            url = %self.url,
            series = parsed.series.len(),
            skipped_rows = parsed.skipped_rows,
            "fetched indicator export"
        );
        Ok(parsed.series)
    }

    fn describe(&self) -> String {
        self.url.clone()
    }
}

impl HttpCsvLoader {
    fn classify(&self, err: reqwest::Error) -> DataLoadError {
        if err.is_timeout() {
            DataLoadError::Timeout {
                url: self.url.clone(),
                after: self.timeout,
            }
        } else {
            DataLoadError::Http(err)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bundled_dataset_covers_every_catalog_series() {
        let map = BundledSeries::parse().expect("bundled dataset parses");
        for question in crate::questions::catalog() {
            for code in question.series {
                let series = map
                    .get(*code)
                    .unwrap_or_else(|| panic!("bundled data missing {code}"));
                assert!(!series.is_empty(), "{code} has no points");
            }
        }
    }

    #[tokio::test]
    async fn file_loader_reports_missing_file_as_io_error() {
        let loader = CsvFileLoader::new("./does-not-exist.csv");
        match loader.load().await {
            Err(DataLoadError::Io { location, .. }) => {
                assert!(location.contains("does-not-exist.csv"))
            }
            other => panic!("expected io error, got {other:?}"),
        }
    }
}
