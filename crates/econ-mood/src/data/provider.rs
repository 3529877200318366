use super::loader::{BundledSeries, CsvFileLoader, HttpCsvLoader, SeriesLoader};
use super::source::{resolve_source, DataSourceKind};
use super::DataLoadError;
use crate::config::{DataConfig, DataLocation};
use crate::series::{summarize, SeriesMap, SeriesSummary};
use serde::Serialize;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::{debug, info, warn};

/// Result of a single attempt through the primary/fallback chain.
#[derive(Debug)]
pub enum LoadOutcome {
    Primary(SeriesMap),
    FellBack {
        reason: DataLoadError,
        series: SeriesMap,
    },
}

/// Attempts `primary`; on failure attempts `fallback` if one is given; otherwise
/// propagates the primary failure.
pub async fn load_with_fallback(
    primary: &dyn SeriesLoader,
    fallback: Option<&dyn SeriesLoader>,
) -> Result<LoadOutcome, DataLoadError> {
    let reason = match primary.load().await {
        Ok(series) => return Ok(LoadOutcome::Primary(series)),
        Err(err) => err,
    };

    let Some(fallback) = fallback else {
        return Err(reason);
    };

    warn!(
        error = %reason,
        fallback = %fallback.describe(),
        "primary indicator load failed; falling back"
    );
    match fallback.load().await {
        Ok(series) => Ok(LoadOutcome::FellBack { reason, series }),
        Err(fallback_err) => Err(DataLoadError::FallbackFailed {
            primary: Box::new(reason),
            fallback: Box::new(fallback_err),
        }),
    }
}

/// A resolved, cached dataset. Cloning shares the underlying map.
#[derive(Debug, Clone)]
pub struct LoadedSeries {
    pub requested: DataSourceKind,
    pub served: DataSourceKind,
    pub series: Arc<SeriesMap>,
}

impl LoadedSeries {
    pub fn fell_back(&self) -> bool {
        self.requested != self.served
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DataSourceInfo {
    pub configured: DataSourceKind,
    pub served: Option<DataSourceKind>,
    pub series_count: usize,
    pub is_loaded: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SeriesValidation {
    pub valid: bool,
    pub missing: Vec<String>,
    pub available: Vec<String>,
}

impl SeriesValidation {
    /// Partitions `required` by whether `series` holds a non-empty series for each code.
    pub fn check(series: &SeriesMap, required: &[&str]) -> Self {
        let (available, missing): (Vec<String>, Vec<String>) = required
            .iter()
            .map(|code| code.to_string())
            .partition(|code| series.get(code).is_some_and(|s| !s.is_empty()));

        Self {
            valid: missing.is_empty(),
            missing,
            available,
        }
    }
}

/// Owns the series cache. Each source is loaded at most once until invalidated.
pub struct DataProvider {
    config: DataConfig,
    real: Arc<dyn SeriesLoader>,
    mock: Arc<dyn SeriesLoader>,
    cache: Mutex<HashMap<DataSourceKind, LoadedSeries>>,
}

impl DataProvider {
    pub fn new(
        config: DataConfig,
        real: Arc<dyn SeriesLoader>,
        mock: Arc<dyn SeriesLoader>,
    ) -> Self {
        Self {
            config,
            real,
            mock,
            cache: Mutex::new(HashMap::new()),
        }
    }

    /// Wires the real loader from the configured location and the bundled dataset as mock.
    pub fn from_config(config: DataConfig) -> Result<Self, DataLoadError> {
        let real: Arc<dyn SeriesLoader> = match &config.location {
            DataLocation::Path(path) => Arc::new(CsvFileLoader::new(path.clone())),
            DataLocation::Url(url) => {
                let client = reqwest::Client::builder().build()?;
                Arc::new(HttpCsvLoader::new(client, url.clone(), config.fetch_timeout))
            }
        };
        Ok(Self::new(config, real, Arc::new(BundledSeries)))
    }

    pub fn config(&self) -> &DataConfig {
        &self.config
    }

    pub fn resolve(&self, request: Option<DataSourceKind>) -> DataSourceKind {
        resolve_source(request, &self.config).0
    }

    /// Returns the series map for the resolved source, loading it on first use.
    pub async fn series_map(
        &self,
        request: Option<DataSourceKind>,
    ) -> Result<LoadedSeries, DataLoadError> {
        let (target, origin) = resolve_source(request, &self.config);
        let mut cache = self.cache.lock().await;

        if let Some(loaded) = cache.get(&target) {
            debug!(source = %target, served = %loaded.served, "serving cached indicator data");
            return Ok(loaded.clone());
        }

        info!(source = %target, ?origin, "loading indicator data");
        let loaded = match target {
            DataSourceKind::Mock => LoadedSeries {
                requested: target,
                served: DataSourceKind::Mock,
                series: Arc::new(self.mock.load().await?),
            },
            DataSourceKind::Real => {
                let fallback = self
                    .config
                    .fallback_to_mock
                    .then(|| self.mock.as_ref());
                match load_with_fallback(self.real.as_ref(), fallback).await? {
                    LoadOutcome::Primary(series) => LoadedSeries {
                        requested: target,
                        served: DataSourceKind::Real,
                        series: Arc::new(series),
                    },
                    LoadOutcome::FellBack { series, .. } => LoadedSeries {
                        requested: target,
                        served: DataSourceKind::Mock,
                        series: Arc::new(series),
                    },
                }
            }
        };

        info!(
            source = %target,
            served = %loaded.served,
            series = loaded.series.len(),
            "indicator data ready"
        );
        cache.insert(target, loaded.clone());
        Ok(loaded)
    }

    /// Drops every cached dataset.
    pub async fn invalidate(&self) {
        self.cache.lock().await.clear();
        info!("indicator data cache cleared");
    }

    /// Clears the cache and resolves the source again.
    pub async fn reload(
        &self,
        request: Option<DataSourceKind>,
    ) -> Result<LoadedSeries, DataLoadError> {
        self.invalidate().await;
        self.series_map(request).await
    }

    /// Describes the dataset that would serve `request`, without loading it.
    pub async fn info(&self, request: Option<DataSourceKind>) -> DataSourceInfo {
        let configured = self.resolve(request);
        let cache = self.cache.lock().await;
        match cache.get(&configured) {
            Some(loaded) => DataSourceInfo {
                configured,
                served: Some(loaded.served),
                series_count: loaded.series.len(),
                is_loaded: true,
            },
            None => DataSourceInfo {
                configured,
                served: None,
                series_count: 0,
                is_loaded: false,
            },
        }
    }

    pub async fn is_series_available(&self, request: Option<DataSourceKind>, code: &str) -> bool {
        match self.series_map(request).await {
            Ok(loaded) => loaded
                .series
                .get(code)
                .is_some_and(|series| !series.is_empty()),
            Err(err) => {
                warn!(%code, error = %err, "series availability check failed");
                false
            }
        }
    }

    pub async fn available_series(&self, request: Option<DataSourceKind>) -> Vec<String> {
        match self.series_map(request).await {
            Ok(loaded) => loaded
                .series
                .iter()
                .filter(|(_, series)| !series.is_empty())
                .map(|(code, _)| code.clone())
                .collect(),
            Err(err) => {
                warn!(error = %err, "listing available series failed");
                Vec::new()
            }
        }
    }

    pub async fn validate_required_series(
        &self,
        request: Option<DataSourceKind>,
        required: &[&str],
    ) -> SeriesValidation {
        match self.series_map(request).await {
            Ok(loaded) => SeriesValidation::check(&loaded.series, required),
            Err(err) => {
                warn!(error = %err, "required series validation failed");
                SeriesValidation {
                    valid: false,
                    missing: required.iter().map(|code| code.to_string()).collect(),
                    available: Vec::new(),
                }
            }
        }
    }

    pub async fn summary(
        &self,
        request: Option<DataSourceKind>,
    ) -> Result<(LoadedSeries, Vec<SeriesSummary>), DataLoadError> {
        let loaded = self.series_map(request).await?;
        let summary = summarize(&loaded.series);
        Ok((loaded, summary))
    }
}
