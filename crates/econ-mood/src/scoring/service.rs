use std::sync::Arc;

use chrono::{Local, NaiveDate};
use serde::Serialize;
use tracing::info;

use super::outcome::{Demographics, ScoreResult};
use super::ScoringEngine;
use crate::data::{DataLoadError, DataProvider, DataSourceKind, DataStatusReport, LoadedSeries};
use crate::metadata::SchemaLoader;
use crate::questions::{self, Question};
use crate::series::SeriesMap;

/// A score plus where its data came from.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScoreReport {
    pub requested_source: DataSourceKind,
    pub served_source: DataSourceKind,
    pub fell_back: bool,
    #[serde(flatten)]
    pub result: ScoreResult,
}

/// Service composing the data provider, schema metadata, and scoring engine.
pub struct MoodService {
    provider: Arc<DataProvider>,
    schema: Arc<SchemaLoader>,
}

impl MoodService {
    pub fn new(provider: Arc<DataProvider>, schema: Arc<SchemaLoader>) -> Self {
        Self { provider, schema }
    }

    pub fn provider(&self) -> &Arc<DataProvider> {
        &self.provider
    }

    pub fn schema(&self) -> &Arc<SchemaLoader> {
        &self.schema
    }

    /// Score one question by id. Without `as_of`, the latest observation date in the
    /// served dataset is used.
    pub async fn score_question(
        &self,
        question_id: &str,
        as_of: Option<NaiveDate>,
        source: Option<DataSourceKind>,
        demographics: Option<Demographics>,
    ) -> Result<ScoreReport, ScoreServiceError> {
        let question = questions::find(question_id)
            .ok_or_else(|| ScoreServiceError::UnknownQuestion(question_id.to_string()))?;
        let (loaded, engine) = self.prepare(source).await?;
        let as_of = as_of.unwrap_or_else(|| default_as_of(&loaded.series));
        Ok(report(&engine, &loaded, question, as_of, demographics))
    }

    /// Score every question in catalog order against a single data load.
    pub async fn score_all(
        &self,
        as_of: Option<NaiveDate>,
        source: Option<DataSourceKind>,
    ) -> Result<Vec<ScoreReport>, ScoreServiceError> {
        let (loaded, engine) = self.prepare(source).await?;
        let as_of = as_of.unwrap_or_else(|| default_as_of(&loaded.series));
        let reports: Vec<ScoreReport> = questions::catalog()
            .iter()
            .map(|question| report(&engine, &loaded, question, as_of, None))
            .collect();
        info!(
            %as_of,
            questions = reports.len(),
            served = %loaded.served,
            "scored full question catalog"
        );
        Ok(reports)
    }

    /// Status of the dataset serving `source`, measured against the question catalog.
    /// `reload` drops cached data first.
    pub async fn data_status(
        &self,
        source: Option<DataSourceKind>,
        reload: bool,
        today: NaiveDate,
    ) -> Result<DataStatusReport, DataLoadError> {
        if reload {
            self.provider.invalidate().await;
        }
        let loaded = self.provider.series_map(source).await?;
        let info = self.provider.info(source).await;
        let catalog = self.schema.catalog().await;
        Ok(DataStatusReport::build(
            &loaded,
            info,
            self.provider.config(),
            &catalog,
            &questions::all_series(),
            today,
        ))
    }

    async fn prepare(
        &self,
        source: Option<DataSourceKind>,
    ) -> Result<(LoadedSeries, ScoringEngine), ScoreServiceError> {
        let loaded = self.provider.series_map(source).await?;
        let metadata = self.schema.catalog().await;
        Ok((loaded, ScoringEngine::new(metadata)))
    }
}

/// Latest observation date across the dataset, or today when it is empty.
pub fn default_as_of(series: &SeriesMap) -> NaiveDate {
    series
        .values()
        .filter_map(|s| s.latest().map(|point| point.date))
        .max()
        .unwrap_or_else(|| Local::now().date_naive())
}

fn report(
    engine: &ScoringEngine,
    loaded: &LoadedSeries,
    question: &Question,
    as_of: NaiveDate,
    demographics: Option<Demographics>,
) -> ScoreReport {
    ScoreReport {
        requested_source: loaded.requested,
        served_source: loaded.served,
        fell_back: loaded.fell_back(),
        result: engine.score(question, &loaded.series, as_of, demographics),
    }
}

/// Error raised by the mood service.
#[derive(Debug, thiserror::Error)]
pub enum ScoreServiceError {
    #[error("unknown question '{0}'")]
    UnknownQuestion(String),
    #[error(transparent)]
    Data(#[from] DataLoadError),
}
