use super::provider::{DataSourceInfo, LoadedSeries, SeriesValidation};
use super::source::DataSourceKind;
use crate::config::DataConfig;
use crate::metadata::MetadataCatalog;
use crate::series::summarize;
use chrono::NaiveDate;
use serde::Serialize;
use std::collections::BTreeSet;

const CURRENT_WITHIN_DAYS: i64 = 30;
const AGING_WITHIN_DAYS: i64 = 60;

/// How recently a series last reported.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Freshness {
    Current,
    Aging,
    Stale,
}

impl Freshness {
    pub fn classify(age_days: i64) -> Self {
        if age_days <= CURRENT_WITHIN_DAYS {
            Self::Current
        } else if age_days <= AGING_WITHIN_DAYS {
            Self::Aging
        } else {
            Self::Stale
        }
    }

    pub const fn label(self) -> &'static str {
        match self {
            Self::Current => "current",
            Self::Aging => "aging",
            Self::Stale => "stale",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct DateRange {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SeriesStatus {
    pub code: String,
    pub name: String,
    pub count: usize,
    pub latest_date: NaiveDate,
    pub latest_value: f64,
    pub age_days: i64,
    pub freshness: Freshness,
}

/// Snapshot of one served dataset: coverage against the question catalog,
/// codes the schema does not describe, and per-series freshness.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DataStatusReport {
    pub requested_source: DataSourceKind,
    pub served_source: DataSourceKind,
    pub fell_back: bool,
    pub location: String,
    pub fallback_to_mock: bool,
    pub info: DataSourceInfo,
    pub record_count: usize,
    pub date_range: Option<DateRange>,
    pub validation: SeriesValidation,
    pub extra_series: Vec<String>,
    /// Most recently updated first.
    pub series: Vec<SeriesStatus>,
}

impl DataStatusReport {
    pub fn build(
        loaded: &LoadedSeries,
        info: DataSourceInfo,
        config: &DataConfig,
        catalog: &MetadataCatalog,
        required: &[&str],
        today: NaiveDate,
    ) -> Self {
        let mut series: Vec<SeriesStatus> = summarize(&loaded.series)
            .into_iter()
            .map(|summary| {
                let age_days = (today - summary.latest_date).num_days();
                SeriesStatus {
                    name: catalog.name(&summary.code),
                    code: summary.code,
                    count: summary.count,
                    latest_date: summary.latest_date,
                    latest_value: summary.latest_value,
                    age_days,
                    freshness: Freshness::classify(age_days),
                }
            })
            .collect();
        series.sort_by(|a, b| {
            b.latest_date
                .cmp(&a.latest_date)
                .then_with(|| a.code.cmp(&b.code))
        });

        let start = loaded
            .series
            .values()
            .filter_map(|s| s.earliest().map(|point| point.date))
            .min();
        let end = series.iter().map(|status| status.latest_date).max();
        let date_range = start.zip(end).map(|(start, end)| DateRange { start, end });

        let described: BTreeSet<&str> = catalog.iter().map(|meta| meta.code.as_str()).collect();
        let extra_series = if described.is_empty() {
            Vec::new()
        } else {
            loaded
                .series
                .keys()
                .filter(|code| !described.contains(code.as_str()))
                .cloned()
                .collect()
        };

        Self {
            requested_source: loaded.requested,
            served_source: loaded.served,
            fell_back: loaded.fell_back(),
            location: config.location.to_string(),
            fallback_to_mock: config.fallback_to_mock,
            info,
            record_count: loaded.series.values().map(|s| s.len()).sum(),
            date_range,
            validation: SeriesValidation::check(&loaded.series, required),
            extra_series,
            series,
        }
    }
}
