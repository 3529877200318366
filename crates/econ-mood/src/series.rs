//! Indicator time series as loaded from a data source.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// One dated observation of an indicator.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SeriesPoint {
    pub date: NaiveDate,
    pub value: f64,
}

impl SeriesPoint {
    pub fn new(date: NaiveDate, value: f64) -> Self {
        Self { date, value }
    }
}

/// Observations ordered by strictly increasing date.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct Series {
    points: Vec<SeriesPoint>,
}

impl Series {
    /// Sorts the points and collapses duplicate dates, keeping the last value seen
    /// for a date.
    pub fn from_points(mut points: Vec<SeriesPoint>) -> Self {
        points.sort_by_key(|point| point.date);
        let mut deduped: Vec<SeriesPoint> = Vec::with_capacity(points.len());
        for point in points {
            match deduped.last_mut() {
                Some(last) if last.date == point.date => *last = point,
                _ => deduped.push(point),
            }
        }
        Self { points: deduped }
    }

    pub fn points(&self) -> &[SeriesPoint] {
        &self.points
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn latest(&self) -> Option<&SeriesPoint> {
        self.points.last()
    }

    pub fn earliest(&self) -> Option<&SeriesPoint> {
        self.points.first()
    }

    /// Most recent observation dated on or before `date`.
    pub fn at_or_before(&self, date: NaiveDate) -> Option<&SeriesPoint> {
        let idx = self.points.partition_point(|point| point.date <= date);
        idx.checked_sub(1).map(|i| &self.points[i])
    }

    /// Most recent observation for which `matches` holds.
    pub fn last_matching<F>(&self, matches: F) -> Option<&SeriesPoint>
    where
        F: Fn(&SeriesPoint) -> bool,
    {
        self.points.iter().rev().find(|point| matches(point))
    }
}

/// Every loaded series keyed by its FRED code.
pub type SeriesMap = BTreeMap<String, Series>;

/// Per-series digest used by status reports.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SeriesSummary {
    pub code: String,
    pub count: usize,
    pub latest_date: NaiveDate,
    pub latest_value: f64,
}

pub fn summarize(map: &SeriesMap) -> Vec<SeriesSummary> {
    map.iter()
        .filter_map(|(code, series)| {
            series.latest().map(|latest| SeriesSummary {
                code: code.clone(),
                count: series.len(),
                latest_date: latest.date,
                latest_value: latest.value,
            })
        })
        .collect()
}
