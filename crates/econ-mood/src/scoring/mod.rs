//! Scoring engine: aligns each series, applies its threshold rule, and aggregates.

mod alignment;
mod outcome;
mod rules;
mod service;

pub use alignment::{strategy_for, AlignmentStrategy, Annual, Monthly, Quarterly};
pub use outcome::{
    insight, Demographics, IndicatorMood, Mood, OverallMood, ScoreResult, NO_DATA,
};
pub use rules::{
    generic_rule, rule_for, Direction, Rule, RuleEntry, RuleKind, RuleOrigin, Threshold,
    HIGHER_IS_BETTER, RULE_TABLE,
};
pub use service::{default_as_of, MoodService, ScoreReport, ScoreServiceError};

use crate::metadata::{display_units, fred_url, MetadataCatalog};
use crate::questions::Question;
use crate::series::{Series, SeriesMap};
use chrono::NaiveDate;
use std::sync::Arc;
use tracing::debug;

/// Stateless scorer over an already-loaded series map.
pub struct ScoringEngine {
    metadata: Arc<MetadataCatalog>,
}

impl ScoringEngine {
    pub fn new(metadata: Arc<MetadataCatalog>) -> Self {
        Self { metadata }
    }

    pub fn score(
        &self,
        question: &Question,
        series: &SeriesMap,
        as_of: NaiveDate,
        demographics: Option<Demographics>,
    ) -> ScoreResult {
        let indicators: Vec<IndicatorMood> = question
            .series
            .iter()
            .map(|code| self.score_indicator(question.id, code, series.get(*code), as_of))
            .collect();

        let count = |mood: Mood| indicators.iter().filter(|i| i.mood == mood).count();
        let good_count = count(Mood::Good);
        let neutral_count = count(Mood::Neutral);
        let bad_count = count(Mood::Bad);

        let total = indicators.len();
        let score = if total == 0 {
            0.0
        } else {
            indicators
                .iter()
                .map(|indicator| f64::from(indicator.mood_score))
                .sum::<f64>()
                / total as f64
        };
        let mood = OverallMood::classify(score);

        ScoreResult {
            question_id: question.id.to_string(),
            as_of,
            score,
            mood,
            emoji: mood.emoji(),
            color: mood.color(),
            insight: insight(score, good_count, bad_count, total),
            good_count,
            neutral_count,
            bad_count,
            indicators,
            demographics: demographics.filter(|d| !d.is_empty()),
        }
    }

    fn score_indicator(
        &self,
        question_id: &str,
        code: &str,
        series: Option<&Series>,
        as_of: NaiveDate,
    ) -> IndicatorMood {
        let (rule, origin) = rule_for(question_id, code);
        let strategy = strategy_for(self.metadata.frequency(code));

        let Some(series) = series.filter(|s| s.len() >= strategy.min_points()) else {
            debug!(
                question = question_id,
                series = code,
                points = series.map_or(0, Series::len),
                required = strategy.min_points(),
                "series absent or too sparse; scoring neutral"
            );
            return self.no_data(code, rule.kind);
        };

        let Some(current) = strategy.current_point(series, as_of) else {
            debug!(question = question_id, series = code, %as_of, "no observation on or before as-of date");
            return self.no_data(code, rule.kind);
        };
        let comparison = strategy
            .comparison_point(series, as_of)
            .or_else(|| series.earliest());

        let (mood, measured) = match comparison {
            Some(comparison) => rule.evaluate(current.value, comparison.value),
            None => (Mood::Neutral, None),
        };
        debug!(
            question = question_id,
            series = code,
            ?origin,
            current = current.value,
            comparison = comparison.map(|p| p.value),
            ?measured,
            %mood,
            "scored indicator"
        );

        let units = self.metadata.units(code);
        IndicatorMood {
            code: code.to_string(),
            name: self.metadata.name(code),
            mood,
            mood_score: mood.score(),
            value: current.value,
            comparison_value: comparison.map(|p| p.value),
            comparison_date: comparison.map(|p| p.date),
            timestamp: current.date.format("%Y-%m-%d").to_string(),
            measured,
            rule: rule.kind,
            display_units: display_units(&units),
            units,
            message: self.metadata.mood_message(code, mood),
            link: fred_url(code),
            chart: series
                .points()
                .iter()
                .take_while(|point| point.date <= current.date)
                .copied()
                .collect(),
        }
    }

    fn no_data(&self, code: &str, kind: RuleKind) -> IndicatorMood {
        let units = self.metadata.units(code);
        IndicatorMood {
            code: code.to_string(),
            name: self.metadata.name(code),
            mood: Mood::Neutral,
            mood_score: 0,
            value: 0.0,
            comparison_value: None,
            comparison_date: None,
            timestamp: NO_DATA.to_string(),
            measured: None,
            rule: kind,
            display_units: display_units(&units),
            units,
            message: self.metadata.mood_message(code, Mood::Neutral),
            link: fred_url(code),
            chart: Vec::new(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::metadata::{MetricSchema, SchemaDocument};
    use crate::series::SeriesPoint;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).expect("valid date")
    }

    fn monthly(values_2023: f64, values_2024: f64) -> Series {
        let mut points = Vec::new();
        for month in 1..=12 {
            points.push(SeriesPoint::new(date(2023, month, 1), values_2023));
            points.push(SeriesPoint::new(date(2024, month, 1), values_2024));
        }
        Series::from_points(points)
    }

    fn catalog(codes: &[(&str, &str)]) -> Arc<MetadataCatalog> {
        let document = SchemaDocument {
            metrics_to_track: codes
                .iter()
                .map(|(id, frequency)| MetricSchema {
                    id: id.to_string(),
                    name: format!("{id} name"),
                    units: "Percent".to_string(),
                    update_frequency: frequency.to_string(),
                    yay_message: "up".to_string(),
                    meh_message: "flat".to_string(),
                    nay_message: "down".to_string(),
                    ..MetricSchema::default()
                })
                .collect(),
            ..SchemaDocument::default()
        };
        Arc::new(MetadataCatalog::from_document(&document))
    }

    const MIXED: Question = Question {
        id: "home-hunt",
        title: "Mixed",
        question: "?",
        series: &["MORTGAGE30US", "CSUSHPINSA", "CUSR0000SEHA"],
    };

    #[test]
    fn one_good_one_neutral_one_bad_is_meh_at_zero() {
        let engine = ScoringEngine::new(catalog(&[
            ("MORTGAGE30US", "weekly"),
            ("CSUSHPINSA", "monthly"),
            ("CUSR0000SEHA", "monthly"),
        ]));
        let mut map = SeriesMap::new();
        map.insert("MORTGAGE30US".into(), monthly(7.0, 6.0)); // -1.0pp: good
        map.insert("CSUSHPINSA".into(), monthly(324.1, 330.1)); // +1.85%: neutral
        map.insert("CUSR0000SEHA".into(), monthly(100.0, 105.0)); // +5%: bad

        let result = engine.score(&MIXED, &map, date(2024, 12, 1), None);

        assert_eq!(result.score, 0.0);
        assert_eq!(result.mood, OverallMood::Meh);
        assert_eq!((result.good_count, result.neutral_count, result.bad_count), (1, 1, 1));
        assert_eq!(result.insight, "Mostly positive trends (1/3 good indicators)");
        let first = &result.indicators[0];
        assert_eq!(first.mood, Mood::Good);
        assert_eq!(first.message, "up");
        assert_eq!(first.display_units, "%");
        assert_eq!(first.link, "https://fred.stlouisfed.org/series/MORTGAGE30US");
        assert_eq!(first.timestamp, "2024-12-01");
        assert_eq!(first.comparison_date, Some(date(2023, 12, 1)));
        assert_eq!(first.chart.len(), 24);
    }

    #[test]
    fn sparse_and_missing_series_score_neutral() {
        let engine = ScoringEngine::new(catalog(&[("MORTGAGE30US", "monthly")]));
        let mut map = SeriesMap::new();
        map.insert(
            "MORTGAGE30US".into(),
            Series::from_points(vec![
                SeriesPoint::new(date(2023, 12, 1), 9.0),
                SeriesPoint::new(date(2024, 6, 1), 6.0),
                SeriesPoint::new(date(2024, 12, 1), 3.0),
            ]),
        );

        let result = engine.score(&MIXED, &map, date(2024, 12, 1), None);
        assert_eq!(result.total(), MIXED.series.len());
        for indicator in &result.indicators {
            assert_eq!(indicator.mood, Mood::Neutral);
            assert_eq!(indicator.mood_score, 0);
            assert_eq!(indicator.value, 0.0);
            assert_eq!(indicator.timestamp, NO_DATA);
            assert!(indicator.chart.is_empty());
        }
        // Unknown codes fall back to the raw code.
        assert_eq!(result.indicators[1].name, "CSUSHPINSA");
        assert_eq!(result.score, 0.0);
    }

    #[test]
    fn annual_series_needs_only_two_points() {
        let engine = ScoringEngine::new(catalog(&[("MEHOINUSA672N", "annually")]));
        let question = Question {
            id: "home-hunt",
            title: "Income",
            question: "?",
            series: &["MEHOINUSA672N"],
        };
        let mut map = SeriesMap::new();
        map.insert(
            "MEHOINUSA672N".into(),
            Series::from_points(vec![
                SeriesPoint::new(date(2022, 1, 1), 74_000.0),
                SeriesPoint::new(date(2023, 1, 1), 80_000.0),
            ]),
        );

        let result = engine.score(&question, &map, date(2024, 12, 1), None);
        assert_eq!(result.indicators[0].mood, Mood::Good);
        assert_eq!(result.score, 1.0);
        assert_eq!(result.mood, OverallMood::Yay);
    }

    #[test]
    fn short_quarterly_and_annual_series_score_neutral() {
        let engine = ScoringEngine::new(catalog(&[
            ("MSPUS", "quarterly"),
            ("MEHOINUSA672N", "annually"),
        ]));
        let question = Question {
            id: "home-hunt",
            title: "Thin",
            question: "?",
            series: &["MSPUS", "MEHOINUSA672N"],
        };
        let mut map = SeriesMap::new();
        map.insert(
            "MSPUS".into(),
            Series::from_points(vec![
                SeriesPoint::new(date(2024, 1, 1), 420_000.0),
                SeriesPoint::new(date(2024, 4, 1), 415_000.0),
                SeriesPoint::new(date(2024, 7, 1), 410_000.0),
            ]),
        );
        map.insert(
            "MEHOINUSA672N".into(),
            Series::from_points(vec![SeriesPoint::new(date(2023, 1, 1), 80_000.0)]),
        );

        let result = engine.score(&question, &map, date(2024, 12, 1), None);
        assert_eq!(result.neutral_count, 2);
        for indicator in &result.indicators {
            assert_eq!(indicator.mood, Mood::Neutral);
            assert_eq!(indicator.mood_score, 0);
            assert_eq!(indicator.timestamp, NO_DATA);
            assert!(indicator.chart.is_empty());
        }
        assert_eq!(result.indicators[0].name, "MSPUS name");
        assert_eq!(result.score, 0.0);
    }

    #[test]
    fn demographics_are_echoed_without_changing_the_score() {
        let engine = ScoringEngine::new(catalog(&[]));
        let map = SeriesMap::new();
        let demographics = Demographics {
            geography: Some("California".to_string()),
            ..Demographics::default()
        };

        let plain = engine.score(&MIXED, &map, date(2024, 12, 1), None);
        let profiled = engine.score(&MIXED, &map, date(2024, 12, 1), Some(demographics.clone()));
        assert_eq!(plain.score, profiled.score);
        assert_eq!(profiled.demographics, Some(demographics));
        assert!(engine
            .score(&MIXED, &map, date(2024, 12, 1), Some(Demographics::default()))
            .demographics
            .is_none());
    }
}
