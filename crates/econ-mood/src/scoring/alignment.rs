use crate::metadata::UpdateFrequency;
use crate::series::{Series, SeriesPoint};
use chrono::{Datelike, Months, NaiveDate};

/// Picks the observation pair a rule is evaluated against.
pub trait AlignmentStrategy: Send + Sync {
    /// Fewer points than this and the series counts as absent.
    fn min_points(&self) -> usize;

    fn current_point<'a>(&self, series: &'a Series, as_of: NaiveDate) -> Option<&'a SeriesPoint>;

    fn comparison_point<'a>(
        &self,
        series: &'a Series,
        as_of: NaiveDate,
    ) -> Option<&'a SeriesPoint>;
}

pub fn strategy_for(frequency: UpdateFrequency) -> &'static dyn AlignmentStrategy {
    match frequency {
        UpdateFrequency::Annually => &Annual,
        UpdateFrequency::Quarterly => &Quarterly,
        UpdateFrequency::Daily
        | UpdateFrequency::Weekly
        | UpdateFrequency::Monthly
        | UpdateFrequency::Unknown => &Monthly,
    }
}

fn year_ago(date: NaiveDate) -> NaiveDate {
    date.checked_sub_months(Months::new(12)).unwrap_or(date)
}

/// Period match first, then the latest observation on or before the date.
fn period_or_prior<'a, K>(series: &'a Series, date: NaiveDate, period: K) -> Option<&'a SeriesPoint>
where
    K: Fn(NaiveDate) -> (i32, u32),
{
    let target = period(date);
    series
        .last_matching(|point| period(point.date) == target)
        .or_else(|| series.at_or_before(date))
}

fn quarter_key(date: NaiveDate) -> (i32, u32) {
    (date.year(), (date.month() - 1) / 3)
}

fn month_key(date: NaiveDate) -> (i32, u32) {
    (date.year(), date.month())
}

/// Calendar-year series.
#[derive(Debug, Clone, Copy)]
pub struct Annual;

impl AlignmentStrategy for Annual {
    fn min_points(&self) -> usize {
        2
    }

    fn current_point<'a>(&self, series: &'a Series, as_of: NaiveDate) -> Option<&'a SeriesPoint> {
        series
            .last_matching(|point| point.date.year() == as_of.year())
            .or_else(|| series.latest())
    }

    fn comparison_point<'a>(
        &self,
        series: &'a Series,
        as_of: NaiveDate,
    ) -> Option<&'a SeriesPoint> {
        let current = self.current_point(series, as_of)?;
        let prior_year = current.date.year() - 1;
        series
            .last_matching(|point| point.date.year() == prior_year)
            .or_else(|| series.at_or_before(current.date.pred_opt()?))
    }
}

#[derive(Debug, Clone, Copy)]
pub struct Quarterly;

impl AlignmentStrategy for Quarterly {
    fn min_points(&self) -> usize {
        4
    }

    fn current_point<'a>(&self, series: &'a Series, as_of: NaiveDate) -> Option<&'a SeriesPoint> {
        period_or_prior(series, as_of, quarter_key)
    }

    fn comparison_point<'a>(
        &self,
        series: &'a Series,
        as_of: NaiveDate,
    ) -> Option<&'a SeriesPoint> {
        period_or_prior(series, year_ago(as_of), quarter_key)
    }
}

/// Monthly and finer series: weekly and daily observations are matched by month.
#[derive(Debug, Clone, Copy)]
pub struct Monthly;

impl AlignmentStrategy for Monthly {
    fn min_points(&self) -> usize {
        4
    }

    fn current_point<'a>(&self, series: &'a Series, as_of: NaiveDate) -> Option<&'a SeriesPoint> {
        period_or_prior(series, as_of, month_key)
    }

    fn comparison_point<'a>(
        &self,
        series: &'a Series,
        as_of: NaiveDate,
    ) -> Option<&'a SeriesPoint> {
        period_or_prior(series, year_ago(as_of), month_key)
    }
}
