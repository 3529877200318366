use crate::series::SeriesPoint;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;

use super::rules::RuleKind;

/// Per-indicator classification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Mood {
    Good,
    Neutral,
    Bad,
}

impl Mood {
    pub const fn score(self) -> i8 {
        match self {
            Self::Good => 1,
            Self::Neutral => 0,
            Self::Bad => -1,
        }
    }

    pub const fn label(self) -> &'static str {
        match self {
            Self::Good => "good",
            Self::Neutral => "neutral",
            Self::Bad => "bad",
        }
    }
}

impl fmt::Display for Mood {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Classification of the aggregate score.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum OverallMood {
    Yay,
    Meh,
    Nay,
}

impl OverallMood {
    /// Lower bounds are inclusive: 0.5 is Yay, -0.5 is Meh.
    pub fn classify(score: f64) -> Self {
        if score >= 0.5 {
            Self::Yay
        } else if score >= -0.5 {
            Self::Meh
        } else {
            Self::Nay
        }
    }

    pub const fn label(self) -> &'static str {
        match self {
            Self::Yay => "Yay",
            Self::Meh => "Meh",
            Self::Nay => "Nay",
        }
    }

    pub const fn emoji(self) -> &'static str {
        match self {
            Self::Yay => "😀",
            Self::Meh => "😐",
            Self::Nay => "😒",
        }
    }

    pub const fn color(self) -> &'static str {
        match self {
            Self::Yay => "#4CAF50",
            Self::Meh => "#FF9800",
            Self::Nay => "#F44336",
        }
    }
}

impl fmt::Display for OverallMood {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Optional respondent profile. Echoed on results; scoring ignores it.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Demographics {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub age_group: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub household_income: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub geography: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub household_size: Option<u8>,
}

impl Demographics {
    pub fn is_empty(&self) -> bool {
        self.age_group.is_none()
            && self.household_income.is_none()
            && self.geography.is_none()
            && self.household_size.is_none()
    }
}

pub const NO_DATA: &str = "No data";

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct IndicatorMood {
    pub code: String,
    pub name: String,
    pub mood: Mood,
    pub mood_score: i8,
    pub value: f64,
    pub comparison_value: Option<f64>,
    pub comparison_date: Option<NaiveDate>,
    /// Date of the current observation, or "No data".
    pub timestamp: String,
    /// Point delta, percent change, or level, depending on the rule kind.
    pub measured: Option<f64>,
    pub rule: RuleKind,
    pub units: String,
    pub display_units: String,
    pub message: String,
    pub link: String,
    pub chart: Vec<SeriesPoint>,
}

impl IndicatorMood {
    pub fn has_data(&self) -> bool {
        self.timestamp != NO_DATA
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScoreResult {
    pub question_id: String,
    pub as_of: NaiveDate,
    pub score: f64,
    pub mood: OverallMood,
    pub emoji: &'static str,
    pub color: &'static str,
    pub insight: String,
    pub good_count: usize,
    pub neutral_count: usize,
    pub bad_count: usize,
    pub indicators: Vec<IndicatorMood>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub demographics: Option<Demographics>,
}

impl ScoreResult {
    pub fn total(&self) -> usize {
        self.good_count + self.neutral_count + self.bad_count
    }
}

/// Headline sentence for the aggregate score band.
pub fn insight(score: f64, good: usize, bad: usize, total: usize) -> String {
    if score >= 0.5 {
        format!("Strong positive signals ({good}/{total} good indicators)")
    } else if score >= 0.0 {
        format!("Mostly positive trends ({good}/{total} good indicators)")
    } else if score >= -0.5 {
        format!("Mixed economic signals ({bad}/{total} concerning)")
    } else {
        format!("Challenging conditions ({bad}/{total} concerning)")
    }
}
