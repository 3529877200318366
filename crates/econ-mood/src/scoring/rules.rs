use serde::Serialize;

use super::outcome::Mood;

/// What gets compared against the thresholds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RuleKind {
    /// `current - comparison`, in percentage points.
    PointChange,
    /// `(current - comparison) / comparison * 100`.
    PercentChange,
    /// `current` on its own.
    AbsoluteLevel,
}

/// A single-sided or banded bound.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum Threshold {
    Below { limit: f64 },
    AtMost { limit: f64 },
    Above { limit: f64 },
    AtLeast { limit: f64 },
    /// Inclusive on both ends.
    Within { low: f64, high: f64 },
    /// Strictly outside `[low, high]`.
    Outside { low: f64, high: f64 },
}

impl Threshold {
    pub fn holds(self, measured: f64) -> bool {
        match self {
            Self::Below { limit } => measured < limit,
            Self::AtMost { limit } => measured <= limit,
            Self::Above { limit } => measured > limit,
            Self::AtLeast { limit } => measured >= limit,
            Self::Within { low, high } => measured >= low && measured <= high,
            Self::Outside { low, high } => measured < low || measured > high,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Direction {
    LowerIsBetter,
    HigherIsBetter,
    InBand,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Rule {
    pub kind: RuleKind,
    pub good: Threshold,
    pub bad: Threshold,
}

impl Rule {
    const fn new(kind: RuleKind, good: Threshold, bad: Threshold) -> Self {
        Self { kind, good, bad }
    }

    pub fn direction(&self) -> Direction {
        match self.good {
            Threshold::Below { .. } | Threshold::AtMost { .. } => Direction::LowerIsBetter,
            Threshold::Above { .. } | Threshold::AtLeast { .. } => Direction::HigherIsBetter,
            Threshold::Within { .. } | Threshold::Outside { .. } => Direction::InBand,
        }
    }

    /// The quantity this rule compares, or `None` when it cannot be computed.
    pub fn measure(&self, current: f64, comparison: f64) -> Option<f64> {
        let measured = match self.kind {
            RuleKind::PointChange => current - comparison,
            RuleKind::PercentChange => {
                if comparison == 0.0 {
                    return None;
                }
                (current - comparison) / comparison * 100.0
            }
            RuleKind::AbsoluteLevel => current,
        };
        measured.is_finite().then_some(measured)
    }

    /// Good bound is checked first; anything matching neither is neutral.
    pub fn classify(&self, measured: f64) -> Mood {
        if self.good.holds(measured) {
            Mood::Good
        } else if self.bad.holds(measured) {
            Mood::Bad
        } else {
            Mood::Neutral
        }
    }

    pub fn evaluate(&self, current: f64, comparison: f64) -> (Mood, Option<f64>) {
        match self.measure(current, comparison) {
            Some(measured) => (self.classify(measured), Some(measured)),
            None => (Mood::Neutral, None),
        }
    }
}

/// Whether a rule came from the explicit table or the generic fallback.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RuleOrigin {
    Explicit,
    Generic,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RuleEntry {
    pub question: &'static str,
    pub series: &'static str,
    pub rule: Rule,
}

use RuleKind::{AbsoluteLevel as Level, PercentChange as Pct, PointChange as Pts};

const fn below(limit: f64) -> Threshold {
    Threshold::Below { limit }
}
const fn at_most(limit: f64) -> Threshold {
    Threshold::AtMost { limit }
}
const fn above(limit: f64) -> Threshold {
    Threshold::Above { limit }
}
const fn at_least(limit: f64) -> Threshold {
    Threshold::AtLeast { limit }
}

const fn entry(
    question: &'static str,
    series: &'static str,
    kind: RuleKind,
    good: Threshold,
    bad: Threshold,
) -> RuleEntry {
    RuleEntry {
        question,
        series,
        rule: Rule::new(kind, good, bad),
    }
}

/// Explicit thresholds per (question, series).
pub const RULE_TABLE: &[RuleEntry] = &[
    entry("home-hunt", "MORTGAGE30US", Pts, at_most(-0.5), at_least(0.5)),
    entry("home-hunt", "CSUSHPINSA", Pct, below(0.0), above(2.0)),
    entry("home-hunt", "CUSR0000SEHA", Pct, below(2.0), above(4.0)),
    entry("home-hunt", "HOUST", Pct, at_least(5.0), at_most(-5.0)),
    entry("home-hunt", "MEHOINUSA672N", Pct, above(3.0), below(0.0)),
    entry("home-hunt", "MSPUS", Pct, below(0.0), above(3.0)),
    entry("car-cost", "CUSR0000SETA01", Pct, below(0.0), above(3.0)),
    entry("car-cost", "CUSR0000SETA02", Pct, below(0.0), above(5.0)),
    entry("car-cost", "CUSR0000SETB", Pct, below(-5.0), above(5.0)),
    entry("car-cost", "TERMCBAUTO48NS", Pts, at_most(-0.5), at_least(0.5)),
    entry("car-cost", "DAUTOSAAR", Pct, above(3.0), below(-3.0)),
    entry("job-jolt", "UNRATE", Pts, at_most(-0.3), at_least(0.3)),
    entry("job-jolt", "PAYEMS", Pct, above(1.5), below(0.5)),
    entry("job-jolt", "JTSJOL", Pct, above(0.0), below(-10.0)),
    entry("job-jolt", "JTSQUR", Pts, at_least(0.2), at_most(-0.2)),
    entry("job-jolt", "CES0500000003", Pct, above(4.0), below(2.5)),
    entry("grocery-gauge", "CUSR0000SAF11", Pct, below(1.0), above(3.0)),
    entry("grocery-gauge", "CUSR0000SETB", Pct, below(-5.0), above(5.0)),
    entry("grocery-gauge", "CPILFESL", Pct, below(2.5), above(3.5)),
    entry("grocery-gauge", "PCEPI", Pct, below(2.0), above(3.0)),
    entry("grocery-gauge", "DSPIC96", Pct, above(2.0), below(0.0)),
    entry("health-bill", "CPIMEDSL", Pct, below(2.0), above(4.0)),
    entry("health-bill", "PCU4461104461101", Pct, below(1.0), above(4.0)),
    entry("health-bill", "DHLCRC1Q027SBEA", Pct, below(4.0), above(7.0)),
    entry("health-bill", "ECIBEN", Pct, below(3.0), above(5.0)),
    entry("health-bill", "CUSR0000SEMD", Pct, below(3.0), above(6.0)),
    entry("tuition-tracker", "CUUR0000SEEB", Pct, below(2.0), above(4.0)),
    entry("tuition-tracker", "SLOAS", Pct, below(0.0), above(5.0)),
    entry("tuition-tracker", "CUSR0000SEEA", Pct, below(0.0), above(3.0)),
    entry("tuition-tracker", "PSAVERT", Level, above(6.0), below(4.0)),
    entry("nest-egg", "PSAVERT", Level, above(6.0), below(4.0)),
    entry("nest-egg", "SP500", Pct, above(5.0), below(-5.0)),
    entry(
        "nest-egg",
        "DGS10",
        Level,
        Threshold::Within {
            low: 3.0,
            high: 4.0,
        },
        Threshold::Outside {
            low: 2.0,
            high: 4.0,
        },
    ),
    entry("nest-egg", "CPIAUCSL", Pct, below(2.5), above(3.5)),
    entry("nest-egg", "DSPIC96", Pct, above(2.0), below(0.0)),
    entry("paycheck-power", "CES0500000003", Pct, above(4.0), below(3.0)),
    entry("paycheck-power", "CPIAUCSL", Pct, below(2.5), above(3.5)),
    entry("paycheck-power", "PSAVERT", Level, above(6.0), below(4.0)),
    entry("paycheck-power", "PPIACO", Pct, below(0.0), above(3.0)),
    entry("paycheck-power", "DSPIC96", Pct, above(2.0), below(0.0)),
];

/// Series judged on their level by the generic rule.
pub const HIGHER_IS_BETTER: &[&str] = &["PSAVERT", "HOUST", "MEHOINUSA672N"];

// The generic rule scores PSAVERT on level like the table does, but HOUST and
// MEHOINUSA672N are percent-change rules under home-hunt. Kept as-is.
const GENERIC_LEVEL: Rule = Rule::new(Level, at_least(6.0), below(4.0));
const GENERIC_CHANGE: Rule = Rule::new(Pct, below(-2.0), above(2.0));

pub fn generic_rule(series: &str) -> Rule {
    if HIGHER_IS_BETTER.contains(&series) {
        GENERIC_LEVEL
    } else {
        GENERIC_CHANGE
    }
}

/// Rule for a (question, series) pair, falling back to the generic rule.
pub fn rule_for(question: &str, series: &str) -> (Rule, RuleOrigin) {
    RULE_TABLE
        .iter()
        .find(|entry| entry.question == question && entry.series == series)
        .map(|entry| (entry.rule, RuleOrigin::Explicit))
        .unwrap_or_else(|| (generic_rule(series), RuleOrigin::Generic))
}
