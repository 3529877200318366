use serde::Serialize;
use serde_json::{Map, Value};
use std::collections::{BTreeSet, HashSet};

pub const VALID_CATEGORIES: &[&str] = &[
    "housing",
    "automotive",
    "employment",
    "inflation",
    "healthcare",
    "education",
    "retirement",
    "utilities",
    "wages",
    "emergency",
];

pub const VALID_FREQUENCIES: &[&str] = &["daily", "weekly", "monthly", "quarterly", "annually"];

const REQUIRED_FIELDS: &[&str] = &[
    "id",
    "name",
    "description",
    "category",
    "units",
    "update_frequency",
    "yay_message",
    "meh_message",
    "nay_message",
];

const MESSAGE_FIELDS: &[&str] = &["yay_message", "meh_message", "nay_message"];
const MAX_MESSAGE_CHARS: usize = 100;
const MAX_DESCRIPTION_CHARS: usize = 200;

/// Findings from a schema document check.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct SchemaValidation {
    pub metric_count: usize,
    pub unique_ids: usize,
    pub categories: BTreeSet<String>,
    pub errors: Vec<String>,
    pub warnings: Vec<String>,
}

impl SchemaValidation {
    pub fn is_valid(&self) -> bool {
        self.errors.is_empty()
    }
}

/// Checks the raw schema text: required fields, ID format, message and description
/// lengths, allowed categories and frequencies, and duplicate IDs.
pub fn validate_document(raw: &str) -> SchemaValidation {
    let mut report = SchemaValidation::default();

    let root: Value = match serde_json::from_str(raw) {
        Ok(value) => value,
        Err(err) => {
            report.errors.push(format!("invalid JSON in schema file: {err}"));
            return report;
        }
    };

    if root.get("schema_version").is_none() {
        report
            .warnings
            .push("missing 'schema_version' field".to_string());
    }

    let Some(metrics) = root.get("metrics_to_track") else {
        report
            .errors
            .push("missing 'metrics_to_track' array".to_string());
        return report;
    };
    let Some(metrics) = metrics.as_array() else {
        report
            .errors
            .push("'metrics_to_track' must be an array".to_string());
        return report;
    };
    if metrics.is_empty() {
        report
            .errors
            .push("'metrics_to_track' array is empty".to_string());
        return report;
    }

    report.metric_count = metrics.len();
    let mut seen: HashSet<&str> = HashSet::new();

    for (index, metric) in metrics.iter().enumerate() {
        let Some(metric) = metric.as_object() else {
            report
                .errors
                .push(format!("metric {index}: must be an object"));
            continue;
        };

        report.errors.extend(validate_metric(metric, index));

        if let Some(id) = metric.get("id").and_then(Value::as_str) {
            if !seen.insert(id) {
                report
                    .errors
                    .push(format!("metric {index} ({id}): duplicate series ID"));
            }
        }
        if let Some(category) = metric.get("category").and_then(Value::as_str) {
            report.categories.insert(category.to_string());
        }
    }

    report.unique_ids = seen.len();
    report
}

fn validate_metric(metric: &Map<String, Value>, index: usize) -> Vec<String> {
    let mut errors = Vec::new();
    let label = metric
        .get("id")
        .and_then(Value::as_str)
        .unwrap_or("unknown");

    for field in REQUIRED_FIELDS {
        match metric.get(*field) {
            None => errors.push(format!("metric {index}: missing required field '{field}'")),
            Some(value) if field_text(value).trim().is_empty() => {
                errors.push(format!("metric {index}: field '{field}' is empty"))
            }
            Some(_) => {}
        }
    }

    if let Some(id) = metric.get("id").and_then(Value::as_str) {
        if !is_valid_series_id(id) {
            errors.push(format!("metric {index} ({id}): invalid FRED series ID format"));
        }
    }

    for field in MESSAGE_FIELDS {
        if let Some(message) = metric.get(*field).and_then(Value::as_str) {
            let length = message.chars().count();
            if length > MAX_MESSAGE_CHARS {
                errors.push(format!(
                    "metric {index} ({label}): {field} too long ({length} chars, max {MAX_MESSAGE_CHARS})"
                ));
            }
        }
    }

    if let Some(description) = metric.get("description").and_then(Value::as_str) {
        let length = description.chars().count();
        if length > MAX_DESCRIPTION_CHARS {
            errors.push(format!(
                "metric {index} ({label}): description too long ({length} chars, max {MAX_DESCRIPTION_CHARS})"
            ));
        }
    }

    if let Some(category) = metric.get("category").and_then(Value::as_str) {
        if !VALID_CATEGORIES.contains(&category) {
            errors.push(format!(
                "metric {index} ({label}): invalid category '{category}'"
            ));
        }
    }

    if let Some(frequency) = metric.get("update_frequency").and_then(Value::as_str) {
        if !VALID_FREQUENCIES.contains(&frequency) {
            errors.push(format!(
                "metric {index} ({label}): invalid update_frequency '{frequency}'"
            ));
        }
    }

    errors
}

fn field_text(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::String(text) => text.clone(),
        Value::Bool(false) => String::new(),
        other => other.to_string(),
    }
}

fn is_valid_series_id(id: &str) -> bool {
    !id.is_empty()
        && id
            .chars()
            .all(|c| c.is_ascii_uppercase() || c.is_ascii_digit() || c == '_')
}
