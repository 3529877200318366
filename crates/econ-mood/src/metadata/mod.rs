//! Indicator schema: display metadata, update frequency, and mood messages per series.

mod validate;

pub use validate::{validate_document, SchemaValidation, VALID_CATEGORIES, VALID_FREQUENCIES};

use crate::scoring::Mood;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use std::path::PathBuf;
use std::sync::Arc;
use tokio::sync::OnceCell;
use tracing::{error, info};

const BUNDLED_SCHEMA: &str = include_str!("../../assets/schema.json");

/// Reference page for a FRED series.
pub fn fred_url(code: &str) -> String {
    format!("https://fred.stlouisfed.org/series/{code}")
}

/// How often a series publishes. Drives date alignment and minimum history.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UpdateFrequency {
    Daily,
    Weekly,
    Monthly,
    Quarterly,
    Annually,
    Unknown,
}

impl UpdateFrequency {
    pub fn parse(raw: &str) -> Self {
        match raw.trim().to_ascii_lowercase().as_str() {
            "daily" => Self::Daily,
            "weekly" => Self::Weekly,
            "monthly" => Self::Monthly,
            "quarterly" => Self::Quarterly,
            "annually" | "annual" | "yearly" => Self::Annually,
            _ => Self::Unknown,
        }
    }

    pub const fn label(self) -> &'static str {
        match self {
            Self::Daily => "daily",
            Self::Weekly => "weekly",
            Self::Monthly => "monthly",
            Self::Quarterly => "quarterly",
            Self::Annually => "annually",
            Self::Unknown => "unknown",
        }
    }
}

impl fmt::Display for UpdateFrequency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// One metric entry as written in the schema document.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MetricSchema {
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub category: String,
    #[serde(default)]
    pub units: String,
    #[serde(default)]
    pub update_frequency: String,
    #[serde(default)]
    pub yay_message: String,
    #[serde(default)]
    pub meh_message: String,
    #[serde(default)]
    pub nay_message: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SchemaDocument {
    #[serde(default)]
    pub schema_version: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(alias = "indicators")]
    pub metrics_to_track: Vec<MetricSchema>,
}

impl SchemaDocument {
    pub fn from_json(raw: &str) -> Result<Self, SchemaError> {
        Ok(serde_json::from_str(raw)?)
    }
}

/// Normalised metadata for one series, with defaults applied.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SeriesMetadata {
    pub code: String,
    pub name: String,
    pub description: String,
    pub units: String,
    pub category: String,
    pub update_frequency: UpdateFrequency,
    pub yay_message: String,
    pub meh_message: String,
    pub nay_message: String,
}

impl SeriesMetadata {
    fn from_metric(metric: &MetricSchema) -> Self {
        let or_default = |value: &str, fallback: &str| {
            if value.trim().is_empty() {
                fallback.to_string()
            } else {
                value.to_string()
            }
        };

        Self {
            code: metric.id.clone(),
            name: or_default(&metric.name, &metric.id),
            description: metric.description.clone(),
            units: metric.units.clone(),
            category: or_default(&metric.category, "uncategorized"),
            update_frequency: UpdateFrequency::parse(&metric.update_frequency),
            yay_message: metric.yay_message.clone(),
            meh_message: metric.meh_message.clone(),
            nay_message: metric.nay_message.clone(),
        }
    }
}

/// Lookup table keyed by series code. Unknown codes degrade to the raw code.
#[derive(Debug, Clone, Default)]
pub struct MetadataCatalog {
    entries: HashMap<String, SeriesMetadata>,
    order: Vec<String>,
}

impl MetadataCatalog {
    pub fn from_document(document: &SchemaDocument) -> Self {
        let mut catalog = Self::default();
        for metric in &document.metrics_to_track {
            if metric.id.trim().is_empty() {
                continue;
            }
            if !catalog.entries.contains_key(&metric.id) {
                catalog.order.push(metric.id.clone());
            }
            catalog
                .entries
                .insert(metric.id.clone(), SeriesMetadata::from_metric(metric));
        }
        catalog
    }

    pub fn empty() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn get(&self, code: &str) -> Option<&SeriesMetadata> {
        self.entries.get(code)
    }

    pub fn name(&self, code: &str) -> String {
        self.get(code)
            .map(|meta| meta.name.clone())
            .unwrap_or_else(|| code.to_string())
    }

    pub fn units(&self, code: &str) -> String {
        self.get(code)
            .map(|meta| meta.units.clone())
            .unwrap_or_default()
    }

    pub fn frequency(&self, code: &str) -> UpdateFrequency {
        self.get(code)
            .map(|meta| meta.update_frequency)
            .unwrap_or(UpdateFrequency::Unknown)
    }

    pub fn description(&self, code: &str) -> String {
        self.get(code)
            .map(|meta| meta.description.clone())
            .filter(|description| !description.is_empty())
            .unwrap_or_else(|| "Economic indicator from FRED database".to_string())
    }

    pub fn mood_message(&self, code: &str, mood: Mood) -> String {
        match self.get(code) {
            Some(meta) => match mood {
                Mood::Good => meta.yay_message.clone(),
                Mood::Neutral => meta.meh_message.clone(),
                Mood::Bad => meta.nay_message.clone(),
            },
            None => match mood {
                Mood::Good => "This indicator is performing well".to_string(),
                Mood::Neutral => "This indicator is at moderate levels".to_string(),
                Mood::Bad => "This indicator is showing concerning trends".to_string(),
            },
        }
    }

    /// Metrics in a category, in document order.
    pub fn metrics_in_category(&self, category: &str) -> Vec<&SeriesMetadata> {
        self.order
            .iter()
            .filter_map(|code| self.entries.get(code))
            .filter(|meta| meta.category == category)
            .collect()
    }

    pub fn iter(&self) -> impl Iterator<Item = &SeriesMetadata> {
        self.order.iter().filter_map(|code| self.entries.get(code))
    }
}

/// Short display form for technical FRED unit strings.
pub fn display_units(units: &str) -> String {
    let mapped = match units {
        "" => return String::new(),
        "Percent" => Some("%"),
        "Dollars per Hour" => Some("$/hr"),
        "Thousands of Persons" => Some("K persons"),
        "Thousands of Units, SAAR" => Some("K units"),
        "Millions of Units, Seasonally Adjusted Annual Rate" => Some("M units"),
        "Billions of Dollars" => Some("$B"),
        "Billions of Dollars, Seasonally Adjusted Annual Rate" => Some("$B"),
        "Chained 2012 Dollars, SAAR" => Some("2012$"),
        "2022 CPI-U-RS Adjusted Dollars" => Some("2022$"),
        "Ratio" => Some("ratio"),
        _ => None,
    };
    if let Some(short) = mapped {
        return short.to_string();
    }

    if units.contains("Index") {
        for base in ["1982", "2000", "2005", "2012"] {
            if units.contains(base) {
                return format!("Index ({base}=100)");
            }
        }
        return "Index".to_string();
    }

    units.to_string()
}

/// Where the schema document comes from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SchemaSource {
    Bundled,
    Path(PathBuf),
}

impl SchemaSource {
    pub fn from_config(path: Option<PathBuf>) -> Self {
        path.map(Self::Path).unwrap_or(Self::Bundled)
    }
}

impl fmt::Display for SchemaSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Bundled => f.write_str("bundled schema"),
            Self::Path(path) => write!(f, "{}", path.display()),
        }
    }
}

/// Loads the schema once for the lifetime of the loader.
#[derive(Debug)]
pub struct SchemaLoader {
    source: SchemaSource,
    catalog: OnceCell<Arc<MetadataCatalog>>,
}

impl SchemaLoader {
    pub fn new(source: SchemaSource) -> Self {
        Self {
            source,
            catalog: OnceCell::new(),
        }
    }

    pub fn bundled() -> Self {
        Self::new(SchemaSource::Bundled)
    }

    pub fn source(&self) -> &SchemaSource {
        &self.source
    }

    /// Raw document text.
    pub async fn read_raw(&self) -> Result<String, SchemaError> {
        match &self.source {
            SchemaSource::Bundled => Ok(BUNDLED_SCHEMA.to_string()),
            SchemaSource::Path(path) => {
                tokio::fs::read_to_string(path)
                    .await
                    .map_err(|source| SchemaError::Io {
                        path: path.display().to_string(),
                        source,
                    })
            }
        }
    }

    /// Reads and parses the document without touching the memoized catalog.
    pub async fn load_document(&self) -> Result<SchemaDocument, SchemaError> {
        SchemaDocument::from_json(&self.read_raw().await?)
    }

    /// Runs the structural checks over the raw document.
    pub async fn validate(&self) -> Result<SchemaValidation, SchemaError> {
        let raw = self.read_raw().await?;
        Ok(validate_document(&raw))
    }

    /// Memoized catalog. A document that fails to load yields an empty catalog.
    pub async fn catalog(&self) -> Arc<MetadataCatalog> {
        self.catalog
            .get_or_init(|| async {
                match self.load_document().await {
                    Ok(document) => {
                        let catalog = MetadataCatalog::from_document(&document);
                        info!(source = %self.source, metrics = catalog.len(), "loaded schema metadata");
                        Arc::new(catalog)
                    }
                    Err(err) => {
                        error!(source = %self.source, error = %err, "failed to load schema metadata");
                        Arc::new(MetadataCatalog::empty())
                    }
                }
            })
            .await
            .clone()
    }
}

#[derive(Debug, thiserror::Error)]
pub enum SchemaError {
    #[error("failed to read schema from {path}: {source}")]
    Io {
        path: String,
        source: std::io::Error,
    },
    #[error("invalid schema JSON: {0}")]
    Json(#[from] serde_json::Error),
}
