use chrono::NaiveDate;
use econ_mood::config::AppConfig;
use econ_mood::data::{DataProvider, DataSourceKind};
use econ_mood::error::AppError;
use econ_mood::feedback::FeedbackClient;
use econ_mood::metadata::{SchemaLoader, SchemaSource};
use econ_mood::scoring::MoodService;
use metrics_exporter_prometheus::PrometheusHandle;
use std::sync::atomic::AtomicBool;
use std::sync::Arc;

#[derive(Clone)]
pub(crate) struct AppState {
    pub(crate) readiness: Arc<AtomicBool>,
    pub(crate) metrics: Arc<PrometheusHandle>,
}

/// Long-lived collaborators shared by the CLI and the HTTP service.
pub(crate) struct Services {
    pub(crate) mood: Arc<MoodService>,
    pub(crate) feedback: Arc<FeedbackClient>,
}

impl Services {
    pub(crate) fn from_config(config: &AppConfig) -> Result<Self, AppError> {
        let provider = Arc::new(DataProvider::from_config(config.data.clone())?);
        let schema = Arc::new(SchemaLoader::new(SchemaSource::from_config(
            config.data.schema_path.clone(),
        )));
        let feedback = Arc::new(FeedbackClient::from_config(&config.feedback)?);

        Ok(Self {
            mood: Arc::new(MoodService::new(provider, schema)),
            feedback,
        })
    }
}

pub(crate) fn parse_date(raw: &str) -> Result<NaiveDate, String> {
    NaiveDate::parse_from_str(raw.trim(), "%Y-%m-%d")
        .map_err(|err| format!("failed to parse '{raw}' as YYYY-MM-DD ({err})"))
}

pub(crate) fn parse_source(raw: &str) -> Result<DataSourceKind, String> {
    DataSourceKind::parse(raw).ok_or_else(|| format!("'{raw}' is not a data source (mock|real)"))
}

/// Optional query parameter to a typed value, rejecting malformed input as a 400.
pub(crate) fn parse_query<T>(
    raw: Option<&str>,
    parse: impl Fn(&str) -> Result<T, String>,
) -> Result<Option<T>, AppError> {
    match raw.map(str::trim).filter(|value| !value.is_empty()) {
        Some(value) => parse(value).map(Some).map_err(AppError::invalid_input),
        None => Ok(None),
    }
}
