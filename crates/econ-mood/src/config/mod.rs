use crate::data::DataSourceKind;
use std::env;
use std::fmt;
use std::net::{IpAddr, SocketAddr};
use std::path::PathBuf;
use std::time::Duration;

const DEFAULT_DATA_LOCATION: &str = "data/fred_data.csv";
const DEFAULT_FETCH_TIMEOUT_MS: u64 = 15_000;
const DEFAULT_FEEDBACK_TIMEOUT_MS: u64 = 10_000;

/// Distinguishes runtime behavior for different stages of the service.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppEnvironment {
    Development,
    Test,
    Production,
}

impl AppEnvironment {
    fn from_str(value: &str) -> Self {
        match value.trim().to_ascii_lowercase().as_str() {
            "prod" | "production" => Self::Production,
            "test" | "ci" => Self::Test,
            _ => Self::Development,
        }
    }
}

/// Top-level configuration for the application.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub environment: AppEnvironment,
    pub server: ServerConfig,
    pub telemetry: TelemetryConfig,
    pub data: DataConfig,
    pub feedback: FeedbackConfig,
}

impl AppConfig {
    pub fn load() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();

        let environment = AppEnvironment::from_str(
            &env::var("APP_ENV").unwrap_or_else(|_| "development".to_string()),
        );

        let host = env::var("APP_HOST").unwrap_or_else(|_| "127.0.0.1".to_string());
        let port = env::var("APP_PORT")
            .unwrap_or_else(|_| "3000".to_string())
            .parse::<u16>()
            .map_err(|_| ConfigError::InvalidPort)?;

        let log_level = env::var("APP_LOG_LEVEL").unwrap_or_else(|_| "info".to_string());

        Ok(Self {
            environment,
            server: ServerConfig { host, port },
            telemetry: TelemetryConfig { log_level },
            data: DataConfig::from_env()?,
            feedback: FeedbackConfig::from_env()?,
        })
    }
}

/// Settings controlling the HTTP server binding.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

impl ServerConfig {
    pub fn socket_addr(&self) -> Result<SocketAddr, ConfigError> {
        if self.host.eq_ignore_ascii_case("localhost") {
            return Ok(SocketAddr::new(IpAddr::from([127, 0, 0, 1]), self.port));
        }

        let ip: IpAddr = self
            .host
            .parse()
            .map_err(|source| ConfigError::InvalidHost { source })?;

        Ok(SocketAddr::new(ip, self.port))
    }
}

/// Tracing controls.
#[derive(Debug, Clone)]
pub struct TelemetryConfig {
    pub log_level: String,
}

/// Where indicator series come from and how loading degrades.
#[derive(Debug, Clone, PartialEq)]
pub struct DataConfig {
    /// Source used when no override is present.
    pub default_source: DataSourceKind,
    /// Stored preference that beats the default (`ECON_DATA_OVERRIDE`).
    pub override_source: Option<DataSourceKind>,
    pub fallback_to_mock: bool,
    pub location: DataLocation,
    pub fetch_timeout: Duration,
    /// `None` means the schema bundled with the crate.
    pub schema_path: Option<PathBuf>,
}

impl DataConfig {
    fn from_env() -> Result<Self, ConfigError> {
        let default_source = match env::var("ECON_DATA_SOURCE") {
            Ok(raw) => parse_source("ECON_DATA_SOURCE", &raw)?,
            Err(_) => DataSourceKind::Real,
        };
        let override_source = match env::var("ECON_DATA_OVERRIDE") {
            Ok(raw) if !raw.trim().is_empty() => Some(parse_source("ECON_DATA_OVERRIDE", &raw)?),
            _ => None,
        };
        let fallback_to_mock = match env::var("ECON_FALLBACK_TO_MOCK") {
            Ok(raw) => parse_bool("ECON_FALLBACK_TO_MOCK", &raw)?,
            Err(_) => true,
        };
        let location = env::var("ECON_DATA_LOCATION")
            .map(|raw| DataLocation::parse(&raw))
            .unwrap_or_else(|_| DataLocation::Path(PathBuf::from(DEFAULT_DATA_LOCATION)));
        let fetch_timeout = parse_millis("ECON_FETCH_TIMEOUT_MS", DEFAULT_FETCH_TIMEOUT_MS)?;
        let schema_path = env::var("ECON_SCHEMA_PATH")
            .ok()
            .filter(|raw| !raw.trim().is_empty())
            .map(PathBuf::from);

        Ok(Self {
            default_source,
            override_source,
            fallback_to_mock,
            location,
            fetch_timeout,
            schema_path,
        })
    }
}

impl Default for DataConfig {
    fn default() -> Self {
        Self {
            default_source: DataSourceKind::Real,
            override_source: None,
            fallback_to_mock: true,
            location: DataLocation::Path(PathBuf::from(DEFAULT_DATA_LOCATION)),
            fetch_timeout: Duration::from_millis(DEFAULT_FETCH_TIMEOUT_MS),
            schema_path: None,
        }
    }
}

/// Location of the delimited indicator dataset.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DataLocation {
    Path(PathBuf),
    Url(String),
}

impl DataLocation {
    pub fn parse(raw: &str) -> Self {
        let trimmed = raw.trim();
        if trimmed.starts_with("http://") || trimmed.starts_with("https://") {
            Self::Url(trimmed.to_string())
        } else {
            Self::Path(PathBuf::from(trimmed))
        }
    }
}

impl fmt::Display for DataLocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DataLocation::Path(path) => write!(f, "{}", path.display()),
            DataLocation::Url(url) => write!(f, "{url}"),
        }
    }
}

/// Outbound subscription/contact endpoint settings.
#[derive(Debug, Clone, PartialEq)]
pub struct FeedbackConfig {
    pub enabled: bool,
    pub endpoint_url: Option<String>,
    pub timeout: Duration,
    pub page_url: String,
}

impl FeedbackConfig {
    fn from_env() -> Result<Self, ConfigError> {
        let enabled = match env::var("FEEDBACK_ENABLED") {
            Ok(raw) => parse_bool("FEEDBACK_ENABLED", &raw)?,
            Err(_) => true,
        };
        let endpoint_url = env::var("FEEDBACK_ENDPOINT_URL")
            .ok()
            .filter(|raw| !raw.trim().is_empty());
        let timeout = parse_millis("FEEDBACK_TIMEOUT_MS", DEFAULT_FEEDBACK_TIMEOUT_MS)?;
        let page_url = env::var("FEEDBACK_PAGE_URL").unwrap_or_default();

        Ok(Self {
            enabled,
            endpoint_url,
            timeout,
            page_url,
        })
    }
}

impl Default for FeedbackConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            endpoint_url: None,
            timeout: Duration::from_millis(DEFAULT_FEEDBACK_TIMEOUT_MS),
            page_url: String::new(),
        }
    }
}

fn parse_source(variable: &'static str, raw: &str) -> Result<DataSourceKind, ConfigError> {
    DataSourceKind::parse(raw).ok_or_else(|| ConfigError::InvalidDataSource {
        variable,
        value: raw.to_string(),
    })
}

fn parse_bool(variable: &'static str, raw: &str) -> Result<bool, ConfigError> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" => Ok(false),
        _ => Err(ConfigError::InvalidFlag {
            variable,
            value: raw.to_string(),
        }),
    }
}

fn parse_millis(variable: &'static str, default: u64) -> Result<Duration, ConfigError> {
    match env::var(variable) {
        Ok(raw) => raw
            .trim()
            .parse::<u64>()
            .ok()
            .filter(|millis| *millis > 0)
            .map(Duration::from_millis)
            .ok_or(ConfigError::InvalidTimeout { variable }),
        Err(_) => Ok(Duration::from_millis(default)),
    }
}

#[derive(Debug)]
pub enum ConfigError {
    InvalidPort,
    InvalidHost {
        source: std::net::AddrParseError,
    },
    InvalidDataSource {
        variable: &'static str,
        value: String,
    },
    InvalidFlag {
        variable: &'static str,
        value: String,
    },
    InvalidTimeout {
        variable: &'static str,
    },
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::InvalidPort => write!(f, "APP_PORT must be a valid u16"),
            ConfigError::InvalidHost { .. } => {
                write!(f, "APP_HOST must parse to an IPv4 or IPv6 address")
            }
            ConfigError::InvalidDataSource { variable, value } => {
                write!(f, "{variable} must be 'mock' or 'real' (got '{value}')")
            }
            ConfigError::InvalidFlag { variable, value } => {
                write!(f, "{variable} must be a boolean flag (got '{value}')")
            }
            ConfigError::InvalidTimeout { variable } => {
                write!(f, "{variable} must be a positive number of milliseconds")
            }
        }
    }
}

impl std::error::Error for ConfigError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ConfigError::InvalidHost { source } => Some(source),
            ConfigError::InvalidPort
            | ConfigError::InvalidDataSource { .. }
            | ConfigError::InvalidFlag { .. }
            | ConfigError::InvalidTimeout { .. } => None,
        }
    }
}
