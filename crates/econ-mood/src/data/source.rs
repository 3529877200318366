use crate::config::DataConfig;
use serde::{Deserialize, Serialize};
use std::fmt;

/// The two datasets the provider can serve.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DataSourceKind {
    /// Static dataset bundled with the crate.
    Mock,
    /// Delimited export refreshed from FRED.
    Real,
}

impl DataSourceKind {
    pub fn parse(raw: &str) -> Option<Self> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "mock" => Some(Self::Mock),
            "real" => Some(Self::Real),
            _ => None,
        }
    }

    pub const fn label(self) -> &'static str {
        match self {
            Self::Mock => "mock",
            Self::Real => "real",
        }
    }
}

impl fmt::Display for DataSourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Why a particular source was picked.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SourceOrigin {
    /// Query parameter or CLI flag on this request.
    Request,
    /// Stored preference from the environment.
    StoredOverride,
    ConfigDefault,
}

/// Picks the source in priority order: request override, stored override, config default.
pub fn resolve_source(
    request: Option<DataSourceKind>,
    config: &DataConfig,
) -> (DataSourceKind, SourceOrigin) {
    if let Some(kind) = request {
        return (kind, SourceOrigin::Request);
    }
    if let Some(kind) = config.override_source {
        return (kind, SourceOrigin::StoredOverride);
    }
    (config.default_source, SourceOrigin::ConfigDefault)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_is_case_insensitive_and_strict() {
        assert_eq!(DataSourceKind::parse(" Mock "), Some(DataSourceKind::Mock));
        assert_eq!(DataSourceKind::parse("REAL"), Some(DataSourceKind::Real));
        assert_eq!(DataSourceKind::parse("live"), None);
    }

    #[test]
    fn request_override_beats_stored_override_and_default() {
        let config = DataConfig {
            default_source: DataSourceKind::Real,
            override_source: Some(DataSourceKind::Mock),
            ..DataConfig::default()
        };

        assert_eq!(
            resolve_source(Some(DataSourceKind::Real), &config),
            (DataSourceKind::Real, SourceOrigin::Request)
        );
        assert_eq!(
            resolve_source(None, &config),
            (DataSourceKind::Mock, SourceOrigin::StoredOverride)
        );

        let plain = DataConfig::default();
        assert_eq!(
            resolve_source(None, &plain),
            (DataSourceKind::Real, SourceOrigin::ConfigDefault)
        );
    }
}
