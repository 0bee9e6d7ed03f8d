/// Service configuration.
///
/// Loaded from a TOML file, with environment-variable overrides applied
/// on top (the binary honors a `.env` file through dotenv). Every field
/// has a default, so a partial config file (or none at all) still
/// yields a working service.

use serde::Deserialize;
use std::fmt;

use crate::query::ResolveConfig;
use crate::resolve::locate::DEFAULT_FUZZY_THRESHOLD;

// ---------------------------------------------------------------------------
// Configuration schema
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct ServiceConfig {
    /// Path to the measurement table CSV.
    pub dataset_csv: String,
    /// Path to the gazetteer CSV.
    pub gazetteer_csv: String,
    /// Minimum fuzzy score (0–100) for gazetteer location matches.
    pub fuzzy_threshold: f64,
    /// Reference time used when free text carries no parseable date:
    /// this many minutes before the request clock.
    pub default_reference_offset_minutes: i64,
    /// Minimum log level: "debug", "info", "warn", or "error".
    pub log_level: String,
    /// Optional append-mode log file.
    pub log_file: Option<String>,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            dataset_csv: "fixtures/ocean_measurements.csv".to_string(),
            gazetteer_csv: "fixtures/gazetteer.csv".to_string(),
            fuzzy_threshold: DEFAULT_FUZZY_THRESHOLD,
            default_reference_offset_minutes: 10,
            log_level: "info".to_string(),
            log_file: None,
        }
    }
}

impl ServiceConfig {
    /// The subset of settings the query pipeline consumes.
    pub fn resolve_config(&self) -> ResolveConfig {
        ResolveConfig {
            fuzzy_threshold: self.fuzzy_threshold,
            default_reference_offset_minutes: self.default_reference_offset_minutes,
        }
    }
}

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

#[derive(Debug, PartialEq)]
pub enum ConfigError {
    /// The file could not be read.
    Io(String),
    /// The file was read but is not valid TOML for this schema.
    Parse(String),
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::Io(message) => write!(f, "config read failed: {}", message),
            ConfigError::Parse(message) => write!(f, "config parse failed: {}", message),
        }
    }
}

impl std::error::Error for ConfigError {}

// ---------------------------------------------------------------------------
// Loading
// ---------------------------------------------------------------------------

/// Loads a config file and applies environment overrides on top.
pub fn load_config(path: &str) -> Result<ServiceConfig, ConfigError> {
    let raw = std::fs::read_to_string(path)
        .map_err(|e| ConfigError::Io(format!("{}: {}", path, e)))?;
    let mut config: ServiceConfig =
        toml::from_str(&raw).map_err(|e| ConfigError::Parse(e.to_string()))?;
    apply_env_overrides(&mut config);
    Ok(config)
}

/// Environment overrides, applied after file values. Malformed numeric
/// values are ignored rather than failing startup.
pub fn apply_env_overrides(config: &mut ServiceConfig) {
    if let Ok(v) = std::env::var("OCEANQUERY_DATASET") {
        config.dataset_csv = v;
    }
    if let Ok(v) = std::env::var("OCEANQUERY_GAZETTEER") {
        config.gazetteer_csv = v;
    }
    if let Ok(v) = std::env::var("OCEANQUERY_FUZZY_THRESHOLD") {
        if let Ok(threshold) = v.parse() {
            config.fuzzy_threshold = threshold;
        }
    }
    if let Ok(v) = std::env::var("OCEANQUERY_REFERENCE_OFFSET_MINUTES") {
        if let Ok(minutes) = v.parse() {
            config.default_reference_offset_minutes = minutes;
        }
    }
    if let Ok(v) = std::env::var("OCEANQUERY_LOG_LEVEL") {
        config.log_level = v;
    }
    if let Ok(v) = std::env::var("OCEANQUERY_LOG_FILE") {
        config.log_file = Some(v);
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_sensible() {
        let config = ServiceConfig::default();
        assert_eq!(config.fuzzy_threshold, 75.0);
        assert_eq!(config.default_reference_offset_minutes, 10);
        assert_eq!(config.log_level, "info");
        assert!(config.log_file.is_none());
    }

    #[test]
    fn test_full_toml_round_trips_into_the_schema() {
        let toml_src = r#"
dataset_csv = "data/measurements.csv"
gazetteer_csv = "data/places.csv"
fuzzy_threshold = 80.0
default_reference_offset_minutes = 30
log_level = "debug"
log_file = "service.log"
"#;
        let config: ServiceConfig = toml::from_str(toml_src).expect("valid TOML should parse");
        assert_eq!(config.dataset_csv, "data/measurements.csv");
        assert_eq!(config.fuzzy_threshold, 80.0);
        assert_eq!(config.default_reference_offset_minutes, 30);
        assert_eq!(config.log_file.as_deref(), Some("service.log"));
    }

    #[test]
    fn test_partial_toml_keeps_defaults_for_missing_fields() {
        let config: ServiceConfig =
            toml::from_str("fuzzy_threshold = 60.0").expect("partial TOML should parse");
        assert_eq!(config.fuzzy_threshold, 60.0);
        assert_eq!(config.default_reference_offset_minutes, 10);
        assert_eq!(config.dataset_csv, "fixtures/ocean_measurements.csv");
    }

    #[test]
    fn test_resolve_config_carries_the_pipeline_settings() {
        let mut config = ServiceConfig::default();
        config.fuzzy_threshold = 85.0;
        config.default_reference_offset_minutes = 5;
        let resolve = config.resolve_config();
        assert_eq!(resolve.fuzzy_threshold, 85.0);
        assert_eq!(resolve.default_reference_offset_minutes, 5);
    }

    #[test]
    fn test_missing_file_is_an_io_error() {
        let err = load_config("definitely/not/here.toml").expect_err("missing file");
        assert!(matches!(err, ConfigError::Io(_)));
    }

    #[test]
    fn test_invalid_toml_is_a_parse_error() {
        let err = toml::from_str::<ServiceConfig>("fuzzy_threshold = \"very\"")
            .expect_err("wrong type should fail");
        assert!(!err.to_string().is_empty());
    }
}
