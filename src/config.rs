//! Generator configuration
//!
//! Defaults, overridden by an optional JSON config file, overridden by
//! command-line arguments.

use crate::export::OutputFormat;
use crate::fetch::DEFAULT_LISTING_URL;
use crate::listing::{MarketRegistry, UnknownMarketPolicy};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse config file {path}: {source}")]
    Parse {
        path: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("Invalid log level: {0}. Must be one of: trace, debug, info, warn, error")]
    InvalidLogLevel(String),

    #[error("Invalid configuration: {0}")]
    Invalid(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Trace,
    Debug,
    #[default]
    Info,
    Warn,
    Error,
}

impl std::str::FromStr for LogLevel {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "trace" => Ok(LogLevel::Trace),
            "debug" => Ok(LogLevel::Debug),
            "info" => Ok(LogLevel::Info),
            "warn" => Ok(LogLevel::Warn),
            "error" => Ok(LogLevel::Error),
            _ => Err(ConfigError::InvalidLogLevel(s.to_string())),
        }
    }
}

impl LogLevel {
    pub fn as_filter_str(&self) -> &'static str {
        match self {
            LogLevel::Trace => "trace",
            LogLevel::Debug => "debug",
            LogLevel::Info => "info",
            LogLevel::Warn => "warn",
            LogLevel::Error => "error",
        }
    }
}

/// Generator configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Listing URL or local path
    pub source: String,
    /// Output file
    pub output: PathBuf,
    pub format: OutputFormat,
    /// Name of the exported TypeScript constant
    pub variable_name: String,
    pub on_unknown_market: UnknownMarketPolicy,
    /// Replaces the built-in market table when set
    pub markets: Option<BTreeMap<String, Option<String>>>,
    pub log_level: LogLevel,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            source: DEFAULT_LISTING_URL.to_string(),
            output: PathBuf::from("isin_to_ticker.ts"),
            format: OutputFormat::TypeScript,
            variable_name: "isin_to_ticker".to_string(),
            on_unknown_market: UnknownMarketPolicy::Fail,
            markets: None,
            log_level: LogLevel::Info,
        }
    }
}

/// Values given on the command line; `None` keeps the configured value
#[derive(Debug, Clone, Default)]
pub struct CliOverrides {
    pub source: Option<String>,
    pub output: Option<PathBuf>,
    pub format: Option<OutputFormat>,
    pub variable_name: Option<String>,
    pub skip_unknown: bool,
    pub log_level: Option<String>,
}

impl Config {
    /// Load a JSON config file; missing keys take their defaults
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.display().to_string(),
            source,
        })?;
        serde_json::from_str(&content).map_err(|source| ConfigError::Parse {
            path: path.display().to_string(),
            source,
        })
    }

    /// Apply command-line values on top of this config
    pub fn with_overrides(mut self, cli: CliOverrides) -> Result<Self, ConfigError> {
        if let Some(source) = cli.source {
            self.source = source;
        }
        if let Some(output) = cli.output {
            // An explicit output without an explicit format picks the format from the extension
            if cli.format.is_none() {
                if let Some(format) = OutputFormat::from_extension(&output) {
                    self.format = format;
                }
            }
            self.output = output;
        }
        if let Some(format) = cli.format {
            self.format = format;
        }
        if let Some(name) = cli.variable_name {
            self.variable_name = name;
        }
        if cli.skip_unknown {
            self.on_unknown_market = UnknownMarketPolicy::Skip;
        }
        if let Some(level) = cli.log_level {
            self.log_level = level.parse()?;
        }
        Ok(self)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.source.trim().is_empty() {
            return Err(ConfigError::Invalid("source must not be empty".to_string()));
        }
        if !is_js_identifier(&self.variable_name) {
            return Err(ConfigError::Invalid(format!(
                "variable_name '{}' is not a valid identifier",
                self.variable_name
            )));
        }
        if let Some(markets) = &self.markets {
            if markets.is_empty() {
                return Err(ConfigError::Invalid("markets table is empty".to_string()));
            }
            if let Some(bad) = markets.keys().find(|m| m.is_empty() || m.chars().any(char::is_whitespace)) {
                return Err(ConfigError::Invalid(format!(
                    "market identifier '{}' must be non-empty and contain no whitespace",
                    bad
                )));
            }
        }
        Ok(())
    }

    /// Market registry for this run
    pub fn registry(&self) -> MarketRegistry {
        match &self.markets {
            Some(markets) => MarketRegistry::from_entries(
                markets.iter().map(|(market, suffix)| (market.clone(), suffix.clone())),
            ),
            None => MarketRegistry::new(),
        }
    }
}

fn is_js_identifier(name: &str) -> bool {
    let mut chars = name.chars();
    match chars.next() {
        Some(c) if c.is_ascii_alphabetic() || c == '_' || c == '$' => {}
        _ => return false,
    }
    chars.all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '$')
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = Config::default();
        assert_eq!(config.source, DEFAULT_LISTING_URL);
        assert_eq!(config.format, OutputFormat::TypeScript);
        assert_eq!(config.on_unknown_market, UnknownMarketPolicy::Fail);
        assert!(config.validate().is_ok());
        assert_eq!(config.registry().len(), 10);
    }

    #[test]
    fn test_load_partial_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");
        std::fs::write(
            &path,
            r#"{
                "source": "listing.pdf",
                "on_unknown_market": "skip",
                "markets": { "Xetra": ".DE", "NSQ": null, "WSE": "" }
            }"#,
        )
        .unwrap();

        let config = Config::load(&path).unwrap();
        assert_eq!(config.source, "listing.pdf");
        assert_eq!(config.on_unknown_market, UnknownMarketPolicy::Skip);
        assert_eq!(config.variable_name, "isin_to_ticker");

        let registry = config.registry();
        assert_eq!(registry.len(), 3);
        assert_eq!(registry.apply("Xetra", "SAP"), Some("SAP.DE".to_string()));
        assert_eq!(registry.apply("WSE", "PKO"), Some("PKO".to_string()));
        assert!(!registry.contains("LSE"));
    }

    #[test]
    fn test_file_keys_are_field_names() {
        let value = serde_json::to_value(Config::default()).unwrap();
        let mut keys: Vec<_> = value.as_object().unwrap().keys().cloned().collect();
        keys.sort();
        assert_eq!(
            keys,
            vec![
                "format",
                "log_level",
                "markets",
                "on_unknown_market",
                "output",
                "source",
                "variable_name",
            ]
        );

        let config: Config =
            serde_json::from_str(r#"{ "variable_name": "isinMap", "log_level": "debug" }"#).unwrap();
        assert_eq!(config.variable_name, "isinMap");
        assert_eq!(config.log_level, LogLevel::Debug);
    }

    #[test]
    fn test_load_invalid_json() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");
        std::fs::write(&path, "{ not json").unwrap();

        assert!(matches!(Config::load(&path), Err(ConfigError::Parse { .. })));
    }

    #[test]
    fn test_cli_overrides_win() {
        let config = Config::default()
            .with_overrides(CliOverrides {
                source: Some("local.pdf".to_string()),
                output: Some(PathBuf::from("out/map.json")),
                skip_unknown: true,
                log_level: Some("DEBUG".to_string()),
                ..Default::default()
            })
            .unwrap();

        assert_eq!(config.source, "local.pdf");
        assert_eq!(config.format, OutputFormat::Json);
        assert_eq!(config.on_unknown_market, UnknownMarketPolicy::Skip);
        assert_eq!(config.log_level, LogLevel::Debug);
    }

    #[test]
    fn test_explicit_format_beats_extension() {
        let config = Config::default()
            .with_overrides(CliOverrides {
                output: Some(PathBuf::from("map.json")),
                format: Some(OutputFormat::TypeScript),
                ..Default::default()
            })
            .unwrap();
        assert_eq!(config.format, OutputFormat::TypeScript);
    }

    #[test]
    fn test_invalid_log_level() {
        let result = Config::default().with_overrides(CliOverrides {
            log_level: Some("loud".to_string()),
            ..Default::default()
        });
        assert!(matches!(result, Err(ConfigError::InvalidLogLevel(_))));
    }

    #[test]
    fn test_validate_rejects_bad_values() {
        let config = Config {
            variable_name: "1map".to_string(),
            ..Default::default()
        };
        assert!(config.validate().is_err());

        let config = Config {
            markets: Some(BTreeMap::from([("NY SE".to_string(), None)])),
            ..Default::default()
        };
        assert!(config.validate().is_err());

        let config = Config {
            markets: Some(BTreeMap::new()),
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }
}
