//! Configuration loading
//!
//! Settings sources, highest priority first:
//! 1. Command-line arguments / environment variables (see [`ConfigOverrides`])
//! 2. TOML configuration file
//! 3. Built-in defaults
//!
//! A missing TOML file is not fatal: a warning is logged and defaults apply.

use serde::Deserialize;
use std::path::{Path, PathBuf};
use tracing::{info, warn};

use crate::resolver::{Resolver, SlotOverride};
use crate::schedule::ScheduleLayout;
use crate::{Error, Result};

/// Full service configuration
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct Config {
    pub server: ServerConfig,
    pub sources: SourcesConfig,
    pub layout: ScheduleLayout,
    pub policy: PolicyConfig,
    pub logging: LoggingConfig,
}

/// HTTP listener settings
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 5730,
        }
    }
}

/// Locations of the two input files
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct SourcesConfig {
    /// Newline-delimited subject list shown on the selection form
    pub subjects_path: PathBuf,
    /// Schedule sheet exported as CSV
    pub schedule_path: PathBuf,
    /// Name of the sheet the export was taken from (display only)
    pub sheet: String,
}

impl Default for SourcesConfig {
    fn default() -> Self {
        Self {
            subjects_path: PathBuf::from("all subjects.txt"),
            schedule_path: PathBuf::from("schedule.csv"),
            sheet: "FSC Final".to_string(),
        }
    }
}

/// Resolver policy
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct PolicyConfig {
    pub slot_override: SlotOverride,
    /// Ignore selections whose best match scores below this ratio
    pub min_ratio: Option<f64>,
}

/// Logging configuration
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error)
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
        }
    }
}

/// Values given on the command line or through the environment
#[derive(Debug, Clone, Default)]
pub struct ConfigOverrides {
    pub host: Option<String>,
    pub port: Option<u16>,
    pub subjects_path: Option<PathBuf>,
    pub schedule_path: Option<PathBuf>,
    pub log_level: Option<String>,
}

impl Config {
    /// Load from an optional TOML file, apply overrides, validate
    pub fn load(toml_path: Option<&Path>, overrides: ConfigOverrides) -> Result<Self> {
        let mut config = match toml_path {
            Some(path) => Self::from_file(path)?,
            None => Self::default(),
        };
        config.apply(overrides);
        config.validate()?;
        Ok(config)
    }

    /// Parse a TOML file; a missing file yields the defaults
    pub fn from_file(path: &Path) -> Result<Self> {
        match std::fs::read_to_string(path) {
            Ok(text) => {
                let config = Self::from_toml_str(&text).map_err(|e| match e {
                    Error::Config(msg) => Error::Config(format!("{}: {}", path.display(), msg)),
                    other => other,
                })?;
                info!("Loaded configuration from {}", path.display());
                Ok(config)
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                warn!("Config file {} not found, using defaults", path.display());
                Ok(Self::default())
            }
            Err(e) => Err(e.into()),
        }
    }

    pub fn from_toml_str(text: &str) -> Result<Self> {
        toml::from_str(text).map_err(|e| Error::Config(format!("Failed to parse TOML: {}", e)))
    }

    /// Overrides win over file and default values
    pub fn apply(&mut self, overrides: ConfigOverrides) {
        if let Some(host) = overrides.host {
            self.server.host = host;
        }
        if let Some(port) = overrides.port {
            self.server.port = port;
        }
        if let Some(path) = overrides.subjects_path {
            self.sources.subjects_path = path;
        }
        if let Some(path) = overrides.schedule_path {
            self.sources.schedule_path = path;
        }
        if let Some(level) = overrides.log_level {
            self.logging.level = level;
        }
    }

    pub fn validate(&self) -> Result<()> {
        self.layout.validate()?;
        self.policy.slot_override.validate()?;
        if let Some(min) = self.policy.min_ratio {
            if !(0.0..=1.0).contains(&min) {
                return Err(Error::Config(format!(
                    "policy.min_ratio must be within [0, 1], got {}",
                    min
                )));
            }
        }
        Ok(())
    }

    /// Resolver carrying this configuration's policy
    pub fn resolver(&self) -> Resolver {
        Resolver::new(self.policy.slot_override.clone()).with_min_ratio(self.policy.min_ratio)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_defaults() {
        let config = Config::default();
        assert_eq!(config.server.port, 5730);
        assert_eq!(config.layout.header_row, 4);
        assert_eq!(config.layout.max_rows, 161);
        assert_eq!(config.layout.slot_columns.len(), 3);
        assert_eq!(config.policy.slot_override.weekday, "Friday");
        assert_eq!(config.policy.min_ratio, None);
        assert_eq!(config.logging.level, "info");
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_partial_toml_keeps_defaults() {
        let config = Config::from_toml_str(
            r#"
            [server]
            port = 8080

            [layout]
            max_rows = 40

            [policy]
            min_ratio = 0.5
            "#,
        )
        .unwrap();
        assert_eq!(config.server.port, 8080);
        assert_eq!(config.server.host, "127.0.0.1");
        assert_eq!(config.layout.max_rows, 40);
        assert_eq!(config.layout.header_row, 4);
        assert_eq!(config.policy.min_ratio, Some(0.5));
        assert_eq!(config.policy.slot_override.to, "1:30 to 4:30 PM");
    }

    #[test]
    fn test_full_toml() {
        let config = Config::from_toml_str(
            r#"
            [sources]
            subjects_path = "/srv/exams/subjects.txt"
            schedule_path = "/srv/exams/fall.csv"
            sheet = "FSC Final"

            [layout]
            header_row = 0
            date_column = "Date"
            slot_columns = ["Morning", "Evening"]

            [policy.slot_override]
            weekday = "Saturday"
            from = "Morning"
            to = "Late Morning"

            [logging]
            level = "debug"
            "#,
        )
        .unwrap();
        assert_eq!(config.sources.schedule_path, PathBuf::from("/srv/exams/fall.csv"));
        assert_eq!(config.layout.slot_columns, vec!["Morning", "Evening"]);
        assert_eq!(config.policy.slot_override.weekday, "Saturday");
        assert_eq!(config.logging.level, "debug");
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_invalid_toml_is_config_error() {
        let err = Config::from_toml_str("[server]\nport = \"high\"").unwrap_err();
        assert!(matches!(err, Error::Config(_)));
    }

    #[test]
    fn test_validation_rejects_bad_values() {
        let mut config = Config::default();
        config.layout.max_rows = 0;
        assert!(config.validate().is_err());

        let mut config = Config::default();
        config.layout.slot_columns.clear();
        assert!(config.validate().is_err());

        let mut config = Config::default();
        config.policy.min_ratio = Some(1.5);
        assert!(config.validate().is_err());

        let mut config = Config::default();
        config.policy.slot_override.weekday = "Someday".to_string();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_overrides_take_priority() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(
            file,
            "[server]\nport = 9000\n[sources]\nschedule_path = \"from-file.csv\""
        )
        .unwrap();

        let overrides = ConfigOverrides {
            port: Some(9100),
            subjects_path: Some(PathBuf::from("cli-subjects.txt")),
            ..ConfigOverrides::default()
        };
        let config = Config::load(Some(file.path()), overrides).unwrap();
        assert_eq!(config.server.port, 9100);
        assert_eq!(config.sources.schedule_path, PathBuf::from("from-file.csv"));
        assert_eq!(config.sources.subjects_path, PathBuf::from("cli-subjects.txt"));
    }

    #[test]
    fn test_missing_file_uses_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let config = Config::load(Some(&dir.path().join("absent.toml")), ConfigOverrides::default())
            .unwrap();
        assert_eq!(config, Config::default());
    }

    #[test]
    fn test_invalid_file_value_fails_load() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "[layout]\nmax_rows = 0").unwrap();
        let err = Config::load(Some(file.path()), ConfigOverrides::default()).unwrap_err();
        assert!(matches!(err, Error::Config(_)));
    }
}
