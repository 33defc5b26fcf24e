//! Presentation settings for the console.
//!
//! Loaded from `console_config.json` with support for an environment variable
//! override. Nothing here changes what the authority decides; it only tunes
//! how the console labels and formats what it is told.

use std::{
    env, fs, io,
    path::{Path, PathBuf},
    sync::Arc,
};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::travel::EtaStyle;

pub const BUILTIN_CONSOLE_CONFIG: &str = include_str!("data/console_config.json");
pub const CONSOLE_CONFIG_ENV: &str = "EXODRONE_CONSOLE_CONFIG_PATH";

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct ConsoleConfig {
    pub integrity: IntegrityThresholds,
    /// Style for destination ETAs in the travel listing.
    pub eta_style: EtaStyle,
    /// Style for the travel and wait countdowns.
    pub countdown_style: EtaStyle,
    /// Most recent drone log lines to show; 0 shows all of them.
    pub max_log_entries: usize,
    pub home_label: String,
    pub launch_label: String,
}

impl Default for ConsoleConfig {
    fn default() -> Self {
        Self {
            integrity: IntegrityThresholds::default(),
            eta_style: EtaStyle::Short,
            countdown_style: EtaStyle::Clock,
            max_log_entries: 50,
            home_label: "Home".to_string(),
            launch_label: "Launch!".to_string(),
        }
    }
}

/// Fractions of max integrity at which the gauge changes colour.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct IntegrityThresholds {
    pub good: f64,
    pub average: f64,
}

impl Default for IntegrityThresholds {
    fn default() -> Self {
        Self {
            good: 0.7,
            average: 0.4,
        }
    }
}

#[derive(Debug, Error)]
pub enum ConsoleConfigError {
    #[error("failed to parse console config: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("failed to read console config from {path:?}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("integrity thresholds must satisfy 0 <= average <= good <= 1 (got good={good}, average={average})")]
    Thresholds { good: f64, average: f64 },
}

impl ConsoleConfig {
    pub fn builtin() -> Result<Self, ConsoleConfigError> {
        Self::from_json_str(BUILTIN_CONSOLE_CONFIG)
    }

    pub fn from_json_str(json: &str) -> Result<Self, ConsoleConfigError> {
        let config: ConsoleConfig = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_file(path: &Path) -> Result<Self, ConsoleConfigError> {
        let contents = fs::read_to_string(path).map_err(|source| ConsoleConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json_str(&contents)
    }

    fn validate(&self) -> Result<(), ConsoleConfigError> {
        let IntegrityThresholds { good, average } = self.integrity;
        if !(0.0..=1.0).contains(&average) || !(average..=1.0).contains(&good) {
            return Err(ConsoleConfigError::Thresholds { good, average });
        }
        Ok(())
    }
}

/// Metadata about where the active configuration came from.
#[derive(Debug, Clone, Default)]
pub struct ConsoleConfigMetadata {
    path: Option<PathBuf>,
}

impl ConsoleConfigMetadata {
    pub fn new(path: Option<PathBuf>) -> Self {
        Self { path }
    }

    pub fn path(&self) -> Option<&PathBuf> {
        self.path.as_ref()
    }
}

/// Load the console configuration from an explicit path,
/// `EXODRONE_CONSOLE_CONFIG_PATH`, or the builtin defaults, in that order.
pub fn load_console_config(explicit: Option<&Path>) -> (Arc<ConsoleConfig>, ConsoleConfigMetadata) {
    let candidate = explicit
        .map(Path::to_path_buf)
        .or_else(|| env::var(CONSOLE_CONFIG_ENV).ok().map(PathBuf::from));

    if let Some(path) = candidate {
        match ConsoleConfig::from_file(&path) {
            Ok(config) => {
                tracing::info!(
                    target: "exodrone::config",
                    path = %path.display(),
                    "console_config.loaded=file"
                );
                return (Arc::new(config), ConsoleConfigMetadata::new(Some(path)));
            }
            Err(err) => {
                tracing::warn!(
                    target: "exodrone::config",
                    path = %path.display(),
                    error = %err,
                    "console_config.load_failed"
                );
            }
        }
    }

    let config = match ConsoleConfig::builtin() {
        Ok(config) => config,
        Err(err) => {
            tracing::error!(
                target: "exodrone::config",
                error = %err,
                "console_config.builtin_invalid"
            );
            ConsoleConfig::default()
        }
    };
    tracing::info!(target: "exodrone::config", "console_config.loaded=builtin");
    (Arc::new(config), ConsoleConfigMetadata::new(None))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builtin_config_matches_defaults() {
        let config = ConsoleConfig::builtin().expect("builtin config should parse");
        assert_eq!(config, ConsoleConfig::default());
    }

    #[test]
    fn partial_config_fills_defaults() {
        let config = ConsoleConfig::from_json_str(r#"{ "home_label": "Station" }"#).unwrap();
        assert_eq!(config.home_label, "Station");
        assert_eq!(config.launch_label, "Launch!");
        assert_eq!(config.eta_style, EtaStyle::Short);
    }

    #[test]
    fn inverted_thresholds_are_rejected() {
        let err = ConsoleConfig::from_json_str(r#"{ "integrity": { "good": 0.3, "average": 0.6 } }"#)
            .expect_err("thresholds out of order");
        assert!(matches!(err, ConsoleConfigError::Thresholds { .. }));
    }

    #[test]
    fn missing_file_reports_path() {
        let err = ConsoleConfig::from_file(Path::new("/nonexistent/console_config.json"))
            .expect_err("file does not exist");
        assert!(err.to_string().contains("console_config.json"));
    }
}
