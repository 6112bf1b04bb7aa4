//! Application-level configuration loading, including the scoring curve.

use std::{env, fs, io::ErrorKind, path::PathBuf, time::Duration};

use serde::Deserialize;
use tracing::{info, warn};

use crate::state::{
    scoring::{Threshold, ThresholdTable},
    state_machine::DEFAULT_LATENCY_COMPENSATION_MS,
};

/// Default location on disk where the server looks for the JSON configuration.
const DEFAULT_CONFIG_PATH: &str = "config/app.json";
/// Environment variable that overrides [`DEFAULT_CONFIG_PATH`].
const CONFIG_PATH_ENV: &str = "WHITNEY_CHALLENGE_CONFIG_PATH";
/// Environment variable that overrides the configured data directory.
const DATA_DIR_ENV: &str = "WHITNEY_CHALLENGE_DATA_DIR";
/// Directory holding the storage slots when nothing else is configured.
const DEFAULT_DATA_DIR: &str = "data";
/// Time a round may run before the host times it out.
const DEFAULT_ROUND_TIMEOUT: Duration = Duration::from_secs(30);

#[derive(Debug, Clone)]
/// Immutable runtime configuration shared across the application.
pub struct AppConfig {
    thresholds: ThresholdTable,
    round_timeout: Duration,
    default_latency_compensation: f64,
    data_dir: PathBuf,
}

impl AppConfig {
    /// Load the application configuration from disk, falling back to built-in defaults.
    pub fn load() -> Self {
        let path = resolve_config_path();
        let config = match fs::read_to_string(&path) {
            Ok(contents) => match serde_json::from_str::<RawConfig>(&contents) {
                Ok(raw) => {
                    let app_config: Self = raw.into();
                    info!(
                        path = %path.display(),
                        thresholds = app_config.thresholds.thresholds().len(),
                        "loaded configuration"
                    );
                    app_config
                }
                Err(err) => {
                    warn!(
                        path = %path.display(),
                        error = %err,
                        "failed to parse config; falling back to defaults"
                    );
                    Self::default()
                }
            },
            Err(err) if err.kind() == ErrorKind::NotFound => {
                info!(
                    path = %path.display(),
                    "config file not found; using built-in defaults"
                );
                Self::default()
            }
            Err(err) => {
                warn!(
                    path = %path.display(),
                    error = %err,
                    "failed to read config; falling back to defaults"
                );
                Self::default()
            }
        };

        match env::var_os(DATA_DIR_ENV).filter(|dir| !dir.is_empty()) {
            Some(dir) => config.with_data_dir(dir),
            None => config,
        }
    }

    /// Replace the directory holding the storage slots.
    pub fn with_data_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.data_dir = dir.into();
        self
    }

    /// Replace the round timeout.
    pub fn with_round_timeout(mut self, timeout: Duration) -> Self {
        self.round_timeout = timeout;
        self
    }

    /// Scoring curve used by the state machine.
    pub fn thresholds(&self) -> &ThresholdTable {
        &self.thresholds
    }

    /// Delay after the round start before the host emits a timeout.
    pub fn round_timeout(&self) -> Duration {
        self.round_timeout
    }

    /// Latency compensation used until one is saved in the settings.
    pub fn default_latency_compensation(&self) -> f64 {
        self.default_latency_compensation
    }

    /// Directory holding the storage slots.
    pub fn data_dir(&self) -> &PathBuf {
        &self.data_dir
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            thresholds: ThresholdTable::default(),
            round_timeout: DEFAULT_ROUND_TIMEOUT,
            default_latency_compensation: DEFAULT_LATENCY_COMPENSATION_MS,
            data_dir: PathBuf::from(DEFAULT_DATA_DIR),
        }
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
/// JSON representation of the configuration file located at [`DEFAULT_CONFIG_PATH`].
struct RawConfig {
    thresholds: Option<Vec<Threshold>>,
    round_timeout_ms: Option<u64>,
    default_latency_compensation: Option<f64>,
    data_dir: Option<PathBuf>,
}

impl From<RawConfig> for AppConfig {
    fn from(value: RawConfig) -> Self {
        let defaults = Self::default();
        Self {
            thresholds: value
                .thresholds
                .filter(|entries| !entries.is_empty())
                .map(ThresholdTable::new)
                .unwrap_or(defaults.thresholds),
            round_timeout: value
                .round_timeout_ms
                .map(Duration::from_millis)
                .unwrap_or(defaults.round_timeout),
            default_latency_compensation: value
                .default_latency_compensation
                .filter(|ms| ms.is_finite())
                .map(|ms| ms.max(0.0))
                .unwrap_or(defaults.default_latency_compensation),
            data_dir: value.data_dir.unwrap_or(defaults.data_dir),
        }
    }
}

/// Resolve the configuration path taking the environment override into account.
fn resolve_config_path() -> PathBuf {
    env::var_os(CONFIG_PATH_ENV)
        .map(PathBuf::from)
        .filter(|path| !path.as_os_str().is_empty())
        .unwrap_or_else(|| PathBuf::from(DEFAULT_CONFIG_PATH))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn partial_file_keeps_defaults_for_missing_keys() {
        let raw: RawConfig = serde_json::from_str(r#"{ "round_timeout_ms": 45000 }"#).unwrap();
        let config = AppConfig::from(raw);

        assert_eq!(config.round_timeout(), Duration::from_secs(45));
        assert_eq!(config.thresholds(), &ThresholdTable::default());
        assert_eq!(config.default_latency_compensation(), 250.0);
    }

    #[test]
    fn configured_thresholds_are_sorted() {
        let raw: RawConfig = serde_json::from_str(
            r#"{ "thresholds": [ { "below": 500, "points": 1 }, { "below": 100, "points": 3 } ] }"#,
        )
        .unwrap();
        let config = AppConfig::from(raw);

        assert_eq!(config.thresholds().score_for(50.0), 3);
        assert_eq!(config.thresholds().score_for(400.0), 1);
    }

    #[test]
    fn negative_default_latency_is_floored() {
        let raw: RawConfig =
            serde_json::from_str(r#"{ "default_latency_compensation": -40 }"#).unwrap();
        assert_eq!(AppConfig::from(raw).default_latency_compensation(), 0.0);
    }
}
