//! Application-level configuration loading, including roster and court limits
//! enforced at the ingestion boundary.

use std::{env, fs, io::ErrorKind, path::PathBuf};

use serde::Deserialize;
use tracing::{info, warn};

/// Default location on disk where the server looks for the JSON configuration.
const DEFAULT_CONFIG_PATH: &str = "config/app.json";
/// Environment variable that overrides [`DEFAULT_CONFIG_PATH`].
const CONFIG_PATH_ENV: &str = "SHUTTLE_COURT_BACK_CONFIG_PATH";
/// Upper bound on courts per event when the config file does not say.
const DEFAULT_MAX_COURTS: usize = 12;
/// Upper bound on roster size per event when the config file does not say.
const DEFAULT_MAX_ROSTER_SIZE: usize = 256;

#[derive(Debug, Clone)]
/// Immutable runtime configuration shared across the application.
pub struct AppConfig {
    /// Maximum courts a single event may declare.
    pub max_courts: usize,
    /// Maximum players a single roster may carry.
    pub max_roster_size: usize,
}

impl AppConfig {
    /// Load the application configuration from disk, falling back to baked-in
    /// defaults.
    pub fn load() -> Self {
        let path = resolve_config_path();
        match fs::read_to_string(&path) {
            Ok(contents) => match serde_json::from_str::<RawConfig>(&contents) {
                Ok(raw) => {
                    let config: Self = raw.into();
                    info!(
                        path = %path.display(),
                        max_courts = config.max_courts,
                        max_roster_size = config.max_roster_size,
                        "loaded engine limits from config"
                    );
                    config
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
        }
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            max_courts: DEFAULT_MAX_COURTS,
            max_roster_size: DEFAULT_MAX_ROSTER_SIZE,
        }
    }
}

#[derive(Debug, Deserialize)]
/// JSON representation of the configuration file located at [`DEFAULT_CONFIG_PATH`].
struct RawConfig {
    max_courts: Option<usize>,
    max_roster_size: Option<usize>,
}

impl From<RawConfig> for AppConfig {
    fn from(value: RawConfig) -> Self {
        let defaults = AppConfig::default();
        Self {
            max_courts: value.max_courts.unwrap_or(defaults.max_courts),
            max_roster_size: value.max_roster_size.unwrap_or(defaults.max_roster_size),
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
