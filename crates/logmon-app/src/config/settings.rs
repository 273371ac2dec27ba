//! Settings parser for config.toml

use std::path::{Path, PathBuf};
use std::time::Duration;

use super::types::Settings;
use logmon_core::prelude::*;
use logmon_core::SeverityFilter;

const CONFIG_FILENAME: &str = "config.toml";
const APP_DIR: &str = "logcat-monitor";

/// Environment variable overriding the settings file location
pub const CONFIG_ENV_VAR: &str = "LOGMON_CONFIG";

/// Default settings location: `<config_dir>/logcat-monitor/config.toml`
pub fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join(APP_DIR).join(CONFIG_FILENAME))
}

/// Settings file to read: `LOGMON_CONFIG` if set, else the default location
pub fn config_path() -> Option<PathBuf> {
    match std::env::var_os(CONFIG_ENV_VAR) {
        Some(path) if !path.is_empty() => Some(PathBuf::from(path)),
        _ => default_config_path(),
    }
}

/// Load settings from `config_path`
///
/// Returns default settings if the file doesn't exist or can't be parsed.
pub fn load_settings(config_path: &Path) -> Settings {
    if !config_path.exists() {
        debug!("No config file at {:?}, using defaults", config_path);
        return Settings::default();
    }

    match std::fs::read_to_string(config_path) {
        Ok(content) => match toml::from_str(&content) {
            Ok(settings) => {
                debug!("Loaded settings from {:?}", config_path);
                settings
            }
            Err(e) => {
                warn!("Failed to parse {:?}: {}", config_path, e);
                Settings::default()
            }
        },
        Err(e) => {
            warn!("Failed to read {:?}: {}", config_path, e);
            Settings::default()
        }
    }
}

/// Resolve and load settings.
///
/// An explicitly requested file must exist; the environment override and the
/// default location quietly fall back to defaults.
pub fn resolve_settings(explicit: Option<&Path>) -> Result<Settings> {
    if let Some(path) = explicit {
        if !path.exists() {
            return Err(Error::ConfigNotFound {
                path: path.to_path_buf(),
            });
        }
        return Ok(load_settings(path));
    }

    Ok(config_path()
        .map(|path| load_settings(&path))
        .unwrap_or_default())
}

impl Settings {
    /// Severity filter configured under `[monitor]`
    pub fn severity_filter(&self) -> Result<SeverityFilter> {
        SeverityFilter::new(self.monitor.severity.iter().copied())
            .map_err(|_| Error::config("[monitor] severity must not be empty"))
    }

    pub fn shutdown_timeout(&self) -> Duration {
        Duration::from_millis(self.source.shutdown_timeout_ms)
    }
}
