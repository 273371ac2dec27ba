//! Configuration types for logcat-monitor
//!
//! Defines `Settings` (the optional `config.toml`) and its sections.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use logmon_adb::{DEFAULT_LINE_BUFFER, DEFAULT_SHUTDOWN_TIMEOUT};
use logmon_core::Severity;

use crate::report::DEFAULT_DISPLAY_WIDTH;

/// Application settings (config.toml)
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct Settings {
    #[serde(default)]
    pub monitor: MonitorSettings,

    #[serde(default)]
    pub source: SourceSettings,

    #[serde(default)]
    pub report: ReportSettings,
}

/// Defaults for a monitoring run; CLI flags take precedence
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct MonitorSettings {
    /// Severities included when `--severity` is not given
    #[serde(default = "default_severity")]
    pub severity: Vec<Severity>,

    /// Clear the device log buffer before streaming
    #[serde(default)]
    pub clear_first: bool,
}

impl Default for MonitorSettings {
    fn default() -> Self {
        Self {
            severity: default_severity(),
            clear_first: false,
        }
    }
}

/// Log source process settings
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct SourceSettings {
    /// Explicit adb executable; PATH lookup when unset
    #[serde(default)]
    pub adb_path: Option<PathBuf>,

    /// Capacity of the reader-to-controller line queue
    #[serde(default = "default_line_buffer")]
    pub line_buffer: usize,

    /// How long to wait for the source process to exit after a kill
    #[serde(default = "default_shutdown_timeout_ms")]
    pub shutdown_timeout_ms: u64,
}

impl Default for SourceSettings {
    fn default() -> Self {
        Self {
            adb_path: None,
            line_buffer: default_line_buffer(),
            shutdown_timeout_ms: default_shutdown_timeout_ms(),
        }
    }
}

/// Report rendering settings
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ReportSettings {
    /// Characters kept per issue line in the text summary
    #[serde(default = "default_display_width")]
    pub display_width: usize,
}

impl Default for ReportSettings {
    fn default() -> Self {
        Self {
            display_width: default_display_width(),
        }
    }
}

fn default_severity() -> Vec<Severity> {
    vec![
        Severity::Error,
        Severity::Warning,
        Severity::Info,
        Severity::Debug,
    ]
}

fn default_line_buffer() -> usize {
    DEFAULT_LINE_BUFFER
}

fn default_shutdown_timeout_ms() -> u64 {
    DEFAULT_SHUTDOWN_TIMEOUT.as_millis() as u64
}

fn default_display_width() -> usize {
    DEFAULT_DISPLAY_WIDTH
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_settings_default() {
        let settings = Settings::default();
        assert_eq!(settings.monitor.severity.len(), 4);
        assert!(!settings.monitor.severity.contains(&Severity::Verbose));
        assert!(!settings.monitor.clear_first);
        assert_eq!(settings.source.line_buffer, 1024);
        assert_eq!(settings.source.shutdown_timeout_ms, 2000);
        assert!(settings.source.adb_path.is_none());
        assert_eq!(settings.report.display_width, 120);
    }

    #[test]
    fn test_settings_deserialize_partial() {
        let settings: Settings = toml::from_str(
            r#"
[monitor]
severity = ["error", "verbose"]
"#,
        )
        .unwrap();

        assert_eq!(
            settings.monitor.severity,
            vec![Severity::Error, Severity::Verbose]
        );
        assert_eq!(settings.source.line_buffer, 1024);
        assert_eq!(settings.report.display_width, 120);
    }

    #[test]
    fn test_settings_reject_unknown_severity() {
        let result: std::result::Result<Settings, _> = toml::from_str(
            r#"
[monitor]
severity = ["fatal"]
"#,
        );
        assert!(result.is_err());
    }
}
