//! Command-line arguments and their merge with settings

use std::path::PathBuf;

use clap::Parser;
use logmon_app::config::Settings;
use logmon_app::MonitorConfig;
use logmon_core::prelude::*;
use logmon_core::{parse_duration_expr, SeverityFilter};

/// logmon - Monitor and summarize Android device logs
#[derive(Parser, Debug)]
#[command(name = "logmon")]
#[command(about = "Monitor and analyze Android device/emulator logs", long_about = None)]
#[command(after_help = "Examples:
  logmon --app com.myapp --follow
  logmon --app com.myapp --duration 30s
  logmon --severity error,warning --duration 1m
  logmon --app com.myapp --duration 1m --output logs/
  logmon --app com.myapp --clear --follow")]
pub struct Args {
    /// App package name to filter logs (e.g., com.myapp)
    #[arg(long = "app", value_name = "PACKAGE")]
    pub app_package: Option<String>,

    /// Device serial (adb default device if not specified)
    #[arg(long = "serial", value_name = "SERIAL")]
    pub device_serial: Option<String>,

    /// Comma-separated severities (error,warning,info,debug,verbose)
    #[arg(long, value_name = "LIST")]
    pub severity: Option<String>,

    /// Stream continuously, echoing lines as they arrive
    #[arg(long, conflicts_with = "duration")]
    pub follow: bool,

    /// Capture duration (e.g., 30s, 5m, 1h)
    #[arg(long, value_name = "EXPR")]
    pub duration: Option<String>,

    /// Save logs and a JSON summary to this directory
    #[arg(long, value_name = "DIR")]
    pub output: Option<PathBuf>,

    /// Include recent raw lines in the summary
    #[arg(long)]
    pub verbose: bool,

    /// Print the summary as JSON
    #[arg(long)]
    pub json: bool,

    /// Clear the logcat buffer before streaming
    #[arg(long)]
    pub clear: bool,

    /// Path to the adb executable
    #[arg(long, value_name = "PATH")]
    pub adb: Option<PathBuf>,

    /// Settings file (default: <config dir>/logcat-monitor/config.toml)
    #[arg(long, value_name = "PATH")]
    pub config: Option<PathBuf>,
}

impl Args {
    /// Validate arguments and merge them over `settings`.
    ///
    /// Bad severity names or duration expressions are rejected here, before
    /// anything is launched.
    pub fn monitor_config(&self, settings: &Settings) -> Result<MonitorConfig> {
        let filter = match &self.severity {
            Some(list) => SeverityFilter::parse(list)?,
            None => settings.severity_filter()?,
        };

        let duration = self
            .duration
            .as_deref()
            .map(parse_duration_expr)
            .transpose()?;

        Ok(MonitorConfig {
            app_package: self.app_package.clone(),
            device_serial: self.device_serial.clone(),
            filter,
            duration,
            follow: self.follow,
            clear_first: self.clear || settings.monitor.clear_first,
        })
    }

    /// adb location from the command line, then settings
    pub fn adb_hint(&self, settings: &Settings) -> Option<PathBuf> {
        self.adb
            .clone()
            .or_else(|| settings.source.adb_path.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use logmon_core::Severity;
    use std::time::Duration;

    fn parse(args: &[&str]) -> Args {
        Args::try_parse_from(std::iter::once("logmon").chain(args.iter().copied())).unwrap()
    }

    #[test]
    fn test_defaults_follow_settings() {
        let config = parse(&[]).monitor_config(&Settings::default()).unwrap();

        assert_eq!(config.filter, SeverityFilter::default());
        assert_eq!(config.duration, None);
        assert!(!config.follow);
        assert!(!config.clear_first);
        assert!(config.app_package.is_none());
    }

    #[test]
    fn test_flags_override_settings() {
        let mut settings = Settings::default();
        settings.monitor.severity = vec![Severity::Verbose];

        let config = parse(&[
            "--app",
            "com.myapp",
            "--serial",
            "emulator-5554",
            "--severity",
            "error,warning",
            "--duration",
            "5m",
            "--clear",
        ])
        .monitor_config(&settings)
        .unwrap();

        assert_eq!(config.app_package.as_deref(), Some("com.myapp"));
        assert_eq!(config.device_serial.as_deref(), Some("emulator-5554"));
        assert_eq!(
            config.filter,
            SeverityFilter::new([Severity::Error, Severity::Warning]).unwrap()
        );
        assert_eq!(config.duration, Some(Duration::from_secs(300)));
        assert!(config.clear_first);
    }

    #[test]
    fn test_clear_from_settings() {
        let mut settings = Settings::default();
        settings.monitor.clear_first = true;
        let config = parse(&[]).monitor_config(&settings).unwrap();
        assert!(config.clear_first);
    }

    #[test]
    fn test_invalid_duration_rejected() {
        let result = parse(&["--duration", "5x"]).monitor_config(&Settings::default());
        assert!(matches!(result, Err(Error::InvalidDuration { .. })));
    }

    #[test]
    fn test_invalid_severity_rejected() {
        let result = parse(&["--severity", "error,loud"]).monitor_config(&Settings::default());
        assert!(matches!(result, Err(Error::InvalidSeverity { .. })));
    }

    #[test]
    fn test_follow_conflicts_with_duration() {
        let result = Args::try_parse_from(["logmon", "--follow", "--duration", "30s"]);
        assert!(result.is_err());
    }

    #[test]
    fn test_adb_hint_prefers_flag() {
        let mut settings = Settings::default();
        settings.source.adb_path = Some(PathBuf::from("/from/settings/adb"));

        assert_eq!(
            parse(&["--adb", "/from/flag/adb"]).adb_hint(&settings),
            Some(PathBuf::from("/from/flag/adb"))
        );
        assert_eq!(
            parse(&[]).adb_hint(&settings),
            Some(PathBuf::from("/from/settings/adb"))
        );
    }
}
