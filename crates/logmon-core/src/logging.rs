//! Logging configuration using tracing

use std::path::PathBuf;
use tracing_appender::rolling::{RollingFileAppender, Rotation};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use crate::error::Result;

/// Environment variable controlling the diagnostic log filter
pub const LOG_ENV_VAR: &str = "LOGMON_LOG";

const LOG_FILE_PREFIX: &str = "logmon.log";

/// Initialize the logging subsystem
///
/// Diagnostics are written to `~/.local/share/logcat-monitor/logs/`, never to
/// stdout, which carries the live echo and the report.
/// Log level is controlled by the `LOGMON_LOG` environment variable.
///
/// # Examples
/// ```bash
/// LOGMON_LOG=debug logmon --app com.example --duration 30s
/// LOGMON_LOG=trace logmon --follow
/// ```
pub fn init() -> Result<()> {
    let log_dir = get_log_directory()?;
    std::fs::create_dir_all(&log_dir)?;

    let file_appender = RollingFileAppender::new(Rotation::DAILY, &log_dir, LOG_FILE_PREFIX);

    // Default to info for our crates, allow override via LOGMON_LOG
    let env_filter = EnvFilter::try_from_env(LOG_ENV_VAR)
        .unwrap_or_else(|_| EnvFilter::new("logmon=info,logcat_monitor=info,warn"));

    tracing_subscriber::registry()
        .with(env_filter)
        .with(
            fmt::layer()
                .with_writer(file_appender)
                .with_ansi(false)
                .with_target(true)
                .with_thread_ids(false)
                .with_file(true)
                .with_line_number(true)
                .with_timer(fmt::time::ChronoLocal::new(
                    "%Y-%m-%d %H:%M:%S%.3f".to_string(),
                )),
        )
        .init();

    tracing::info!("═══════════════════════════════════════════════════════");
    tracing::info!("logcat-monitor starting");
    tracing::info!("Log directory: {}", log_dir.display());
    tracing::info!("═══════════════════════════════════════════════════════");

    Ok(())
}

/// Get the log directory path
fn get_log_directory() -> Result<PathBuf> {
    let base = dirs::data_local_dir().unwrap_or_else(|| PathBuf::from("."));
    Ok(base.join("logcat-monitor").join("logs"))
}

/// Get the log file path for the current day
///
/// The daily appender suffixes the file name with the UTC date.
pub fn get_current_log_file() -> Result<PathBuf> {
    let dir = get_log_directory()?;
    let date = chrono::Utc::now().format("%Y-%m-%d");
    Ok(dir.join(format!("{}.{}", LOG_FILE_PREFIX, date)))
}
