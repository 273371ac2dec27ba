//! Monitor error types with rich context

use std::path::PathBuf;
use thiserror::Error;

/// Result type alias using our Error type
pub type Result<T> = std::result::Result<T, Error>;

/// Monitor error types organized by layer
///
/// Malformed log lines are not represented here: the line parser is total and
/// turns anything it cannot match into a raw-only record.
#[derive(Debug, Error)]
pub enum Error {
    // ─────────────────────────────────────────────────────────────
    // Common/Infrastructure Errors
    // ─────────────────────────────────────────────────────────────
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Terminal error: {message}")]
    Terminal { message: String },

    // ─────────────────────────────────────────────────────────────
    // Log Source Errors
    // ─────────────────────────────────────────────────────────────
    #[error("adb not found. Install Android platform-tools or pass --adb <path>.")]
    AdbNotFound,

    #[error("Failed to launch log source: {reason}")]
    SourceLaunch { reason: String },

    #[error("Failed to read log source: {message}")]
    SourceRead { message: String },

    // ─────────────────────────────────────────────────────────────
    // Configuration Errors
    // ─────────────────────────────────────────────────────────────
    #[error("Invalid duration '{expr}'. Use a format like '30s', '5m' or '1h'")]
    InvalidDuration { expr: String },

    #[error("Invalid severity '{value}'. Expected one of: error, warning, info, debug, verbose")]
    InvalidSeverity { value: String },

    #[error("Configuration error: {message}")]
    Config { message: String },

    #[error("Configuration file not found: {path}")]
    ConfigNotFound { path: PathBuf },
}

// ─────────────────────────────────────────────────────────────────
// Convenience Constructors
// ─────────────────────────────────────────────────────────────────

impl Error {
    pub fn terminal(message: impl Into<String>) -> Self {
        Self::Terminal {
            message: message.into(),
        }
    }

    pub fn source_launch(reason: impl Into<String>) -> Self {
        Self::SourceLaunch {
            reason: reason.into(),
        }
    }

    pub fn source_read(message: impl Into<String>) -> Self {
        Self::SourceRead {
            message: message.into(),
        }
    }

    pub fn invalid_duration(expr: impl Into<String>) -> Self {
        Self::InvalidDuration { expr: expr.into() }
    }

    pub fn invalid_severity(value: impl Into<String>) -> Self {
        Self::InvalidSeverity {
            value: value.into(),
        }
    }

    pub fn config(message: impl Into<String>) -> Self {
        Self::Config {
            message: message.into(),
        }
    }

    /// Check if this is a recoverable error
    ///
    /// Recoverable errors are logged and the session carries on.
    pub fn is_recoverable(&self) -> bool {
        matches!(self, Error::Config { .. })
    }

    /// Check if this error ends the monitoring session
    pub fn is_fatal(&self) -> bool {
        matches!(
            self,
            Error::AdbNotFound
                | Error::SourceLaunch { .. }
                | Error::SourceRead { .. }
                | Error::InvalidDuration { .. }
                | Error::InvalidSeverity { .. }
        )
    }
}

// ─────────────────────────────────────────────────────────────────
// Error Context Extensions (for use with color-eyre)
// ─────────────────────────────────────────────────────────────────

/// Extension trait for adding context to Results
pub trait ResultExt<T> {
    /// Add context to an error
    fn context(self, context: impl Into<String>) -> Result<T>;

    /// Add context with a closure (lazy evaluation)
    fn with_context<F>(self, f: F) -> Result<T>
    where
        F: FnOnce() -> String;
}

impl<T, E: Into<Error>> ResultExt<T> for std::result::Result<T, E> {
    fn context(self, context: impl Into<String>) -> Result<T> {
        self.map_err(|e| {
            let err = e.into();
            tracing::error!("{}: {:?}", context.into(), err);
            err
        })
    }

    fn with_context<F>(self, f: F) -> Result<T>
    where
        F: FnOnce() -> String,
    {
        self.map_err(|e| {
            let err = e.into();
            tracing::error!("{}: {:?}", f(), err);
            err
        })
    }
}
