//! Session aggregation state for one monitoring run
//!
//! A [`Session`] is created when streaming starts, mutated only by the stream
//! controller's dispatch loop, and frozen into a [`SessionSnapshot`] when the
//! run stops.

use std::fmt;

use chrono::{DateTime, Local};
use serde::Serialize;

use crate::record::{LogRecord, Severity};
use crate::ring_buffer::RingBuffer;
use crate::signature::Deduplicator;

/// Raw lines kept for "recent activity"
pub const RECENT_RAW_LINES_CAP: usize = 50;

/// Info messages kept for the session
pub const RECENT_INFO_CAP: usize = 20;

/// Why a session stopped. Exactly one reason ends a session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum StopReason {
    /// The source closed its output
    NaturalEof,
    /// The configured duration was reached
    DurationElapsed,
    /// A cancellation request arrived
    UserCancelled,
    /// The source failed to launch or could not be read
    SourceError,
}

impl StopReason {
    pub fn describe(&self) -> &'static str {
        match self {
            StopReason::NaturalEof => "log source ended",
            StopReason::DurationElapsed => "duration elapsed",
            StopReason::UserCancelled => "cancelled",
            StopReason::SourceError => "log source error",
        }
    }
}

impl fmt::Display for StopReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.describe())
    }
}

/// Per-severity counters plus the total line count
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct Statistics {
    pub total_lines: u64,
    pub errors: u64,
    pub warnings: u64,
    pub info: u64,
    pub debug: u64,
    pub verbose: u64,
}

impl Statistics {
    fn bump(&mut self, severity: Severity) {
        let counter = match severity {
            Severity::Error => &mut self.errors,
            Severity::Warning => &mut self.warnings,
            Severity::Info => &mut self.info,
            Severity::Debug => &mut self.debug,
            Severity::Verbose => &mut self.verbose,
        };
        *counter += 1;
    }

    pub fn count(&self, severity: Severity) -> u64 {
        match severity {
            Severity::Error => self.errors,
            Severity::Warning => self.warnings,
            Severity::Info => self.info,
            Severity::Debug => self.debug,
            Severity::Verbose => self.verbose,
        }
    }
}

/// Live aggregation state for a monitoring run
#[derive(Debug)]
pub struct Session {
    app_package: Option<String>,
    device_serial: Option<String>,
    started_at: DateTime<Local>,
    stats: Statistics,
    errors: Vec<String>,
    warnings: Vec<String>,
    recent_info: RingBuffer<String>,
    recent_raw: RingBuffer<String>,
    dedup: Deduplicator,
}

impl Session {
    pub fn new(app_package: Option<String>, device_serial: Option<String>) -> Self {
        Self {
            app_package,
            device_serial,
            started_at: Local::now(),
            stats: Statistics::default(),
            errors: Vec::new(),
            warnings: Vec::new(),
            recent_info: RingBuffer::new(RECENT_INFO_CAP),
            recent_raw: RingBuffer::new(RECENT_RAW_LINES_CAP),
            dedup: Deduplicator::new(),
        }
    }

    /// Fold one record into the session.
    ///
    /// Raw-only records count toward `total_lines` and the raw ring only.
    /// Errors and warnings are listed once per signature; every occurrence is
    /// still counted.
    pub fn record(&mut self, entry: LogRecord) {
        self.stats.total_lines += 1;

        if let (Some(severity), Some(fields)) = (entry.severity(), &entry.fields) {
            self.stats.bump(severity);

            let listed = if severity.is_deduplicated() {
                self.dedup.should_emit(&fields.tag, &fields.message)
            } else {
                severity == Severity::Info
            };
            if let Some(display) = entry.display_message().filter(|_| listed) {
                match severity {
                    Severity::Error => self.errors.push(display),
                    Severity::Warning => self.warnings.push(display),
                    _ => self.recent_info.push(display),
                }
            }
        }

        self.recent_raw.push(entry.raw);
    }

    pub fn statistics(&self) -> &Statistics {
        &self.stats
    }

    /// Distinct error messages in first-seen order
    pub fn errors(&self) -> &[String] {
        &self.errors
    }

    /// Distinct warning messages in first-seen order
    pub fn warnings(&self) -> &[String] {
        &self.warnings
    }

    pub fn recent_info(&self) -> impl Iterator<Item = &String> {
        self.recent_info.iter()
    }

    pub fn recent_raw_lines(&self) -> impl Iterator<Item = &String> {
        self.recent_raw.iter()
    }

    /// Freeze the session for reporting
    pub fn finalize(self, stop_reason: StopReason) -> SessionSnapshot {
        SessionSnapshot {
            app_package: self.app_package,
            device_serial: self.device_serial,
            started_at: self.started_at,
            stopped_at: Local::now(),
            stop_reason,
            statistics: self.stats,
            errors: self.errors,
            warnings: self.warnings,
            recent_info: self.recent_info.into_vec(),
            recent_raw_lines: self.recent_raw.into_vec(),
        }
    }
}

/// Immutable result of a finished session
#[derive(Debug, Clone)]
pub struct SessionSnapshot {
    pub app_package: Option<String>,
    pub device_serial: Option<String>,
    pub started_at: DateTime<Local>,
    pub stopped_at: DateTime<Local>,
    pub stop_reason: StopReason,
    pub statistics: Statistics,
    pub errors: Vec<String>,
    pub warnings: Vec<String>,
    pub recent_info: Vec<String>,
    pub recent_raw_lines: Vec<String>,
}

impl SessionSnapshot {
    /// Human description of what was monitored
    pub fn scope(&self) -> &str {
        self.app_package.as_deref().unwrap_or("All processes")
    }
}
