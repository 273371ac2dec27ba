//! Parsed log record and severity vocabulary

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Raw single-character priority token emitted by logcat.
///
/// Declaration order is the logcat threshold order: `V < D < I < W < E < F`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum PriorityCode {
    Verbose,
    Debug,
    Info,
    Warn,
    Error,
    Fatal,
}

impl PriorityCode {
    /// All priority codes, lowest first
    pub const ALL: [PriorityCode; 6] = [
        PriorityCode::Verbose,
        PriorityCode::Debug,
        PriorityCode::Info,
        PriorityCode::Warn,
        PriorityCode::Error,
        PriorityCode::Fatal,
    ];

    /// Parse a logcat priority letter
    pub fn from_char(c: char) -> Option<Self> {
        match c {
            'V' => Some(PriorityCode::Verbose),
            'D' => Some(PriorityCode::Debug),
            'I' => Some(PriorityCode::Info),
            'W' => Some(PriorityCode::Warn),
            'E' => Some(PriorityCode::Error),
            'F' => Some(PriorityCode::Fatal),
            _ => None,
        }
    }

    /// The logcat letter for this priority
    pub fn as_char(&self) -> char {
        match self {
            PriorityCode::Verbose => 'V',
            PriorityCode::Debug => 'D',
            PriorityCode::Info => 'I',
            PriorityCode::Warn => 'W',
            PriorityCode::Error => 'E',
            PriorityCode::Fatal => 'F',
        }
    }
}

impl fmt::Display for PriorityCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_char())
    }
}

/// Severity tier of a parsed record.
///
/// Fatal records fold into [`Severity::Error`]; the original letter stays
/// available as [`LogFields::priority`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Verbose,
    Debug,
    Info,
    Warning,
    Error,
}

impl Severity {
    /// All severities, lowest first
    pub const ALL: [Severity; 5] = [
        Severity::Verbose,
        Severity::Debug,
        Severity::Info,
        Severity::Warning,
        Severity::Error,
    ];

    /// Lowercase name used on the command line and in reports
    pub fn as_str(&self) -> &'static str {
        match self {
            Severity::Verbose => "verbose",
            Severity::Debug => "debug",
            Severity::Info => "info",
            Severity::Warning => "warning",
            Severity::Error => "error",
        }
    }

    /// Whether records of this severity go through deduplication
    pub fn is_deduplicated(&self) -> bool {
        matches!(self, Severity::Warning | Severity::Error)
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Severity {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "verbose" => Ok(Severity::Verbose),
            "debug" => Ok(Severity::Debug),
            "info" => Ok(Severity::Info),
            "warning" => Ok(Severity::Warning),
            "error" => Ok(Severity::Error),
            _ => Err(Error::invalid_severity(s.trim())),
        }
    }
}

/// Structured fields of a line that matched the logcat threadtime shape
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogFields {
    /// Date and time token, carried through verbatim
    pub timestamp: String,
    pub pid: String,
    pub tid: String,
    pub priority: PriorityCode,
    pub tag: String,
    pub message: String,
}

/// One log line as seen by the monitor.
///
/// `raw` is always the unmodified input. `fields` is `None` for raw-only
/// lines, which are stored but never classified.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogRecord {
    pub raw: String,
    pub fields: Option<LogFields>,
}

impl LogRecord {
    /// Create a record for a line that did not match the structured shape
    pub fn raw_only(raw: impl Into<String>) -> Self {
        Self {
            raw: raw.into(),
            fields: None,
        }
    }

    /// Create a fully parsed record
    pub fn parsed(raw: impl Into<String>, fields: LogFields) -> Self {
        Self {
            raw: raw.into(),
            fields: Some(fields),
        }
    }

    /// Whether the line matched the structured shape
    pub fn is_parsed(&self) -> bool {
        self.fields.is_some()
    }

    /// Derived severity, `None` for raw-only lines
    pub fn severity(&self) -> Option<Severity> {
        self.fields
            .as_ref()
            .map(|f| crate::severity::classify(f.priority))
    }

    /// `[tag] message` form used in issue lists
    pub fn display_message(&self) -> Option<String> {
        self.fields
            .as_ref()
            .map(|f| format!("[{}] {}", f.tag, f.message))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_priority_order_matches_logcat() {
        let letters: String = PriorityCode::ALL.iter().map(|p| p.as_char()).collect();
        assert_eq!(letters, "VDIWEF");
        assert!(PriorityCode::Verbose < PriorityCode::Fatal);
        assert!(PriorityCode::Warn < PriorityCode::Error);
    }

    #[test]
    fn test_priority_from_char_rejects_unknown() {
        assert_eq!(PriorityCode::from_char('E'), Some(PriorityCode::Error));
        assert_eq!(PriorityCode::from_char('S'), None);
        assert_eq!(PriorityCode::from_char('e'), None);
    }

    #[test]
    fn test_severity_from_str() {
        assert_eq!("error".parse::<Severity>().unwrap(), Severity::Error);
        assert_eq!(" Warning ".parse::<Severity>().unwrap(), Severity::Warning);
        assert!(matches!(
            "fatal".parse::<Severity>(),
            Err(Error::InvalidSeverity { .. })
        ));
    }

    #[test]
    fn test_severity_serializes_lowercase() {
        let json = serde_json::to_string(&Severity::Warning).unwrap();
        assert_eq!(json, "\"warning\"");
    }

    #[test]
    fn test_raw_only_record_has_no_severity() {
        let record = LogRecord::raw_only("--------- beginning of main");
        assert!(!record.is_parsed());
        assert_eq!(record.severity(), None);
        assert_eq!(record.display_message(), None);
    }

    #[test]
    fn test_parsed_record_display_message() {
        let record = LogRecord::parsed(
            "raw",
            LogFields {
                timestamp: "01-01 00:00:00.000".to_string(),
                pid: "1".to_string(),
                tid: "2".to_string(),
                priority: PriorityCode::Fatal,
                tag: "libc".to_string(),
                message: "abort".to_string(),
            },
        );
        assert_eq!(record.severity(), Some(Severity::Error));
        assert_eq!(record.display_message().as_deref(), Some("[libc] abort"));
    }
}
