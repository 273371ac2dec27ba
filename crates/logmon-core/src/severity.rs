//! Severity classification and filter sets

use std::fmt;
use std::str::FromStr;

use crate::error::{Error, Result};
use crate::record::{PriorityCode, Severity};

/// Map a logcat priority to its severity tier
///
/// `F` folds into [`Severity::Error`].
pub fn classify(priority: PriorityCode) -> Severity {
    match priority {
        PriorityCode::Verbose => Severity::Verbose,
        PriorityCode::Debug => Severity::Debug,
        PriorityCode::Info => Severity::Info,
        PriorityCode::Warn => Severity::Warning,
        PriorityCode::Error | PriorityCode::Fatal => Severity::Error,
    }
}

/// Priority letters that classify into a severity
fn priorities_for(severity: Severity) -> &'static [PriorityCode] {
    match severity {
        Severity::Verbose => &[PriorityCode::Verbose],
        Severity::Debug => &[PriorityCode::Debug],
        Severity::Info => &[PriorityCode::Info],
        Severity::Warning => &[PriorityCode::Warn],
        Severity::Error => &[PriorityCode::Error, PriorityCode::Fatal],
    }
}

/// Set of severities a session lets through.
///
/// Logcat filters are thresholds, so the set is reduced to its minimum
/// priority for the source ([`SeverityFilter::min_priority`]) and the exact set
/// is enforced again on every record ([`SeverityFilter::includes`]).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SeverityFilter {
    // Indexed by `Severity as usize`
    enabled: [bool; 5],
}

impl SeverityFilter {
    /// Build a filter from an explicit list. An empty list is rejected.
    pub fn new(severities: impl IntoIterator<Item = Severity>) -> Result<Self> {
        let mut enabled = [false; 5];
        for severity in severities {
            enabled[severity as usize] = true;
        }
        if !enabled.iter().any(|e| *e) {
            return Err(Error::invalid_severity(""));
        }
        Ok(Self { enabled })
    }

    /// Every severity including verbose
    pub fn all() -> Self {
        Self { enabled: [true; 5] }
    }

    /// Parse a comma-separated list such as `error,warning`
    pub fn parse(list: &str) -> Result<Self> {
        let severities = list
            .split(',')
            .filter(|part| !part.trim().is_empty())
            .map(Severity::from_str)
            .collect::<Result<Vec<_>>>()?;
        if severities.is_empty() {
            return Err(Error::invalid_severity(list));
        }
        Self::new(severities)
    }

    pub fn includes(&self, severity: Severity) -> bool {
        self.enabled[severity as usize]
    }

    /// Included severities, lowest first
    pub fn severities(&self) -> impl DoubleEndedIterator<Item = Severity> + '_ {
        Severity::ALL.into_iter().filter(|s| self.includes(*s))
    }

    /// Lowest priority letter the source must emit to cover this set
    pub fn min_priority(&self) -> PriorityCode {
        self.severities()
            .flat_map(|s| priorities_for(s).iter().copied())
            .min()
            // An empty filter cannot be constructed
            .unwrap_or(PriorityCode::Verbose)
    }
}

/// Error, warning, info and debug. Verbose is off unless asked for.
impl Default for SeverityFilter {
    fn default() -> Self {
        Self {
            enabled: [false, true, true, true, true],
        }
    }
}

impl fmt::Display for SeverityFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let names: Vec<&str> = self.severities().rev().map(|s| s.as_str()).collect();
        f.write_str(&names.join(","))
    }
}

impl FromStr for SeverityFilter {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_classify_every_priority() {
        assert_eq!(classify(PriorityCode::Verbose), Severity::Verbose);
        assert_eq!(classify(PriorityCode::Debug), Severity::Debug);
        assert_eq!(classify(PriorityCode::Info), Severity::Info);
        assert_eq!(classify(PriorityCode::Warn), Severity::Warning);
        assert_eq!(classify(PriorityCode::Error), Severity::Error);
        assert_eq!(classify(PriorityCode::Fatal), Severity::Error);
    }

    #[test]
    fn test_default_excludes_verbose() {
        let filter = SeverityFilter::default();
        assert!(!filter.includes(Severity::Verbose));
        assert!(filter.includes(Severity::Debug));
        assert!(filter.includes(Severity::Error));
        assert_eq!(filter.min_priority(), PriorityCode::Debug);
    }

    #[test]
    fn test_min_priority_uses_lowest_member() {
        let filter = SeverityFilter::parse("error,warning").unwrap();
        assert_eq!(filter.min_priority(), PriorityCode::Warn);

        let filter = SeverityFilter::parse("error").unwrap();
        assert_eq!(filter.min_priority(), PriorityCode::Error);

        let filter = SeverityFilter::parse("error,verbose").unwrap();
        assert_eq!(filter.min_priority(), PriorityCode::Verbose);
    }

    #[test]
    fn test_gap_in_set_is_still_enforced_per_record() {
        // Threshold is I, so W arrives from the source but must be gated here
        let filter = SeverityFilter::parse("error,info").unwrap();
        assert_eq!(filter.min_priority(), PriorityCode::Info);
        assert!(!filter.includes(Severity::Warning));
    }

    #[test]
    fn test_parse_tolerates_spacing_and_case() {
        let filter = SeverityFilter::parse(" Error , WARNING ").unwrap();
        assert_eq!(filter.to_string(), "error,warning");
    }

    #[test]
    fn test_parse_rejects_unknown_and_empty() {
        assert!(matches!(
            SeverityFilter::parse("error,fatal"),
            Err(Error::InvalidSeverity { .. })
        ));
        assert!(SeverityFilter::parse("").is_err());
        assert!(SeverityFilter::parse(" , ").is_err());
        assert!(SeverityFilter::new(Vec::<Severity>::new()).is_err());
    }

    #[test]
    fn test_display_lists_highest_first() {
        let filter = SeverityFilter::new([Severity::Debug, Severity::Error]).unwrap();
        assert_eq!(filter.to_string(), "error,debug");
        assert_eq!(SeverityFilter::default().to_string(), "error,warning,info,debug");
    }

    #[test]
    fn test_all_includes_verbose() {
        let filter = SeverityFilter::all();
        assert_eq!(filter.severities().count(), 5);
        assert_eq!(filter.min_priority(), PriorityCode::Verbose);
    }
}
