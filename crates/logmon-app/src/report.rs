//! Session reports: text summary, JSON payload and saved artifacts

use std::path::{Path, PathBuf};

use chrono::{DateTime, Local};
use serde::Serialize;

use logmon_core::prelude::*;
use logmon_core::{SessionSnapshot, Statistics, StopReason};

/// Issues shown per list in the text summary
pub const SUMMARY_ISSUE_LIMIT: usize = 5;

/// Issues kept per list in the structured payload
pub const STRUCTURED_ISSUE_LIMIT: usize = 20;

/// Default character width for issue lines in the text summary
pub const DEFAULT_DISPLAY_WIDTH: usize = 120;

/// Machine-readable session report
#[derive(Debug, Clone, Serialize)]
pub struct StructuredReport {
    pub scope: String,
    pub app_package: Option<String>,
    pub device_serial: Option<String>,
    pub started_at: DateTime<Local>,
    pub stop_reason: StopReason,
    pub statistics: Statistics,
    pub errors: Vec<String>,
    pub warnings: Vec<String>,
    pub recent_raw_lines: Vec<String>,
}

/// Render the human-readable summary.
///
/// Issue lines are cut to `width` characters. With `verbose`, the recent raw
/// lines follow verbatim.
pub fn summarize(snapshot: &SessionSnapshot, verbose: bool, width: usize) -> String {
    let stats = &snapshot.statistics;
    let mut lines = vec![
        format!("Logs for: {}", snapshot.scope()),
        format!("Total lines: {}", stats.total_lines),
        format!(
            "Errors: {}, Warnings: {}, Info: {}, Debug: {}, Verbose: {}",
            stats.errors, stats.warnings, stats.info, stats.debug, stats.verbose
        ),
        format!("Stopped: {}", snapshot.stop_reason),
    ];

    if !snapshot.errors.is_empty() {
        lines.push(String::new());
        lines.push(format!("Top Errors ({}):", snapshot.errors.len()));
        lines.extend(
            snapshot
                .errors
                .iter()
                .take(SUMMARY_ISSUE_LIMIT)
                .map(|error| format!("  ❌ {}", truncate_chars(error, width))),
        );
    }

    if !snapshot.warnings.is_empty() {
        lines.push(String::new());
        lines.push(format!("Top Warnings ({}):", snapshot.warnings.len()));
        lines.extend(
            snapshot
                .warnings
                .iter()
                .take(SUMMARY_ISSUE_LIMIT)
                .map(|warning| format!("  ⚠️  {}", truncate_chars(warning, width))),
        );
    }

    if verbose && !snapshot.recent_raw_lines.is_empty() {
        lines.push(String::new());
        lines.push("=== Recent Log Lines ===".to_string());
        lines.extend(snapshot.recent_raw_lines.iter().cloned());
    }

    lines.join("\n")
}

/// Build the structured payload with capped issue lists
pub fn to_structured(snapshot: &SessionSnapshot) -> StructuredReport {
    StructuredReport {
        scope: snapshot.scope().to_string(),
        app_package: snapshot.app_package.clone(),
        device_serial: snapshot.device_serial.clone(),
        started_at: snapshot.started_at,
        stop_reason: snapshot.stop_reason,
        statistics: snapshot.statistics,
        errors: capped(&snapshot.errors, STRUCTURED_ISSUE_LIMIT),
        warnings: capped(&snapshot.warnings, STRUCTURED_ISSUE_LIMIT),
        recent_raw_lines: snapshot.recent_raw_lines.clone(),
    }
}

/// Pretty-printed JSON for the structured payload
pub fn to_json(snapshot: &SessionSnapshot) -> Result<String> {
    Ok(serde_json::to_string_pretty(&to_structured(snapshot))?)
}

/// Write the raw-line log and its JSON summary into `directory`.
///
/// Creates the directory if needed. Returns the path of the `.log` file; the
/// summary sits next to it as `<name>-summary.json`.
pub fn persist(snapshot: &SessionSnapshot, directory: &Path) -> Result<PathBuf> {
    std::fs::create_dir_all(directory)?;

    let base = artifact_base_name(snapshot);
    let log_path = directory.join(format!("{}.log", base));
    let summary_path = directory.join(format!("{}-summary.json", base));

    std::fs::write(&log_path, snapshot.recent_raw_lines.join("\n"))?;
    std::fs::write(&summary_path, to_json(snapshot)?)?;

    info!("Saved session artifacts to {}", log_path.display());
    Ok(log_path)
}

/// `<stem>-<YYYYmmdd-HHMMSS>` from the app package and session start
pub fn artifact_base_name(snapshot: &SessionSnapshot) -> String {
    let stem = snapshot
        .app_package
        .as_deref()
        .and_then(|pkg| pkg.rsplit('.').next())
        .filter(|s| !s.is_empty())
        .unwrap_or("device");
    format!("{}-{}", stem, snapshot.started_at.format("%Y%m%d-%H%M%S"))
}

fn capped(items: &[String], limit: usize) -> Vec<String> {
    items.iter().take(limit).cloned().collect()
}

fn truncate_chars(s: &str, width: usize) -> &str {
    match s.char_indices().nth(width) {
        Some((idx, _)) => &s[..idx],
        None => s,
    }
}
