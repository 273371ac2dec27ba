//! # logmon-core - Core Domain Types
//!
//! Foundation crate for logcat-monitor. Provides the log record model, the
//! logcat line parser, severity classification, signature deduplication and
//! the per-run session aggregator.
//!
//! This crate has **zero internal dependencies** -- it only depends on external
//! crates (serde, chrono, thiserror, regex, tracing).
//!
//! ## Public API
//!
//! ### Record Model (`record`)
//! - [`LogRecord`] - One input line, structured or raw-only
//! - [`PriorityCode`] - Raw logcat priority letter (`V D I W E F`)
//! - [`Severity`] - Severity tier (verbose, debug, info, warning, error)
//!
//! ### Parsing and Classification
//! - [`parse_line()`] - Total parser for the logcat `threadtime` shape
//! - [`classify()`] - Priority letter to severity tier
//! - [`SeverityFilter`] - Set of severities plus the logcat threshold covering it
//! - [`parse_duration_expr()`] - `30s` / `5m` / `1h` grammar
//!
//! ### Aggregation
//! - [`Signature`], [`Deduplicator`] - Numeral-invariant message keys
//! - [`Session`] - Live counters, top issues and recent lines
//! - [`SessionSnapshot`] - Frozen session for reporting
//! - [`StopReason`] - Why a session ended
//!
//! ### Error Handling (`error`)
//! - [`Error`] - Error enum with `fatal` vs `recoverable` classification
//! - [`Result`] - Type alias for `std::result::Result<T, Error>`
//! - [`ResultExt`] - Extension trait for adding error context
//!
//! ## Prelude
//!
//! ```rust
//! use logmon_core::prelude::*;
//! ```

pub mod duration;
pub mod error;
pub mod logging;
pub mod parser;
pub mod record;
pub mod ring_buffer;
pub mod session;
pub mod severity;
pub mod signature;

/// Prelude for common imports used throughout all logcat-monitor crates
pub mod prelude {
    pub use super::error::{Error, Result, ResultExt};
    pub use tracing::{debug, error, info, instrument, trace, warn};
}

pub use duration::parse_duration_expr;
pub use error::{Error, Result, ResultExt};
pub use parser::parse_line;
pub use record::{LogFields, LogRecord, PriorityCode, Severity};
pub use ring_buffer::RingBuffer;
pub use session::{
    Session, SessionSnapshot, Statistics, StopReason, RECENT_INFO_CAP, RECENT_RAW_LINES_CAP,
};
pub use severity::{classify, SeverityFilter};
pub use signature::{Deduplicator, Signature};
