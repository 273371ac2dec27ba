//! # logmon-adb - Log Source Process Management
//!
//! Launches and supervises the external process that produces log lines
//! (`adb logcat`), and exposes it to the stream controller through the
//! [`LogSource`] trait.
//!
//! Depends on [`logmon_core`] for domain types and error handling.
//!
//! ## Public API
//!
//! ### Source Seam
//! - [`LogSource`] - Clear / start / terminate contract used by the controller
//! - [`SourceRequest`] - App scope and priority threshold for a run
//! - [`SourceEvent`] - Line or read failure; channel close means end of stream
//!
//! ### Process Management
//! - [`SourceProcess`] - Spawn a child and stream its stdout line by line
//!
//! ### adb
//! - [`AdbLogcat`] - `adb logcat -v threadtime` with device and PID targeting
//! - [`locate_adb()`] - Find the adb executable
//! - [`build_adb_args()`] - `[-s SERIAL] op args...`

pub mod adb;
pub mod process;
pub mod source;
#[cfg(any(test, feature = "test-helpers"))]
pub mod test_utils;

pub use adb::{
    build_adb_args, locate_adb, parse_pidof_output, AdbLogcat, DEFAULT_SHUTDOWN_TIMEOUT,
};
pub use process::SourceProcess;
pub use source::{LocalLogSource, LogSource, SourceEvent, SourceRequest, DEFAULT_LINE_BUFFER};
