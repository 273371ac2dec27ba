//! # logmon-app - Monitoring Session Orchestration
//!
//! Runs a monitoring session end to end: takes a validated [`MonitorConfig`],
//! drives a [`logmon_adb::LogSource`] through the [`StreamController`] state
//! machine, and renders the finished session as text, JSON or saved files.
//!
//! ## Public API
//!
//! ### Controller
//! - [`StreamController`] - `Idle -> Streaming -> {Completed, Cancelled, TimedOut, Failed}`
//! - [`MonitorConfig`] - Scope, severity filter, duration and follow settings
//! - [`SessionOutcome`] - Stop reason, snapshot and surfaced error
//! - [`LiveSink`] - Follow-mode output
//!
//! ### Cancellation
//! - [`cancel_pair()`] - Handle/token pair passed into the controller
//! - [`spawn_signal_handler()`] - SIGINT/SIGTERM to cancellation
//!
//! ### Reporting
//! - [`report::summarize()`], [`report::to_structured()`], [`report::persist()`]
//!
//! ### Configuration
//! - [`config::Settings`] - `config.toml` contents

pub mod cancel;
pub mod config;
pub mod controller;
pub mod report;
pub mod signals;

pub use cancel::{cancel_pair, CancelHandle, CancelToken};
pub use controller::{
    CollectingSink, ControllerState, LiveSink, MonitorConfig, SessionOutcome, StdoutSink,
    StreamController,
};
pub use report::{persist, summarize, to_json, to_structured, StructuredReport};
pub use signals::spawn_signal_handler;
