//! Stream controller
//!
//! Drives one monitoring run: launches the log source, dispatches each line
//! through parse, classify, severity gate and aggregation, enforces the stop
//! conditions and always terminates the source before returning.
//!
//! Lines are consumed one at a time from the source's bounded channel. The
//! read is raced against the cancel token and the optional deadline, so an
//! idle source cannot delay either. Clearing and starting the source are
//! raced against the cancel token as well.

use std::io::Write;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use tokio::time::Instant;

use crate::cancel::CancelToken;
use logmon_adb::{LogSource, SourceEvent, SourceRequest};
use logmon_core::prelude::*;
use logmon_core::{parse_line, LogRecord, Session, SessionSnapshot, SeverityFilter, StopReason};

/// Lifecycle of a [`StreamController`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ControllerState {
    Idle,
    Streaming,
    Completed,
    Cancelled,
    TimedOut,
    Failed,
}

impl ControllerState {
    pub fn is_terminal(&self) -> bool {
        !matches!(self, ControllerState::Idle | ControllerState::Streaming)
    }
}

impl From<StopReason> for ControllerState {
    fn from(reason: StopReason) -> Self {
        match reason {
            StopReason::NaturalEof => ControllerState::Completed,
            StopReason::DurationElapsed => ControllerState::TimedOut,
            StopReason::UserCancelled => ControllerState::Cancelled,
            StopReason::SourceError => ControllerState::Failed,
        }
    }
}

/// Validated settings for one run
#[derive(Debug, Clone, Default)]
pub struct MonitorConfig {
    /// Restrict to one app's process; `None` monitors everything
    pub app_package: Option<String>,
    pub device_serial: Option<String>,
    pub filter: SeverityFilter,
    /// Stop after this long; `None` runs until EOF or cancellation
    pub duration: Option<Duration>,
    /// Echo filtered lines to the live sink as they arrive
    pub follow: bool,
    /// Ask the source to drop buffered history before streaming
    pub clear_first: bool,
}

impl MonitorConfig {
    pub fn source_request(&self) -> SourceRequest {
        SourceRequest::new(self.app_package.clone(), self.filter.min_priority())
    }
}

/// Destination for follow-mode output
///
/// A write error means the reader has gone away; the controller stops
/// echoing and ends the run so the summary can still be produced.
pub trait LiveSink: Send {
    fn emit(&mut self, record: &LogRecord) -> Result<()>;
}

/// Writes each echoed line to stdout
#[derive(Debug, Default)]
pub struct StdoutSink;

impl LiveSink for StdoutSink {
    fn emit(&mut self, record: &LogRecord) -> Result<()> {
        let mut out = std::io::stdout().lock();
        writeln!(out, "{}", record.raw)?;
        Ok(())
    }
}

/// Collects echoed raw lines; clones share the same buffer
#[derive(Debug, Clone, Default)]
pub struct CollectingSink {
    lines: Arc<Mutex<Vec<String>>>,
}

impl CollectingSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn lines(&self) -> Vec<String> {
        self.lines.lock().map(|l| l.clone()).unwrap_or_default()
    }
}

impl LiveSink for CollectingSink {
    fn emit(&mut self, record: &LogRecord) -> Result<()> {
        if let Ok(mut lines) = self.lines.lock() {
            lines.push(record.raw.clone());
        }
        Ok(())
    }
}

/// Result of a finished run
#[derive(Debug)]
pub struct SessionOutcome {
    pub stop_reason: StopReason,
    /// Everything aggregated before the stop, also on failure
    pub snapshot: SessionSnapshot,
    /// Set when the run ended with [`StopReason::SourceError`]
    pub error: Option<Error>,
}

impl SessionOutcome {
    /// Outcome for a run whose source could not even be set up, such as
    /// when no adb executable is found. The snapshot is empty.
    pub fn launch_failed(config: &MonitorConfig, error: Error) -> Self {
        let session = Session::new(config.app_package.clone(), config.device_serial.clone());
        Self {
            stop_reason: StopReason::SourceError,
            snapshot: session.finalize(StopReason::SourceError),
            error: Some(error),
        }
    }

    pub fn state(&self) -> ControllerState {
        self.stop_reason.into()
    }

    pub fn is_failed(&self) -> bool {
        self.stop_reason == StopReason::SourceError
    }
}

pub struct StreamController<S: LogSource> {
    source: S,
    config: MonitorConfig,
    state: ControllerState,
    sink: Box<dyn LiveSink>,
    // Set once the live sink fails; echoing stops and the run ends
    sink_closed: bool,
}

impl<S: LogSource> StreamController<S> {
    pub fn new(source: S, config: MonitorConfig) -> Self {
        Self {
            source,
            config,
            state: ControllerState::Idle,
            sink: Box::new(StdoutSink),
            sink_closed: false,
        }
    }

    /// Replace the follow-mode sink (stdout by default)
    pub fn with_sink(mut self, sink: impl LiveSink + 'static) -> Self {
        self.sink = Box::new(sink);
        self
    }

    pub fn state(&self) -> ControllerState {
        self.state
    }

    pub fn config(&self) -> &MonitorConfig {
        &self.config
    }

    /// Run a full session until a stop condition fires.
    ///
    /// The source is terminated before this returns, whatever the outcome.
    pub async fn run(&mut self, mut cancel: CancelToken) -> SessionOutcome {
        self.state = ControllerState::Idle;
        self.sink_closed = false;
        let mut session = Session::new(
            self.config.app_package.clone(),
            self.config.device_serial.clone(),
        );

        let (stop_reason, error) = match self.stream(&mut session, &mut cancel).await {
            Ok(reason) => (reason, None),
            Err(e) => {
                error!("Log source failed: {}", e);
                (StopReason::SourceError, Some(e))
            }
        };

        if let Err(e) = self.source.terminate().await {
            warn!("Failed to terminate log source: {}", e);
        }

        self.state = stop_reason.into();
        info!(
            "Session ended ({}) after {} lines",
            stop_reason,
            session.statistics().total_lines
        );

        SessionOutcome {
            stop_reason,
            snapshot: session.finalize(stop_reason),
            error,
        }
    }

    async fn stream(
        &mut self,
        session: &mut Session,
        cancel: &mut CancelToken,
    ) -> Result<StopReason> {
        if self.config.clear_first {
            tokio::select! {
                biased;

                _ = cancel.cancelled() => {
                    info!("Cancellation requested while clearing");
                    return Ok(StopReason::UserCancelled);
                }

                cleared = self.source.clear() => {
                    if let Err(e) = cleared {
                        warn!("Failed to clear log buffer, continuing: {}", e);
                    }
                }
            }
        }

        let request = self.config.source_request();
        debug!("Starting log source: {:?}", request);
        let mut events = tokio::select! {
            biased;

            _ = cancel.cancelled() => {
                info!("Cancellation requested while starting");
                return Ok(StopReason::UserCancelled);
            }

            started = self.source.start(&request) => started?,
        };
        self.state = ControllerState::Streaming;

        let deadline = self.config.duration.map(|d| Instant::now() + d);

        loop {
            tokio::select! {
                biased;

                _ = cancel.cancelled() => {
                    info!("Cancellation requested");
                    return Ok(StopReason::UserCancelled);
                }

                _ = wait_until(deadline) => {
                    info!("Duration elapsed");
                    return Ok(StopReason::DurationElapsed);
                }

                event = events.recv() => match event {
                    Some(SourceEvent::Line(line)) => {
                        self.dispatch(session, &line);
                        if self.sink_closed {
                            return Ok(StopReason::UserCancelled);
                        }
                        if deadline.is_some_and(|d| Instant::now() >= d) {
                            info!("Duration elapsed");
                            return Ok(StopReason::DurationElapsed);
                        }
                    }
                    Some(SourceEvent::ReadFailed(message)) => {
                        return Err(Error::source_read(message));
                    }
                    None => {
                        info!("Log source reached end of stream");
                        return Ok(StopReason::NaturalEof);
                    }
                },
            }
        }
    }

    /// Handle one line: parse, gate on severity, echo, aggregate.
    ///
    /// Lines whose severity is excluded never reach the session. Raw-only
    /// lines are aggregated but not echoed. A line whose echo fails is still
    /// aggregated.
    pub fn dispatch(&mut self, session: &mut Session, line: &str) {
        if line.trim().is_empty() {
            return;
        }

        let record = parse_line(line);
        if let Some(severity) = record.severity() {
            if !self.config.filter.includes(severity) {
                trace!("Filtered {} line", severity);
                return;
            }
            if self.config.follow && !self.sink_closed {
                if let Err(e) = self.sink.emit(&record) {
                    warn!("Live output closed, stopping session: {}", e);
                    self.sink_closed = true;
                }
            }
        }

        session.record(record);
    }
}

async fn wait_until(deadline: Option<Instant>) {
    match deadline {
        Some(deadline) => tokio::time::sleep_until(deadline).await,
        None => std::future::pending().await,
    }
}
