//! Test log sources
//!
//! - [`ScriptSource`] runs a real `sh -c` child process through
//!   [`SourceProcess`], so process lifecycle is exercised end to end.
//! - [`ChannelSource`] feeds canned lines through the channel without any
//!   process, for fast deterministic controller tests.

use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use tokio::sync::mpsc;

use crate::process::SourceProcess;
use crate::source::{LogSource, SourceEvent, SourceRequest};
use logmon_core::prelude::*;

/// A source backed by `sh -c <script>`; stdout lines are the log stream.
pub struct ScriptSource {
    script: String,
    process: Option<SourceProcess>,
    pid: Arc<Mutex<Option<u32>>>,
    clear_calls: Arc<AtomicUsize>,
}

impl ScriptSource {
    pub fn new(script: impl Into<String>) -> Self {
        Self {
            script: script.into(),
            process: None,
            pid: Arc::new(Mutex::new(None)),
            clear_calls: Arc::new(AtomicUsize::new(0)),
        }
    }

    /// Shared cell holding the child PID once started
    pub fn pid_handle(&self) -> Arc<Mutex<Option<u32>>> {
        Arc::clone(&self.pid)
    }

    /// Shared counter of `clear()` calls
    pub fn clear_counter(&self) -> Arc<AtomicUsize> {
        Arc::clone(&self.clear_calls)
    }
}

impl LogSource for ScriptSource {
    async fn clear(&mut self) -> Result<()> {
        self.clear_calls.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }

    async fn start(&mut self, _request: &SourceRequest) -> Result<mpsc::Receiver<SourceEvent>> {
        let (tx, rx) = mpsc::channel(64);
        let process = SourceProcess::spawn("sh", &["-c", self.script.as_str()], tx)?;
        if let Ok(mut pid) = self.pid.lock() {
            *pid = process.id();
        }
        self.process = Some(process);
        Ok(rx)
    }

    async fn terminate(&mut self) -> Result<()> {
        match self.process.take() {
            Some(mut process) => process.shutdown(Duration::from_secs(2)).await,
            None => Ok(()),
        }
    }
}

/// A process-free source that replays canned events.
pub struct ChannelSource {
    events: Vec<SourceEvent>,
    hold_open: bool,
    launch_error: Option<String>,
    clear_error: Option<String>,
    stall_clear: bool,
    stall_start: bool,
    // Kept alive while `hold_open` so the stream looks idle instead of ended
    open_tx: Option<mpsc::Sender<SourceEvent>>,
    requests: Arc<Mutex<Vec<SourceRequest>>>,
    cleared: Arc<AtomicBool>,
    terminated: Arc<AtomicBool>,
}

impl ChannelSource {
    /// Replay `lines`, then end the stream
    pub fn from_lines<I, S>(lines: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            events: lines
                .into_iter()
                .map(|l| SourceEvent::Line(l.into()))
                .collect(),
            hold_open: false,
            launch_error: None,
            clear_error: None,
            stall_clear: false,
            stall_start: false,
            open_tx: None,
            requests: Arc::new(Mutex::new(Vec::new())),
            cleared: Arc::new(AtomicBool::new(false)),
            terminated: Arc::new(AtomicBool::new(false)),
        }
    }

    /// Keep the stream open and silent after the canned lines
    pub fn hold_open(mut self) -> Self {
        self.hold_open = true;
        self
    }

    /// Deliver a read failure after the canned lines
    pub fn then_read_error(mut self, message: impl Into<String>) -> Self {
        self.events.push(SourceEvent::ReadFailed(message.into()));
        self
    }

    /// Make `start()` fail
    pub fn failing_launch(mut self, reason: impl Into<String>) -> Self {
        self.launch_error = Some(reason.into());
        self
    }

    /// Make `clear()` fail
    pub fn failing_clear(mut self, reason: impl Into<String>) -> Self {
        self.clear_error = Some(reason.into());
        self
    }

    /// Make `clear()` wait forever, like adb waiting for a device
    pub fn stalled_clear(mut self) -> Self {
        self.stall_clear = true;
        self
    }

    /// Make `start()` wait forever
    pub fn stalled_start(mut self) -> Self {
        self.stall_start = true;
        self
    }

    /// Requests passed to `start()`
    pub fn requests(&self) -> Arc<Mutex<Vec<SourceRequest>>> {
        Arc::clone(&self.requests)
    }

    pub fn cleared_flag(&self) -> Arc<AtomicBool> {
        Arc::clone(&self.cleared)
    }

    pub fn terminated_flag(&self) -> Arc<AtomicBool> {
        Arc::clone(&self.terminated)
    }
}

impl LogSource for ChannelSource {
    async fn clear(&mut self) -> Result<()> {
        if self.stall_clear {
            std::future::pending::<()>().await;
        }
        if let Some(reason) = &self.clear_error {
            return Err(Error::source_launch(reason.clone()));
        }
        self.cleared.store(true, Ordering::SeqCst);
        Ok(())
    }

    async fn start(&mut self, request: &SourceRequest) -> Result<mpsc::Receiver<SourceEvent>> {
        if let Ok(mut requests) = self.requests.lock() {
            requests.push(request.clone());
        }
        if self.stall_start {
            std::future::pending::<()>().await;
        }
        if let Some(reason) = &self.launch_error {
            return Err(Error::source_launch(reason.clone()));
        }

        let (tx, rx) = mpsc::channel(self.events.len().max(1));
        for event in self.events.drain(..) {
            tx.try_send(event)
                .map_err(|_| Error::source_launch("test channel full"))?;
        }
        if self.hold_open {
            self.open_tx = Some(tx);
        }
        Ok(rx)
    }

    async fn terminate(&mut self) -> Result<()> {
        self.open_tx = None;
        self.terminated.store(true, Ordering::SeqCst);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use logmon_core::PriorityCode;

    fn request() -> SourceRequest {
        SourceRequest::new(None, PriorityCode::Debug)
    }

    #[tokio::test]
    async fn test_channel_source_replays_then_closes() {
        let mut source = ChannelSource::from_lines(["a", "b"]);
        let mut rx = source.start(&request()).await.unwrap();
        assert_eq!(rx.recv().await, Some(SourceEvent::Line("a".to_string())));
        assert_eq!(rx.recv().await, Some(SourceEvent::Line("b".to_string())));
        assert_eq!(rx.recv().await, None);
    }

    #[tokio::test]
    async fn test_channel_source_hold_open_stays_silent() {
        let mut source = ChannelSource::from_lines(Vec::<String>::new()).hold_open();
        let mut rx = source.start(&request()).await.unwrap();
        let idle = tokio::time::timeout(Duration::from_millis(50), rx.recv()).await;
        assert!(idle.is_err(), "held-open source should not close");

        source.terminate().await.unwrap();
        assert_eq!(rx.recv().await, None);
    }

    #[tokio::test]
    async fn test_channel_source_stalled_clear_never_resolves() {
        let mut source = ChannelSource::from_lines(["a"]).stalled_clear();
        let clear = tokio::time::timeout(Duration::from_millis(50), source.clear()).await;
        assert!(clear.is_err());
        assert!(!source.cleared_flag().load(Ordering::SeqCst));
    }

    #[tokio::test]
    async fn test_script_source_records_pid() {
        let mut source = ScriptSource::new("echo hi");
        let pid = source.pid_handle();
        let mut rx = source.start(&request()).await.unwrap();
        assert_eq!(rx.recv().await, Some(SourceEvent::Line("hi".to_string())));
        assert!(pid.lock().unwrap().is_some());
        source.terminate().await.unwrap();
    }
}
