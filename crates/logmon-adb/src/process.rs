//! Line-streaming child process management

use std::ffi::OsStr;
use std::process::Stdio;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use tokio::io::{AsyncBufReadExt, AsyncRead, BufReader};
use tokio::process::{Child, Command};
use tokio::sync::{mpsc, oneshot, Notify};

use crate::source::SourceEvent;
use logmon_core::prelude::*;

/// Manages a child process whose stdout is a line stream.
///
/// The `Child` handle is moved into a dedicated `wait_for_exit` background task.
/// `SourceProcess` keeps a kill channel ([`kill_tx`]) to request termination,
/// an atomic flag ([`exited`]) for synchronous `has_exited()` checks, and a
/// [`Notify`] so `shutdown()` can await reaping without polling.
///
/// Stdout lines go to the bounded channel handed to [`SourceProcess::spawn`];
/// the channel closes when stdout reaches EOF.
pub struct SourceProcess {
    /// Process ID for logging
    pid: Option<u32>,
    /// One-shot sender that tells the wait task to kill the process.
    /// Consumed on first use (or on drop).
    kill_tx: Option<oneshot::Sender<()>>,
    /// Set to `true` by the wait task once the child has been reaped.
    exited: Arc<AtomicBool>,
    /// Notified by the wait task immediately after the child exits.
    exit_notify: Arc<Notify>,
}

impl SourceProcess {
    /// Spawn `program args...` and start streaming its stdout into `line_tx`
    pub fn spawn<S: AsRef<OsStr>>(
        program: impl AsRef<OsStr>,
        args: &[S],
        line_tx: mpsc::Sender<SourceEvent>,
    ) -> Result<Self> {
        let program = program.as_ref();
        info!(
            "Spawning log source: {} {}",
            program.to_string_lossy(),
            args.iter()
                .map(|a| a.as_ref().to_string_lossy())
                .collect::<Vec<_>>()
                .join(" ")
        );

        let mut child = Command::new(program)
            .args(args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true) // Critical: cleanup on drop
            .spawn()
            .map_err(|e| Error::source_launch(format!("{}: {}", program.to_string_lossy(), e)))?;

        let pid = child.id();
        info!("Log source started with PID: {:?}", pid);

        let stdout = child
            .stdout
            .take()
            .ok_or_else(|| Error::source_launch("stdout was not captured"))?;
        tokio::spawn(Self::stdout_reader(stdout, line_tx));

        let stderr = child
            .stderr
            .take()
            .ok_or_else(|| Error::source_launch("stderr was not captured"))?;
        tokio::spawn(Self::stderr_reader(stderr));

        let exited = Arc::new(AtomicBool::new(false));
        let exit_notify = Arc::new(Notify::new());

        // Kill channel: SourceProcess holds the sender, wait task holds the receiver.
        let (kill_tx, kill_rx) = oneshot::channel::<()>();

        tokio::spawn(Self::wait_for_exit(
            child,
            kill_rx,
            Arc::clone(&exited),
            Arc::clone(&exit_notify),
        ));

        Ok(Self {
            pid,
            kill_tx: Some(kill_tx),
            exited,
            exit_notify,
        })
    }

    /// Background task: owns `child`, waits for it to exit or be killed.
    async fn wait_for_exit(
        mut child: Child,
        kill_rx: oneshot::Receiver<()>,
        exited: Arc<AtomicBool>,
        exit_notify: Arc<Notify>,
    ) {
        tokio::select! {
            result = child.wait() => {
                match result {
                    Ok(status) => info!("Log source exited with status: {:?}", status),
                    Err(e) => error!("Error waiting for log source: {}", e),
                }
            }
            _ = kill_rx => {
                info!("Kill signal received, terminating log source");
                if let Err(e) = child.kill().await {
                    error!("Failed to kill log source: {}", e);
                }
                match child.wait().await {
                    Ok(status) => info!("Log source killed, exit status: {:?}", status),
                    Err(e) => error!("Error waiting after kill: {}", e),
                }
            }
        }

        // Mark as exited before waking waiters so `has_exited()` is already true
        exited.store(true, Ordering::Release);
        exit_notify.notify_waiters();
    }

    /// Forward stdout lines until EOF, a read error, or the consumer going away.
    ///
    /// Lines are decoded lossily so a stray non-UTF-8 byte cannot end the stream.
    async fn stdout_reader<R: AsyncRead + Unpin>(stdout: R, tx: mpsc::Sender<SourceEvent>) {
        let mut reader = BufReader::new(stdout);
        let mut buf = Vec::with_capacity(512);

        loop {
            buf.clear();
            match reader.read_until(b'\n', &mut buf).await {
                Ok(0) => break,
                Ok(_) => {
                    let line = String::from_utf8_lossy(trim_line_ending(&buf)).into_owned();
                    trace!("stdout: {}", line);
                    if tx.send(SourceEvent::Line(line)).await.is_err() {
                        debug!("line channel closed");
                        break;
                    }
                }
                Err(e) => {
                    warn!("Failed to read log source stdout: {}", e);
                    let _ = tx.send(SourceEvent::ReadFailed(e.to_string())).await;
                    break;
                }
            }
        }

        info!("stdout reader finished");
    }

    /// Log stderr lines; logcat reports device errors here
    async fn stderr_reader<R: AsyncRead + Unpin>(stderr: R) {
        let mut reader = BufReader::new(stderr).lines();

        while let Ok(Some(line)) = reader.next_line().await {
            warn!("log source stderr: {}", line);
        }

        debug!("stderr reader finished");
    }

    /// Terminate the process and wait until it has been reaped.
    ///
    /// Returns immediately if it already exited. Waits at most `timeout`
    /// after sending the kill signal.
    pub async fn shutdown(&mut self, timeout: Duration) -> Result<()> {
        // Create the `notified()` future before checking the flag so a
        // notification between the check and the await is not lost.
        let notified = self.exit_notify.notified();
        if self.has_exited() {
            debug!("Log source already exited");
            return Ok(());
        }

        if let Some(tx) = self.kill_tx.take() {
            // The wait task may already be finishing on its own
            let _ = tx.send(());
        }

        match tokio::time::timeout(timeout, notified).await {
            Ok(()) => {
                info!("Log source terminated");
                Ok(())
            }
            Err(_) => {
                warn!("Timeout waiting for log source {:?} to exit", self.pid);
                Err(Error::source_launch(format!(
                    "process {:?} did not exit within {:?}",
                    self.pid, timeout
                )))
            }
        }
    }

    /// Non-blocking check backed by the wait task's flag
    pub fn has_exited(&self) -> bool {
        self.exited.load(Ordering::Acquire)
    }

    pub fn id(&self) -> Option<u32> {
        self.pid
    }
}

impl Drop for SourceProcess {
    fn drop(&mut self) {
        if !self.has_exited() {
            warn!("SourceProcess dropped while process may still be running");
            if let Some(tx) = self.kill_tx.take() {
                let _ = tx.send(());
            }
        }
        // kill_on_drop(true) on the Child is the final safety net
        debug!("SourceProcess dropped");
    }
}

fn trim_line_ending(buf: &[u8]) -> &[u8] {
    let buf = buf.strip_suffix(b"\n").unwrap_or(buf);
    buf.strip_suffix(b"\r").unwrap_or(buf)
}
