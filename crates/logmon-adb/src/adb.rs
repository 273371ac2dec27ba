//! `adb logcat` as a log source
//!
//! Builds adb command lines with optional device targeting, resolves an app
//! package to its PID with `pidof`, and streams `logcat -v threadtime` through
//! a [`SourceProcess`].

use std::path::{Path, PathBuf};
use std::time::Duration;

use tokio::process::Command;
use tokio::sync::mpsc;

use crate::process::SourceProcess;
use crate::source::{LogSource, SourceEvent, SourceRequest, DEFAULT_LINE_BUFFER};
use logmon_core::prelude::*;

/// Grace period for the logcat client to exit after being killed
pub const DEFAULT_SHUTDOWN_TIMEOUT: Duration = Duration::from_secs(2);

/// Build an adb argument list: `[-s SERIAL] <operation> <args...>`.
///
/// The `-s` flag is omitted without a serial so adb picks its default device.
pub fn build_adb_args(serial: Option<&str>, operation: &str, args: &[&str]) -> Vec<String> {
    let mut cmd = Vec::with_capacity(args.len() + 3);
    if let Some(serial) = serial {
        cmd.push("-s".to_string());
        cmd.push(serial.to_string());
    }
    cmd.push(operation.to_string());
    cmd.extend(args.iter().map(|a| a.to_string()));
    cmd
}

/// First PID in `pidof` output, if any
pub fn parse_pidof_output(output: &str) -> Option<String> {
    output
        .split_whitespace()
        .find(|token| token.chars().all(|c| c.is_ascii_digit()))
        .map(str::to_string)
}

/// Locate the adb executable: explicit path first, then `PATH`
pub fn locate_adb(explicit: Option<&Path>) -> Result<PathBuf> {
    if let Some(path) = explicit {
        return if path.exists() {
            Ok(path.to_path_buf())
        } else {
            warn!("Configured adb path does not exist: {}", path.display());
            Err(Error::AdbNotFound)
        };
    }

    which::which("adb").map_err(|e| {
        debug!("adb lookup on PATH failed: {}", e);
        Error::AdbNotFound
    })
}

/// Android device log stream via `adb logcat`
pub struct AdbLogcat {
    adb: PathBuf,
    serial: Option<String>,
    line_buffer: usize,
    shutdown_timeout: Duration,
    process: Option<SourceProcess>,
}

impl AdbLogcat {
    pub fn new(adb: impl Into<PathBuf>, serial: Option<String>) -> Self {
        Self {
            adb: adb.into(),
            serial,
            line_buffer: DEFAULT_LINE_BUFFER,
            shutdown_timeout: DEFAULT_SHUTDOWN_TIMEOUT,
            process: None,
        }
    }

    /// Capacity of the bounded queue between the stdout reader and consumer
    pub fn with_line_buffer(mut self, line_buffer: usize) -> Self {
        self.line_buffer = line_buffer.max(1);
        self
    }

    pub fn with_shutdown_timeout(mut self, timeout: Duration) -> Self {
        self.shutdown_timeout = timeout;
        self
    }

    pub fn serial(&self) -> Option<&str> {
        self.serial.as_deref()
    }

    fn args(&self, operation: &str, args: &[&str]) -> Vec<String> {
        build_adb_args(self.serial.as_deref(), operation, args)
    }

    /// Arguments for the streaming logcat invocation
    pub fn logcat_args(&self, request: &SourceRequest, pid: Option<&str>) -> Vec<String> {
        let pid_arg = pid.map(|p| format!("--pid={}", p));
        let threshold = format!("*:{}", request.min_priority.as_char());

        let mut args = vec!["-v", "threadtime"];
        if let Some(pid_arg) = &pid_arg {
            args.push(pid_arg);
        }
        args.push(&threshold);

        self.args("logcat", &args)
    }

    /// Run a short adb command to completion and return its stdout
    async fn run_to_completion(&self, args: Vec<String>) -> Result<String> {
        let output = Command::new(&self.adb)
            .args(&args)
            .kill_on_drop(true)
            .output()
            .await
            .map_err(|e| Error::source_launch(format!("adb {}: {}", args.join(" "), e)))?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(Error::source_launch(format!(
                "adb {} failed: {}",
                args.join(" "),
                stderr.trim()
            )));
        }

        Ok(String::from_utf8_lossy(&output.stdout).into_owned())
    }

    /// PID of a running app, `None` if it is not running
    async fn resolve_pid(&self, package: &str) -> Option<String> {
        let args = self.args("shell", &["pidof", package]);
        match self.run_to_completion(args).await {
            Ok(stdout) => {
                let pid = parse_pidof_output(&stdout);
                if pid.is_none() {
                    warn!("{} is not running, streaming without PID filter", package);
                }
                pid
            }
            Err(e) => {
                // pidof exits non-zero when nothing matches
                warn!("Could not resolve PID for {}: {}", package, e);
                None
            }
        }
    }
}

impl LogSource for AdbLogcat {
    async fn clear(&mut self) -> Result<()> {
        info!("Clearing logcat buffer");
        self.run_to_completion(self.args("logcat", &["-c"]))
            .await
            .map(|_| ())
    }

    async fn start(&mut self, request: &SourceRequest) -> Result<mpsc::Receiver<SourceEvent>> {
        let pid = match &request.app_package {
            Some(package) => self.resolve_pid(package).await,
            None => None,
        };

        let args = self.logcat_args(request, pid.as_deref());
        let (tx, rx) = mpsc::channel(self.line_buffer);

        let process = SourceProcess::spawn(&self.adb, args.as_slice(), tx)?;
        self.process = Some(process);
        Ok(rx)
    }

    async fn terminate(&mut self) -> Result<()> {
        match self.process.take() {
            Some(mut process) => process.shutdown(self.shutdown_timeout).await,
            None => Ok(()),
        }
    }
}
