//! OS signal handling for graceful shutdown

use crate::cancel::CancelHandle;
use logmon_core::prelude::*;

/// Cancel the running session when the process is asked to stop.
///
/// SIGINT and SIGTERM on Unix, Ctrl+C elsewhere.
pub fn spawn_signal_handler(handle: CancelHandle) {
    tokio::spawn(async move {
        match next_stop_signal().await {
            Ok(name) => {
                info!("Received {}, stopping session", name);
                handle.cancel();
            }
            Err(e) => error!("Signal handler error: {}", e),
        }
    });
}

#[cfg(unix)]
async fn next_stop_signal() -> Result<&'static str> {
    use tokio::signal::unix::{signal, SignalKind};

    let listen = |kind: SignalKind, name: &str| {
        signal(kind).map_err(|e| Error::terminal(format!("Cannot listen for {}: {}", name, e)))
    };
    let mut interrupt = listen(SignalKind::interrupt(), "SIGINT")?;
    let mut terminate = listen(SignalKind::terminate(), "SIGTERM")?;

    Ok(tokio::select! {
        _ = interrupt.recv() => "SIGINT",
        _ = terminate.recv() => "SIGTERM",
    })
}

#[cfg(not(unix))]
async fn next_stop_signal() -> Result<&'static str> {
    tokio::signal::ctrl_c()
        .await
        .map_err(|e| Error::terminal(format!("Cannot listen for Ctrl+C: {}", e)))?;
    Ok("Ctrl+C")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cancel::cancel_pair;
    use std::time::Duration;

    #[tokio::test]
    async fn test_handler_does_not_cancel_without_signal() {
        let (handle, token) = cancel_pair();
        spawn_signal_handler(handle);

        tokio::time::sleep(Duration::from_millis(10)).await;
        assert!(!token.is_cancelled());
    }
}
