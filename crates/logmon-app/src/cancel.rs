//! Cancellation token for a monitoring run
//!
//! The caller owns a [`CancelHandle`] and hands the [`CancelToken`] to the
//! stream controller. Whatever notices a cancel request (an OS signal, a UI
//! action, a test) calls [`CancelHandle::cancel`]; the controller awaits
//! [`CancelToken::cancelled`] alongside its line reads.

use tokio::sync::watch;

/// Create a connected handle/token pair
pub fn cancel_pair() -> (CancelHandle, CancelToken) {
    let (tx, rx) = watch::channel(false);
    (CancelHandle { tx }, CancelToken { rx })
}

/// Requests cancellation. Cheap to clone.
#[derive(Debug, Clone)]
pub struct CancelHandle {
    tx: watch::Sender<bool>,
}

impl CancelHandle {
    pub fn cancel(&self) {
        // send_replace succeeds even when every token is gone
        self.tx.send_replace(true);
    }

    pub fn is_cancelled(&self) -> bool {
        *self.tx.borrow()
    }
}

/// Observes cancellation
#[derive(Debug, Clone)]
pub struct CancelToken {
    rx: watch::Receiver<bool>,
}

impl CancelToken {
    pub fn is_cancelled(&self) -> bool {
        *self.rx.borrow()
    }

    /// Resolve once cancellation has been requested.
    ///
    /// Never resolves if every handle is dropped without cancelling.
    pub async fn cancelled(&mut self) {
        if self.rx.wait_for(|cancelled| *cancelled).await.is_err() {
            std::future::pending::<()>().await;
        }
    }
}
