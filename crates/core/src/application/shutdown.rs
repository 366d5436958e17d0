// Shutdown Token
// One-shot, first-reason-wins shutdown broadcast shared by the signal handler,
// the panic hook and every long-running task.

use std::fmt;
use std::sync::Arc;
use tokio::sync::watch;

/// Why the launcher is shutting down
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ShutdownReason {
    /// Interrupt or termination signal
    Signal,
    /// Unrecoverable fault (panic)
    Fault(String),
}

impl ShutdownReason {
    /// Process exit status for this reason
    pub fn exit_code(&self) -> i32 {
        match self {
            ShutdownReason::Signal => 0,
            ShutdownReason::Fault(_) => 1,
        }
    }
}

impl fmt::Display for ShutdownReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ShutdownReason::Signal => f.write_str("signal"),
            ShutdownReason::Fault(msg) => write!(f, "fault: {}", msg),
        }
    }
}

/// Shutdown signal for graceful termination
#[derive(Clone)]
pub struct ShutdownToken {
    rx: watch::Receiver<Option<ShutdownReason>>,
}

impl ShutdownToken {
    /// Check if shutdown was requested
    pub fn is_shutdown(&self) -> bool {
        self.rx.borrow().is_some()
    }

    pub fn reason(&self) -> Option<ShutdownReason> {
        self.rx.borrow().clone()
    }

    /// Wait for the shutdown signal
    ///
    /// Returns None only if every sender was dropped without signalling.
    pub async fn wait(&mut self) -> Option<ShutdownReason> {
        match self.rx.wait_for(|reason| reason.is_some()).await {
            Ok(reason) => reason.clone(),
            Err(_) => None,
        }
    }
}

/// Shutdown sender
#[derive(Clone)]
pub struct ShutdownSender {
    tx: Arc<watch::Sender<Option<ShutdownReason>>>,
}

impl ShutdownSender {
    /// Request shutdown. Only the first request is recorded; returns whether
    /// this call was it.
    pub fn shutdown(&self, reason: ShutdownReason) -> bool {
        self.tx.send_if_modified(|current| {
            if current.is_some() {
                return false;
            }
            *current = Some(reason);
            true
        })
    }
}

/// Create a shutdown channel
pub fn shutdown_channel() -> (ShutdownSender, ShutdownToken) {
    let (tx, rx) = watch::channel(None);
    (ShutdownSender { tx: Arc::new(tx) }, ShutdownToken { rx })
}
