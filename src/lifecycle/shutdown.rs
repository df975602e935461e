//! Shutdown coordination for the panel.

use tokio::sync::broadcast;
use tokio::task::JoinHandle;

use crate::lifecycle::signals::shutdown_signal;

/// Coordinator for graceful shutdown.
///
/// Provides a broadcast channel that the HTTP server and any other
/// long-running task can subscribe to.
pub struct Shutdown {
    tx: broadcast::Sender<()>,
}

impl Shutdown {
    pub fn new() -> Self {
        let (tx, _) = broadcast::channel(1);
        Self { tx }
    }

    /// Subscribe to the shutdown signal.
    pub fn subscribe(&self) -> broadcast::Receiver<()> {
        self.tx.subscribe()
    }

    /// Trigger the shutdown signal.
    pub fn trigger(&self) {
        let _ = self.tx.send(());
    }

    /// Trigger shutdown when SIGINT or SIGTERM arrives.
    pub fn trigger_on_signal(&self) -> JoinHandle<()> {
        let tx = self.tx.clone();
        tokio::spawn(async move {
            shutdown_signal().await;
            let _ = tx.send(());
        })
    }
}

impl Default for Shutdown {
    fn default() -> Self {
        Self::new()
    }
}

/// Resolve once shutdown has been triggered (or every sender is gone).
pub async fn wait_for(mut rx: broadcast::Receiver<()>) {
    let _ = rx.recv().await;
}
