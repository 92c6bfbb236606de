use std::sync::mpsc::{self, Sender};
use std::thread::{self, JoinHandle};

use anyhow::{Context, Result};
use log::debug;

/// Observes one cancellation request and runs a single shutdown action.
///
/// The action runs at most once, on the first SIGINT or the first
/// [`trigger`](Self::trigger) call; later deliveries are inert.
pub struct Shutdown {
    cancel_tx: Sender<()>,
    _watcher: JoinHandle<()>,
}

impl Shutdown {
    /// Spawn the watcher task that runs `on_cancel` once cancellation
    /// is requested.
    pub fn new(on_cancel: impl FnOnce() + Send + 'static) -> Self {
        let (cancel_tx, cancel_rx) = mpsc::channel();
        let watcher = thread::spawn(move || {
            if cancel_rx.recv().is_ok() {
                debug!("Cancellation requested, shutting down");
                on_cancel();
            }
        });
        Self {
            cancel_tx,
            _watcher: watcher,
        }
    }

    /// Register the SIGINT handler that requests cancellation.
    pub fn install_sigint(&self) -> Result<()> {
        let cancel_tx = self.cancel_tx.clone();
        ctrlc::set_handler(move || {
            let _ = cancel_tx.send(());
        })
        .context("Failed to register the SIGINT handler")
    }

    /// Request cancellation without a signal.
    pub fn trigger(&self) {
        let _ = self.cancel_tx.send(());
    }
}
