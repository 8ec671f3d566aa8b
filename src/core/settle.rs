//! Cancellable debounce timer used by the selector controller.

use std::time::Duration;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::debug;

pub const DEFAULT_SETTLE_DELAY: Duration = Duration::from_millis(300);

/// Posted to the event loop when a selector's settle window elapses.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SettleTicket {
    pub selector: &'static str,
    pub generation: u64,
}

/// At most one pending timer per selector. Restarting or cancelling aborts
/// the previous task, and tickets from superseded generations are rejected
/// by [`SettleTimer::accept`].
pub struct SettleTimer {
    selector: &'static str,
    delay: Duration,
    tx: mpsc::UnboundedSender<SettleTicket>,
    pending: Option<JoinHandle<()>>,
    generation: u64,
}

impl SettleTimer {
    pub fn new(
        selector: &'static str,
        delay: Duration,
        tx: mpsc::UnboundedSender<SettleTicket>,
    ) -> Self {
        Self {
            selector,
            delay,
            tx,
            pending: None,
            generation: 0,
        }
    }

    /// Starts a fresh settle window, superseding any pending one.
    /// Must be called from within a tokio runtime.
    pub fn restart(&mut self) {
        self.cancel();
        self.generation += 1;

        let ticket = SettleTicket {
            selector: self.selector,
            generation: self.generation,
        };
        let delay = self.delay;
        let tx = self.tx.clone();
        self.pending = Some(tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            // The receiver is gone once the event loop has shut down.
            let _ = tx.send(ticket);
        }));
        debug!(selector = self.selector, generation = self.generation, "Settle timer started");
    }

    pub fn cancel(&mut self) {
        if let Some(handle) = self.pending.take() {
            handle.abort();
            debug!(selector = self.selector, generation = self.generation, "Settle timer cancelled");
        }
    }

    pub fn is_pending(&self) -> bool {
        self.pending.is_some()
    }

    /// Consumes `ticket` if it belongs to the currently pending window.
    pub fn accept(&mut self, ticket: SettleTicket) -> bool {
        if ticket.selector != self.selector
            || ticket.generation != self.generation
            || !self.is_pending()
        {
            debug!(?ticket, current = self.generation, "Ignoring stale settle ticket");
            return false;
        }
        self.pending = None;
        true
    }
}

impl Drop for SettleTimer {
    fn drop(&mut self) {
        self.cancel();
    }
}
