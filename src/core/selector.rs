//! Controller for a free-text currency picker.
//!
//! The host owns the committed value; the controller owns what the user sees.
//! While the user is typing, external commits update the baseline but leave
//! the display alone, so a re-render never stomps on in-flight keystrokes.
//! The display converges back to a validated value on blur.

use crate::core::catalog::PriceCatalog;
use crate::core::settle::{SettleTicket, SettleTimer};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;
use tracing::debug;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    /// Display mirrors the committed value.
    Idle,
    /// Keys are going down; display tracks raw input.
    Editing,
    /// Last key released, settle timer pending.
    Settling,
}

/// Notifications for the host.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SelectorEvent {
    SelectionChanged(String),
    Blurred,
}

pub struct SelectorController {
    label: &'static str,
    committed: String,
    display: String,
    phase: Phase,
    catalog: Arc<PriceCatalog>,
    timer: SettleTimer,
}

impl SelectorController {
    pub fn new(
        label: &'static str,
        committed: &str,
        catalog: Arc<PriceCatalog>,
        settle_delay: Duration,
        settle_tx: mpsc::UnboundedSender<SettleTicket>,
    ) -> Self {
        Self {
            label,
            committed: committed.to_string(),
            display: committed.to_string(),
            phase: Phase::Idle,
            catalog,
            timer: SettleTimer::new(label, settle_delay, settle_tx),
        }
    }

    pub fn label(&self) -> &'static str {
        self.label
    }

    pub fn display_value(&self) -> &str {
        &self.display
    }

    pub fn committed_value(&self) -> &str {
        &self.committed
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn is_editing(&self) -> bool {
        self.phase != Phase::Idle
    }

    pub fn on_catalog_update(&mut self, catalog: Arc<PriceCatalog>) {
        self.catalog = catalog;
    }

    /// The host changed the committed value.
    pub fn set_committed(&mut self, value: &str) {
        if self.committed == value {
            return;
        }
        self.committed = value.to_string();
        if self.phase == Phase::Idle {
            self.display = value.to_string();
        } else {
            debug!(
                selector = self.label,
                committed = value,
                "Deferring display sync while editing"
            );
        }
    }

    pub fn key_down(&mut self) {
        self.timer.cancel();
        self.phase = Phase::Editing;
    }

    /// Raw text from the input widget.
    pub fn text_input(&mut self, text: &str) {
        if self.phase == Phase::Idle {
            return;
        }
        self.display = text.to_string();
        if self.catalog.contains(text) {
            debug!(selector = self.label, currency = text, "Typed a known currency");
            self.phase = Phase::Idle;
        }
    }

    pub fn key_up(&mut self) {
        if self.phase == Phase::Idle {
            return;
        }
        self.phase = Phase::Settling;
        self.timer.restart();
    }

    /// Handles a settle ticket addressed to this selector.
    pub fn on_settled(&mut self, ticket: SettleTicket) {
        if self.timer.accept(ticket) && self.phase == Phase::Settling {
            debug!(selector = self.label, display = %self.display, "Edit settled");
            self.phase = Phase::Idle;
        }
    }

    /// Focus loss. Emits a selection change for a known, different code and
    /// otherwise reverts the display; `Blurred` always comes last.
    pub fn blur(&mut self) -> Vec<SelectorEvent> {
        self.timer.cancel();
        self.phase = Phase::Idle;

        let mut events = Vec::with_capacity(2);
        if self.catalog.contains(&self.display) && self.display != self.committed {
            debug!(selector = self.label, currency = %self.display, "Committing typed currency");
            events.push(SelectorEvent::SelectionChanged(self.display.clone()));
        } else {
            if self.display != self.committed {
                debug!(
                    selector = self.label,
                    rejected = %self.display,
                    "Reverting to committed currency"
                );
            }
            self.display = self.committed.clone();
        }
        events.push(SelectorEvent::Blurred);
        events
    }

    /// A pick from the suggestion list bypasses blur validation.
    pub fn select(&mut self, code: &str) -> SelectorEvent {
        self.timer.cancel();
        self.phase = Phase::Idle;
        self.display = code.to_string();
        SelectorEvent::SelectionChanged(code.to_string())
    }

    /// Snaps an idle display back to the committed value. Used by the host
    /// after it has had the chance to reject a selection.
    pub fn resync_display(&mut self) {
        if self.phase == Phase::Idle && self.display != self.committed {
            debug!(
                selector = self.label,
                display = %self.display,
                committed = %self.committed,
                "Resyncing display"
            );
            self.display = self.committed.clone();
        }
    }

    /// Catalog codes matching the current text, for the dropdown.
    pub fn suggestions(&self) -> Vec<&str> {
        if self.display.is_empty() || self.display == self.committed {
            return self.catalog.codes().collect();
        }
        let needle = self.display.to_lowercase();
        self.catalog
            .codes()
            .filter(|code| code.to_lowercase().contains(&needle))
            .collect()
    }
}
