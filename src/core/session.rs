//! Wires the swap form to its two currency selectors.

use crate::core::catalog::PriceCatalog;
use crate::core::form::{FormField, Quote, SwapForm};
use crate::core::selector::{SelectorController, SelectorEvent};
use crate::core::settle::SettleTicket;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;
use tracing::debug;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Side {
    From,
    To,
}

impl Side {
    pub fn field(self) -> FormField {
        match self {
            Side::From => FormField::FromCurrency,
            Side::To => FormField::ToCurrency,
        }
    }
}

pub struct SwapSession {
    form: SwapForm,
    from: SelectorController,
    to: SelectorController,
}

impl SwapSession {
    pub fn new(
        catalog: Arc<PriceCatalog>,
        settle_delay: Duration,
        settle_tx: mpsc::UnboundedSender<SettleTicket>,
    ) -> Self {
        let form = SwapForm::new(Arc::clone(&catalog));
        let from = SelectorController::new(
            "from",
            form.from_currency(),
            Arc::clone(&catalog),
            settle_delay,
            settle_tx.clone(),
        );
        let to = SelectorController::new(
            "to",
            form.to_currency(),
            catalog,
            settle_delay,
            settle_tx,
        );
        Self { form, from, to }
    }

    pub fn form(&self) -> &SwapForm {
        &self.form
    }

    pub fn selector(&self, side: Side) -> &SelectorController {
        match side {
            Side::From => &self.from,
            Side::To => &self.to,
        }
    }

    fn selector_mut(&mut self, side: Side) -> &mut SelectorController {
        match side {
            Side::From => &mut self.from,
            Side::To => &mut self.to,
        }
    }

    /// Pushes the form's committed values down to the selectors.
    fn sync_committed(&mut self) {
        self.from.set_committed(self.form.from_currency());
        self.to.set_committed(self.form.to_currency());
    }

    pub fn on_catalog_update(&mut self, catalog: Arc<PriceCatalog>) {
        debug!(currencies = catalog.len(), "Catalog updated");
        self.from.on_catalog_update(Arc::clone(&catalog));
        self.to.on_catalog_update(Arc::clone(&catalog));
        self.form.on_catalog_update(catalog);
        self.sync_committed();
    }

    pub fn key_down(&mut self, side: Side) {
        self.selector_mut(side).key_down();
    }

    pub fn text_input(&mut self, side: Side, text: &str) {
        self.selector_mut(side).text_input(text);
    }

    pub fn key_up(&mut self, side: Side) {
        self.selector_mut(side).key_up();
    }

    pub fn on_settled(&mut self, ticket: SettleTicket) {
        if ticket.selector == self.from.label() {
            self.from.on_settled(ticket);
        } else if ticket.selector == self.to.label() {
            self.to.on_settled(ticket);
        }
    }

    pub fn blur(&mut self, side: Side) {
        let events = self.selector_mut(side).blur();
        self.apply(side, events);
    }

    pub fn select(&mut self, side: Side, code: &str) {
        let event = self.selector_mut(side).select(code);
        self.apply(side, vec![event]);
    }

    fn apply(&mut self, side: Side, events: Vec<SelectorEvent>) {
        for event in events {
            match event {
                SelectorEvent::SelectionChanged(code) => {
                    self.form.change_currency(side.field(), &code);
                }
                SelectorEvent::Blurred => self.form.touch(side.field()),
            }
        }
        self.sync_committed();
        self.selector_mut(side).resync_display();
    }

    pub fn set_amount(&mut self, amount: &str) {
        self.form.set_amount(amount);
    }

    pub fn blur_amount(&mut self) {
        self.form.touch(FormField::Amount);
    }

    pub fn swap(&mut self) {
        self.form.swap();
        self.sync_committed();
    }

    pub fn quote(&self) -> Option<Quote> {
        self.form.quote()
    }
}
