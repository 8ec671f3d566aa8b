//! Deduplicated currency to price lookup built from a raw observation batch.

use crate::core::price::PriceObservation;
use std::collections::BTreeMap;
use std::collections::btree_map;

/// The canonical observation per currency code.
///
/// A catalog is never edited in place. A new batch produces a new catalog,
/// which callers share as `Arc<PriceCatalog>` and swap wholesale.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PriceCatalog(BTreeMap<String, PriceObservation>);

impl PriceCatalog {
    /// Builds a catalog keeping, per currency, the observation with the
    /// latest timestamp; identical timestamps are decided by the higher price.
    pub fn build<I>(observations: I) -> Self
    where
        I: IntoIterator<Item = PriceObservation>,
    {
        let mut entries: BTreeMap<String, PriceObservation> = BTreeMap::new();
        for observation in observations {
            match entries.entry(observation.currency.clone()) {
                btree_map::Entry::Vacant(slot) => {
                    slot.insert(observation);
                }
                btree_map::Entry::Occupied(mut slot) => {
                    if observation.supersedes(slot.get()) {
                        slot.insert(observation);
                    }
                }
            }
        }
        Self(entries)
    }

    pub fn get(&self, currency: &str) -> Option<&PriceObservation> {
        self.0.get(currency)
    }

    /// Price of `currency`, if the catalog knows it.
    pub fn price(&self, currency: &str) -> Option<f64> {
        self.get(currency).map(|obs| obs.price)
    }

    /// Exact, case-sensitive membership test.
    pub fn contains(&self, currency: &str) -> bool {
        self.0.contains_key(currency)
    }

    /// Currency codes in alphabetical order.
    pub fn codes(&self) -> impl Iterator<Item = &str> {
        self.0.keys().map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = &PriceObservation> {
        self.0.values()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl FromIterator<PriceObservation> for PriceCatalog {
    fn from_iter<T: IntoIterator<Item = PriceObservation>>(iter: T) -> Self {
        Self::build(iter)
    }
}
