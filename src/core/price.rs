//! Price observation types and the feed abstraction

use anyhow::Result;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::Deserialize;

/// A single spot price for a currency, as reported by a feed at `observed_at`.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct PriceObservation {
    pub currency: String,
    #[serde(rename = "date")]
    pub observed_at: DateTime<Utc>,
    pub price: f64,
}

impl PriceObservation {
    pub fn new(currency: &str, observed_at: DateTime<Utc>, price: f64) -> Self {
        Self {
            currency: currency.to_string(),
            observed_at,
            price,
        }
    }

    /// Returns true if `self` is more authoritative than `other`: a later
    /// observation wins, and on identical timestamps the higher price wins.
    pub fn supersedes(&self, other: &PriceObservation) -> bool {
        self.observed_at > other.observed_at
            || (self.observed_at == other.observed_at && self.price > other.price)
    }
}

/// A source of raw price observations. Implementations are expected to drop
/// malformed entries before returning.
#[async_trait]
pub trait PriceFeed: Send + Sync {
    async fn fetch_observations(&self) -> Result<Vec<PriceObservation>>;
}
