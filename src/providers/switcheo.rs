use anyhow::{Context, Result, anyhow};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::Deserialize;
use serde_json::Value;
use std::time::Duration;
use tracing::{debug, instrument, warn};

use crate::core::price::{PriceFeed, PriceObservation};
use crate::providers::util::with_retry;

const PRICES_PATH: &str = "/prices.json";

/// Spot prices from the Switcheo `prices.json` endpoint.
pub struct SwitcheoPriceFeed {
    base_url: String,
}

impl SwitcheoPriceFeed {
    pub fn new(base_url: &str) -> Self {
        SwitcheoPriceFeed {
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }
}

#[derive(Deserialize, Debug)]
struct PriceEntry {
    currency: Option<String>,
    date: Option<String>,
    price: Option<f64>,
}

/// Validation boundary: anything that cannot become a well-formed
/// observation is dropped here rather than reaching the catalog.
fn parse_entry(value: Value) -> Result<PriceObservation> {
    let entry: PriceEntry = serde_json::from_value(value)?;
    let currency = entry
        .currency
        .filter(|c| !c.trim().is_empty())
        .ok_or_else(|| anyhow!("missing currency"))?;
    let date = entry.date.ok_or_else(|| anyhow!("missing date for {currency}"))?;
    let observed_at = DateTime::parse_from_rfc3339(&date)
        .with_context(|| format!("bad date '{date}' for {currency}"))?
        .with_timezone(&Utc);
    let price = entry
        .price
        .filter(|p| p.is_finite())
        .ok_or_else(|| anyhow!("missing or non-finite price for {currency}"))?;

    Ok(PriceObservation {
        currency,
        observed_at,
        price,
    })
}

#[async_trait]
impl PriceFeed for SwitcheoPriceFeed {
    #[instrument(name = "SwitcheoPriceFetch", skip(self), fields(base_url = %self.base_url))]
    async fn fetch_observations(&self) -> Result<Vec<PriceObservation>> {
        let url = format!("{}{}", self.base_url, PRICES_PATH);
        debug!("Requesting prices from {}", url);

        let client = reqwest::Client::builder().user_agent("xswap/0.1").build()?;
        let response = with_retry(
            "prices",
            || async { client.get(&url).send().await },
            3,
            Duration::from_millis(500),
        )
        .await
        .with_context(|| format!("Request error for prices URL: {url}"))?;

        if !response.status().is_success() {
            return Err(anyhow!("HTTP error: {} for prices URL: {}", response.status(), url));
        }

        let text = response.text().await?;
        let entries: Vec<Value> = serde_json::from_str(&text)
            .map_err(|e| anyhow!("Failed to parse prices response from {}: {}", url, e))?;

        let total = entries.len();
        let observations: Vec<PriceObservation> = entries
            .into_iter()
            .filter_map(|value| match parse_entry(value) {
                Ok(obs) => Some(obs),
                Err(e) => {
                    warn!("Skipping malformed price entry: {e:#}");
                    None
                }
            })
            .collect();

        debug!(total, kept = observations.len(), "Parsed price entries");
        Ok(observations)
    }
}
