//! Keeps a shared price catalog fresh by polling a [`PriceFeed`].

use crate::core::catalog::PriceCatalog;
use crate::core::price::PriceFeed;
use anyhow::{Result, anyhow};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::Instant;
use tracing::{debug, info, warn};

/// Fetches one batch and builds a catalog from it.
pub async fn load_catalog(feed: &dyn PriceFeed) -> Result<PriceCatalog> {
    let observations = feed.fetch_observations().await?;
    let catalog = PriceCatalog::build(observations);
    debug!(currencies = catalog.len(), "Built price catalog");
    Ok(catalog)
}

/// A background poller publishing each rebuilt catalog on a watch channel.
///
/// Subscribers see `None` until the first successful fetch. A failed refresh
/// leaves the last published catalog in place. Dropping the `CatalogFeed`
/// stops polling.
pub struct CatalogFeed {
    rx: watch::Receiver<Option<Arc<PriceCatalog>>>,
    handle: JoinHandle<()>,
}

impl CatalogFeed {
    /// Starts from an already loaded catalog; the first poll happens one
    /// `interval` later.
    pub fn seeded(initial: Arc<PriceCatalog>, feed: Arc<dyn PriceFeed>, interval: Duration) -> Self {
        Self::start(feed, interval, Some(initial), Instant::now() + interval)
    }

    fn start(
        feed: Arc<dyn PriceFeed>,
        interval: Duration,
        initial: Option<Arc<PriceCatalog>>,
        first_poll: Instant,
    ) -> Self {
        let (tx, rx) = watch::channel(initial);
        let handle = tokio::spawn(async move {
            let mut ticker = tokio::time::interval_at(first_poll, interval);
            ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);
            loop {
                ticker.tick().await;
                match load_catalog(feed.as_ref()).await {
                    Ok(catalog) => {
                        info!(currencies = catalog.len(), "Price catalog refreshed");
                        if tx.send(Some(Arc::new(catalog))).is_err() {
                            debug!("No catalog subscribers left, stopping refresh");
                            break;
                        }
                    }
                    Err(e) => warn!("Price refresh failed, keeping previous catalog: {e:#}"),
                }
            }
        });
        Self { rx, handle }
    }

    pub fn subscribe(&self) -> watch::Receiver<Option<Arc<PriceCatalog>>> {
        self.rx.clone()
    }

    /// Waits for the first catalog to arrive.
    pub async fn first(&self) -> Result<Arc<PriceCatalog>> {
        let mut rx = self.subscribe();
        let catalog = rx
            .wait_for(Option::is_some)
            .await
            .map_err(|_| anyhow!("Price refresh stopped before any catalog arrived"))?
            .clone();
        catalog.ok_or_else(|| anyhow!("Price refresh published no catalog"))
    }
}

impl Drop for CatalogFeed {
    fn drop(&mut self) {
        self.handle.abort();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::price::PriceObservation;
    use async_trait::async_trait;
    use chrono::{Duration as ChronoDuration, TimeZone, Utc};
    use std::sync::atomic::{AtomicUsize, Ordering};

    /// Serves a scripted sequence of batches; `None` entries fail.
    struct ScriptedFeed {
        calls: AtomicUsize,
        script: Vec<Option<Vec<PriceObservation>>>,
    }

    #[async_trait]
    impl PriceFeed for ScriptedFeed {
        async fn fetch_observations(&self) -> Result<Vec<PriceObservation>> {
            let call = self.calls.fetch_add(1, Ordering::SeqCst);
            let step = self.script.get(call).or(self.script.last()).cloned().flatten();
            step.ok_or_else(|| anyhow!("feed unavailable"))
        }
    }

    fn batch(price: f64) -> Vec<PriceObservation> {
        let t = Utc.with_ymd_and_hms(2023, 8, 29, 7, 10, 40).unwrap();
        vec![
            PriceObservation::new("ETH", t, price),
            PriceObservation::new("ETH", t - ChronoDuration::hours(1), 1.0),
            PriceObservation::new("USD", t, 1.0),
        ]
    }

    #[tokio::test]
    async fn test_load_catalog_dedupes() {
        let feed = ScriptedFeed {
            calls: AtomicUsize::new(0),
            script: vec![Some(batch(1645.93))],
        };
        let catalog = load_catalog(&feed).await.unwrap();
        assert_eq!(catalog.len(), 2);
        assert_eq!(catalog.price("ETH"), Some(1645.93));
    }

    #[tokio::test(start_paused = true)]
    async fn test_refresh_publishes_and_keeps_stale_catalog() {
        let feed = Arc::new(ScriptedFeed {
            calls: AtomicUsize::new(0),
            script: vec![None, Some(batch(1600.0)), None, Some(batch(1700.0))],
        });
        let catalog_feed = CatalogFeed::start(feed.clone(), Duration::from_secs(60), None, Instant::now());
        assert!(catalog_feed.subscribe().borrow().is_none());

        let mut rx = catalog_feed.subscribe();
        let first = catalog_feed.first().await.unwrap();
        assert_eq!(first.price("ETH"), Some(1600.0));
        let _ = rx.borrow_and_update();

        // Third fetch fails, fourth succeeds
        rx.changed().await.unwrap();
        let latest = rx.borrow_and_update().clone().unwrap();
        assert_eq!(latest.price("ETH"), Some(1700.0));
        assert_eq!(feed.calls.load(Ordering::SeqCst), 4);

        // The first snapshot is untouched by the refresh
        assert_eq!(first.price("ETH"), Some(1600.0));
    }

    #[tokio::test(start_paused = true)]
    async fn test_drop_stops_polling() {
        let feed = Arc::new(ScriptedFeed {
            calls: AtomicUsize::new(0),
            script: vec![Some(batch(1600.0))],
        });
        let catalog_feed = CatalogFeed::start(feed.clone(), Duration::from_secs(60), None, Instant::now());
        catalog_feed.first().await.unwrap();
        drop(catalog_feed);

        let calls = feed.calls.load(Ordering::SeqCst);
        tokio::time::sleep(Duration::from_secs(600)).await;
        assert_eq!(feed.calls.load(Ordering::SeqCst), calls);
    }

    #[tokio::test(start_paused = true)]
    async fn test_seeded_feed_waits_one_interval() {
        let feed = Arc::new(ScriptedFeed {
            calls: AtomicUsize::new(0),
            script: vec![Some(batch(1700.0))],
        });
        let initial = Arc::new(load_catalog(&ScriptedFeed {
            calls: AtomicUsize::new(0),
            script: vec![Some(batch(1600.0))],
        })
        .await
        .unwrap());

        let catalog_feed = CatalogFeed::seeded(initial, feed.clone(), Duration::from_secs(60));
        assert_eq!(catalog_feed.first().await.unwrap().price("ETH"), Some(1600.0));
        assert_eq!(feed.calls.load(Ordering::SeqCst), 0);

        let mut rx = catalog_feed.subscribe();
        rx.changed().await.unwrap();
        let latest = rx.borrow_and_update().clone().unwrap();
        assert_eq!(latest.price("ETH"), Some(1700.0));
        assert_eq!(feed.calls.load(Ordering::SeqCst), 1);
    }
}
