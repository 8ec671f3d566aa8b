pub mod cli;
pub mod core;
pub mod providers;

use crate::core::config::AppConfig;
use crate::core::{PriceCatalog, PriceFeed};
use anyhow::Result;
use providers::{CatalogFeed, SwitcheoPriceFeed, load_catalog};
use std::sync::Arc;
use tracing::{debug, info};

pub enum AppCommand {
    Prices {
        filter: Option<String>,
    },
    Convert {
        amount: String,
        from: String,
        to: String,
    },
    Swap,
}

async fn fetch_catalog(feed: &dyn PriceFeed) -> Result<Arc<PriceCatalog>> {
    let pb = cli::ui::new_spinner("Fetching prices...");
    let catalog = load_catalog(feed).await;
    pb.finish_and_clear();
    Ok(Arc::new(catalog?))
}

pub async fn run_command(command: AppCommand, config_path: Option<&str>) -> Result<()> {
    info!("xswap starting...");

    let config = match config_path {
        Some(path) => AppConfig::load_from_path(path)?,
        None => AppConfig::load()?,
    };
    debug!("Loaded config: {config:#?}");

    let feed = Arc::new(SwitcheoPriceFeed::new(config.switcheo_base_url()));
    let catalog = fetch_catalog(feed.as_ref()).await?;

    match command {
        AppCommand::Prices { filter } => {
            cli::prices::run(&catalog, filter.as_deref());
            Ok(())
        }
        AppCommand::Convert { amount, from, to } => cli::convert::run(catalog, &amount, &from, &to),
        AppCommand::Swap => {
            let catalog_feed = CatalogFeed::seeded(catalog, feed, config.refresh_interval());
            cli::swap::run(catalog_feed, config.settle_delay()).await
        }
    }
}
