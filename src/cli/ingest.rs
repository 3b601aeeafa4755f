use std::time::Duration;

use tracing::info;

use super::commands::IngestArgs;
use super::open_database;
use crate::config::VigilConfig;
use crate::errors::VigilError;
use crate::feeds::{KevClient, NvdClient};
use crate::ingest::IngestionOrchestrator;
use crate::utils::Pacer;

const DEFAULT_FEED_PAUSE_SECS: u64 = 2;

pub async fn handle_ingest(args: IngestArgs, config: &VigilConfig) -> Result<(), VigilError> {
    let db = open_database(config)?;

    let nvd_config = config.nvd.clone().unwrap_or_default();
    let nvd = NvdClient::new(
        config.nvd_api_key().as_deref(),
        nvd_config.base_url.as_deref(),
        nvd_config.results_per_page,
    );

    let kev_config = config.kev.clone().unwrap_or_default();
    let kev = KevClient::new(kev_config.catalog_url.as_deref(), kev_config.cache_ttl_hours);

    let pause_secs = config
        .pacing
        .as_ref()
        .and_then(|p| p.feed_pause_secs)
        .unwrap_or(DEFAULT_FEED_PAUSE_SECS);
    let pacer = Pacer::new(Duration::from_secs(pause_secs));

    // CLI flag wins over the config file
    let days_back = args.days_back.or(nvd_config.days_back).unwrap_or(7);
    info!(days_back, "Starting feed ingestion");

    let result = IngestionOrchestrator::new(db, nvd, kev, pacer)
        .run_full(days_back)
        .await;

    println!("{}", result.summary());
    Ok(())
}
