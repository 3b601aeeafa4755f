//! Client for the KEV-shaped known-exploited catalog: a single authoritative
//! JSON snapshot, cached in memory with a 24-hour expiry. No retries; a
//! failed fetch propagates immediately.

use std::sync::Mutex;

use chrono::{DateTime, Duration, Utc};
use reqwest::Client;
use tracing::{debug, info};

use super::types::{KevCatalog, KevEntry};
use crate::errors::VigilError;

pub const DEFAULT_CATALOG_URL: &str =
    "https://www.cisa.gov/sites/default/files/feeds/known_exploited_vulnerabilities.json";

/// Constant key under which the catalog snapshot is cached.
pub const CACHE_KEY: &str = "cisa_kev_catalog";

pub const DEFAULT_CACHE_TTL_HOURS: i64 = 24;

struct CachedCatalog {
    entries: Vec<KevEntry>,
    fetched_at: DateTime<Utc>,
}

pub struct KevClient {
    client: Client,
    catalog_url: String,
    cache_ttl: Duration,
    cache: Mutex<Option<CachedCatalog>>,
}

impl KevClient {
    pub fn new(catalog_url: Option<&str>, cache_ttl_hours: Option<i64>) -> Self {
        Self {
            client: Client::new(),
            catalog_url: catalog_url.unwrap_or(DEFAULT_CATALOG_URL).to_string(),
            cache_ttl: Duration::hours(cache_ttl_hours.unwrap_or(DEFAULT_CACHE_TTL_HOURS)),
            cache: Mutex::new(None),
        }
    }

    /// Fetch the known-exploited catalog. Calls within the cache TTL return
    /// the cached list without a network call.
    pub async fn fetch_catalog(&self) -> Result<Vec<KevEntry>, VigilError> {
        {
            let cache = self.cache.lock().unwrap();
            if let Some(cached) = cache.as_ref() {
                if Utc::now() - cached.fetched_at < self.cache_ttl {
                    debug!(key = CACHE_KEY, entries = cached.entries.len(), "KEV cache hit");
                    return Ok(cached.entries.clone());
                }
            }
        }

        let catalog = self.fetch_remote().await?;
        info!(
            entries = catalog.vulnerabilities.len(),
            version = catalog.catalog_version.as_deref().unwrap_or("unknown"),
            "Fetched KEV catalog"
        );

        let entries = catalog.vulnerabilities;
        *self.cache.lock().unwrap() = Some(CachedCatalog {
            entries: entries.clone(),
            fetched_at: Utc::now(),
        });
        Ok(entries)
    }

    /// Manual cache invalidation; the next fetch goes to the network.
    pub fn invalidate_cache(&self) {
        *self.cache.lock().unwrap() = None;
        debug!(key = CACHE_KEY, "KEV cache invalidated");
    }

    async fn fetch_remote(&self) -> Result<KevCatalog, VigilError> {
        let response = self
            .client
            .get(&self.catalog_url)
            .send()
            .await
            .map_err(|e| VigilError::Network(format!("KEV request failed: {}", e)))?;

        if !response.status().is_success() {
            return Err(VigilError::Network(format!(
                "KEV catalog returned {}",
                response.status()
            )));
        }

        response
            .json::<KevCatalog>()
            .await
            .map_err(|e| VigilError::FeedFormat(format!("KEV catalog decode failed: {}", e)))
    }

    #[cfg(test)]
    fn prime_cache(&self, entries: Vec<KevEntry>, fetched_at: DateTime<Utc>) {
        *self.cache.lock().unwrap() = Some(CachedCatalog { entries, fetched_at });
    }
}
