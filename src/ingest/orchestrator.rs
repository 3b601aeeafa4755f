//! Full-ingestion orchestration: NVD sub-flow, courtesy pause, KEV sub-flow.
//! Ingestion runs unattended on a timer, so nothing is allowed to escape
//! `run_full`; each sub-flow's failure is captured into its result and the
//! partial combined result is returned.

use chrono::Utc;
use tracing::{error, info, warn};

use crate::db::Database;
use crate::errors::VigilError;
use crate::feeds::types::KevEntry;
use crate::feeds::{KevClient, NvdClient};
use crate::models::ingestion::{CombinedIngestionResult, IngestionResult};
use crate::models::Vulnerability;
use crate::utils::Pacer;

/// Settings key under which the last combined result is cached. Set at run
/// completion, read by the status query.
pub const LAST_INGESTION_KEY: &str = "last_ingestion";

pub struct IngestionOrchestrator {
    db: Database,
    nvd: NvdClient,
    kev: KevClient,
    pacer: Pacer,
}

impl IngestionOrchestrator {
    pub fn new(db: Database, nvd: NvdClient, kev: KevClient, pacer: Pacer) -> Self {
        Self { db, nvd, kev, pacer }
    }

    /// Run a full NVD + KEV ingestion. Never fails: errors from either
    /// sub-flow are recorded in the result message instead of propagating.
    pub async fn run_full(&self, nvd_days_back: u32) -> CombinedIngestionResult {
        let nvd = match self.run_nvd(nvd_days_back).await {
            Ok(result) => result,
            Err(e) => {
                error!(error = %e, "NVD ingestion failed");
                IngestionResult::failed(format!("NVD ingestion failed: {}", e))
            }
        };

        // Courtesy pause between feeds
        self.pacer.pause().await;

        let kev = match self.run_kev().await {
            Ok(result) => result,
            Err(e) => {
                error!(error = %e, "KEV ingestion failed");
                IngestionResult::failed(format!("KEV ingestion failed: {}", e))
            }
        };

        let message = if nvd.errors == 0 && kev.errors == 0 {
            "Ingestion completed".to_string()
        } else {
            format!("Ingestion completed with errors (NVD: {}, KEV: {})", nvd.errors, kev.errors)
        };

        let combined = CombinedIngestionResult {
            nvd,
            kev,
            message,
            completed_at: Utc::now(),
        };

        // Cache the last run for the status query; a cache write failure is
        // not worth failing the run over
        match serde_json::to_string(&combined) {
            Ok(json) => {
                if let Err(e) = self.db.set_setting(LAST_INGESTION_KEY, &json) {
                    warn!(error = %e, "Failed to cache last ingestion result");
                }
            }
            Err(e) => warn!(error = %e, "Failed to encode last ingestion result"),
        }

        info!(summary = %combined.summary(), "Ingestion run finished");
        combined
    }

    /// NVD sub-flow: fetch, then upsert keyed by identifier. An existing row
    /// gets its feed fields refreshed so late-assigned CVSS scores land.
    async fn run_nvd(&self, days_back: u32) -> Result<IngestionResult, VigilError> {
        let vulns = self.nvd.fetch_recent(days_back).await?;
        let fetched = vulns.len() as u64;

        let mut added = 0u64;
        let mut duplicates = 0u64;
        let mut errors = 0u64;

        for vuln in vulns {
            match self.db.vulnerability_exists(&vuln.cve_id) {
                Ok(true) => {
                    if let Err(e) = self.db.refresh_vulnerability(&vuln) {
                        warn!(cve_id = %vuln.cve_id, error = %e, "Failed to refresh NVD record");
                        errors += 1;
                    } else {
                        duplicates += 1;
                    }
                }
                Ok(false) => match self.db.insert_vulnerability(&vuln) {
                    Ok(()) => added += 1,
                    Err(e) => {
                        warn!(cve_id = %vuln.cve_id, error = %e, "Failed to insert NVD record");
                        errors += 1;
                    }
                },
                Err(e) => {
                    warn!(cve_id = %vuln.cve_id, error = %e, "Lookup failed for NVD record");
                    errors += 1;
                }
            }
        }

        Ok(IngestionResult {
            fetched,
            added,
            duplicates,
            errors,
            message: format!("NVD: {} new, {} duplicate", added, duplicates),
            completed_at: Utc::now(),
        })
    }

    /// KEV sub-flow: mark existing records known-exploited, insert synthetic
    /// records for identifiers we have never seen.
    async fn run_kev(&self) -> Result<IngestionResult, VigilError> {
        let entries = self.kev.fetch_catalog().await?;
        let fetched = entries.len() as u64;

        let mut added = 0u64;
        let mut duplicates = 0u64;
        let mut errors = 0u64;

        for entry in &entries {
            if !Vulnerability::is_valid_cve_id(&entry.cve_id) {
                warn!(cve_id = %entry.cve_id, "Skipping KEV entry with invalid identifier");
                errors += 1;
                continue;
            }

            match self.db.vulnerability_exists(&entry.cve_id) {
                Ok(true) => {
                    // No new row: counts as a duplicate. The flag is monotone
                    if let Err(e) = self.db.mark_known_exploited(&entry.cve_id) {
                        warn!(cve_id = %entry.cve_id, error = %e, "Failed to mark known exploited");
                        errors += 1;
                    } else {
                        duplicates += 1;
                    }
                }
                Ok(false) => match self.db.insert_vulnerability(&synthetic_from_kev(entry)) {
                    Ok(()) => added += 1,
                    Err(e) => {
                        warn!(cve_id = %entry.cve_id, error = %e, "Failed to insert KEV record");
                        errors += 1;
                    }
                },
                Err(e) => {
                    warn!(cve_id = %entry.cve_id, error = %e, "Lookup failed for KEV record");
                    errors += 1;
                }
            }
        }

        Ok(IngestionResult {
            fetched,
            added,
            duplicates,
            errors,
            message: format!("KEV: {} new, {} marked exploited", added, duplicates),
            completed_at: Utc::now(),
        })
    }
}

/// Build a vulnerability directly from KEV fields for identifiers the NVD
/// flow has never produced.
fn synthetic_from_kev(entry: &KevEntry) -> Vulnerability {
    let description = entry
        .short_description
        .clone()
        .or_else(|| entry.vulnerability_name.clone())
        .unwrap_or_else(|| "Known exploited vulnerability (no description)".to_string());

    let vendor_product = match (&entry.vendor_project, &entry.product) {
        (Some(v), Some(p)) => Some(format!("{} {}", v, p)),
        (Some(v), None) => Some(v.clone()),
        (None, Some(p)) => Some(p.clone()),
        (None, None) => None,
    };

    let now = Utc::now();
    Vulnerability {
        cve_id: entry.cve_id.clone(),
        description,
        source: "CISA_KEV".to_string(),
        cvss_score: None,
        cvss_vector: None,
        published: entry.date_added.as_deref().and_then(crate::feeds::parse_feed_timestamp),
        vendor_product,
        known_exploited: true,
        raw_source: serde_json::to_value(entry).ok(),
        created_at: now,
        updated_at: now,
    }
}
