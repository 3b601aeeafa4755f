use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Per-feed statistics for one ingestion run. Purely reportive.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IngestionResult {
    pub fetched: u64,
    pub added: u64,
    pub duplicates: u64,
    pub errors: u64,
    pub message: String,
    pub completed_at: DateTime<Utc>,
}

impl IngestionResult {
    /// Result for a sub-flow that failed before producing any counts.
    pub fn failed(message: String) -> Self {
        Self {
            fetched: 0,
            added: 0,
            duplicates: 0,
            errors: 1,
            message,
            completed_at: Utc::now(),
        }
    }
}

/// The combined outcome of a full NVD + KEV ingestion run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CombinedIngestionResult {
    pub nvd: IngestionResult,
    pub kev: IngestionResult,
    pub message: String,
    pub completed_at: DateTime<Utc>,
}

impl CombinedIngestionResult {
    pub fn summary(&self) -> String {
        format!(
            "NVD: {} fetched, {} new, {} duplicate, {} errors | KEV: {} fetched, {} new, {} duplicate, {} errors",
            self.nvd.fetched,
            self.nvd.added,
            self.nvd.duplicates,
            self.nvd.errors,
            self.kev.fetched,
            self.kev.added,
            self.kev.duplicates,
            self.kev.errors,
        )
    }
}
