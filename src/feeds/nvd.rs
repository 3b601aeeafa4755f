//! Client for the NVD-shaped vulnerability feed: date-windowed queries,
//! bounded retry with exponential backoff, and strict-priority CVSS
//! extraction. Returns normalized `Vulnerability` values; persists nothing.

use chrono::{DateTime, Duration, Utc};
use reqwest::Client;
use tracing::{debug, info, warn};

use super::types::{NvdCve, NvdItem, NvdResponse};
use crate::errors::{with_retry, RetryConfig, VigilError};
use crate::models::Vulnerability;

pub const DEFAULT_BASE_URL: &str = "https://services.nvd.nist.gov/rest/json/cves/2.0";
pub const DEFAULT_RESULTS_PER_PAGE: u32 = 2_000;

/// Query timestamp format: millisecond precision, no timezone suffix.
const DATE_FORMAT: &str = "%Y-%m-%dT%H:%M:%S%.3f";

const DESCRIPTION_PLACEHOLDER: &str = "No description available";

pub struct NvdClient {
    client: Client,
    base_url: String,
    api_key: Option<String>,
    results_per_page: u32,
    retry: RetryConfig,
}

impl NvdClient {
    pub fn new(api_key: Option<&str>, base_url: Option<&str>, results_per_page: Option<u32>) -> Self {
        Self {
            client: Client::new(),
            base_url: base_url.unwrap_or(DEFAULT_BASE_URL).to_string(),
            api_key: api_key.map(|k| k.to_string()),
            results_per_page: results_per_page.unwrap_or(DEFAULT_RESULTS_PER_PAGE),
            retry: RetryConfig::default(),
        }
    }

    pub fn with_retry_config(mut self, retry: RetryConfig) -> Self {
        self.retry = retry;
        self
    }

    /// Fetch vulnerabilities published in the window `now - days_back` to
    /// now. A per-item mapping failure is logged and skipped; the rest of
    /// the batch continues.
    pub async fn fetch_recent(&self, days_back: u32) -> Result<Vec<Vulnerability>, VigilError> {
        let end = Utc::now();
        let start = end - Duration::days(i64::from(days_back));

        let response = with_retry("nvd_fetch", &self.retry, || self.fetch_window(&start, &end)).await?;

        if response.total_results > response.vulnerabilities.len() as u64 {
            debug!(
                total = response.total_results,
                returned = response.vulnerabilities.len(),
                "NVD window larger than one page"
            );
        }

        let mut vulns = Vec::with_capacity(response.vulnerabilities.len());
        for item in &response.vulnerabilities {
            match map_item(item) {
                Ok(v) => vulns.push(v),
                Err(e) => {
                    warn!(cve_id = %item.cve.id, error = %e, "Skipping unmappable NVD item");
                }
            }
        }

        info!(days_back, fetched = vulns.len(), "Fetched NVD window");
        Ok(vulns)
    }

    async fn fetch_window(
        &self,
        start: &DateTime<Utc>,
        end: &DateTime<Utc>,
    ) -> Result<NvdResponse, VigilError> {
        let mut request = self.client.get(&self.base_url).query(&[
            ("pubStartDate", start.format(DATE_FORMAT).to_string()),
            ("pubEndDate", end.format(DATE_FORMAT).to_string()),
            ("resultsPerPage", self.results_per_page.to_string()),
        ]);
        if let Some(key) = &self.api_key {
            request = request.header("apiKey", key);
        }

        let response = request.send().await.map_err(|e| {
            if e.is_timeout() {
                VigilError::Timeout(format!("NVD request timed out: {}", e))
            } else {
                VigilError::Network(format!("NVD request failed: {}", e))
            }
        })?;

        let status = response.status();
        if status.as_u16() == 429 {
            return Err(VigilError::RateLimit("NVD returned 429 Too Many Requests".into()));
        }
        if status.is_server_error() {
            return Err(VigilError::Network(format!("NVD server error: {}", status)));
        }
        if !status.is_success() {
            return Err(VigilError::FeedFormat(format!("NVD request rejected: {}", status)));
        }

        response
            .json::<NvdResponse>()
            .await
            .map_err(|e| VigilError::FeedFormat(format!("NVD response decode failed: {}", e)))
    }
}

fn map_item(item: &NvdItem) -> Result<Vulnerability, VigilError> {
    let cve = &item.cve;
    if !Vulnerability::is_valid_cve_id(&cve.id) {
        return Err(VigilError::Validation(format!("Invalid CVE identifier: {}", cve.id)));
    }

    let (cvss_score, cvss_vector) = extract_cvss(cve);
    let now = Utc::now();

    Ok(Vulnerability {
        cve_id: cve.id.clone(),
        description: extract_description(cve),
        source: "NVD".to_string(),
        cvss_score,
        cvss_vector,
        published: cve.published.as_deref().and_then(super::parse_feed_timestamp),
        vendor_product: None,
        known_exploited: false,
        raw_source: serde_json::to_value(item).ok(),
        created_at: now,
        updated_at: now,
    })
}

/// Strict priority: v3.1 metric first, else v3.0, else v2.0, else no score.
fn extract_cvss(cve: &NvdCve) -> (Option<f64>, Option<String>) {
    let metric = cve
        .metrics
        .cvss_metric_v31
        .first()
        .or_else(|| cve.metrics.cvss_metric_v30.first())
        .or_else(|| cve.metrics.cvss_metric_v2.first());

    match metric {
        Some(m) => (Some(m.cvss_data.base_score), m.cvss_data.vector_string.clone()),
        None => (None, None),
    }
}

/// English entry preferred, else the first available language, else a
/// placeholder.
fn extract_description(cve: &NvdCve) -> String {
    cve.descriptions
        .iter()
        .find(|d| d.lang == "en")
        .or_else(|| cve.descriptions.first())
        .map(|d| d.value.clone())
        .unwrap_or_else(|| DESCRIPTION_PLACEHOLDER.to_string())
}
