//! Wire shapes for the consumed feeds. Kept separate from the canonical
//! `Vulnerability` model: the clients normalize at the boundary.

use serde::{Deserialize, Serialize};

// NVD-shaped feed

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NvdResponse {
    #[serde(rename = "totalResults", default)]
    pub total_results: u64,
    #[serde(default)]
    pub vulnerabilities: Vec<NvdItem>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NvdItem {
    pub cve: NvdCve,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NvdCve {
    pub id: String,
    pub published: Option<String>,
    #[serde(default)]
    pub descriptions: Vec<NvdDescription>,
    #[serde(default)]
    pub metrics: NvdMetrics,
    #[serde(default)]
    pub references: Vec<NvdReference>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NvdDescription {
    pub lang: String,
    pub value: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct NvdMetrics {
    #[serde(rename = "cvssMetricV31", default)]
    pub cvss_metric_v31: Vec<NvdCvssMetric>,
    #[serde(rename = "cvssMetricV30", default)]
    pub cvss_metric_v30: Vec<NvdCvssMetric>,
    #[serde(rename = "cvssMetricV2", default)]
    pub cvss_metric_v2: Vec<NvdCvssMetric>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NvdCvssMetric {
    #[serde(rename = "cvssData")]
    pub cvss_data: NvdCvssData,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NvdCvssData {
    #[serde(rename = "baseScore")]
    pub base_score: f64,
    #[serde(rename = "vectorString")]
    pub vector_string: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NvdReference {
    pub url: String,
}

// KEV-shaped feed

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct KevCatalog {
    pub title: Option<String>,
    pub catalog_version: Option<String>,
    pub date_released: Option<String>,
    pub count: Option<u64>,
    #[serde(default)]
    pub vulnerabilities: Vec<KevEntry>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct KevEntry {
    #[serde(rename = "cveID")]
    pub cve_id: String,
    pub vendor_project: Option<String>,
    pub product: Option<String>,
    pub vulnerability_name: Option<String>,
    pub date_added: Option<String>,
    pub short_description: Option<String>,
    pub required_action: Option<String>,
    pub due_date: Option<String>,
    /// Enumerated "Known"/"Unknown" in the feed.
    pub known_ransomware_campaign_use: Option<String>,
}
