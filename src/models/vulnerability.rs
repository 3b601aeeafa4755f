use std::sync::OnceLock;

use chrono::{DateTime, Utc};
use regex::Regex;
use serde::{Deserialize, Serialize};

/// Canonical vulnerability record, normalized from either feed.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Vulnerability {
    /// External identifier, `CVE-YYYY-N`. Globally unique.
    pub cve_id: String,
    pub description: String,
    /// Originating feed name ("NVD" or "CISA_KEV").
    pub source: String,
    /// CVSS base score, if the feed supplied one.
    pub cvss_score: Option<f64>,
    pub cvss_vector: Option<String>,
    pub published: Option<DateTime<Utc>>,
    /// Free-text vendor/product description.
    pub vendor_product: Option<String>,
    /// Monotone: once true, later ingestion never resets it.
    pub known_exploited: bool,
    /// Opaque raw feed payload kept for audit.
    pub raw_source: Option<serde_json::Value>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

fn cve_id_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^CVE-\d{4}-\d+$").expect("static regex"))
}

impl Vulnerability {
    pub fn new(cve_id: &str, description: &str, source: &str) -> Self {
        let now = Utc::now();
        Self {
            cve_id: cve_id.to_string(),
            description: description.to_string(),
            source: source.to_string(),
            cvss_score: None,
            cvss_vector: None,
            published: None,
            vendor_product: None,
            known_exploited: false,
            raw_source: None,
            created_at: now,
            updated_at: now,
        }
    }

    /// Accepts exactly the `CVE-\d{4}-\d+` shape.
    pub fn is_valid_cve_id(id: &str) -> bool {
        cve_id_regex().is_match(id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_valid_cve_ids_accepted() {
        assert!(Vulnerability::is_valid_cve_id("CVE-2024-1234"));
        assert!(Vulnerability::is_valid_cve_id("CVE-1999-1"));
        assert!(Vulnerability::is_valid_cve_id("CVE-2023-123456789"));
    }

    #[test]
    fn test_invalid_cve_ids_rejected() {
        assert!(!Vulnerability::is_valid_cve_id("CVE-24-1234"));
        assert!(!Vulnerability::is_valid_cve_id("cve-2024-1234"));
        assert!(!Vulnerability::is_valid_cve_id("CVE-2024-"));
        assert!(!Vulnerability::is_valid_cve_id("CVE-2024-12a4"));
        assert!(!Vulnerability::is_valid_cve_id(" CVE-2024-1234"));
        assert!(!Vulnerability::is_valid_cve_id("CVE-2024-1234 "));
        assert!(!Vulnerability::is_valid_cve_id("GHSA-xxxx-yyyy"));
        assert!(!Vulnerability::is_valid_cve_id(""));
    }

    #[test]
    fn test_new_defaults() {
        let v = Vulnerability::new("CVE-2024-1234", "desc", "NVD");
        assert!(!v.known_exploited);
        assert!(v.cvss_score.is_none());
        assert!(v.published.is_none());
    }
}
