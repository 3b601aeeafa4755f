use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::analysis::Sector;

/// Priority level derived from the composite score.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Priority {
    Critical,
    High,
    Medium,
    Low,
}

impl Priority {
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_uppercase().as_str() {
            "CRITICAL" => Some(Self::Critical),
            "HIGH" => Some(Self::High),
            "MEDIUM" => Some(Self::Medium),
            "LOW" => Some(Self::Low),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Critical => "CRITICAL",
            Self::High => "HIGH",
            Self::Medium => "MEDIUM",
            Self::Low => "LOW",
        }
    }
}

impl std::fmt::Display for Priority {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Composite bio-impact score, one-to-one with a vulnerability. Created
/// exactly once by the scorer; re-analysis is an explicit caller decision.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BioImpactScore {
    pub cve_id: String,
    /// Sub-scores, each 0-100.
    pub human_safety: f64,
    pub supply_chain: f64,
    pub exploitability: f64,
    pub patch_availability: f64,
    /// Weighted composite, 0-100, rounded to 2 decimals.
    pub composite: f64,
    pub priority: Priority,
    pub confidence: Option<f64>,
    pub affected_sectors: Vec<Sector>,
    /// Raw analyzer output kept for audit.
    pub ai_audit: Option<String>,
    pub model_version: String,
    pub needs_human_review: bool,
    pub created_at: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_priority_parse() {
        assert_eq!(Priority::parse("CRITICAL"), Some(Priority::Critical));
        assert_eq!(Priority::parse("high"), Some(Priority::High));
        assert_eq!(Priority::parse("Medium"), Some(Priority::Medium));
        assert_eq!(Priority::parse("urgent"), None);
    }

    #[test]
    fn test_priority_serde_uppercase() {
        assert_eq!(serde_json::to_string(&Priority::Critical).unwrap(), "\"CRITICAL\"");
        let p: Priority = serde_json::from_str("\"LOW\"").unwrap();
        assert_eq!(p, Priority::Low);
    }
}
