use serde::{Deserialize, Serialize};

use super::score::Priority;

/// Human-safety impact level assigned by the relevance analysis.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum SafetyImpact {
    High,
    Medium,
    Low,
    None,
}

impl SafetyImpact {
    /// Parse a model-supplied value against the closed vocabulary.
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_uppercase().as_str() {
            "HIGH" => Some(Self::High),
            "MEDIUM" => Some(Self::Medium),
            "LOW" => Some(Self::Low),
            "NONE" => Some(Self::None),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::High => "HIGH",
            Self::Medium => "MEDIUM",
            Self::Low => "LOW",
            Self::None => "NONE",
        }
    }
}

/// Biosecurity-sensitive sector labels. Closed vocabulary.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Sector {
    #[serde(rename = "Hospitals")]
    Hospitals,
    #[serde(rename = "Clinical Labs")]
    ClinicalLabs,
    #[serde(rename = "Biomanufacturing")]
    Biomanufacturing,
    #[serde(rename = "Pharmaceutical")]
    Pharmaceutical,
    #[serde(rename = "Food & Agriculture")]
    FoodAgriculture,
    #[serde(rename = "Research")]
    Research,
}

impl Sector {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Hospitals => "Hospitals",
            Self::ClinicalLabs => "Clinical Labs",
            Self::Biomanufacturing => "Biomanufacturing",
            Self::Pharmaceutical => "Pharmaceutical",
            Self::FoodAgriculture => "Food & Agriculture",
            Self::Research => "Research",
        }
    }

    /// Lenient parse for model output: matches on characteristic substrings
    /// so "hospital networks" still maps to Hospitals. Unknown labels are
    /// dropped by the caller.
    pub fn parse_loose(s: &str) -> Option<Self> {
        let lower = s.trim().to_lowercase();
        if lower.contains("hospital") || lower.contains("healthcare") {
            Some(Self::Hospitals)
        } else if lower.contains("lab") || lower.contains("diagnostic") {
            Some(Self::ClinicalLabs)
        } else if lower.contains("biomanufactur") || lower.contains("bioprocess") {
            Some(Self::Biomanufacturing)
        } else if lower.contains("pharma") || lower.contains("drug") {
            Some(Self::Pharmaceutical)
        } else if lower.contains("food") || lower.contains("agri") {
            Some(Self::FoodAgriculture)
        } else if lower.contains("research") || lower.contains("academ") {
            Some(Self::Research)
        } else {
            None
        }
    }
}

/// Transient verdict of the relevance analyzer. Consumed immediately by the
/// composite scorer; never persisted directly.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BioRelevanceAnalysis {
    pub relevant: bool,
    /// 0-100.
    pub relevance_score: u8,
    pub affected_sectors: Vec<Sector>,
    pub safety_impact: SafetyImpact,
    /// One-sentence key concern.
    pub key_concern: String,
    pub recommended_priority: Priority,
    /// 0.0-1.0.
    pub confidence: f64,
    /// Provenance: verbatim model output for the generative path, or a fixed
    /// marker string for the short-circuit and fallback paths.
    pub raw_response: String,
}
