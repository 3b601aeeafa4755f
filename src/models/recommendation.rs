use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// How urgently a remediation action should be taken.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum RecommendationType {
    Immediate,
    Scheduled,
    Monitor,
    Escalate,
}

impl RecommendationType {
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_uppercase().as_str() {
            "IMMEDIATE" => Some(Self::Immediate),
            "SCHEDULED" => Some(Self::Scheduled),
            "MONITOR" => Some(Self::Monitor),
            "ESCALATE" => Some(Self::Escalate),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Immediate => "IMMEDIATE",
            Self::Scheduled => "SCHEDULED",
            Self::Monitor => "MONITOR",
            Self::Escalate => "ESCALATE",
        }
    }
}

/// A single templated remediation action for a vulnerability.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ActionRecommendation {
    pub cve_id: String,
    pub recommendation_type: RecommendationType,
    pub action: String,
    pub safe_to_implement: bool,
    pub tier2_escalation_required: bool,
    pub created_at: DateTime<Utc>,
}

impl ActionRecommendation {
    pub fn new(
        cve_id: &str,
        recommendation_type: RecommendationType,
        action: String,
        safe_to_implement: bool,
        tier2_escalation_required: bool,
    ) -> Self {
        Self {
            cve_id: cve_id.to_string(),
            recommendation_type,
            action,
            safe_to_implement,
            tier2_escalation_required,
            created_at: Utc::now(),
        }
    }
}
