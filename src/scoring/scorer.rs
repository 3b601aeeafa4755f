//! Composite bio-impact scoring: four independent, pure sub-scorers combined
//! by fixed weights into one priority-classified score. The weights and
//! thresholds are load-bearing constants that downstream consumers depend on
//! being stable; the test suite pins them exactly.

use chrono::{DateTime, Utc};

use crate::models::analysis::{BioRelevanceAnalysis, SafetyImpact, Sector};
use crate::models::score::{BioImpactScore, Priority};
use crate::models::Vulnerability;

pub const WEIGHT_HUMAN_SAFETY: f64 = 0.40;
pub const WEIGHT_SUPPLY_CHAIN: f64 = 0.25;
pub const WEIGHT_EXPLOITABILITY: f64 = 0.20;
pub const WEIGHT_PATCH_AVAILABILITY: f64 = 0.15;

pub const CRITICAL_THRESHOLD: f64 = 85.0;
pub const HIGH_THRESHOLD: f64 = 70.0;
pub const MEDIUM_THRESHOLD: f64 = 50.0;

/// Analyses below this confidence are flagged for human review.
const REVIEW_CONFIDENCE_FLOOR: f64 = 0.6;

/// Compute the composite bio-impact score for a vulnerability and its
/// relevance analysis. Pure: same inputs always produce the same score.
pub fn score(
    vuln: &Vulnerability,
    analysis: &BioRelevanceAnalysis,
    model_version: &str,
) -> BioImpactScore {
    score_at(vuln, analysis, model_version, Utc::now())
}

/// Scoring against an explicit "now" so recency bands are testable.
pub fn score_at(
    vuln: &Vulnerability,
    analysis: &BioRelevanceAnalysis,
    model_version: &str,
    now: DateTime<Utc>,
) -> BioImpactScore {
    let human_safety = human_safety_score(analysis);
    let supply_chain = supply_chain_score(analysis);
    let exploitability = exploitability_score(vuln);
    let patch_availability = patch_availability_score(vuln, now);

    let composite = round2(
        WEIGHT_HUMAN_SAFETY * human_safety
            + WEIGHT_SUPPLY_CHAIN * supply_chain
            + WEIGHT_EXPLOITABILITY * exploitability
            + WEIGHT_PATCH_AVAILABILITY * patch_availability,
    );

    BioImpactScore {
        cve_id: vuln.cve_id.clone(),
        human_safety,
        supply_chain,
        exploitability,
        patch_availability,
        composite,
        priority: priority_for(composite),
        confidence: Some(analysis.confidence),
        affected_sectors: analysis.affected_sectors.clone(),
        ai_audit: Some(analysis.raw_response.clone()),
        model_version: model_version.to_string(),
        needs_human_review: analysis.confidence < REVIEW_CONFIDENCE_FLOOR,
        created_at: Utc::now(),
    }
}

/// Base from the safety-impact level, else the clamped relevance score;
/// +10 (capped) when a direct-patient-care sector is affected.
pub fn human_safety_score(analysis: &BioRelevanceAnalysis) -> f64 {
    let base = match analysis.safety_impact {
        SafetyImpact::High => 100.0,
        SafetyImpact::Medium => 75.0,
        SafetyImpact::Low => 50.0,
        SafetyImpact::None => f64::from(analysis.relevance_score).clamp(0.0, 100.0),
    };

    let patient_facing = analysis
        .affected_sectors
        .iter()
        .any(|s| matches!(s, Sector::Hospitals | Sector::ClinicalLabs));
    if patient_facing {
        (base + 10.0).min(100.0)
    } else {
        base
    }
}

/// Base from sector breadth; +20 (capped) when production sectors are hit.
pub fn supply_chain_score(analysis: &BioRelevanceAnalysis) -> f64 {
    let base: f64 = match analysis.affected_sectors.len() {
        0 | 1 => 40.0,
        2 => 50.0,
        3 => 60.0,
        _ => 80.0,
    };

    let production = analysis
        .affected_sectors
        .iter()
        .any(|s| matches!(s, Sector::Biomanufacturing | Sector::Pharmaceutical));
    if production {
        (base + 20.0).min(100.0)
    } else {
        base
    }
}

/// Severity-banded, with a flat boost when the vulnerability is on the
/// known-exploited list.
pub fn exploitability_score(vuln: &Vulnerability) -> f64 {
    let base: f64 = match vuln.cvss_score {
        Some(s) if s >= 9.0 => 90.0,
        Some(s) if s >= 7.0 => 70.0,
        Some(s) if s >= 4.0 => 50.0,
        Some(_) => 30.0,
        None => 40.0,
    };

    if vuln.known_exploited {
        (base + 20.0).min(100.0)
    } else {
        base
    }
}

/// Recency proxy: newer high-severity issues are less likely to have a
/// deployed patch.
pub fn patch_availability_score(vuln: &Vulnerability, now: DateTime<Utc>) -> f64 {
    let published = match vuln.published {
        Some(p) => p,
        None => return 60.0,
    };
    let days = (now - published).num_days();
    let severity = vuln.cvss_score.unwrap_or(0.0);

    if days < 7 && severity >= 9.0 {
        100.0
    } else if days < 14 && severity >= 7.0 {
        80.0
    } else if days < 30 {
        60.0
    } else if days < 90 {
        40.0
    } else {
        20.0
    }
}

/// Pure step function of the composite with boundaries at 50/70/85.
pub fn priority_for(composite: f64) -> Priority {
    if composite >= CRITICAL_THRESHOLD {
        Priority::Critical
    } else if composite >= HIGH_THRESHOLD {
        Priority::High
    } else if composite >= MEDIUM_THRESHOLD {
        Priority::Medium
    } else {
        Priority::Low
    }
}

fn round2(x: f64) -> f64 {
    (x * 100.0).round() / 100.0
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;
    use crate::models::score::Priority;

    fn analysis(
        impact: SafetyImpact,
        sectors: Vec<Sector>,
        relevance_score: u8,
        confidence: f64,
    ) -> BioRelevanceAnalysis {
        BioRelevanceAnalysis {
            relevant: relevance_score > 0,
            relevance_score,
            affected_sectors: sectors,
            safety_impact: impact,
            key_concern: "test".into(),
            recommended_priority: Priority::Medium,
            confidence,
            raw_response: "test".into(),
        }
    }

    fn vuln(cvss: Option<f64>, known_exploited: bool, published_days_ago: Option<i64>) -> Vulnerability {
        let mut v = Vulnerability::new("CVE-2024-1234", "test", "NVD");
        v.cvss_score = cvss;
        v.known_exploited = known_exploited;
        v.published = published_days_ago.map(|d| Utc::now() - Duration::days(d));
        v
    }

    #[test]
    fn test_weights_are_pinned() {
        assert_eq!(WEIGHT_HUMAN_SAFETY, 0.40);
        assert_eq!(WEIGHT_SUPPLY_CHAIN, 0.25);
        assert_eq!(WEIGHT_EXPLOITABILITY, 0.20);
        assert_eq!(WEIGHT_PATCH_AVAILABILITY, 0.15);
        assert!((WEIGHT_HUMAN_SAFETY + WEIGHT_SUPPLY_CHAIN + WEIGHT_EXPLOITABILITY + WEIGHT_PATCH_AVAILABILITY - 1.0).abs() < 1e-9);
    }

    #[test]
    fn test_priority_boundaries_pinned() {
        assert_eq!(priority_for(85.0), Priority::Critical);
        assert_eq!(priority_for(84.99), Priority::High);
        assert_eq!(priority_for(70.0), Priority::High);
        assert_eq!(priority_for(69.99), Priority::Medium);
        assert_eq!(priority_for(50.0), Priority::Medium);
        assert_eq!(priority_for(49.99), Priority::Low);
        assert_eq!(priority_for(0.0), Priority::Low);
    }

    #[test]
    fn test_human_safety_impact_bands_and_boost() {
        assert_eq!(human_safety_score(&analysis(SafetyImpact::High, vec![], 0, 0.9)), 100.0);
        assert_eq!(human_safety_score(&analysis(SafetyImpact::Medium, vec![], 0, 0.9)), 75.0);
        assert_eq!(human_safety_score(&analysis(SafetyImpact::Low, vec![], 0, 0.9)), 50.0);
        assert_eq!(human_safety_score(&analysis(SafetyImpact::None, vec![], 42, 0.9)), 42.0);

        // Patient-facing sector boost, capped at 100
        assert_eq!(
            human_safety_score(&analysis(SafetyImpact::Low, vec![Sector::Hospitals], 0, 0.9)),
            60.0
        );
        assert_eq!(
            human_safety_score(&analysis(SafetyImpact::High, vec![Sector::ClinicalLabs], 0, 0.9)),
            100.0
        );
    }

    #[test]
    fn test_supply_chain_sector_bands_and_boost() {
        assert_eq!(supply_chain_score(&analysis(SafetyImpact::None, vec![], 0, 0.9)), 40.0);
        assert_eq!(
            supply_chain_score(&analysis(SafetyImpact::None, vec![Sector::Hospitals], 0, 0.9)),
            40.0
        );
        assert_eq!(
            supply_chain_score(&analysis(
                SafetyImpact::None,
                vec![Sector::Hospitals, Sector::ClinicalLabs],
                0,
                0.9
            )),
            50.0
        );
        assert_eq!(
            supply_chain_score(&analysis(
                SafetyImpact::None,
                vec![Sector::Hospitals, Sector::ClinicalLabs, Sector::Research],
                0,
                0.9
            )),
            60.0
        );
        assert_eq!(
            supply_chain_score(&analysis(
                SafetyImpact::None,
                vec![
                    Sector::Hospitals,
                    Sector::ClinicalLabs,
                    Sector::Research,
                    Sector::FoodAgriculture
                ],
                0,
                0.9
            )),
            80.0
        );

        // Production boost
        assert_eq!(
            supply_chain_score(&analysis(SafetyImpact::None, vec![Sector::Biomanufacturing], 0, 0.9)),
            60.0
        );
        assert_eq!(
            supply_chain_score(&analysis(
                SafetyImpact::None,
                vec![
                    Sector::Pharmaceutical,
                    Sector::Biomanufacturing,
                    Sector::Hospitals,
                    Sector::Research
                ],
                0,
                0.9
            )),
            100.0
        );
    }

    #[test]
    fn test_exploitability_bands_and_known_exploited_boost() {
        assert_eq!(exploitability_score(&vuln(Some(9.8), false, None)), 90.0);
        assert_eq!(exploitability_score(&vuln(Some(7.5), false, None)), 70.0);
        assert_eq!(exploitability_score(&vuln(Some(5.0), false, None)), 50.0);
        assert_eq!(exploitability_score(&vuln(Some(2.0), false, None)), 30.0);
        assert_eq!(exploitability_score(&vuln(None, false, None)), 40.0);

        assert_eq!(exploitability_score(&vuln(Some(9.8), true, None)), 100.0);
        assert_eq!(exploitability_score(&vuln(Some(5.0), true, None)), 70.0);
    }

    #[test]
    fn test_patch_availability_recency_bands() {
        let now = Utc::now();
        assert_eq!(patch_availability_score(&vuln(Some(9.8), false, Some(3)), now), 100.0);
        assert_eq!(patch_availability_score(&vuln(Some(7.5), false, Some(10)), now), 80.0);
        assert_eq!(patch_availability_score(&vuln(Some(9.8), false, Some(20)), now), 60.0);
        assert_eq!(patch_availability_score(&vuln(Some(3.0), false, Some(60)), now), 40.0);
        assert_eq!(patch_availability_score(&vuln(Some(9.8), false, Some(365)), now), 20.0);
        assert_eq!(patch_availability_score(&vuln(Some(9.8), false, None), now), 60.0);
    }

    #[test]
    fn test_worked_example_is_critical() {
        // "Medical device vulnerability in hospital laboratory equipment",
        // severity 9.8, not known-exploited, published 3 days ago, analysis
        // HIGH impact with Hospitals + Clinical Labs.
        let v = vuln(Some(9.8), false, Some(3));
        let a = analysis(
            SafetyImpact::High,
            vec![Sector::Hospitals, Sector::ClinicalLabs],
            90,
            0.9,
        );

        let s = score(&v, &a, "llama3.1:8b");
        assert_eq!(s.human_safety, 100.0);
        assert_eq!(s.supply_chain, 50.0);
        assert_eq!(s.exploitability, 90.0);
        assert_eq!(s.patch_availability, 100.0);
        // 0.40*100 + 0.25*50 + 0.20*90 + 0.15*100 = 85.5
        assert_eq!(s.composite, 85.5);
        assert_eq!(s.priority, Priority::Critical);
        assert!(!s.needs_human_review);
    }

    #[test]
    fn test_composite_rounded_and_in_range() {
        let v = vuln(Some(6.3), false, Some(45));
        let a = analysis(SafetyImpact::Low, vec![Sector::Research], 33, 0.7);
        let s = score(&v, &a, "test-model");

        // 0.40*50 + 0.25*40 + 0.20*50 + 0.15*40 = 46.0
        assert_eq!(s.composite, 46.0);
        assert!(s.composite >= 0.0 && s.composite <= 100.0);
        assert_eq!(s.priority, Priority::Low);
    }

    #[test]
    fn test_low_confidence_flags_human_review() {
        let v = vuln(Some(9.8), false, Some(3));
        let a = analysis(SafetyImpact::Medium, vec![Sector::Hospitals], 50, 0.5);
        let s = score(&v, &a, "test-model");
        assert!(s.needs_human_review);
    }
}
