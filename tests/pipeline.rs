use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use chrono::{Duration, Utc};

use biovigil::analysis::analyzer::{
    RelevanceAnalyzer, FALLBACK_HEURISTIC, SKIPPED_NO_KEYWORDS,
};
use biovigil::db::Database;
use biovigil::errors::VigilError;
use biovigil::llm::CompletionProvider;
use biovigil::models::{Priority, RecommendationType, SafetyImpact, Sector, Vulnerability};
use biovigil::recommend::RecommendationGenerator;
use biovigil::scoring::scorer::score_at;

/// Scripted provider: returns a fixed response and counts calls so tests can
/// assert which records reached the model.
struct StubProvider {
    response: Result<String, VigilError>,
    calls: AtomicU32,
}

impl StubProvider {
    fn returning(response: &str) -> Arc<Self> {
        Arc::new(Self {
            response: Ok(response.to_string()),
            calls: AtomicU32::new(0),
        })
    }

    fn failing() -> Arc<Self> {
        Arc::new(Self {
            response: Err(VigilError::ModelUnavailable("stub outage".into())),
            calls: AtomicU32::new(0),
        })
    }

    fn call_count(&self) -> u32 {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl CompletionProvider for StubProvider {
    async fn complete(&self, _prompt: &str, _temperature: f32) -> Result<String, VigilError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        match &self.response {
            Ok(s) => Ok(s.clone()),
            Err(_) => Err(VigilError::ModelUnavailable("stub outage".into())),
        }
    }

    fn model_name(&self) -> &str {
        "stub-model"
    }
}

fn test_db() -> Database {
    Database::in_memory().unwrap()
}

fn hospital_vuln() -> Vulnerability {
    let mut vuln = Vulnerability::new(
        "CVE-2024-31337",
        "Medical device vulnerability in hospital laboratory equipment allows \
         unauthenticated remote code execution",
        "NVD",
    );
    vuln.cvss_score = Some(9.8);
    vuln.published = Some(Utc::now() - Duration::days(2));
    vuln.vendor_product = Some("MedTech LabSystem 4".to_string());
    vuln
}

const GOOD_VERDICT: &str = r#"{
    "relevance": true,
    "relevanceScore": 95,
    "affectedSectors": ["Hospitals", "Clinical Labs"],
    "safetyImpact": "HIGH",
    "keyConcern": "Unauthenticated RCE on patient-adjacent lab systems",
    "recommendedPriority": "CRITICAL",
    "confidence": 0.9
}"#;

#[tokio::test]
async fn test_full_pipeline_critical_path() {
    let db = test_db();
    let vuln = hospital_vuln();
    db.insert_vulnerability(&vuln).unwrap();

    let provider = StubProvider::returning(GOOD_VERDICT);
    let analyzer = RelevanceAnalyzer::new(provider.clone());

    let analysis = analyzer.analyze(&vuln).await;
    assert_eq!(provider.call_count(), 1);
    assert!(analysis.relevant);
    assert_eq!(analysis.relevance_score, 95);
    assert_eq!(analysis.safety_impact, SafetyImpact::High);
    assert_eq!(
        analysis.affected_sectors,
        vec![Sector::Hospitals, Sector::ClinicalLabs]
    );

    // HIGH impact + patient-facing sector capped at 100; two sectors, no
    // production sector; 9.8 severity not on the KEV list; patched window
    // under 7 days at critical severity.
    // 0.40*100 + 0.25*50 + 0.20*90 + 0.15*100 = 85.5
    let score = score_at(&vuln, &analysis, analyzer.model_version(), Utc::now());
    assert_eq!(score.human_safety, 100.0);
    assert_eq!(score.supply_chain, 50.0);
    assert_eq!(score.exploitability, 90.0);
    assert_eq!(score.patch_availability, 100.0);
    assert_eq!(score.composite, 85.5);
    assert_eq!(score.priority, Priority::Critical);
    assert!(!score.needs_human_review);
    assert_eq!(score.model_version, "stub-model");

    db.insert_score(&score).unwrap();
    let stored = db.get_score(&vuln.cve_id).unwrap().unwrap();
    assert_eq!(stored.composite, 85.5);
    assert_eq!(stored.priority, Priority::Critical);

    let generator = RecommendationGenerator::new(db.clone());
    let recs = generator.generate(&vuln.cve_id).unwrap();
    assert_eq!(recs.len(), 5);
    assert!(recs
        .iter()
        .any(|r| r.recommendation_type == RecommendationType::Escalate
            && r.tier2_escalation_required));
    assert!(recs
        .iter()
        .filter(|r| r.recommendation_type == RecommendationType::Immediate)
        .count()
        >= 3);

    // Generation is idempotent: a second call returns the stored actions
    let again = generator.generate(&vuln.cve_id).unwrap();
    assert_eq!(again.len(), recs.len());
    assert_eq!(db.count_recommendations().unwrap(), 5);
}

#[tokio::test]
async fn test_irrelevant_record_never_reaches_model() {
    let provider = StubProvider::returning(GOOD_VERDICT);
    let analyzer = RelevanceAnalyzer::new(provider.clone());

    let vuln = Vulnerability::new(
        "CVE-2024-1000",
        "Buffer overflow in router firmware allows remote code execution",
        "NVD",
    );

    let analysis = analyzer.analyze(&vuln).await;
    assert_eq!(provider.call_count(), 0);
    assert!(!analysis.relevant);
    assert_eq!(analysis.relevance_score, 0);
    assert_eq!(analysis.raw_response, SKIPPED_NO_KEYWORDS);

    // The short-circuit verdict is confident enough to skip human review
    let score = score_at(&vuln, &analysis, "stub-model", Utc::now());
    assert!(!score.needs_human_review);
}

#[tokio::test]
async fn test_model_outage_falls_back_to_heuristic_and_flags_review() {
    let provider = StubProvider::failing();
    let analyzer = RelevanceAnalyzer::new(provider.clone());

    let vuln = hospital_vuln();
    let analysis = analyzer.analyze(&vuln).await;
    assert_eq!(provider.call_count(), 1);
    assert_eq!(analysis.raw_response, FALLBACK_HEURISTIC);
    assert!(analysis.relevant);
    assert_eq!(analysis.confidence, 0.5);

    // Heuristic confidence sits below the review floor
    let score = score_at(&vuln, &analysis, "stub-model", Utc::now());
    assert!(score.needs_human_review);
}

#[tokio::test]
async fn test_malformed_response_salvaged_by_regex() {
    let provider =
        StubProvider::returning("Sure! Here is my answer: relevance: true, relevanceScore: 80");
    let analyzer = RelevanceAnalyzer::new(provider.clone());

    let analysis = analyzer.analyze(&hospital_vuln()).await;
    assert_eq!(provider.call_count(), 1);
    assert!(analysis.relevant);
    assert_eq!(analysis.relevance_score, 80);
    assert_eq!(analysis.confidence, 0.6);
    assert_eq!(analysis.recommended_priority, Priority::High);
}

#[tokio::test]
async fn test_recommendations_require_a_stored_score() {
    let db = test_db();
    db.insert_vulnerability(&hospital_vuln()).unwrap();

    let generator = RecommendationGenerator::new(db);
    match generator.generate("CVE-2024-31337") {
        Err(VigilError::Precondition(msg)) => assert!(msg.contains("CVE-2024-31337")),
        other => panic!("expected precondition error, got {:?}", other.map(|r| r.len())),
    }
}

#[tokio::test]
async fn test_reanalysis_replaces_score_and_cascades() {
    let db = test_db();
    let vuln = hospital_vuln();
    db.insert_vulnerability(&vuln).unwrap();

    let analyzer = RelevanceAnalyzer::new(StubProvider::returning(GOOD_VERDICT));
    let analysis = analyzer.analyze(&vuln).await;
    let score = score_at(&vuln, &analysis, "stub-model", Utc::now());
    db.insert_score(&score).unwrap();

    let generator = RecommendationGenerator::new(db.clone());
    assert_eq!(generator.generate(&vuln.cve_id).unwrap().len(), 5);

    // Replacing the score drops its recommendations with it
    db.replace_score(&score).unwrap();
    assert_eq!(db.get_recommendations(&vuln.cve_id).unwrap().len(), 0);
    assert_eq!(generator.generate(&vuln.cve_id).unwrap().len(), 5);
}
