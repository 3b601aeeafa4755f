//! The relevance analyzer: a cascade of strategies where each stage is a
//! fallback for the one before it. The final heuristic stage cannot fail, so
//! `analyze` always returns a fully-populated verdict.

use std::sync::{Arc, OnceLock};

use regex::Regex;
use serde::Deserialize;
use tracing::{debug, warn};

use super::{keywords, safety};
use crate::llm::CompletionProvider;
use crate::models::{BioRelevanceAnalysis, Priority, SafetyImpact, Sector, Vulnerability};

pub const ANALYSIS_TEMPERATURE: f32 = 0.3;

/// Provenance markers recorded in `raw_response` for non-generative paths.
pub const SKIPPED_NO_KEYWORDS: &str = "skipped: no bio keywords";
pub const SKIPPED_SUSPICIOUS: &str = "skipped: suspicious input, fallback heuristic used";
pub const FALLBACK_HEURISTIC: &str = "fallback heuristic used";

pub struct RelevanceAnalyzer {
    provider: Arc<dyn CompletionProvider>,
}

/// The strict JSON object requested from the model.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ModelVerdict {
    relevance: bool,
    #[serde(default)]
    relevance_score: f64,
    #[serde(default)]
    affected_sectors: Vec<String>,
    safety_impact: Option<String>,
    key_concern: Option<String>,
    recommended_priority: Option<String>,
    confidence: Option<f64>,
}

impl RelevanceAnalyzer {
    pub fn new(provider: Arc<dyn CompletionProvider>) -> Self {
        Self { provider }
    }

    pub fn model_version(&self) -> &str {
        self.provider.model_name()
    }

    /// Analyze a vulnerability for bio-relevance. Never fails: every exit
    /// path returns a complete verdict, with `raw_response` recording which
    /// stage produced it.
    pub async fn analyze(&self, vuln: &Vulnerability) -> BioRelevanceAnalysis {
        let haystack = match &vuln.vendor_product {
            Some(vp) => format!("{} {}", vuln.description, vp),
            None => vuln.description.clone(),
        };

        // Stage 1: keyword gate. Cost control, not the final verdict.
        let matches = keywords::find_matches(&haystack);
        if matches.is_empty() {
            debug!(cve_id = %vuln.cve_id, "No bio keywords, skipping model call");
            return not_relevant_verdict();
        }

        // Stage 2: untrusted input is never forwarded to the model.
        if safety::is_suspicious(&haystack) {
            warn!(cve_id = %vuln.cve_id, "Suspicious input, skipping model call");
            return heuristic_verdict(vuln, &matches, SKIPPED_SUSPICIOUS);
        }

        // Stage 3: generative analysis.
        let prompt = build_prompt(vuln);
        match self.provider.complete(&prompt, ANALYSIS_TEMPERATURE).await {
            Ok(raw) => {
                if let Some(verdict) = parse_structured(&raw) {
                    return verdict;
                }
                // Stage 4: regex salvage of a malformed response.
                if let Some(verdict) = regex_salvage(&raw, &matches) {
                    debug!(cve_id = %vuln.cve_id, "Structured decode failed, regex salvage succeeded");
                    return verdict;
                }
                warn!(cve_id = %vuln.cve_id, "Unparseable model response, using heuristic");
                heuristic_verdict(vuln, &matches, FALLBACK_HEURISTIC)
            }
            Err(e) => {
                // Stage 5: model outage is never terminal.
                warn!(cve_id = %vuln.cve_id, error = %e, "Model call failed, using heuristic");
                heuristic_verdict(vuln, &matches, FALLBACK_HEURISTIC)
            }
        }
    }
}

fn build_prompt(vuln: &Vulnerability) -> String {
    let description = safety::sanitize(&vuln.description);
    let vendor = vuln
        .vendor_product
        .as_deref()
        .map(safety::sanitize)
        .unwrap_or_else(|| "unknown".to_string());
    let severity = vuln
        .cvss_score
        .map(|s| format!("{:.1}", s))
        .unwrap_or_else(|| "unscored".to_string());

    format!(
        "You are a biosecurity analyst. Assess whether this software vulnerability \
         is relevant to biosecurity-sensitive sectors (Hospitals, Clinical Labs, \
         Biomanufacturing, Pharmaceutical, Food & Agriculture, Research).\n\n\
         Vulnerability: {id}\n\
         CVSS severity: {severity}\n\
         Vendor/products: {vendor}\n\
         Description: {description}\n\n\
         Respond with ONLY a JSON object, no other text:\n\
         {{\"relevance\": true|false, \"relevanceScore\": 0-100, \
         \"affectedSectors\": [\"...\"], \"safetyImpact\": \"HIGH|MEDIUM|LOW|NONE\", \
         \"keyConcern\": \"one sentence\", \
         \"recommendedPriority\": \"CRITICAL|HIGH|MEDIUM|LOW\", \
         \"confidence\": 0.0-1.0}}",
        id = vuln.cve_id,
        severity = severity,
        vendor = vendor,
        description = description,
    )
}

/// The first balanced `{...}` substring of the text, if any.
fn extract_json_object(text: &str) -> Option<&str> {
    let start = text.find('{')?;
    let mut depth = 0usize;
    for (i, c) in text[start..].char_indices() {
        match c {
            '{' => depth += 1,
            '}' => {
                depth = depth.saturating_sub(1);
                if depth == 0 {
                    return Some(&text[start..start + i + 1]);
                }
            }
            _ => {}
        }
    }
    None
}

/// Structured decode of the model output with clamping and closed-vocabulary
/// validation. Out-of-vocabulary impact/priority values substitute the safe
/// defaults NONE/LOW.
fn parse_structured(raw: &str) -> Option<BioRelevanceAnalysis> {
    let json_str = extract_json_object(raw)?;
    let verdict: ModelVerdict = serde_json::from_str(json_str).ok()?;

    let relevance_score = verdict.relevance_score.clamp(0.0, 100.0).round() as u8;
    let confidence = verdict.confidence.unwrap_or(0.5).clamp(0.0, 1.0);

    let safety_impact = verdict
        .safety_impact
        .as_deref()
        .and_then(SafetyImpact::parse)
        .unwrap_or(SafetyImpact::None);
    let recommended_priority = verdict
        .recommended_priority
        .as_deref()
        .and_then(Priority::parse)
        .unwrap_or(Priority::Low);

    let mut affected_sectors: Vec<Sector> = Vec::new();
    for label in &verdict.affected_sectors {
        if let Some(sector) = Sector::parse_loose(label) {
            if !affected_sectors.contains(&sector) {
                affected_sectors.push(sector);
            }
        }
    }

    Some(BioRelevanceAnalysis {
        relevant: verdict.relevance,
        relevance_score,
        affected_sectors,
        safety_impact,
        key_concern: verdict
            .key_concern
            .unwrap_or_else(|| "No specific concern identified".to_string()),
        recommended_priority,
        confidence,
        raw_response: raw.to_string(),
    })
}

fn salvage_bool_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r#"(?i)"?relevance"?\s*:\s*(true|false)"#).expect("static regex"))
}

fn salvage_score_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r#"(?i)"?relevanceScore"?\s*:\s*(\d{1,3})"#).expect("static regex"))
}

/// Pull individual fields out of text that failed structured decode. Returns
/// None when neither field is recoverable.
fn regex_salvage(raw: &str, matches: &[&str]) -> Option<BioRelevanceAnalysis> {
    let relevant = salvage_bool_regex()
        .captures(raw)
        .map(|c| c[1].eq_ignore_ascii_case("true"));
    let score = salvage_score_regex()
        .captures(raw)
        .and_then(|c| c[1].parse::<u32>().ok())
        .map(|v| v.min(100) as u8);

    if relevant.is_none() && score.is_none() {
        return None;
    }

    let relevance_score = score.unwrap_or(if relevant == Some(true) { 50 } else { 0 });
    let relevant = relevant.unwrap_or(relevance_score >= 50);
    let recommended_priority = if relevance_score > 60 { Priority::High } else { Priority::Medium };

    Some(BioRelevanceAnalysis {
        relevant,
        relevance_score,
        affected_sectors: keywords::sectors_for(matches),
        safety_impact: SafetyImpact::Medium,
        key_concern: "Partially parsed model output".to_string(),
        recommended_priority,
        confidence: 0.6,
        raw_response: raw.to_string(),
    })
}

/// Deterministic short-circuit verdict for records with no bio keywords.
fn not_relevant_verdict() -> BioRelevanceAnalysis {
    BioRelevanceAnalysis {
        relevant: false,
        relevance_score: 0,
        affected_sectors: Vec::new(),
        safety_impact: SafetyImpact::None,
        key_concern: "No biosecurity-relevant keywords found".to_string(),
        recommended_priority: Priority::Low,
        confidence: 0.95,
        raw_response: SKIPPED_NO_KEYWORDS.to_string(),
    }
}

/// Guaranteed terminal branch: relevance purely from keyword matches,
/// optionally boosted by severity.
fn heuristic_verdict(vuln: &Vulnerability, matches: &[&str], marker: &str) -> BioRelevanceAnalysis {
    let base: u32 = match matches.len() {
        0 => 0,
        1..=2 => 25,
        3..=4 => 50,
        _ => 75,
    };
    let boost: u32 = match vuln.cvss_score {
        Some(s) if s >= 9.0 => 10,
        Some(s) if s >= 7.0 => 5,
        _ => 0,
    };
    let relevance_score = (base + boost).min(100) as u8;

    let safety_impact = if relevance_score >= 50 {
        SafetyImpact::Medium
    } else if relevance_score > 0 {
        SafetyImpact::Low
    } else {
        SafetyImpact::None
    };
    let recommended_priority = if relevance_score > 60 {
        Priority::High
    } else if relevance_score >= 25 {
        Priority::Medium
    } else {
        Priority::Low
    };

    BioRelevanceAnalysis {
        relevant: relevance_score > 0,
        relevance_score,
        affected_sectors: keywords::sectors_for(matches),
        safety_impact,
        key_concern: format!("Keyword heuristic matched {} bio-relevant terms", matches.len()),
        recommended_priority,
        confidence: 0.5,
        raw_response: marker.to_string(),
    }
}
