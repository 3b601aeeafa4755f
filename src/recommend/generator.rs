//! Maps a priority level to a fixed set of templated remediation actions,
//! parameterized by the vulnerability's own identifier. Generation is
//! idempotent: an existing recommendation set is returned unchanged.

use tracing::info;

use crate::db::Database;
use crate::errors::VigilError;
use crate::models::recommendation::{ActionRecommendation, RecommendationType};
use crate::models::score::Priority;

pub struct RecommendationGenerator {
    db: Database,
}

fn advisory_url(cve_id: &str) -> String {
    format!("https://nvd.nist.gov/vuln/detail/{}", cve_id)
}

impl RecommendationGenerator {
    pub fn new(db: Database) -> Self {
        Self { db }
    }

    /// Generate recommendations for a scored vulnerability. Requires an
    /// existing bio-impact score; calling twice returns the same set.
    pub fn generate(&self, cve_id: &str) -> Result<Vec<ActionRecommendation>, VigilError> {
        let score = self.db.get_score(cve_id)?.ok_or_else(|| {
            VigilError::Precondition(format!(
                "No bio impact score exists for {}; run analysis before generating recommendations",
                cve_id
            ))
        })?;

        let existing = self.db.get_recommendations(cve_id)?;
        if !existing.is_empty() {
            return Ok(existing);
        }

        let recs = template_for(score.priority, cve_id);
        self.db.insert_recommendations(&recs)?;
        info!(cve_id, priority = %score.priority, count = recs.len(), "Generated recommendations");
        Ok(recs)
    }
}

/// Template dispatch over the closed priority enumeration. Unrecognized
/// stored values were already degraded to MEDIUM at the storage boundary.
fn template_for(priority: Priority, cve_id: &str) -> Vec<ActionRecommendation> {
    match priority {
        Priority::Critical => critical_template(cve_id),
        Priority::High => high_template(cve_id),
        Priority::Medium => medium_template(cve_id),
        Priority::Low => low_template(cve_id),
    }
}

fn critical_template(cve_id: &str) -> Vec<ActionRecommendation> {
    vec![
        ActionRecommendation::new(
            cve_id,
            RecommendationType::Immediate,
            format!(
                "Isolate affected systems from biosecurity-sensitive networks until {} is remediated",
                cve_id
            ),
            true,
            false,
        ),
        ActionRecommendation::new(
            cve_id,
            RecommendationType::Immediate,
            format!("Apply the vendor patch for {} as an emergency change; see {}", cve_id, advisory_url(cve_id)),
            true,
            false,
        ),
        ActionRecommendation::new(
            cve_id,
            RecommendationType::Immediate,
            format!("Audit access logs on systems exposed to {} for signs of exploitation", cve_id),
            true,
            false,
        ),
        ActionRecommendation::new(
            cve_id,
            RecommendationType::Monitor,
            format!("Enable enhanced monitoring for indicators associated with {}", cve_id),
            true,
            false,
        ),
        ActionRecommendation::new(
            cve_id,
            RecommendationType::Escalate,
            format!(
                "Escalate {} to the biosecurity incident response team for specialist review",
                cve_id
            ),
            false,
            true,
        ),
    ]
}

fn high_template(cve_id: &str) -> Vec<ActionRecommendation> {
    vec![
        ActionRecommendation::new(
            cve_id,
            RecommendationType::Immediate,
            format!("Apply the vendor patch for {} within 72 hours; see {}", cve_id, advisory_url(cve_id)),
            true,
            false,
        ),
        ActionRecommendation::new(
            cve_id,
            RecommendationType::Scheduled,
            format!("Verify network segmentation between systems affected by {} and lab equipment", cve_id),
            true,
            false,
        ),
        ActionRecommendation::new(
            cve_id,
            RecommendationType::Monitor,
            format!("Add detection rules covering exploitation attempts against {}", cve_id),
            true,
            false,
        ),
        ActionRecommendation::new(
            cve_id,
            RecommendationType::Escalate,
            format!("Notify the security lead if {} affects production biomanufacturing systems", cve_id),
            false,
            true,
        ),
    ]
}

fn medium_template(cve_id: &str) -> Vec<ActionRecommendation> {
    vec![
        ActionRecommendation::new(
            cve_id,
            RecommendationType::Scheduled,
            format!("Schedule patching of {} in the next maintenance window; see {}", cve_id, advisory_url(cve_id)),
            true,
            false,
        ),
        ActionRecommendation::new(
            cve_id,
            RecommendationType::Scheduled,
            format!("Confirm whether deployed inventory includes software affected by {}", cve_id),
            true,
            false,
        ),
        ActionRecommendation::new(
            cve_id,
            RecommendationType::Monitor,
            format!("Track {} for changes in exploitation status", cve_id),
            true,
            false,
        ),
    ]
}

fn low_template(cve_id: &str) -> Vec<ActionRecommendation> {
    vec![
        ActionRecommendation::new(
            cve_id,
            RecommendationType::Monitor,
            format!("Monitor {} via routine vulnerability management; see {}", cve_id, advisory_url(cve_id)),
            true,
            false,
        ),
        ActionRecommendation::new(
            cve_id,
            RecommendationType::Scheduled,
            format!("Fold {} into the next quarterly patch cycle", cve_id),
            true,
            false,
        ),
    ]
}
