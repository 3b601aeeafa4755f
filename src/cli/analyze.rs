use std::sync::Arc;
use std::time::Duration;

use tracing::{info, warn};

use super::commands::AnalyzeArgs;
use super::open_database;
use crate::analysis::RelevanceAnalyzer;
use crate::config::VigilConfig;
use crate::db::Database;
use crate::errors::VigilError;
use crate::llm::OllamaProvider;
use crate::models::Vulnerability;
use crate::scoring;
use crate::utils::Pacer;

const DEFAULT_MODEL_PAUSE_SECS: u64 = 1;

pub async fn handle_analyze(args: AnalyzeArgs, config: &VigilConfig) -> Result<(), VigilError> {
    let db = open_database(config)?;

    let model_config = config.model.clone().unwrap_or_default();
    let provider = OllamaProvider::new(
        model_config.base_url.as_deref(),
        model_config.model.as_deref(),
    );
    let analyzer = RelevanceAnalyzer::new(Arc::new(provider));

    let batch = select_batch(&db, &args)?;
    if batch.is_empty() {
        println!("Nothing to analyze");
        return Ok(());
    }

    info!(count = batch.len(), force = args.force, "Starting analysis batch");

    let pause_secs = config
        .pacing
        .as_ref()
        .and_then(|p| p.model_pause_secs)
        .unwrap_or(DEFAULT_MODEL_PAUSE_SECS);
    let pacer = Pacer::new(Duration::from_secs(pause_secs));

    let mut scored = 0u64;
    let mut failed = 0u64;
    for (i, vuln) in batch.iter().enumerate() {
        if i > 0 {
            pacer.pause().await;
        }
        let analysis = analyzer.analyze(vuln).await;
        let score = scoring::score(vuln, &analysis, analyzer.model_version());

        let stored = if args.force {
            db.replace_score(&score)
        } else {
            db.insert_score(&score)
        };
        match stored {
            Ok(()) => {
                scored += 1;
                println!(
                    "{}: {} ({:.2}){}",
                    score.cve_id,
                    score.priority,
                    score.composite,
                    if score.needs_human_review { " [needs review]" } else { "" }
                );
            }
            Err(e) => {
                warn!(cve_id = %vuln.cve_id, error = %e, "Failed to store score");
                failed += 1;
            }
        }
    }

    println!("Analyzed {} vulnerabilities ({} failed)", scored, failed);
    Ok(())
}

/// Batch selection: a single named CVE, or the unscored backlog. With
/// `--force` a named CVE is re-analyzed even when a score exists.
fn select_batch(db: &Database, args: &AnalyzeArgs) -> Result<Vec<Vulnerability>, VigilError> {
    if let Some(cve_id) = &args.cve {
        let vuln = db.get_vulnerability(cve_id)?.ok_or_else(|| {
            VigilError::Precondition(format!("{} has not been ingested", cve_id))
        })?;
        if !args.force && db.has_score(cve_id)? {
            return Err(VigilError::Precondition(format!(
                "{} is already scored; pass --force to re-analyze",
                cve_id
            )));
        }
        return Ok(vec![vuln]);
    }

    if args.force {
        db.list_vulnerabilities(args.limit)
    } else {
        db.list_unscored(args.limit)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Vulnerability;

    fn seeded_db() -> Database {
        let db = Database::in_memory().unwrap();
        db.insert_vulnerability(&Vulnerability::new(
            "CVE-2024-0001",
            "Hospital infusion pump overflow",
            "NVD",
        ))
        .unwrap();
        db
    }

    #[test]
    fn test_select_batch_unknown_cve_is_precondition_error() {
        let db = seeded_db();
        let args = AnalyzeArgs { limit: None, force: false, cve: Some("CVE-2024-9999".into()) };
        assert!(matches!(select_batch(&db, &args), Err(VigilError::Precondition(_))));
    }

    #[test]
    fn test_select_batch_named_cve() {
        let db = seeded_db();
        let args = AnalyzeArgs { limit: None, force: false, cve: Some("CVE-2024-0001".into()) };
        let batch = select_batch(&db, &args).unwrap();
        assert_eq!(batch.len(), 1);
        assert_eq!(batch[0].cve_id, "CVE-2024-0001");
    }

    #[test]
    fn test_select_batch_defaults_to_unscored() {
        let db = seeded_db();
        let args = AnalyzeArgs { limit: None, force: false, cve: None };
        assert_eq!(select_batch(&db, &args).unwrap().len(), 1);
    }
}
