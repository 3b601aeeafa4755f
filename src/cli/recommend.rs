use tracing::info;

use super::commands::RecommendArgs;
use super::open_database;
use crate::config::VigilConfig;
use crate::errors::VigilError;
use crate::models::ActionRecommendation;
use crate::recommend::RecommendationGenerator;

pub async fn handle_recommend(args: RecommendArgs, config: &VigilConfig) -> Result<(), VigilError> {
    let db = open_database(config)?;
    let generator = RecommendationGenerator::new(db.clone());

    let targets = if args.all {
        db.list_cves_needing_recommendations()?
    } else {
        match args.cve {
            Some(cve) => vec![cve],
            None => {
                return Err(VigilError::Validation(
                    "Pass a CVE identifier or --all".into(),
                ))
            }
        }
    };

    if targets.is_empty() {
        println!("No scored CVEs need recommendations");
        return Ok(());
    }

    info!(count = targets.len(), "Generating recommendations");
    for cve_id in &targets {
        let recs = generator.generate(cve_id)?;
        print_recommendations(cve_id, &recs);
    }
    Ok(())
}

fn print_recommendations(cve_id: &str, recs: &[ActionRecommendation]) {
    println!("{} ({} actions)", cve_id, recs.len());
    for rec in recs {
        let mut flags = Vec::new();
        if !rec.safe_to_implement {
            flags.push("verify first");
        }
        if rec.tier2_escalation_required {
            flags.push("tier-2 escalation");
        }
        let suffix = if flags.is_empty() {
            String::new()
        } else {
            format!(" [{}]", flags.join(", "))
        };
        println!("  {}: {}{}", rec.recommendation_type.as_str(), rec.action, suffix);
    }
}
