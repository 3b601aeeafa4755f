use super::open_database;
use crate::config::VigilConfig;
use crate::errors::VigilError;
use crate::ingest::LAST_INGESTION_KEY;
use crate::models::CombinedIngestionResult;

pub async fn handle_status(config: &VigilConfig) -> Result<(), VigilError> {
    let db = open_database(config)?;

    let git_hash = option_env!("GIT_HASH").unwrap_or("dev");
    let build_ts = option_env!("BUILD_TIMESTAMP").unwrap_or("unknown");
    println!("biovigil {} ({}, built {})", env!("CARGO_PKG_VERSION"), git_hash, build_ts);
    println!();
    println!("Vulnerabilities:   {}", db.count_vulnerabilities()?);
    println!("Known exploited:   {}", db.count_known_exploited()?);
    println!("Scored:            {}", db.count_scores()?);
    println!("Recommendations:   {}", db.count_recommendations()?);

    match db.get_setting(LAST_INGESTION_KEY)? {
        Some(json) => match serde_json::from_str::<CombinedIngestionResult>(&json) {
            Ok(last) => {
                println!("Last ingestion:    {}", last.completed_at.to_rfc3339());
                println!("                   {}", last.summary());
            }
            Err(_) => println!("Last ingestion:    (unreadable record)"),
        },
        None => println!("Last ingestion:    never"),
    }

    Ok(())
}
