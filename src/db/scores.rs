use chrono::{DateTime, Utc};
use tracing::warn;

use super::Database;
use crate::errors::VigilError;
use crate::models::score::{BioImpactScore, Priority};
use crate::models::Sector;

const SELECT_COLUMNS: &str = "cve_id, human_safety, supply_chain, exploitability, patch_availability, composite, priority, confidence, affected_sectors, ai_audit, model_version, needs_human_review, created_at";

fn row_to_score(row: &rusqlite::Row) -> rusqlite::Result<BioImpactScore> {
    let priority_str: String = row.get(6)?;
    let sectors_json: Option<String> = row.get(8)?;
    let created_at: String = row.get(12)?;

    // An unrecognized stored priority degrades to MEDIUM rather than failing
    let priority = Priority::parse(&priority_str).unwrap_or_else(|| {
        warn!(priority = %priority_str, "Unrecognized stored priority, treating as MEDIUM");
        Priority::Medium
    });

    let affected_sectors: Vec<Sector> = sectors_json
        .as_deref()
        .and_then(|s| serde_json::from_str(s).ok())
        .unwrap_or_default();

    Ok(BioImpactScore {
        cve_id: row.get(0)?,
        human_safety: row.get(1)?,
        supply_chain: row.get(2)?,
        exploitability: row.get(3)?,
        patch_availability: row.get(4)?,
        composite: row.get(5)?,
        priority,
        confidence: row.get(7)?,
        affected_sectors,
        ai_audit: row.get(9)?,
        model_version: row.get(10)?,
        needs_human_review: row.get::<_, i64>(11)? != 0,
        created_at: DateTime::parse_from_rfc3339(&created_at)
            .map(|d| d.with_timezone(&Utc))
            .unwrap_or_else(|_| Utc::now()),
    })
}

impl Database {
    /// Insert a score row. Fails if one already exists for the identifier;
    /// replacing a score is an explicit caller decision via `replace_score`.
    pub fn insert_score(&self, score: &BioImpactScore) -> Result<(), VigilError> {
        let conn = self.conn.lock().unwrap();
        let id = uuid::Uuid::new_v4().to_string();
        let sectors = serde_json::to_string(&score.affected_sectors)
            .map_err(|e| VigilError::Database(format!("Failed to encode sectors: {}", e)))?;
        conn.execute(
            "INSERT INTO bio_impact_scores (id, cve_id, human_safety, supply_chain, exploitability, patch_availability, composite, priority, confidence, affected_sectors, ai_audit, model_version, needs_human_review, created_at) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14)",
            rusqlite::params![
                id,
                score.cve_id,
                score.human_safety,
                score.supply_chain,
                score.exploitability,
                score.patch_availability,
                score.composite,
                score.priority.as_str(),
                score.confidence,
                sectors,
                score.ai_audit,
                score.model_version,
                score.needs_human_review as i64,
                score.created_at.to_rfc3339(),
            ],
        )
        .map_err(|e| VigilError::Database(format!("Failed to insert score: {}", e)))?;
        Ok(())
    }

    /// Explicit re-analysis path: drop any existing score and the
    /// recommendations derived from it, then insert.
    pub fn replace_score(&self, score: &BioImpactScore) -> Result<(), VigilError> {
        {
            let conn = self.conn.lock().unwrap();
            conn.execute(
                "DELETE FROM recommendations WHERE cve_id = ?1",
                rusqlite::params![score.cve_id],
            )
            .map_err(|e| VigilError::Database(format!("Failed to delete recommendations: {}", e)))?;
            conn.execute(
                "DELETE FROM bio_impact_scores WHERE cve_id = ?1",
                rusqlite::params![score.cve_id],
            )
            .map_err(|e| VigilError::Database(format!("Failed to delete score: {}", e)))?;
        }
        self.insert_score(score)
    }

    pub fn has_score(&self, cve_id: &str) -> Result<bool, VigilError> {
        let conn = self.conn.lock().unwrap();
        let mut stmt = conn
            .prepare("SELECT 1 FROM bio_impact_scores WHERE cve_id = ?1")
            .map_err(|e| VigilError::Database(format!("Query failed: {}", e)))?;
        stmt.exists(rusqlite::params![cve_id])
            .map_err(|e| VigilError::Database(format!("Query error: {}", e)))
    }

    pub fn get_score(&self, cve_id: &str) -> Result<Option<BioImpactScore>, VigilError> {
        let conn = self.conn.lock().unwrap();
        let sql = format!("SELECT {} FROM bio_impact_scores WHERE cve_id = ?1", SELECT_COLUMNS);
        let mut stmt = conn
            .prepare(&sql)
            .map_err(|e| VigilError::Database(format!("Query failed: {}", e)))?;

        match stmt.query_row(rusqlite::params![cve_id], row_to_score) {
            Ok(s) => Ok(Some(s)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(VigilError::Database(format!("Query error: {}", e))),
        }
    }

    /// Identifiers that have a score but no recommendations yet.
    pub fn list_cves_needing_recommendations(&self) -> Result<Vec<String>, VigilError> {
        let conn = self.conn.lock().unwrap();
        let mut stmt = conn
            .prepare(
                "SELECT s.cve_id FROM bio_impact_scores s WHERE NOT EXISTS (SELECT 1 FROM recommendations r WHERE r.cve_id = s.cve_id) ORDER BY s.composite DESC",
            )
            .map_err(|e| VigilError::Database(format!("Query failed: {}", e)))?;

        let rows = stmt
            .query_map([], |row| row.get::<_, String>(0))
            .map_err(|e| VigilError::Database(format!("Query error: {}", e)))?;

        let mut ids = Vec::new();
        for row in rows {
            ids.push(row.map_err(|e| VigilError::Database(format!("Row error: {}", e)))?);
        }
        Ok(ids)
    }

    pub fn count_scores(&self) -> Result<u64, VigilError> {
        let conn = self.conn.lock().unwrap();
        conn.query_row("SELECT COUNT(*) FROM bio_impact_scores", [], |row| row.get::<_, i64>(0))
            .map(|n| n as u64)
            .map_err(|e| VigilError::Database(format!("Query error: {}", e)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Vulnerability;

    fn seed_vuln(db: &Database, cve_id: &str) {
        db.insert_vulnerability(&Vulnerability::new(cve_id, "test", "NVD")).unwrap();
    }

    fn make_score(cve_id: &str) -> BioImpactScore {
        BioImpactScore {
            cve_id: cve_id.to_string(),
            human_safety: 100.0,
            supply_chain: 50.0,
            exploitability: 90.0,
            patch_availability: 100.0,
            composite: 85.5,
            priority: Priority::Critical,
            confidence: Some(0.9),
            affected_sectors: vec![Sector::Hospitals, Sector::ClinicalLabs],
            ai_audit: Some("{\"relevance\": true}".into()),
            model_version: "llama3.1:8b".into(),
            needs_human_review: false,
            created_at: Utc::now(),
        }
    }

    #[test]
    fn test_insert_and_get_score() {
        let db = Database::in_memory().unwrap();
        seed_vuln(&db, "CVE-2024-1111");
        db.insert_score(&make_score("CVE-2024-1111")).unwrap();

        let s = db.get_score("CVE-2024-1111").unwrap().unwrap();
        assert_eq!(s.composite, 85.5);
        assert_eq!(s.priority, Priority::Critical);
        assert_eq!(s.affected_sectors, vec![Sector::Hospitals, Sector::ClinicalLabs]);
        assert_eq!(s.model_version, "llama3.1:8b");
    }

    #[test]
    fn test_second_insert_fails_without_replace() {
        let db = Database::in_memory().unwrap();
        seed_vuln(&db, "CVE-2024-2222");
        db.insert_score(&make_score("CVE-2024-2222")).unwrap();
        assert!(db.insert_score(&make_score("CVE-2024-2222")).is_err());

        // Explicit replacement is allowed
        let mut updated = make_score("CVE-2024-2222");
        updated.composite = 42.0;
        updated.priority = Priority::Low;
        db.replace_score(&updated).unwrap();
        assert_eq!(db.get_score("CVE-2024-2222").unwrap().unwrap().composite, 42.0);
    }

    #[test]
    fn test_has_score() {
        let db = Database::in_memory().unwrap();
        seed_vuln(&db, "CVE-2024-3333");
        assert!(!db.has_score("CVE-2024-3333").unwrap());
        db.insert_score(&make_score("CVE-2024-3333")).unwrap();
        assert!(db.has_score("CVE-2024-3333").unwrap());
    }

    #[test]
    fn test_list_cves_needing_recommendations() {
        let db = Database::in_memory().unwrap();
        seed_vuln(&db, "CVE-2024-4444");
        db.insert_score(&make_score("CVE-2024-4444")).unwrap();

        let ids = db.list_cves_needing_recommendations().unwrap();
        assert_eq!(ids, vec!["CVE-2024-4444".to_string()]);
    }
}
