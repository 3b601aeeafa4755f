use chrono::{DateTime, Utc};

use super::Database;
use crate::errors::VigilError;
use crate::models::recommendation::{ActionRecommendation, RecommendationType};

fn row_to_recommendation(row: &rusqlite::Row) -> rusqlite::Result<ActionRecommendation> {
    let type_str: String = row.get(1)?;
    let created_at: String = row.get(5)?;

    Ok(ActionRecommendation {
        cve_id: row.get(0)?,
        recommendation_type: RecommendationType::parse(&type_str)
            .unwrap_or(RecommendationType::Monitor),
        action: row.get(2)?,
        safe_to_implement: row.get::<_, i64>(3)? != 0,
        tier2_escalation_required: row.get::<_, i64>(4)? != 0,
        created_at: DateTime::parse_from_rfc3339(&created_at)
            .map(|d| d.with_timezone(&Utc))
            .unwrap_or_else(|_| Utc::now()),
    })
}

impl Database {
    pub fn insert_recommendations(&self, recs: &[ActionRecommendation]) -> Result<(), VigilError> {
        let conn = self.conn.lock().unwrap();
        for rec in recs {
            let id = uuid::Uuid::new_v4().to_string();
            conn.execute(
                "INSERT INTO recommendations (id, cve_id, recommendation_type, action, safe_to_implement, tier2_escalation_required, created_at) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
                rusqlite::params![
                    id,
                    rec.cve_id,
                    rec.recommendation_type.as_str(),
                    rec.action,
                    rec.safe_to_implement as i64,
                    rec.tier2_escalation_required as i64,
                    rec.created_at.to_rfc3339(),
                ],
            )
            .map_err(|e| VigilError::Database(format!("Failed to insert recommendation: {}", e)))?;
        }
        Ok(())
    }

    /// Recommendations in insertion order (rowid preserves template order).
    pub fn get_recommendations(&self, cve_id: &str) -> Result<Vec<ActionRecommendation>, VigilError> {
        let conn = self.conn.lock().unwrap();
        let mut stmt = conn
            .prepare(
                "SELECT cve_id, recommendation_type, action, safe_to_implement, tier2_escalation_required, created_at FROM recommendations WHERE cve_id = ?1 ORDER BY rowid ASC",
            )
            .map_err(|e| VigilError::Database(format!("Query failed: {}", e)))?;

        let rows = stmt
            .query_map(rusqlite::params![cve_id], row_to_recommendation)
            .map_err(|e| VigilError::Database(format!("Query error: {}", e)))?;

        let mut recs = Vec::new();
        for row in rows {
            recs.push(row.map_err(|e| VigilError::Database(format!("Row error: {}", e)))?);
        }
        Ok(recs)
    }

    pub fn count_recommendations(&self) -> Result<u64, VigilError> {
        let conn = self.conn.lock().unwrap();
        conn.query_row("SELECT COUNT(*) FROM recommendations", [], |row| row.get::<_, i64>(0))
            .map(|n| n as u64)
            .map_err(|e| VigilError::Database(format!("Query error: {}", e)))
    }
}
