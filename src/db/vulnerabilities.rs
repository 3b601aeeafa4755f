use chrono::{DateTime, Utc};

use super::Database;
use crate::errors::VigilError;
use crate::models::Vulnerability;

fn row_to_vulnerability(row: &rusqlite::Row) -> rusqlite::Result<Vulnerability> {
    let published: Option<String> = row.get(5)?;
    let raw_source: Option<String> = row.get(8)?;
    let created_at: String = row.get(9)?;
    let updated_at: String = row.get(10)?;

    Ok(Vulnerability {
        cve_id: row.get(0)?,
        description: row.get(1)?,
        source: row.get(2)?,
        cvss_score: row.get(3)?,
        cvss_vector: row.get(4)?,
        published: published
            .as_deref()
            .and_then(|s| DateTime::parse_from_rfc3339(s).ok())
            .map(|d| d.with_timezone(&Utc)),
        vendor_product: row.get(6)?,
        known_exploited: row.get::<_, i64>(7)? != 0,
        raw_source: raw_source.as_deref().and_then(|s| serde_json::from_str(s).ok()),
        created_at: DateTime::parse_from_rfc3339(&created_at)
            .map(|d| d.with_timezone(&Utc))
            .unwrap_or_else(|_| Utc::now()),
        updated_at: DateTime::parse_from_rfc3339(&updated_at)
            .map(|d| d.with_timezone(&Utc))
            .unwrap_or_else(|_| Utc::now()),
    })
}

const SELECT_COLUMNS: &str = "cve_id, description, source, cvss_score, cvss_vector, published, vendor_product, known_exploited, raw_source, created_at, updated_at";

impl Database {
    /// Insert a new vulnerability row. Fails on a duplicate identifier; the
    /// UNIQUE constraint is the race arbiter for concurrent ingestion runs.
    pub fn insert_vulnerability(&self, vuln: &Vulnerability) -> Result<(), VigilError> {
        let conn = self.conn.lock().unwrap();
        conn.execute(
            "INSERT INTO vulnerabilities (cve_id, description, source, cvss_score, cvss_vector, published, vendor_product, known_exploited, raw_source, created_at, updated_at) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11)",
            rusqlite::params![
                vuln.cve_id,
                vuln.description,
                vuln.source,
                vuln.cvss_score,
                vuln.cvss_vector,
                vuln.published.map(|d| d.to_rfc3339()),
                vuln.vendor_product,
                vuln.known_exploited as i64,
                vuln.raw_source.as_ref().map(|v| v.to_string()),
                vuln.created_at.to_rfc3339(),
                vuln.updated_at.to_rfc3339(),
            ],
        )
        .map_err(|e| VigilError::Database(format!("Failed to insert vulnerability: {}", e)))?;
        Ok(())
    }

    pub fn vulnerability_exists(&self, cve_id: &str) -> Result<bool, VigilError> {
        let conn = self.conn.lock().unwrap();
        let mut stmt = conn
            .prepare("SELECT 1 FROM vulnerabilities WHERE cve_id = ?1")
            .map_err(|e| VigilError::Database(format!("Query failed: {}", e)))?;
        stmt.exists(rusqlite::params![cve_id])
            .map_err(|e| VigilError::Database(format!("Query error: {}", e)))
    }

    pub fn get_vulnerability(&self, cve_id: &str) -> Result<Option<Vulnerability>, VigilError> {
        let conn = self.conn.lock().unwrap();
        let sql = format!("SELECT {} FROM vulnerabilities WHERE cve_id = ?1", SELECT_COLUMNS);
        let mut stmt = conn
            .prepare(&sql)
            .map_err(|e| VigilError::Database(format!("Query failed: {}", e)))?;

        match stmt.query_row(rusqlite::params![cve_id], row_to_vulnerability) {
            Ok(v) => Ok(Some(v)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(VigilError::Database(format!("Query error: {}", e))),
        }
    }

    /// Refresh the feed-sourced fields of an existing row so re-ingestion
    /// picks up late-assigned CVSS scores or revised descriptions. Does not
    /// touch `known_exploited`; that flag is monotone and only ever set by
    /// `mark_known_exploited`.
    pub fn refresh_vulnerability(&self, vuln: &Vulnerability) -> Result<(), VigilError> {
        let conn = self.conn.lock().unwrap();
        conn.execute(
            "UPDATE vulnerabilities SET description = ?2, cvss_score = ?3, cvss_vector = ?4, published = ?5, vendor_product = ?6, raw_source = ?7, updated_at = ?8 WHERE cve_id = ?1",
            rusqlite::params![
                vuln.cve_id,
                vuln.description,
                vuln.cvss_score,
                vuln.cvss_vector,
                vuln.published.map(|d| d.to_rfc3339()),
                vuln.vendor_product,
                vuln.raw_source.as_ref().map(|v| v.to_string()),
                Utc::now().to_rfc3339(),
            ],
        )
        .map_err(|e| VigilError::Database(format!("Failed to refresh vulnerability: {}", e)))?;
        Ok(())
    }

    /// Set known_exploited = true. Monotone: there is deliberately no path
    /// that clears the flag once set.
    pub fn mark_known_exploited(&self, cve_id: &str) -> Result<(), VigilError> {
        let conn = self.conn.lock().unwrap();
        conn.execute(
            "UPDATE vulnerabilities SET known_exploited = 1, updated_at = ?2 WHERE cve_id = ?1",
            rusqlite::params![cve_id, Utc::now().to_rfc3339()],
        )
        .map_err(|e| VigilError::Database(format!("Failed to mark known exploited: {}", e)))?;
        Ok(())
    }

    /// Vulnerabilities that have no bio impact score yet, oldest first.
    pub fn list_unscored(&self, limit: Option<u32>) -> Result<Vec<Vulnerability>, VigilError> {
        let conn = self.conn.lock().unwrap();
        let sql = format!(
            "SELECT {} FROM vulnerabilities v WHERE NOT EXISTS (SELECT 1 FROM bio_impact_scores s WHERE s.cve_id = v.cve_id) ORDER BY v.created_at ASC LIMIT ?1",
            SELECT_COLUMNS
        );
        let mut stmt = conn
            .prepare(&sql)
            .map_err(|e| VigilError::Database(format!("Query failed: {}", e)))?;

        let limit = limit.map(|l| l as i64).unwrap_or(-1);
        let rows = stmt
            .query_map(rusqlite::params![limit], row_to_vulnerability)
            .map_err(|e| VigilError::Database(format!("Query error: {}", e)))?;

        let mut vulns = Vec::new();
        for row in rows {
            vulns.push(row.map_err(|e| VigilError::Database(format!("Row error: {}", e)))?);
        }
        Ok(vulns)
    }

    pub fn list_vulnerabilities(&self, limit: Option<u32>) -> Result<Vec<Vulnerability>, VigilError> {
        let conn = self.conn.lock().unwrap();
        let sql = format!(
            "SELECT {} FROM vulnerabilities ORDER BY created_at ASC LIMIT ?1",
            SELECT_COLUMNS
        );
        let mut stmt = conn
            .prepare(&sql)
            .map_err(|e| VigilError::Database(format!("Query failed: {}", e)))?;

        let limit = limit.map(|l| l as i64).unwrap_or(-1);
        let rows = stmt
            .query_map(rusqlite::params![limit], row_to_vulnerability)
            .map_err(|e| VigilError::Database(format!("Query error: {}", e)))?;

        let mut vulns = Vec::new();
        for row in rows {
            vulns.push(row.map_err(|e| VigilError::Database(format!("Row error: {}", e)))?);
        }
        Ok(vulns)
    }

    pub fn count_vulnerabilities(&self) -> Result<u64, VigilError> {
        let conn = self.conn.lock().unwrap();
        conn.query_row("SELECT COUNT(*) FROM vulnerabilities", [], |row| row.get::<_, i64>(0))
            .map(|n| n as u64)
            .map_err(|e| VigilError::Database(format!("Query error: {}", e)))
    }

    pub fn count_known_exploited(&self) -> Result<u64, VigilError> {
        let conn = self.conn.lock().unwrap();
        conn.query_row(
            "SELECT COUNT(*) FROM vulnerabilities WHERE known_exploited = 1",
            [],
            |row| row.get::<_, i64>(0),
        )
        .map(|n| n as u64)
        .map_err(|e| VigilError::Database(format!("Query error: {}", e)))
    }
}
