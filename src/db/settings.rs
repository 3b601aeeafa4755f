use super::Database;
use crate::errors::VigilError;

impl Database {
    pub fn get_setting(&self, key: &str) -> Result<Option<String>, VigilError> {
        let conn = self.conn.lock().unwrap();
        let mut stmt = conn
            .prepare("SELECT value FROM settings WHERE key = ?1")
            .map_err(|e| VigilError::Database(format!("Query failed: {}", e)))?;

        match stmt.query_row(rusqlite::params![key], |row: &rusqlite::Row| row.get::<_, String>(0)) {
            Ok(v) => Ok(Some(v)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(VigilError::Database(format!("Query error: {}", e))),
        }
    }

    pub fn set_setting(&self, key: &str, value: &str) -> Result<(), VigilError> {
        let conn = self.conn.lock().unwrap();
        conn.execute(
            "INSERT OR REPLACE INTO settings (key, value) VALUES (?1, ?2)",
            rusqlite::params![key, value],
        )
        .map_err(|e| VigilError::Database(format!("Insert failed: {}", e)))?;
        Ok(())
    }
}
