//! Database operations for assessment history.

use super::types::{AssessmentHistoryPage, AssessmentRecord};
use crate::core::risk::RiskTier;
use crate::error::HistoryError;
use chrono::{DateTime, Utc};
use rusqlite::types::Type;
use rusqlite::{params, Connection, Row};
use std::path::{Path, PathBuf};
use std::sync::{Mutex, MutexGuard};
use uuid::Uuid;

const SELECT_COLUMNS: &str = "SELECT id, assessed_at, query, corpus, image_match, matched_candidate,
        symptoms, symptom_count, tier
 FROM assessments";

/// SQLite-backed store of past assessments
pub struct AssessmentHistory {
    conn: Mutex<Connection>,
}

impl AssessmentHistory {
    /// Open or create the history database
    pub fn open(path: &Path) -> Result<Self, HistoryError> {
        let open_failed = |reason: String| HistoryError::OpenFailed {
            path: path.to_path_buf(),
            reason,
        };

        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| open_failed(e.to_string()))?;
        }

        let conn = Connection::open(path).map_err(|e| open_failed(e.to_string()))?;
        conn.execute_batch("PRAGMA journal_mode=WAL;")
            .map_err(|e| open_failed(e.to_string()))?;

        Self::with_connection(conn)
    }

    /// Open a throwaway in-memory store
    pub fn open_in_memory() -> Result<Self, HistoryError> {
        Self::with_connection(Connection::open_in_memory()?)
    }

    fn with_connection(conn: Connection) -> Result<Self, HistoryError> {
        conn.execute(
            "CREATE TABLE IF NOT EXISTS assessments (
                id TEXT PRIMARY KEY,
                assessed_at INTEGER NOT NULL,
                query TEXT NOT NULL,
                corpus TEXT NOT NULL,
                image_match INTEGER NOT NULL,
                matched_candidate TEXT,
                symptoms TEXT NOT NULL,
                symptom_count INTEGER NOT NULL,
                tier TEXT NOT NULL
            )",
            [],
        )?;

        conn.execute(
            "CREATE INDEX IF NOT EXISTS idx_assessments_time ON assessments(assessed_at DESC)",
            [],
        )?;

        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    /// Default database location under the user's data directory
    pub fn default_path() -> PathBuf {
        dirs::data_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("canscan-lite")
            .join("history.db")
    }

    /// Generate a new unique ID
    pub fn generate_id() -> String {
        Uuid::new_v4().to_string()
    }

    fn lock(&self) -> Result<MutexGuard<'_, Connection>, HistoryError> {
        self.conn.lock().map_err(|_| HistoryError::LockPoisoned)
    }

    /// Save an assessment, replacing any record with the same id
    pub fn save(&self, record: &AssessmentRecord) -> Result<(), HistoryError> {
        let conn = self.lock()?;
        let symptoms_json = serde_json::to_string(&record.symptoms)?;

        conn.execute(
            "INSERT OR REPLACE INTO assessments
             (id, assessed_at, query, corpus, image_match, matched_candidate,
              symptoms, symptom_count, tier)
             VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?)",
            params![
                record.id,
                record.assessed_at.timestamp_millis(),
                record.query,
                record.corpus,
                record.image_match,
                record.matched_candidate,
                symptoms_json,
                record.symptom_count as i64,
                record.tier.as_str(),
            ],
        )?;

        Ok(())
    }

    /// List assessments, newest first
    pub fn list(&self, limit: usize, offset: usize) -> Result<AssessmentHistoryPage, HistoryError> {
        let conn = self.lock()?;

        let total_count: usize = conn.query_row("SELECT COUNT(*) FROM assessments", [], |row| {
            row.get::<_, i64>(0).map(|v| v as usize)
        })?;

        let mut stmt = conn.prepare(&format!(
            "{} ORDER BY assessed_at DESC, rowid DESC LIMIT ? OFFSET ?",
            SELECT_COLUMNS
        ))?;

        let entries = stmt
            .query_map(params![limit as i64, offset as i64], record_from_row)?
            .collect::<Result<Vec<_>, _>>()?;

        Ok(AssessmentHistoryPage {
            entries,
            total_count,
        })
    }

    /// Get a specific assessment by ID
    pub fn get(&self, id: &str) -> Result<Option<AssessmentRecord>, HistoryError> {
        let conn = self.lock()?;

        let result = conn.query_row(&format!("{} WHERE id = ?", SELECT_COLUMNS), [id], record_from_row);

        match result {
            Ok(record) => Ok(Some(record)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    /// Delete an assessment
    pub fn delete(&self, id: &str) -> Result<bool, HistoryError> {
        let conn = self.lock()?;
        let rows_affected = conn.execute("DELETE FROM assessments WHERE id = ?", [id])?;
        Ok(rows_affected > 0)
    }

    /// Clear all history, returning the number of removed records
    pub fn clear(&self) -> Result<usize, HistoryError> {
        let conn = self.lock()?;
        let removed = conn.execute("DELETE FROM assessments", [])?;
        Ok(removed)
    }
}

fn record_from_row(row: &Row<'_>) -> rusqlite::Result<AssessmentRecord> {
    let assessed_at: i64 = row.get(1)?;
    let symptoms_json: String = row.get(6)?;
    let symptom_count: i64 = row.get(7)?;
    let tier: String = row.get(8)?;

    let corrupt = |column: usize, kind: Type, reason: String| {
        rusqlite::Error::FromSqlConversionFailure(column, kind, reason.into())
    };

    Ok(AssessmentRecord {
        id: row.get(0)?,
        assessed_at: DateTime::<Utc>::from_timestamp_millis(assessed_at).ok_or_else(|| {
            corrupt(1, Type::Integer, format!("timestamp out of range: {}", assessed_at))
        })?,
        query: row.get(2)?,
        corpus: row.get(3)?,
        image_match: row.get(4)?,
        matched_candidate: row.get(5)?,
        symptoms: serde_json::from_str(&symptoms_json)
            .map_err(|e| rusqlite::Error::FromSqlConversionFailure(6, Type::Text, Box::new(e)))?,
        symptom_count: u32::try_from(symptom_count)
            .map_err(|_| rusqlite::Error::IntegralValueOutOfRange(7, symptom_count))?,
        tier: RiskTier::from_str(&tier)
            .ok_or_else(|| corrupt(8, Type::Text, format!("unknown risk tier: {:?}", tier)))?,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::risk::evaluate;
    use chrono::Duration;
    use tempfile::TempDir;

    fn create_test_record(image_match: bool, symptoms: &[&str]) -> AssessmentRecord {
        let symptom_count = symptoms.len() as u32;
        AssessmentRecord {
            id: AssessmentHistory::generate_id(),
            assessed_at: Utc::now(),
            query: "/scans/query.png".to_string(),
            corpus: "/datasets/reference".to_string(),
            image_match,
            matched_candidate: image_match.then(|| "/datasets/reference/a.png".to_string()),
            symptoms: symptoms.iter().map(|s| s.to_string()).collect(),
            symptom_count,
            tier: evaluate(image_match, symptom_count),
        }
    }

    #[test]
    fn test_save_and_get() {
        let history = AssessmentHistory::open_in_memory().unwrap();
        let record = create_test_record(true, &["Chronic cough", "Skin changes", "Persistent pain"]);

        history.save(&record).unwrap();

        let loaded = history.get(&record.id).unwrap().unwrap();
        assert_eq!(loaded.tier, RiskTier::High);
        assert_eq!(loaded.symptoms, record.symptoms);
        assert_eq!(loaded.matched_candidate, record.matched_candidate);
        assert_eq!(
            loaded.assessed_at.timestamp_millis(),
            record.assessed_at.timestamp_millis()
        );
    }

    #[test]
    fn test_list_newest_first() {
        let history = AssessmentHistory::open_in_memory().unwrap();
        let mut older = create_test_record(false, &[]);
        older.assessed_at = Utc::now() - Duration::hours(1);
        let newer = create_test_record(true, &[]);

        history.save(&older).unwrap();
        history.save(&newer).unwrap();

        let page = history.list(10, 0).unwrap();
        assert_eq!(page.total_count, 2);
        assert_eq!(page.entries[0].id, newer.id);
        assert_eq!(page.entries[1].id, older.id);
    }

    #[test]
    fn test_list_pagination() {
        let history = AssessmentHistory::open_in_memory().unwrap();
        for _ in 0..5 {
            history.save(&create_test_record(false, &[])).unwrap();
        }

        let page = history.list(2, 4).unwrap();
        assert_eq!(page.total_count, 5);
        assert_eq!(page.entries.len(), 1);
    }

    #[test]
    fn test_get_missing_returns_none() {
        let history = AssessmentHistory::open_in_memory().unwrap();
        assert!(history.get("does-not-exist").unwrap().is_none());
    }

    #[test]
    fn test_delete() {
        let history = AssessmentHistory::open_in_memory().unwrap();
        let record = create_test_record(false, &["Persistent fatigue"]);

        history.save(&record).unwrap();
        assert!(history.delete(&record.id).unwrap());
        assert!(!history.delete(&record.id).unwrap());
        assert!(history.get(&record.id).unwrap().is_none());
    }

    #[test]
    fn test_clear() {
        let history = AssessmentHistory::open_in_memory().unwrap();
        for _ in 0..3 {
            history.save(&create_test_record(false, &[])).unwrap();
        }

        assert_eq!(history.clear().unwrap(), 3);
        assert_eq!(history.list(10, 0).unwrap().total_count, 0);
    }

    fn insert_raw(
        history: &AssessmentHistory,
        id: &str,
        assessed_at: i64,
        symptoms: &str,
        count: i64,
        tier: &str,
    ) {
        history
            .lock()
            .unwrap()
            .execute(
                "INSERT INTO assessments
                 (id, assessed_at, query, corpus, image_match, matched_candidate,
                  symptoms, symptom_count, tier)
                 VALUES (?, ?, 'q.png', 'corpus', 1, NULL, ?, ?, ?)",
                params![id, assessed_at, symptoms, count, tier],
            )
            .unwrap();
    }

    #[test]
    fn test_unknown_tier_is_an_error() {
        let history = AssessmentHistory::open_in_memory().unwrap();
        insert_raw(&history, "bad-tier", 0, "[]", 7, "HIGH");

        let result = history.get("bad-tier");
        assert!(matches!(
            result,
            Err(HistoryError::QueryFailed(rusqlite::Error::FromSqlConversionFailure(8, _, _)))
        ));
    }

    #[test]
    fn test_corrupt_symptoms_are_an_error() {
        let history = AssessmentHistory::open_in_memory().unwrap();
        insert_raw(&history, "bad-symptoms", 0, "not json", 3, "high");

        assert!(history.get("bad-symptoms").is_err());
        assert!(history.list(10, 0).is_err());
    }

    #[test]
    fn test_out_of_range_values_are_errors() {
        let history = AssessmentHistory::open_in_memory().unwrap();
        insert_raw(&history, "bad-count", 0, "[]", -1, "low");
        insert_raw(&history, "bad-time", i64::MAX, "[]", 0, "low");

        assert!(matches!(
            history.get("bad-count"),
            Err(HistoryError::QueryFailed(rusqlite::Error::IntegralValueOutOfRange(7, -1)))
        ));
        assert!(history.get("bad-time").is_err());
    }

    #[test]
    fn test_persists_across_opens() {
        let temp_dir = TempDir::new().unwrap();
        let db_path = temp_dir.path().join("nested").join("history.db");
        let record = create_test_record(true, &[]);

        {
            let history = AssessmentHistory::open(&db_path).unwrap();
            history.save(&record).unwrap();
        }

        let history = AssessmentHistory::open(&db_path).unwrap();
        assert_eq!(history.get(&record.id).unwrap().unwrap().tier, RiskTier::Moderate);
    }
}
