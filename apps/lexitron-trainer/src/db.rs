//! SQLite persistence for scheduler state.
//!
//! Each persisted map is stored as one JSON blob row. The scheduler decodes
//! the blobs itself so a damaged row only resets that map.

use chrono::Utc;
use lexitron_scheduler::{StateBlobs, StateSnapshot};
use rusqlite::{params, Connection, OptionalExtension};
use std::path::Path;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum DbError {
    #[error("SQLite error: {0}")]
    Sqlite(#[from] rusqlite::Error),
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

pub type DbResult<T> = Result<T, DbError>;

pub struct Database {
    conn: Connection,
}

impl Database {
    pub fn open(path: &Path) -> DbResult<Self> {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)?;
        }
        let conn = Connection::open(path)?;
        let db = Self { conn };
        db.init()?;
        Ok(db)
    }

    pub fn in_memory() -> DbResult<Self> {
        let conn = Connection::open_in_memory()?;
        let db = Self { conn };
        db.init()?;
        Ok(db)
    }

    fn init(&self) -> DbResult<()> {
        self.conn.execute_batch(
            r#"
            CREATE TABLE IF NOT EXISTS state_blobs (
                key TEXT PRIMARY KEY,
                value TEXT NOT NULL,
                updated_at TEXT NOT NULL
            );
            "#,
        )?;
        Ok(())
    }

    pub fn load_blob(&self, key: &str) -> DbResult<Option<String>> {
        let value = self
            .conn
            .query_row(
                "SELECT value FROM state_blobs WHERE key = ?1",
                params![key],
                |row| row.get(0),
            )
            .optional()?;
        Ok(value)
    }

    /// All scheduler blobs that exist.
    pub fn load_blobs(&self) -> DbResult<StateBlobs> {
        let mut blobs = StateBlobs::default();
        for key in StateBlobs::KEYS {
            if let Some(value) = self.load_blob(key)? {
                blobs.set(key, value);
            }
        }
        Ok(blobs)
    }

    /// Write every map of `snapshot` in one transaction.
    pub fn save_snapshot(&mut self, snapshot: &StateSnapshot) -> DbResult<()> {
        let blobs = StateBlobs::from_snapshot(snapshot)?;
        let now = Utc::now().to_rfc3339();
        let tx = self.conn.transaction()?;
        for (key, value) in blobs.entries() {
            upsert_blob(&tx, key, value, &now)?;
        }
        tx.commit()?;
        tracing::debug!("saved scheduler state");
        Ok(())
    }
}

fn upsert_blob(conn: &Connection, key: &str, value: &str, updated_at: &str) -> DbResult<()> {
    conn.execute(
        "INSERT INTO state_blobs (key, value, updated_at) VALUES (?1, ?2, ?3)
         ON CONFLICT(key) DO UPDATE SET value = excluded.value, updated_at = excluded.updated_at",
        params![key, value, updated_at],
    )?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use lexitron_scheduler::{SchedulerConfig, SchedulerState};

    fn put(db: &Database, key: &str, value: &str) {
        upsert_blob(&db.conn, key, value, "2026-01-01T00:00:00Z").unwrap();
    }

    #[test]
    fn test_blob_upsert() {
        let db = Database::in_memory().unwrap();
        assert_eq!(db.load_blob("mastery").unwrap(), None);
        put(&db, "mastery", "{}");
        put(&db, "mastery", r#"{"a":{"stars":1.0}}"#);
        assert_eq!(
            db.load_blob("mastery").unwrap().as_deref(),
            Some(r#"{"a":{"stars":1.0}}"#)
        );
    }

    #[test]
    fn test_snapshot_round_trip() {
        let config = SchedulerConfig::default();
        let mut state = SchedulerState::new(&config);
        state.mastery.on_correct("w1");
        state.penalties.on_idk("w2", 42);
        state.batches.set_batch_index("de", 1, 8);

        let mut db = Database::in_memory().unwrap();
        db.save_snapshot(&state.snapshot()).unwrap();

        let (restored, report) = SchedulerState::restore(&config, &db.load_blobs().unwrap());
        assert!(report.is_clean());
        assert_eq!(restored.snapshot(), state.snapshot());
    }

    #[test]
    fn test_corrupt_row_resets_that_map() {
        let config = SchedulerConfig::default();
        let db = Database::in_memory().unwrap();
        put(&db, "cursors", r#"{"de": 1}"#);
        put(&db, "mastery", "{{{");

        let (state, report) = SchedulerState::restore(&config, &db.load_blobs().unwrap());
        assert_eq!(report.errors.len(), 1);
        assert!(state.mastery.records().is_empty());
        assert_eq!(state.batches.cursors().get("de"), Some(&1));
    }
}
