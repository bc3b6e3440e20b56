use std::path::{Path, PathBuf};
use std::sync::Mutex;

use chrono::{DateTime, Utc};
use rusqlite::{params, Connection, OptionalExtension};

use crate::core::error::PersistenceError;
use crate::core::time::now_utc;
use crate::progress::record::CompactRecord;

pub const PROGRESS_KEY: &str = "gamestate";

/// Local progress store. This is the durable copy of the user's progress.
pub struct Store {
    conn: Mutex<Connection>,
}

impl Store {
    pub fn default_path() -> PathBuf {
        PathBuf::from("data").join("trainer.db")
    }

    pub fn open(path: &Path) -> Result<Self, PersistenceError> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        Self::init(Connection::open(path)?)
    }

    pub fn open_in_memory() -> Result<Self, PersistenceError> {
        Self::init(Connection::open_in_memory()?)
    }

    fn init(conn: Connection) -> Result<Self, PersistenceError> {
        conn.execute_batch(
            "
            CREATE TABLE IF NOT EXISTS progress (
              key TEXT PRIMARY KEY,
              record TEXT NOT NULL,
              saved_at TEXT NOT NULL
            );
            ",
        )?;
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    fn lock(&self) -> Result<std::sync::MutexGuard<'_, Connection>, PersistenceError> {
        self.conn
            .lock()
            .map_err(|_| PersistenceError::Db("connection lock poisoned".to_string()))
    }

    pub fn load(&self, key: &str) -> Result<Option<CompactRecord>, PersistenceError> {
        let conn = self.lock()?;
        let record: Option<String> = conn
            .query_row(
                "SELECT record FROM progress WHERE key = ?1",
                params![key],
                |row| row.get(0),
            )
            .optional()?;
        Ok(record.map(CompactRecord::new))
    }

    pub fn save(&self, key: &str, record: &CompactRecord) -> Result<(), PersistenceError> {
        let conn = self.lock()?;
        conn.execute(
            "INSERT OR REPLACE INTO progress (key, record, saved_at) VALUES (?1, ?2, ?3)",
            params![key, record.as_str(), now_utc().to_rfc3339()],
        )?;
        Ok(())
    }

    pub fn saved_at(&self, key: &str) -> Result<Option<DateTime<Utc>>, PersistenceError> {
        let conn = self.lock()?;
        let raw: Option<String> = conn
            .query_row(
                "SELECT saved_at FROM progress WHERE key = ?1",
                params![key],
                |row| row.get(0),
            )
            .optional()?;
        Ok(raw
            .and_then(|s| DateTime::parse_from_rfc3339(&s).ok())
            .map(|dt| dt.with_timezone(&Utc)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn save_then_load() {
        let store = Store::open_in_memory().unwrap();
        assert_eq!(store.load(PROGRESS_KEY).unwrap(), None);
        store.save(PROGRESS_KEY, &CompactRecord::new("{\"level\":1}")).unwrap();
        store.save(PROGRESS_KEY, &CompactRecord::new("{\"level\":2}")).unwrap();
        assert_eq!(
            store.load(PROGRESS_KEY).unwrap(),
            Some(CompactRecord::new("{\"level\":2}"))
        );
        assert!(store.saved_at(PROGRESS_KEY).unwrap().is_some());
    }

    #[test]
    fn file_store_survives_reopen() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("trainer.db");
        Store::open(&path)
            .unwrap()
            .save(PROGRESS_KEY, &CompactRecord::new("{}"))
            .unwrap();
        let reopened = Store::open(&path).unwrap();
        assert_eq!(reopened.load(PROGRESS_KEY).unwrap(), Some(CompactRecord::new("{}")));
    }
}
