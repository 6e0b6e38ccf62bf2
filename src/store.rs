use chrono::Utc;
use rusqlite::{Connection, OptionalExtension, params};
use std::cell::RefCell;
use std::fs;
use std::path::PathBuf;
use tracing::{debug, info};

use crate::config::AppPaths;
use crate::domain::FinancialEntry;
use crate::error::StoreError;

/// Where the entry list lives between runs. The engine never touches this; callers load a
/// snapshot, run the pipeline, and save after mutating the list.
pub trait EntryRepository {
    fn load(&self) -> Result<Vec<FinancialEntry>, StoreError>;
    fn save(&self, entries: &[FinancialEntry]) -> Result<(), StoreError>;
}

/// Key-value table holding the serialized entry list under one key.
pub struct SqliteStore {
    conn: Connection,
    key: String,
}

impl SqliteStore {
    pub fn open(paths: &AppPaths, key: &str) -> Result<(Self, PathBuf), StoreError> {
        fs::create_dir_all(&paths.data_dir).map_err(|source| StoreError::CreateDir {
            path: paths.data_dir.clone(),
            source,
        })?;

        let db_path = paths.data_dir.join("doughflow.sqlite3");
        let conn = Connection::open(&db_path)?;
        let store = Self::from_connection(conn, key)?;
        debug!(path = %db_path.display(), key, "opened entry store");
        Ok((store, db_path))
    }

    pub fn open_in_memory(key: &str) -> Result<Self, StoreError> {
        Self::from_connection(Connection::open_in_memory()?, key)
    }

    fn from_connection(conn: Connection, key: &str) -> Result<Self, StoreError> {
        let store = Self {
            conn,
            key: key.to_string(),
        };
        store.migrate()?;
        Ok(store)
    }

    fn migrate(&self) -> Result<(), StoreError> {
        self.conn.execute_batch(
            r#"
            CREATE TABLE IF NOT EXISTS kv (
                key TEXT PRIMARY KEY,
                value TEXT NOT NULL,
                updated_at TEXT NOT NULL
            );
            "#,
        )?;
        Ok(())
    }

    pub fn key(&self) -> &str {
        &self.key
    }
}

impl EntryRepository for SqliteStore {
    fn load(&self) -> Result<Vec<FinancialEntry>, StoreError> {
        let raw: Option<String> = self
            .conn
            .query_row(
                "SELECT value FROM kv WHERE key = ?1",
                params![self.key],
                |row| row.get(0),
            )
            .optional()?;

        let Some(raw) = raw else {
            return Ok(Vec::new());
        };

        serde_json::from_str(&raw).map_err(|source| StoreError::Decode {
            key: self.key.clone(),
            source,
        })
    }

    fn save(&self, entries: &[FinancialEntry]) -> Result<(), StoreError> {
        let json = serde_json::to_string(entries).map_err(StoreError::Encode)?;
        self.conn.execute(
            r#"
            INSERT INTO kv (key, value, updated_at)
            VALUES (?1, ?2, ?3)
            ON CONFLICT(key) DO UPDATE SET value = excluded.value, updated_at = excluded.updated_at
            "#,
            params![self.key, json, Utc::now().to_rfc3339()],
        )?;
        info!(key = %self.key, entries = entries.len(), "saved entry list");
        Ok(())
    }
}

/// In-process repository for callers that need no disk.
#[derive(Debug, Default)]
pub struct MemoryStore {
    entries: RefCell<Vec<FinancialEntry>>,
}

impl MemoryStore {
    pub fn new(entries: Vec<FinancialEntry>) -> Self {
        Self {
            entries: RefCell::new(entries),
        }
    }
}

impl EntryRepository for MemoryStore {
    fn load(&self) -> Result<Vec<FinancialEntry>, StoreError> {
        Ok(self.entries.borrow().clone())
    }

    fn save(&self, entries: &[FinancialEntry]) -> Result<(), StoreError> {
        *self.entries.borrow_mut() = entries.to_vec();
        Ok(())
    }
}
