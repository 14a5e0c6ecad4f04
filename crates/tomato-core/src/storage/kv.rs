//! Flat key-value stores.
//!
//! Values are opaque strings (JSON in practice). The SQLite store keeps
//! them in a single `kv` table; the memory store backs tests and callers
//! that do not need durability.

use std::collections::HashMap;
use std::path::Path;

use rusqlite::{params, Connection, OptionalExtension};

use super::data_dir;
use crate::error::PersistenceError;

/// A string-to-string store with no cross-key transactions.
pub trait KvStore {
    fn get(&self, key: &str) -> Result<Option<String>, PersistenceError>;
    fn set(&mut self, key: &str, value: &str) -> Result<(), PersistenceError>;
    fn remove(&mut self, key: &str) -> Result<(), PersistenceError>;
}

/// SQLite-backed store at `<data_dir>/tomato.db`.
pub struct SqliteStore {
    conn: Connection,
}

impl SqliteStore {
    /// Open the store in the default data directory.
    ///
    /// Creates the database file and schema if they don't exist.
    ///
    /// # Errors
    /// Returns an error if the data directory or database cannot be opened.
    pub fn open() -> Result<Self, PersistenceError> {
        let dir = data_dir().map_err(|e| PersistenceError::QueryFailed(e.to_string()))?;
        Self::open_at(dir.join("tomato.db"))
    }

    /// Open (or create) the store at an explicit path.
    ///
    /// # Errors
    /// Returns an error if the database cannot be opened or migrated.
    pub fn open_at(path: impl AsRef<Path>) -> Result<Self, PersistenceError> {
        let path = path.as_ref();
        let conn = Connection::open(path).map_err(|source| PersistenceError::OpenFailed {
            path: path.to_path_buf(),
            source,
        })?;
        let store = Self { conn };
        store.migrate()?;
        Ok(store)
    }

    /// Open an in-memory database.
    ///
    /// # Errors
    /// Returns an error if SQLite cannot allocate the database.
    pub fn open_memory() -> Result<Self, PersistenceError> {
        let conn = Connection::open_in_memory()?;
        let store = Self { conn };
        store.migrate()?;
        Ok(store)
    }

    fn migrate(&self) -> Result<(), rusqlite::Error> {
        self.conn.execute_batch(
            "CREATE TABLE IF NOT EXISTS kv (
                key   TEXT PRIMARY KEY,
                value TEXT NOT NULL
            );",
        )
    }
}

impl KvStore for SqliteStore {
    fn get(&self, key: &str) -> Result<Option<String>, PersistenceError> {
        let value = self
            .conn
            .query_row("SELECT value FROM kv WHERE key = ?1", params![key], |row| {
                row.get::<_, String>(0)
            })
            .optional()?;
        Ok(value)
    }

    fn set(&mut self, key: &str, value: &str) -> Result<(), PersistenceError> {
        self.conn.execute(
            "INSERT OR REPLACE INTO kv (key, value) VALUES (?1, ?2)",
            params![key, value],
        )?;
        Ok(())
    }

    fn remove(&mut self, key: &str) -> Result<(), PersistenceError> {
        self.conn
            .execute("DELETE FROM kv WHERE key = ?1", params![key])?;
        Ok(())
    }
}

/// In-process store with no durability.
#[derive(Debug, Default, Clone)]
pub struct MemoryStore {
    entries: HashMap<String, String>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl KvStore for MemoryStore {
    fn get(&self, key: &str) -> Result<Option<String>, PersistenceError> {
        Ok(self.entries.get(key).cloned())
    }

    fn set(&mut self, key: &str, value: &str) -> Result<(), PersistenceError> {
        self.entries.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&mut self, key: &str) -> Result<(), PersistenceError> {
        self.entries.remove(key);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn exercise(store: &mut dyn KvStore) {
        assert_eq!(store.get("missing").unwrap(), None);

        store.set("k", "v1").unwrap();
        assert_eq!(store.get("k").unwrap().as_deref(), Some("v1"));

        store.set("k", "v2").unwrap();
        assert_eq!(store.get("k").unwrap().as_deref(), Some("v2"));

        store.remove("k").unwrap();
        assert_eq!(store.get("k").unwrap(), None);

        // removing an absent key is fine
        store.remove("k").unwrap();
    }

    #[test]
    fn sqlite_kv_store() {
        let mut store = SqliteStore::open_memory().unwrap();
        exercise(&mut store);
    }

    #[test]
    fn memory_kv_store() {
        let mut store = MemoryStore::new();
        exercise(&mut store);
        assert!(store.is_empty());

        store.set("a", "1").unwrap();
        store.set("b", "2").unwrap();
        store.set("a", "3").unwrap();
        assert_eq!(store.len(), 2);
    }

    #[test]
    fn sqlite_store_survives_reopen() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("tomato.db");
        {
            let mut store = SqliteStore::open_at(&path).unwrap();
            store.set("harvest.count", "4").unwrap();
        }
        let store = SqliteStore::open_at(&path).unwrap();
        assert_eq!(store.get("harvest.count").unwrap().as_deref(), Some("4"));
    }

    #[test]
    fn open_at_reports_path_on_failure() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("missing").join("nested").join("tomato.db");
        match SqliteStore::open_at(&path) {
            Err(PersistenceError::OpenFailed { path: p, .. }) => assert_eq!(p, path),
            Err(other) => panic!("unexpected error: {other}"),
            Ok(_) => panic!("opening under a missing directory should fail"),
        }
    }
}
