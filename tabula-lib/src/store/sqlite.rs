//! SQLite state store with in-memory cache.

use std::path::Path;
use std::sync::Mutex;

use dashmap::DashMap;
use rusqlite::Connection;
use rusqlite::OptionalExtension;

use super::StateStore;
use crate::error::StoreError;

/// SQLite-backed snapshot storage with DashMap cache.
///
/// Snapshots live in a single `grid_state (key TEXT PRIMARY KEY, value BLOB)`
/// table.
pub struct SqliteStore {
    conn: Mutex<Connection>,
    cache: DashMap<String, Vec<u8>>,
}

impl SqliteStore {
    /// Opens (or creates) a database file at `path`.
    pub fn open(path: impl AsRef<Path>) -> Result<Self, StoreError> {
        Self::with_connection(Connection::open(path)?)
    }

    /// Opens a private in-memory database.
    pub fn open_in_memory() -> Result<Self, StoreError> {
        Self::with_connection(Connection::open_in_memory()?)
    }

    fn with_connection(conn: Connection) -> Result<Self, StoreError> {
        conn.execute(
            "CREATE TABLE IF NOT EXISTS grid_state (
                key TEXT PRIMARY KEY,
                value BLOB NOT NULL
            )",
            [],
        )?;

        Ok(Self {
            conn: Mutex::new(conn),
            cache: DashMap::new(),
        })
    }

    fn with_conn<T>(
        &self,
        f: impl FnOnce(&Connection) -> rusqlite::Result<T>,
    ) -> Result<T, StoreError> {
        let conn = self.conn.lock().map_err(|_| StoreError::Poisoned)?;
        Ok(f(&conn)?)
    }
}

impl StateStore for SqliteStore {
    fn get_bytes(&self, key: &str) -> Result<Option<Vec<u8>>, StoreError> {
        // Check cache first
        if let Some(value) = self.cache.get(key) {
            return Ok(Some(value.clone()));
        }

        let result = self.with_conn(|conn| {
            conn.query_row(
                "SELECT value FROM grid_state WHERE key = ?",
                [key],
                |row| row.get::<_, Vec<u8>>(0),
            )
            .optional()
        })?;

        if let Some(ref value) = result {
            self.cache.insert(key.to_string(), value.clone());
        }

        Ok(result)
    }

    fn set_bytes(&self, key: &str, value: Vec<u8>) -> Result<(), StoreError> {
        self.with_conn(|conn| {
            conn.execute(
                "INSERT INTO grid_state (key, value) VALUES (?, ?)
                 ON CONFLICT(key) DO UPDATE SET value = excluded.value",
                rusqlite::params![key, &value],
            )
        })?;

        self.cache.insert(key.to_string(), value);
        Ok(())
    }

    fn delete(&self, key: &str) -> Result<(), StoreError> {
        self.with_conn(|conn| conn.execute("DELETE FROM grid_state WHERE key = ?", [key]))?;
        self.cache.remove(key);
        Ok(())
    }
}

impl std::fmt::Debug for SqliteStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SqliteStore")
            .field("cached", &self.cache.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_upsert_and_delete() {
        let store = SqliteStore::open_in_memory().unwrap();
        assert!(store.get_bytes("k").unwrap().is_none());

        store.set_bytes("k", vec![1]).unwrap();
        store.set_bytes("k", vec![2, 3]).unwrap();
        assert_eq!(store.get_bytes("k").unwrap(), Some(vec![2, 3]));

        store.delete("k").unwrap();
        assert!(store.get_bytes("k").unwrap().is_none());
    }

    #[test]
    fn test_reads_through_cache_miss() {
        let store = SqliteStore::open_in_memory().unwrap();
        store.set_bytes("k", vec![9]).unwrap();
        store.cache.clear();
        assert_eq!(store.get_bytes("k").unwrap(), Some(vec![9]));
    }
}
