//! SQLite-backed settings store

use chrono::Utc;
use parking_lot::Mutex;
use rusqlite::{params, Connection, OptionalExtension};
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use crate::migrations::run_migrations;
use crate::Result;

/// How long a write waits on another process holding the file lock
const BUSY_TIMEOUT: Duration = Duration::from_secs(2);

/// Cheap to clone; clones share one connection.
#[derive(Clone)]
pub struct Database {
    conn: Arc<Mutex<Connection>>,
}

impl Database {
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let conn = Connection::open(path.as_ref())?;
        conn.busy_timeout(BUSY_TIMEOUT)?;
        let mode: String =
            conn.pragma_update_and_check(None, "journal_mode", "WAL", |row| row.get(0))?;
        tracing::debug!(path = %path.as_ref().display(), journal_mode = %mode, "Opened database");
        Self::prepare(conn)
    }

    pub fn open_in_memory() -> Result<Self> {
        Self::prepare(Connection::open_in_memory()?)
    }

    fn prepare(conn: Connection) -> Result<Self> {
        run_migrations(&conn)?;
        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    pub fn with_connection<F, T>(&self, f: F) -> Result<T>
    where
        F: FnOnce(&Connection) -> Result<T>,
    {
        f(&self.conn.lock())
    }

    pub fn get_setting(&self, key: &str) -> Result<Option<String>> {
        self.with_connection(|conn| {
            Ok(conn
                .query_row("SELECT value FROM settings WHERE key = ?1", [key], |row| row.get(0))
                .optional()?)
        })
    }

    pub fn set_setting(&self, key: &str, value: &str) -> Result<()> {
        let stamp = Utc::now().to_rfc3339();
        self.with_connection(|conn| {
            conn.execute(
                "INSERT INTO settings (key, value, updated_at) VALUES (?1, ?2, ?3)
                 ON CONFLICT(key) DO UPDATE SET value = excluded.value, updated_at = excluded.updated_at",
                params![key, value, stamp],
            )?;
            Ok(())
        })
    }

    pub fn remove_setting(&self, key: &str) -> Result<bool> {
        self.with_connection(|conn| {
            Ok(conn.execute("DELETE FROM settings WHERE key = ?1", [key])? > 0)
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fresh_store_is_empty() {
        let db = Database::open_in_memory().unwrap();
        let rows: i64 = db
            .with_connection(|conn| {
                Ok(conn.query_row("SELECT COUNT(*) FROM settings", [], |row| row.get(0))?)
            })
            .unwrap();
        assert_eq!(rows, 0);
    }

    #[test]
    fn test_settings_roundtrip() {
        let db = Database::open_in_memory().unwrap();
        assert_eq!(db.get_setting("searchEngine").unwrap(), None);

        db.set_setting("searchEngine", "brave").unwrap();
        db.set_setting("searchEngine", "ecosia").unwrap();
        assert_eq!(db.get_setting("searchEngine").unwrap().as_deref(), Some("ecosia"));

        assert!(db.remove_setting("searchEngine").unwrap());
        assert!(!db.remove_setting("searchEngine").unwrap());
        assert_eq!(db.get_setting("searchEngine").unwrap(), None);
    }

    #[test]
    fn test_reopen_keeps_values() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("harbor.db");

        {
            let db = Database::open(&path).unwrap();
            db.set_setting("browseHistory", "[]").unwrap();
        }

        let db = Database::open(&path).unwrap();
        assert_eq!(db.get_setting("browseHistory").unwrap().as_deref(), Some("[]"));
    }
}
