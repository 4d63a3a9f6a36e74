//! Schema migrations
//!
//! Applied in order; the count already applied lives in SQLite's
//! `user_version` pragma.

use rusqlite::Connection;

use crate::Result;

const MIGRATIONS: &[(&str, &str)] = &[(
    "settings store",
    "CREATE TABLE IF NOT EXISTS settings (
        key TEXT PRIMARY KEY,
        value TEXT NOT NULL,
        updated_at TEXT NOT NULL
    );",
)];

pub fn run_migrations(conn: &Connection) -> Result<()> {
    let applied = applied_count(conn)?;

    for (index, (name, sql)) in MIGRATIONS.iter().enumerate().skip(applied) {
        let version = index as i64 + 1;
        tracing::info!(version, migration = %name, "Applying migration");
        conn.execute_batch(sql)?;
        conn.pragma_update(None, "user_version", version)?;
    }

    Ok(())
}

fn applied_count(conn: &Connection) -> Result<usize> {
    let version: i64 = conn.pragma_query_value(None, "user_version", |row| row.get(0))?;
    Ok(version.max(0) as usize)
}
