//! Versioned schema migrations for SqliteStore.
//!
//! The applied version lives in the `meta` table under `schema_version`.
//! Each migration runs exactly once, in order.

use rusqlite::{params, Connection, OptionalExtension};

use crate::error::Result;

/// Current schema version. Increment when adding new migrations.
pub const CURRENT_SCHEMA_VERSION: u32 = 2;

type MigrationFn = fn(&Connection) -> Result<()>;

/// All migrations in order. Index + 1 = version number.
const MIGRATIONS: &[MigrationFn] = &[migration_v1_entries, migration_v2_updated_at];

/// Runs all pending migrations on the database.
pub fn run_migrations(conn: &Connection) -> Result<()> {
    let current_version = get_schema_version(conn)?;

    for (idx, migration) in MIGRATIONS.iter().enumerate() {
        let version = (idx + 1) as u32;
        if version > current_version {
            tracing::debug!("Applying store migration v{}", version);
            migration(conn)?;
            set_schema_version(conn, version)?;
        }
    }

    Ok(())
}

/// Gets the current schema version from the database.
pub fn get_schema_version(conn: &Connection) -> Result<u32> {
    conn.execute(
        "CREATE TABLE IF NOT EXISTS meta (key TEXT PRIMARY KEY, value TEXT NOT NULL)",
        [],
    )?;

    let version: Option<String> = conn
        .query_row(
            "SELECT value FROM meta WHERE key = 'schema_version'",
            [],
            |row| row.get(0),
        )
        .optional()?;

    Ok(version.and_then(|v| v.parse().ok()).unwrap_or(0))
}

fn set_schema_version(conn: &Connection, version: u32) -> Result<()> {
    conn.execute(
        "INSERT OR REPLACE INTO meta (key, value) VALUES ('schema_version', ?1)",
        params![version.to_string()],
    )?;
    Ok(())
}

fn column_exists(conn: &Connection, table: &str, column: &str) -> Result<bool> {
    let mut stmt = conn.prepare(&format!("PRAGMA table_info({})", table))?;
    let names = stmt
        .query_map([], |row| row.get::<_, String>(1))?
        .collect::<rusqlite::Result<Vec<_>>>()?;
    Ok(names.iter().any(|name| name == column))
}

fn migration_v1_entries(conn: &Connection) -> Result<()> {
    conn.execute_batch(
        r#"
        CREATE TABLE IF NOT EXISTS entries (
            key TEXT PRIMARY KEY,
            value TEXT NOT NULL
        );
        "#,
    )?;
    Ok(())
}

fn migration_v2_updated_at(conn: &Connection) -> Result<()> {
    if !column_exists(conn, "entries", "updated_at")? {
        conn.execute_batch(
            "ALTER TABLE entries ADD COLUMN updated_at INTEGER NOT NULL DEFAULT 0;",
        )?;
    }
    Ok(())
}
