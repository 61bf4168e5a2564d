//! SQLite connection management for vidsearch.
//!
//! Provides the [`Database`] struct that wraps a `rusqlite::Connection`
//! and brings the schema up to date on open.

use rusqlite::Connection;
use std::path::Path;

use super::migrations;

/// Owns a SQLite connection whose schema has been migrated.
pub struct Database {
    conn: Connection,
}

impl Database {
    /// Opens (or creates) a SQLite database at the given file path and runs migrations.
    ///
    /// Parent directories are not created; callers pass a path inside an
    /// existing data directory.
    ///
    /// # Errors
    /// Returns `rusqlite::Error` if the connection cannot be established or migrations fail.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self, rusqlite::Error> {
        let conn = Connection::open(path)?;
        migrations::run_all(&conn)?;
        Ok(Self { conn })
    }

    /// Opens a throwaway in-memory database with the full schema.
    ///
    /// # Errors
    /// Returns `rusqlite::Error` if migrations fail.
    pub fn open_in_memory() -> Result<Self, rusqlite::Error> {
        let conn = Connection::open_in_memory()?;
        migrations::run_all(&conn)?;
        Ok(Self { conn })
    }

    /// Returns a reference to the underlying `rusqlite::Connection`.
    pub fn connection(&self) -> &Connection {
        &self.conn
    }

    /// Schema version currently recorded in the database.
    pub fn schema_version(&self) -> i32 {
        migrations::get_schema_version(&self.conn)
    }
}
