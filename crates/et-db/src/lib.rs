//! Storage layer for the edit timer.
//!
//! Provides a durable key-value store using `rusqlite`. The timer core only
//! needs `get` and `set` of whole records; see [`et_core::KeyValueStore`].
//!
//! # Thread Safety
//!
//! The [`Database`] type wraps a `rusqlite::Connection`, which is `Send` but not `Sync`.
//! A `Database` instance can be moved between threads but cannot be shared
//! across threads without external synchronization. The CLI uses one
//! instance per process.
//!
//! # Schema
//!
//! A single `kv_store` table keyed by TEXT. `updated_at` is stored as TEXT in
//! RFC 3339 format with millisecond precision (e.g., `2024-01-15T10:30:00.000Z`),
//! so lexicographic ordering matches chronological ordering.

use std::path::Path;

use chrono::{DateTime, SecondsFormat, Utc};
use rusqlite::{Connection, OptionalExtension, params};
use thiserror::Error;

/// Database errors.
#[derive(Debug, Error)]
pub enum DbError {
    /// An error from the underlying database.
    #[error("sqlite error: {0}")]
    Sqlite(#[from] rusqlite::Error),
    /// A stored `updated_at` value could not be parsed.
    #[error("invalid timestamp for key {key}: {timestamp}")]
    TimestampParse {
        key: String,
        timestamp: String,
        #[source]
        source: chrono::ParseError,
    },
}

/// Database connection wrapper.
///
/// See the [module documentation](self) for thread safety considerations.
pub struct Database {
    conn: Connection,
}

impl Database {
    /// Opens a database at the given path, creating it if necessary.
    ///
    /// The database schema is automatically initialized on first open.
    pub fn open(path: &Path) -> Result<Self, DbError> {
        let conn = Connection::open(path)?;
        let db = Self { conn };
        db.init()?;
        Ok(db)
    }

    /// Opens an in-memory database.
    ///
    /// Useful for testing. The database is destroyed when the connection closes.
    pub fn open_in_memory() -> Result<Self, DbError> {
        let conn = Connection::open_in_memory()?;
        let db = Self { conn };
        db.init()?;
        Ok(db)
    }

    /// Initializes the database schema.
    ///
    /// This is idempotent - safe to call on an already-initialized database.
    fn init(&self) -> Result<(), DbError> {
        self.conn.execute_batch(
            "
            CREATE TABLE IF NOT EXISTS kv_store (
                key TEXT PRIMARY KEY,
                value TEXT NOT NULL,
                updated_at TEXT NOT NULL
            );
            ",
        )?;
        Ok(())
    }

    /// Returns the value stored under `key`.
    pub fn get(&self, key: &str) -> Result<Option<String>, DbError> {
        let value = self
            .conn
            .query_row(
                "SELECT value FROM kv_store WHERE key = ?",
                params![key],
                |row| row.get(0),
            )
            .optional()?;
        Ok(value)
    }

    /// Stores `value` under `key`, replacing any previous value.
    pub fn set(&mut self, key: &str, value: &str) -> Result<(), DbError> {
        self.set_at(key, value, Utc::now())
    }

    fn set_at(&mut self, key: &str, value: &str, now: DateTime<Utc>) -> Result<(), DbError> {
        self.conn.execute(
            "
            INSERT INTO kv_store (key, value, updated_at)
            VALUES (?, ?, ?)
            ON CONFLICT(key) DO UPDATE SET
                value = excluded.value,
                updated_at = excluded.updated_at
            ",
            params![key, value, format_timestamp(now)],
        )?;
        tracing::trace!(key, bytes = value.len(), "stored value");
        Ok(())
    }

    /// Removes `key`. Returns whether it existed.
    pub fn delete(&mut self, key: &str) -> Result<bool, DbError> {
        let removed = self
            .conn
            .execute("DELETE FROM kv_store WHERE key = ?", params![key])?;
        Ok(removed > 0)
    }

    /// When `key` was last written.
    pub fn updated_at(&self, key: &str) -> Result<Option<DateTime<Utc>>, DbError> {
        let timestamp: Option<String> = self
            .conn
            .query_row(
                "SELECT updated_at FROM kv_store WHERE key = ?",
                params![key],
                |row| row.get(0),
            )
            .optional()?;

        timestamp
            .map(|timestamp| {
                DateTime::parse_from_rfc3339(&timestamp)
                    .map(|dt| dt.with_timezone(&Utc))
                    .map_err(|source| DbError::TimestampParse {
                        key: key.to_string(),
                        timestamp,
                        source,
                    })
            })
            .transpose()
    }
}

impl et_core::KeyValueStore for Database {
    type Error = DbError;

    fn get(&self, key: &str) -> Result<Option<String>, Self::Error> {
        Self::get(self, key)
    }

    fn set(&mut self, key: &str, value: &str) -> Result<(), Self::Error> {
        Self::set(self, key, value)
    }
}

fn format_timestamp(timestamp: DateTime<Utc>) -> String {
    timestamp.to_rfc3339_opts(SecondsFormat::Millis, true)
}
