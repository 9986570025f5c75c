//! SQLite-backed durable store

use crate::{DbError, DbPool, DurableStore, Result};
use rusqlite::OptionalExtension;

/// Key/value store on top of the `kv` table
#[derive(Clone)]
pub struct SqliteStore {
    pool: DbPool,
}

impl SqliteStore {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

impl DurableStore for SqliteStore {
    fn get(&self, key: &str) -> Result<Option<String>> {
        let conn = self.pool.get().map_err(|e| DbError::Pool(e.to_string()))?;

        let value = conn
            .query_row("SELECT value FROM kv WHERE key = ?1", [key], |row| row.get(0))
            .optional()?;

        Ok(value)
    }

    fn put(&self, key: &str, value: &str) -> Result<()> {
        let conn = self.pool.get().map_err(|e| DbError::Pool(e.to_string()))?;

        conn.execute(
            r#"
            INSERT INTO kv (key, value) VALUES (?1, ?2)
            ON CONFLICT(key) DO UPDATE SET
                value = excluded.value,
                updated_at = strftime('%s', 'now')
            "#,
            rusqlite::params![key, value],
        )?;

        tracing::trace!("Stored {} bytes under {}", value.len(), key);
        Ok(())
    }
}
