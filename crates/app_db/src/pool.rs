//! SQLite connection pool for the client store

use crate::{DbError, Result};
use r2d2::Pool;
use r2d2_sqlite::SqliteConnectionManager;
use std::path::Path;
use std::time::Duration;

pub type DbPool = Pool<SqliteConnectionManager>;

/// Per-connection settings. Likes are user data, so commits are fully synced.
const CONNECTION_PRAGMAS: &str = "
    PRAGMA journal_mode = WAL;
    PRAGMA synchronous = FULL;
    PRAGMA busy_timeout = 2000;
";

/// One writer and one reader cover the session's traffic
const MAX_CONNECTIONS: u32 = 2;

/// Open a pool on the database file at `path`
pub fn init_pool(path: &Path) -> Result<DbPool> {
    let manager = SqliteConnectionManager::file(path)
        .with_init(|conn| conn.execute_batch(CONNECTION_PRAGMAS));

    let pool = Pool::builder()
        .max_size(MAX_CONNECTIONS)
        .min_idle(Some(1))
        .connection_timeout(Duration::from_secs(5))
        .build(manager)
        .map_err(|e| DbError::Pool(e.to_string()))?;

    tracing::debug!(max = MAX_CONNECTIONS, "Opened store pool at {:?}", path);
    Ok(pool)
}
