//! PixiAlbum Durable Storage Layer
//!
//! Provides:
//! - `DurableStore`, a small string key/value abstraction
//! - SQLite-backed store for the installed client
//! - In-memory store for tests and ephemeral sessions

mod sqlite;
mod memory;
mod schema;
mod pool;

pub use sqlite::SqliteStore;
pub use memory::MemoryStore;
pub use pool::DbPool;
pub use schema::migrate;

use std::path::{Path, PathBuf};
use directories::ProjectDirs;
use thiserror::Error;

/// Database errors
#[derive(Error, Debug)]
pub enum DbError {
    #[error("SQLite error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    #[error("Pool error: {0}")]
    Pool(String),

    #[error("Migration error: {0}")]
    Migration(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, DbError>;

/// Durable string key/value storage, scoped to one client installation
pub trait DurableStore: Send + Sync {
    /// Read the value stored under `key`
    fn get(&self, key: &str) -> Result<Option<String>>;

    /// Replace the value stored under `key`
    fn put(&self, key: &str, value: &str) -> Result<()>;
}

/// Get the database directory
pub fn db_dir() -> PathBuf {
    ProjectDirs::from("com", "PixiAlbum", "PixiAlbum")
        .map(|dirs| dirs.data_dir().to_path_buf())
        .unwrap_or_else(|| PathBuf::from("./data"))
}

/// Open the client store, at `path` or in the default data directory
pub fn init(path: Option<&Path>) -> Result<SqliteStore> {
    let db_path = match path {
        Some(p) => p.to_path_buf(),
        None => db_dir().join("client.db"),
    };
    if let Some(parent) = db_path.parent() {
        std::fs::create_dir_all(parent)?;
    }

    let pool = pool::init_pool(&db_path)?;
    migrate(&pool)?;

    tracing::info!("Database initialized at {:?}", db_path);
    Ok(SqliteStore::new(pool))
}
