//! In-memory durable store

use crate::{DurableStore, Result};
use parking_lot::RwLock;
use std::collections::HashMap;

/// Process-local store; contents are lost on drop
#[derive(Default)]
pub struct MemoryStore {
    entries: RwLock<HashMap<String, String>>,
    writes: RwLock<usize>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of `put` calls so far
    pub fn write_count(&self) -> usize {
        *self.writes.read()
    }
}

impl DurableStore for MemoryStore {
    fn get(&self, key: &str) -> Result<Option<String>> {
        Ok(self.entries.read().get(key).cloned())
    }

    fn put(&self, key: &str, value: &str) -> Result<()> {
        self.entries.write().insert(key.to_string(), value.to_string());
        *self.writes.write() += 1;
        Ok(())
    }
}
