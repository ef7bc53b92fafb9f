//! Durable key-value storage seam.

use std::collections::HashMap;
use std::convert::Infallible;

/// A string key-value store the persistence layer writes records to.
///
/// Implemented by `et_db::Database` for on-disk storage and by
/// [`MemoryStore`] for tests and throwaway sessions.
pub trait KeyValueStore {
    type Error: std::error::Error + Send + Sync + 'static;

    fn get(&self, key: &str) -> Result<Option<String>, Self::Error>;

    fn set(&mut self, key: &str, value: &str) -> Result<(), Self::Error>;
}

/// In-memory store.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    entries: HashMap<String, String>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl KeyValueStore for MemoryStore {
    type Error = Infallible;

    fn get(&self, key: &str) -> Result<Option<String>, Self::Error> {
        Ok(self.entries.get(key).cloned())
    }

    fn set(&mut self, key: &str, value: &str) -> Result<(), Self::Error> {
        self.entries.insert(key.to_string(), value.to_string());
        Ok(())
    }
}
