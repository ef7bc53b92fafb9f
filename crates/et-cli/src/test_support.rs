//! Stores with scripted failures.

use std::cell::Cell;
use std::io;

use et_core::{KeyValueStore, MemoryStore};

/// A store whose first `failing_reads` reads fail.
#[derive(Debug, Default)]
pub struct UnreadableStore {
    pub inner: MemoryStore,
    pub failing_reads: Cell<u32>,
}

impl UnreadableStore {
    pub fn new(inner: MemoryStore, failing_reads: u32) -> Self {
        Self {
            inner,
            failing_reads: Cell::new(failing_reads),
        }
    }
}

impl KeyValueStore for UnreadableStore {
    type Error = io::Error;

    fn get(&self, key: &str) -> Result<Option<String>, Self::Error> {
        let remaining = self.failing_reads.get();
        if remaining > 0 {
            self.failing_reads.set(remaining - 1);
            return Err(io::Error::other("disk unavailable"));
        }
        Ok(self.inner.get(key).unwrap_or_else(|e| match e {}))
    }

    fn set(&mut self, key: &str, value: &str) -> Result<(), Self::Error> {
        self.inner.set(key, value).unwrap_or_else(|e| match e {});
        Ok(())
    }
}
