//! Loading and saving timer state through a [`KeyValueStore`].
//!
//! Persistence is best effort. A failed save is logged and reported to the
//! caller as `false` so it can retry on the next cycle. A missing record
//! means "no prior data". A store that cannot be read is an error: the caller
//! must not write over data it was unable to see.

use thiserror::Error;

use crate::record::{PersistedRecord, RecordError};
use crate::state::TimerState;
use crate::store::KeyValueStore;

/// Store key holding the serialized [`PersistedRecord`].
pub const RECORD_KEY: &str = "edit_timer.persistent_data";

/// Why a stored record could not be loaded.
#[derive(Debug, Error)]
pub enum LoadError<E: std::error::Error + 'static> {
    /// The store itself failed.
    #[error("failed to read timer data")]
    Read(#[source] E),
    /// The store answered, but the record is not valid.
    #[error("stored timer data is corrupt")]
    Corrupt(#[source] RecordError),
}

/// Reads and writes the persisted record.
#[derive(Debug)]
pub struct Persistence<S> {
    store: S,
}

impl<S: KeyValueStore> Persistence<S> {
    pub const fn new(store: S) -> Self {
        Self { store }
    }

    pub const fn store(&self) -> &S {
        &self.store
    }

    pub fn into_inner(self) -> S {
        self.store
    }

    /// Reads the stored record. `Ok(None)` if nothing has been saved yet.
    pub fn load_record(&self) -> Result<Option<PersistedRecord>, LoadError<S::Error>> {
        let json = match self.store.get(RECORD_KEY) {
            Ok(Some(json)) => json,
            Ok(None) => {
                tracing::info!("no previous timer data found, starting fresh");
                return Ok(None);
            }
            Err(e) => {
                tracing::warn!(error = %e, "failed to read timer data");
                return Err(LoadError::Read(e));
            }
        };

        PersistedRecord::from_json(&json)
            .map(Some)
            .map_err(LoadError::Corrupt)
    }

    /// Restores the stored state. Nothing is restored as running.
    ///
    /// A corrupt record loads as `Ok(None)`; only a store failure is an error.
    pub fn load(&self) -> Result<Option<TimerState>, S::Error> {
        let record = match self.load_record() {
            Ok(Some(record)) => record,
            Ok(None) => return Ok(None),
            Err(LoadError::Corrupt(e)) => {
                tracing::warn!(error = %e, "ignoring corrupt timer data");
                return Ok(None);
            }
            Err(LoadError::Read(e)) => return Err(e),
        };
        tracing::info!(
            files = record.file_data.len(),
            excluded = record.excluded_files.len(),
            "loaded timer data"
        );
        Ok(Some(TimerState::from_record(&record)))
    }

    /// Flattens `state` at `now` and writes it. Returns whether it was stored.
    pub fn save(&mut self, state: &TimerState, now: i64) -> bool {
        let json = match state.to_record(now).to_json() {
            Ok(json) => json,
            Err(e) => {
                tracing::warn!(error = %e, "failed to serialize timer data");
                return false;
            }
        };

        match self.store.set(RECORD_KEY, &json) {
            Ok(()) => {
                tracing::debug!(saved_at = now, "saved timer data");
                true
            }
            Err(e) => {
                tracing::warn!(error = %e, "failed to save timer data");
                false
            }
        }
    }
}
