//! Core domain logic for the edit timer.
//!
//! This crate contains:
//! - Timers: per-file accumulated and in-flight time
//! - State transitions: start, stop, switch, pause, resume, reset, exclude
//! - Selectors: elapsed and total time at a given instant
//! - Persistence: flattening state into a durable record and restoring it
//!
//! Nothing here reads the clock. Every operation that can move time takes a
//! `now` in milliseconds since the Unix epoch, captured once per host event.

mod event;
mod persistence;
mod record;
mod selectors;
mod state;
mod store;
mod timer;
pub mod types;

pub use event::TimerEvent;
pub use persistence::{LoadError, Persistence, RECORD_KEY};
pub use record::{PersistedFile, PersistedRecord, RecordError};
pub use selectors::FileTime;
pub use state::TimerState;
pub use store::{KeyValueStore, MemoryStore};
pub use timer::{Timer, calc_elapsed};
pub use types::{FsPath, ValidationError};
