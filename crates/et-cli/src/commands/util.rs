//! Shared utilities for CLI commands.

use anyhow::{Context, Result, bail};
use chrono::{DateTime, SecondsFormat, Utc};

use et_core::{KeyValueStore, LoadError, Persistence, TimerState};

/// Current wall-clock time in milliseconds since the Unix epoch.
pub fn now_ms() -> i64 {
    Utc::now().timestamp_millis()
}

/// Formats epoch milliseconds as RFC 3339 UTC, e.g. `2026-01-15T10:30:00Z`.
pub fn format_timestamp_ms(ms: i64) -> String {
    DateTime::<Utc>::from_timestamp_millis(ms).map_or_else(
        || format!("{ms} ms"),
        |dt| dt.to_rfc3339_opts(SecondsFormat::Secs, true),
    )
}

/// Loads the saved state for reading. A corrupt record reads as empty.
pub fn load_state<S: KeyValueStore>(persistence: &Persistence<S>) -> Result<TimerState> {
    let state = persistence
        .load()
        .context("failed to read timer data")?;
    Ok(state.unwrap_or_default())
}

/// Loads the saved state for a command that will write it back.
///
/// Fails on a corrupt record instead of replacing it with an empty one.
pub fn load_state_for_update<S: KeyValueStore>(
    persistence: &Persistence<S>,
) -> Result<TimerState> {
    match persistence.load_record() {
        Ok(record) => Ok(record
            .map(|record| TimerState::from_record(&record))
            .unwrap_or_default()),
        Err(e @ LoadError::Corrupt(_)) => {
            Err(e).context("refusing to overwrite unreadable timer data")
        }
        Err(e) => Err(e).context("failed to read timer data"),
    }
}

/// Saves `state`, failing the command if the store rejects it.
pub fn save_state<S: KeyValueStore>(
    persistence: &mut Persistence<S>,
    state: &TimerState,
    now: i64,
) -> Result<()> {
    if !persistence.save(state, now) {
        bail!("failed to save timer data");
    }
    Ok(())
}
