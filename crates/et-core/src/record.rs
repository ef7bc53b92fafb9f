//! The durable form of a [`TimerState`].
//!
//! A record never contains a running timer: [`TimerState::to_record`]
//! flattens the in-flight time into a static total, and
//! [`TimerState::from_record`] restores every file as stopped. Tracking
//! resumes only when the host reports a focused file again.
//!
//! Records are stored as JSON:
//!
//! ```json
//! {
//!   "excludedFiles": ["/repo/notes.md"],
//!   "isTracking": true,
//!   "fileData": [{ "fsPath": "/repo/src/main.rs", "elapsedTime": 400 }],
//!   "savedAt": 1767225600000
//! }
//! ```

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::state::TimerState;
use crate::types::FsPath;

/// Errors reading or writing a record.
#[derive(Debug, Error)]
pub enum RecordError {
    #[error("invalid persisted record: {0}")]
    Json(#[from] serde_json::Error),
}

/// Flattened timer state as written to the store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PersistedRecord {
    #[serde(default, alias = "excludeFiles")]
    pub excluded_files: Vec<FsPath>,
    #[serde(default = "default_is_tracking")]
    pub is_tracking: bool,
    #[serde(default)]
    pub file_data: Vec<PersistedFile>,
    /// Milliseconds since the Unix epoch at which the record was taken.
    #[serde(default, alias = "lastSavedAt")]
    pub saved_at: i64,
}

/// Total time for one file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PersistedFile {
    pub fs_path: FsPath,
    pub elapsed_time: i64,
}

const fn default_is_tracking() -> bool {
    true
}

impl PersistedRecord {
    pub fn from_json(json: &str) -> Result<Self, RecordError> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn to_json(&self) -> Result<String, RecordError> {
        Ok(serde_json::to_string(self)?)
    }

    /// Sum of stored time over files that are not excluded.
    pub fn total_time(&self) -> i64 {
        self.file_data
            .iter()
            .filter(|file| !self.excluded_files.contains(&file.fs_path))
            .fold(0_i64, |total, file| total.saturating_add(file.elapsed_time))
    }
}

impl TimerState {
    /// Flattens the state at `now` into a record.
    ///
    /// Files with no accrued time are dropped. Excluded files keep their
    /// frozen totals so re-including them later restores the time.
    pub fn to_record(&self, now: i64) -> PersistedRecord {
        let mut file_data: Vec<PersistedFile> = self
            .timers
            .iter()
            .map(|(fs_path, timer)| PersistedFile {
                fs_path: fs_path.clone(),
                elapsed_time: timer.elapsed_at(now),
            })
            .filter(|file| file.elapsed_time > 0)
            .collect();
        file_data.sort_by(|a, b| a.fs_path.cmp(&b.fs_path));

        PersistedRecord {
            excluded_files: self.excluded_files().into_iter().cloned().collect(),
            is_tracking: self.is_tracking,
            file_data,
            saved_at: now,
        }
    }

    /// Rebuilds a state from a record. Nothing is left running.
    pub fn from_record(record: &PersistedRecord) -> Self {
        let mut state = Self::default().load_timer(
            record
                .file_data
                .iter()
                .map(|file| (file.fs_path.clone(), file.elapsed_time)),
        );
        state
            .excluded_files
            .extend(record.excluded_files.iter().cloned());

        if record.is_tracking != state.is_tracking {
            state = state.switch_tracking(record.saved_at, None);
        }
        state
    }
}
