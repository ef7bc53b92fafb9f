//! Read-only views over [`TimerState`].
//!
//! Selectors take the same `now` the caller used for the event being
//! rendered, so a running timer is always reported with its live value.

use serde::Serialize;

use crate::state::TimerState;
use crate::timer::Timer;
use crate::types::FsPath;

/// Elapsed time for one file at a given instant.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FileTime {
    pub fs_path: FsPath,
    pub elapsed_ms: i64,
}

impl TimerState {
    /// Elapsed time for `fs_path`, or `None` if it has never been tracked.
    pub fn elapsed_time(&self, now: i64, fs_path: &FsPath) -> Option<i64> {
        self.timers.get(fs_path).map(|timer| timer.elapsed_at(now))
    }

    /// Like [`elapsed_time`](Self::elapsed_time), but `None` for excluded files.
    pub fn elapsed_time_if_included(&self, now: i64, fs_path: &FsPath) -> Option<i64> {
        if self.is_excluded(fs_path) {
            return None;
        }
        self.elapsed_time(now, fs_path)
    }

    /// Sum of elapsed time over every file that is not excluded.
    pub fn total_time(&self, now: i64) -> i64 {
        self.timers
            .iter()
            .filter(|(fs_path, _)| !self.is_excluded(fs_path))
            .fold(0_i64, |total, (_, timer)| {
                total.saturating_add(timer.elapsed_at(now))
            })
    }

    /// Included files ranked by elapsed time, longest first.
    ///
    /// Ties are broken by path so the order is stable.
    pub fn ranked_files(&self, now: i64) -> Vec<FileTime> {
        let mut files: Vec<FileTime> = self
            .timers
            .iter()
            .filter(|(fs_path, _)| !self.is_excluded(fs_path))
            .map(|(fs_path, timer)| FileTime {
                fs_path: fs_path.clone(),
                elapsed_ms: timer.elapsed_at(now),
            })
            .collect();
        files.sort_by(|a, b| {
            b.elapsed_ms
                .cmp(&a.elapsed_ms)
                .then_with(|| a.fs_path.cmp(&b.fs_path))
        });
        files
    }

    pub fn is_excluded(&self, fs_path: &FsPath) -> bool {
        self.excluded_files.contains(fs_path)
    }

    pub const fn is_tracking(&self) -> bool {
        self.is_tracking
    }

    pub const fn current_tracking_file(&self) -> Option<&FsPath> {
        self.current_tracking_file.as_ref()
    }

    pub fn timer(&self, fs_path: &FsPath) -> Option<&Timer> {
        self.timers.get(fs_path)
    }

    /// Number of files with a timer, excluded ones included.
    pub fn tracked_file_count(&self) -> usize {
        self.timers.len()
    }

    /// Excluded files in path order.
    pub fn excluded_files(&self) -> Vec<&FsPath> {
        let mut files: Vec<&FsPath> = self.excluded_files.iter().collect();
        files.sort();
        files
    }

    /// All timers, in no particular order.
    pub fn timers(&self) -> impl Iterator<Item = (&FsPath, &Timer)> {
        self.timers.iter()
    }
}
