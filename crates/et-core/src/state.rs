//! The aggregate timer state and its transitions.
//!
//! Every transition consumes the old [`TimerState`] and returns the new one,
//! so callers always hold a consistent snapshot:
//!
//! ```
//! use et_core::{FsPath, TimerState};
//!
//! let a = FsPath::new("a.txt").unwrap();
//! let state = TimerState::default().start_timer(0, &a).stop_timer(400);
//! assert_eq!(state.elapsed_time(400, &a), Some(400));
//! ```
//!
//! # Invariants
//!
//! - At most one timer is running, and it is keyed by `current_tracking_file`.
//! - No timer runs while `is_tracking` is false.
//! - An excluded file never has a running timer.
//!
//! Transitions never fail. Inconsistent requests (stopping when nothing is
//! running, a clock that went backward) are logged and resolved without
//! changing accumulated time.

use std::collections::{HashMap, HashSet};

use crate::timer::Timer;
use crate::types::FsPath;

/// Per-file timers plus the tracking flag and exclusion set.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TimerState {
    pub(crate) timers: HashMap<FsPath, Timer>,
    pub(crate) current_tracking_file: Option<FsPath>,
    pub(crate) is_tracking: bool,
    pub(crate) excluded_files: HashSet<FsPath>,
}

impl Default for TimerState {
    fn default() -> Self {
        Self {
            timers: HashMap::new(),
            current_tracking_file: None,
            is_tracking: true,
            excluded_files: HashSet::new(),
        }
    }
}

impl TimerState {
    /// Starts (or resumes) the timer for `fs_path`.
    ///
    /// Does nothing if the file is excluded or tracking is paused. A different
    /// running file is stopped at the same `now` first; the file that is
    /// already running keeps its original start.
    #[must_use]
    pub fn start_timer(mut self, now: i64, fs_path: &FsPath) -> Self {
        if self.excluded_files.contains(fs_path) || !self.is_tracking {
            return self;
        }

        if let Some(current) = &self.current_tracking_file {
            let already_running = current == fs_path
                && self.timers.get(fs_path).is_some_and(Timer::is_running);
            if already_running {
                return self;
            }
            self = self.stop_timer(now);
        }

        self.timers
            .entry(fs_path.clone())
            .and_modify(|timer| timer.start(now))
            .or_insert_with(|| Timer::started(now));
        self.current_tracking_file = Some(fs_path.clone());
        self
    }

    /// Stops the running timer, folding its in-flight time into the total.
    #[must_use]
    pub fn stop_timer(mut self, now: i64) -> Self {
        let Some(current) = self.current_tracking_file.take() else {
            tracing::debug!(now, "stop requested with no file being tracked");
            return self;
        };

        let stopped = self
            .timers
            .get_mut(&current)
            .is_some_and(|timer| timer.stop(now));
        if !stopped {
            tracing::warn!(fs_path = %current, "attempted to stop a timer that was not running");
        }
        self
    }

    /// Stops the current timer and starts `fs_path` at the same instant.
    #[must_use]
    pub fn switch_timer(self, now: i64, fs_path: &FsPath) -> Self {
        self.stop_timer(now).start_timer(now, fs_path)
    }

    /// Turns tracking off and stops the running timer.
    #[must_use]
    pub fn pause(mut self, now: i64) -> Self {
        self.is_tracking = false;
        self.stop_timer(now)
    }

    /// Turns tracking on, starting `fs_path` if one is given.
    #[must_use]
    pub fn resume(mut self, now: i64, fs_path: Option<&FsPath>) -> Self {
        self.is_tracking = true;
        match fs_path {
            Some(fs_path) => self.start_timer(now, fs_path),
            None => self,
        }
    }

    /// Pauses when tracking, resumes otherwise.
    #[must_use]
    pub fn switch_tracking(self, now: i64, fs_path: Option<&FsPath>) -> Self {
        if self.is_tracking {
            self.pause(now)
        } else {
            self.resume(now, fs_path)
        }
    }

    /// Drops every timer. The tracking flag and exclusions are kept.
    #[must_use]
    pub fn reset(mut self) -> Self {
        self.timers.clear();
        self.current_tracking_file = None;
        self
    }

    /// Replaces all timers with stopped timers holding the given totals.
    ///
    /// Only used when restoring, so nothing is ever left running.
    #[must_use]
    pub fn load_timer<I>(mut self, entries: I) -> Self
    where
        I: IntoIterator<Item = (FsPath, i64)>,
    {
        self.timers = entries
            .into_iter()
            .map(|(fs_path, elapsed_ms)| {
                if elapsed_ms < 0 {
                    tracing::warn!(fs_path = %fs_path, elapsed_ms, "negative stored time, loading as zero");
                }
                (fs_path, Timer::stopped(elapsed_ms.max(0)))
            })
            .collect();
        self.current_tracking_file = None;
        self
    }

    /// Flips the exclusion of `fs_path`.
    ///
    /// Excluding the running file stops its timer at `now`. Including a file
    /// never restarts it; the caller decides whether to call `start_timer`.
    #[must_use]
    pub fn toggle_exclude(mut self, now: i64, fs_path: &FsPath) -> Self {
        if self.excluded_files.remove(fs_path) {
            return self;
        }
        self.add_exclude(now, fs_path)
    }

    /// Excludes `fs_path`, stopping it if it is the running file.
    #[must_use]
    pub fn add_exclude(mut self, now: i64, fs_path: &FsPath) -> Self {
        self.excluded_files.insert(fs_path.clone());
        if self.current_tracking_file.as_ref() == Some(fs_path) {
            return self.stop_timer(now);
        }
        self
    }

    /// Includes `fs_path` again. Has no effect if it was not excluded.
    #[must_use]
    pub fn remove_exclude(mut self, fs_path: &FsPath) -> Self {
        self.excluded_files.remove(fs_path);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn path(s: &str) -> FsPath {
        FsPath::new(s).unwrap()
    }

    /// Checks the structural invariants from the module docs.
    fn assert_consistent(state: &TimerState) {
        let running: Vec<&FsPath> = state
            .timers
            .iter()
            .filter(|(_, timer)| timer.is_running())
            .map(|(fs_path, _)| fs_path)
            .collect();

        match &state.current_tracking_file {
            Some(current) => assert_eq!(running, vec![current]),
            None => assert!(running.is_empty(), "running without current: {running:?}"),
        }
        if !state.is_tracking {
            assert!(running.is_empty());
        }
        for fs_path in running {
            assert!(!state.excluded_files.contains(fs_path));
        }
    }

    #[test]
    fn start_then_stop_accumulates_duration() {
        let a = path("a.txt");
        let state = TimerState::default().start_timer(0, &a);
        assert_consistent(&state);
        assert_eq!(state.current_tracking_file, Some(a.clone()));

        let state = state.stop_timer(400);
        assert_consistent(&state);
        assert_eq!(state.current_tracking_file, None);
        assert_eq!(state.timers[&a], Timer::stopped(400));
    }

    #[test]
    fn restarting_keeps_accumulated_time() {
        let a = path("a.txt");
        let state = TimerState::default()
            .start_timer(0, &a)
            .stop_timer(100)
            .start_timer(1_000, &a)
            .stop_timer(1_250);
        assert_eq!(state.timers[&a].accumulated_ms(), 350);
    }

    #[test]
    fn start_is_noop_for_excluded_file() {
        let a = path("a.txt");
        let excluded = TimerState::default().toggle_exclude(0, &a);
        let state = excluded.clone().start_timer(10, &a);
        assert_eq!(state, excluded);
    }

    #[test]
    fn start_is_noop_while_paused() {
        let a = path("a.txt");
        let paused = TimerState::default().pause(0);
        let state = paused.clone().start_timer(10, &a);
        assert_eq!(state, paused);
        assert!(state.timers.is_empty());
    }

    #[test]
    fn starting_running_file_again_keeps_original_start() {
        let a = path("a.txt");
        let state = TimerState::default()
            .start_timer(0, &a)
            .start_timer(300, &a)
            .stop_timer(500);
        assert_eq!(state.timers[&a].accumulated_ms(), 500);
    }

    #[test]
    fn starting_another_file_stops_the_running_one() {
        let a = path("a.txt");
        let b = path("b.txt");
        let state = TimerState::default().start_timer(0, &a).start_timer(300, &b);
        assert_consistent(&state);
        assert_eq!(state.timers[&a], Timer::stopped(300));
        assert_eq!(state.current_tracking_file, Some(b));
    }

    #[test]
    fn switch_matches_stop_then_start() {
        let a = path("a.txt");
        let b = path("b.txt");
        let base = TimerState::default().start_timer(0, &a);

        let switched = base.clone().switch_timer(400, &b);
        let composed = base.stop_timer(400).start_timer(400, &b);
        assert_eq!(switched, composed);
        assert_consistent(&switched);
        assert_eq!(switched.timers[&a], Timer::stopped(400));
        assert_eq!(switched.timers[&b].start_at(), Some(400));
    }

    #[test]
    fn switch_to_same_file_loses_nothing() {
        let a = path("a.txt");
        let state = TimerState::default()
            .start_timer(0, &a)
            .switch_timer(250, &a)
            .stop_timer(600);
        assert_eq!(state.timers[&a].accumulated_ms(), 600);
    }

    #[test]
    fn stop_twice_changes_state_only_once() {
        let a = path("a.txt");
        let once = TimerState::default().start_timer(0, &a).stop_timer(400);
        let twice = once.clone().stop_timer(900);
        assert_eq!(once, twice);
    }

    #[test]
    fn stop_without_running_timer_leaves_accumulated_untouched() {
        let a = path("a.txt");
        let mut state = TimerState::default().load_timer([(a.clone(), 250)]);
        // Corrupt on purpose: current file set but its timer is stopped.
        state.current_tracking_file = Some(a.clone());

        let state = state.stop_timer(1_000);
        assert_eq!(state.current_tracking_file, None);
        assert_eq!(state.timers[&a], Timer::stopped(250));
    }

    #[test]
    fn stop_with_backward_clock_keeps_accumulated() {
        let a = path("a.txt");
        let state = TimerState::default()
            .load_timer([(a.clone(), 100)])
            .start_timer(1_000, &a)
            .stop_timer(500);
        assert_eq!(state.timers[&a], Timer::stopped(100));
    }

    #[test]
    fn pause_stops_and_blocks_starts() {
        let a = path("a.txt");
        let state = TimerState::default().start_timer(0, &a).pause(200);
        assert_consistent(&state);
        assert!(!state.is_tracking);
        assert_eq!(state.timers[&a], Timer::stopped(200));

        let state = state.start_timer(300, &a);
        assert!(!state.timers[&a].is_running());
    }

    #[test]
    fn resume_with_file_restarts_it() {
        let a = path("a.txt");
        let state = TimerState::default()
            .start_timer(0, &a)
            .pause(200)
            .resume(1_000, Some(&a))
            .stop_timer(1_100);
        assert!(state.is_tracking);
        assert_eq!(state.timers[&a].accumulated_ms(), 300);
    }

    #[test]
    fn resume_without_file_only_sets_flag() {
        let state = TimerState::default().pause(0).resume(10, None);
        assert!(state.is_tracking);
        assert_eq!(state.current_tracking_file, None);
    }

    #[test]
    fn switch_tracking_alternates() {
        let a = path("a.txt");
        let state = TimerState::default().start_timer(0, &a);

        let paused = state.switch_tracking(100, Some(&a));
        assert!(!paused.is_tracking);
        assert_consistent(&paused);

        let resumed = paused.switch_tracking(500, Some(&a));
        assert!(resumed.is_tracking);
        assert_eq!(resumed.current_tracking_file, Some(a.clone()));
        assert_eq!(resumed.timers[&a].start_at(), Some(500));
    }

    #[test]
    fn reset_keeps_flag_and_exclusions() {
        let a = path("a.txt");
        let b = path("b.txt");
        let state = TimerState::default()
            .toggle_exclude(0, &b)
            .start_timer(0, &a)
            .pause(10)
            .reset();
        assert!(state.timers.is_empty());
        assert_eq!(state.current_tracking_file, None);
        assert!(!state.is_tracking);
        assert!(state.excluded_files.contains(&b));
    }

    #[test]
    fn load_timer_replaces_everything_with_stopped_timers() {
        let a = path("a.txt");
        let b = path("b.txt");
        let c = path("c.txt");
        let state = TimerState::default()
            .start_timer(0, &c)
            .load_timer([(a.clone(), 1_000), (b.clone(), -5)]);

        assert_consistent(&state);
        assert_eq!(state.current_tracking_file, None);
        assert_eq!(state.timers.len(), 2);
        assert_eq!(state.timers[&a], Timer::stopped(1_000));
        assert_eq!(state.timers[&b], Timer::stopped(0));
        assert!(!state.timers.contains_key(&c));
    }

    #[test]
    fn excluding_running_file_freezes_it() {
        let a = path("a.txt");
        let state = TimerState::default()
            .start_timer(0, &a)
            .toggle_exclude(250, &a);
        assert_consistent(&state);
        assert_eq!(state.current_tracking_file, None);
        assert_eq!(state.timers[&a], Timer::stopped(250));
        assert!(state.excluded_files.contains(&a));
    }

    #[test]
    fn excluding_other_file_keeps_current_running() {
        let a = path("a.txt");
        let b = path("b.txt");
        let state = TimerState::default()
            .start_timer(0, &a)
            .toggle_exclude(100, &b);
        assert_eq!(state.current_tracking_file, Some(a.clone()));
        assert!(state.timers[&a].is_running());
        assert!(!state.timers.contains_key(&b));
    }

    #[test]
    fn including_again_does_not_restart() {
        let a = path("a.txt");
        let state = TimerState::default()
            .start_timer(0, &a)
            .toggle_exclude(100, &a)
            .toggle_exclude(200, &a);
        assert!(!state.excluded_files.contains(&a));
        assert_eq!(state.current_tracking_file, None);
        assert_eq!(state.timers[&a], Timer::stopped(100));
    }

    #[test]
    fn add_and_remove_exclude_are_idempotent() {
        let a = path("a.txt");
        let state = TimerState::default()
            .add_exclude(0, &a)
            .add_exclude(1, &a);
        assert!(state.excluded_files.contains(&a));

        let state = state.remove_exclude(&a).remove_exclude(&a);
        assert!(state.excluded_files.is_empty());
    }

    #[test]
    fn long_random_walk_keeps_invariants() {
        let files = [path("a.txt"), path("b.txt"), path("c.txt")];
        let mut state = TimerState::default();
        let mut now = 0;

        for step in 0..300_usize {
            now += i64::try_from(step % 7).unwrap() * 10;
            let file = &files[step % files.len()];
            state = match step % 9 {
                0 | 1 => state.switch_timer(now, file),
                2 => state.start_timer(now, file),
                3 => state.stop_timer(now),
                4 => state.toggle_exclude(now, file),
                5 => state.switch_tracking(now, Some(file)),
                6 => state.pause(now),
                7 => state.resume(now, Some(file)),
                _ => state.stop_timer(now).start_timer(now, file),
            };
            assert_consistent(&state);
        }
    }
}
