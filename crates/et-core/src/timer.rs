//! Per-file timer records.

/// Accrued activity for one file.
///
/// `accumulated_ms` is the time frozen at the last stop. `start_at` is
/// present only while the timer is running.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Timer {
    start_at: Option<i64>,
    accumulated_ms: i64,
}

impl Timer {
    /// A running timer with nothing accumulated yet.
    pub(crate) const fn started(now: i64) -> Self {
        Self {
            start_at: Some(now),
            accumulated_ms: 0,
        }
    }

    /// A stopped timer holding `accumulated_ms`.
    pub const fn stopped(accumulated_ms: i64) -> Self {
        Self {
            start_at: None,
            accumulated_ms,
        }
    }

    /// When the timer was last started, if it is running.
    pub const fn start_at(&self) -> Option<i64> {
        self.start_at
    }

    /// Time frozen as of the last stop.
    pub const fn accumulated_ms(&self) -> i64 {
        self.accumulated_ms
    }

    pub const fn is_running(&self) -> bool {
        self.start_at.is_some()
    }

    /// Elapsed time at `now`, including the in-flight part.
    ///
    /// Reads run on every redraw, so clamping here is only logged at debug.
    pub fn elapsed_at(&self, now: i64) -> i64 {
        match self.start_at {
            Some(start_at) => {
                if now < start_at || self.accumulated_ms < 0 {
                    tracing::debug!(
                        now,
                        start_at,
                        accumulated = self.accumulated_ms,
                        "clamping elapsed time"
                    );
                }
                clamped_elapsed(now, self.accumulated_ms, start_at)
            }
            None => self.accumulated_ms,
        }
    }

    pub(crate) const fn start(&mut self, now: i64) {
        self.start_at = Some(now);
    }

    /// Freezes the in-flight time. Returns `false` if the timer was not running.
    pub(crate) fn stop(&mut self, now: i64) -> bool {
        let Some(start_at) = self.start_at.take() else {
            return false;
        };
        self.accumulated_ms = calc_elapsed(now, self.accumulated_ms, start_at);
        true
    }
}

/// Computes `accumulated + (now - start_at)` without letting time run backward.
///
/// A clock that went backward yields the previous `accumulated` value; a
/// negative `accumulated` is treated as zero. Both cases are logged.
pub fn calc_elapsed(now: i64, accumulated: i64, start_at: i64) -> i64 {
    if accumulated < 0 {
        tracing::warn!(accumulated, "negative accumulated time, treating as zero");
    }
    if now < start_at {
        tracing::warn!(now, start_at, "clock went backward, keeping accumulated time");
    }
    clamped_elapsed(now, accumulated, start_at)
}

fn clamped_elapsed(now: i64, accumulated: i64, start_at: i64) -> i64 {
    let accumulated = accumulated.max(0);
    if now < start_at {
        return accumulated;
    }
    accumulated.saturating_add(now.saturating_sub(start_at))
}
