//! Text rendering for durations and the status line.

use et_core::{FsPath, TimerState};

/// Placeholder for a file with no time to show.
pub const NO_TIME: &str = "--:--:--";

/// Formats milliseconds as `HH:MM:SS`.
///
/// Hours keep counting past 24. `None` renders as [`NO_TIME`] and negative
/// values as zero.
pub fn format_clock(ms: Option<i64>) -> String {
    let Some(ms) = ms else {
        return NO_TIME.to_string();
    };
    let total_seconds = ms.max(0) / 1000;
    let hours = total_seconds / 3600;
    let minutes = (total_seconds % 3600) / 60;
    let seconds = total_seconds % 60;
    format!("{hours:02}:{minutes:02}:{seconds:02}")
}

/// Generates a 10-character progress bar.
/// Values <5% of max get a single block for visibility.
#[expect(
    clippy::cast_precision_loss,
    clippy::cast_possible_truncation,
    clippy::cast_sign_loss,
    reason = "ratio is clamped to 0..=10 before the cast"
)]
pub fn progress_bar(value: i64, max: i64) -> String {
    if max <= 0 {
        return "░░░░░░░░░░".to_string();
    }

    let ratio = value as f64 / max as f64;
    let filled = if ratio < 0.05 && value > 0 {
        1
    } else {
        (ratio * 10.0).round().clamp(0.0, 10.0) as usize
    };

    let empty = 10 - filled;
    format!("{}{}", "█".repeat(filled), "░".repeat(empty))
}

/// Shortens `name` to at most `width` characters, ending in `...` when cut.
pub fn truncate(name: &str, width: usize) -> String {
    if name.chars().count() <= width {
        return name.to_string();
    }
    let kept: String = name.chars().take(width.saturating_sub(3)).collect();
    format!("{kept}...")
}

/// Status line: tracking icon, total time, and the active file's time.
pub fn status_line(state: &TimerState, active_file: Option<&FsPath>, now: i64) -> String {
    let icon = if state.is_tracking() { "▶" } else { "⏸" };
    let total = format_clock(Some(state.total_time(now)));
    let current = format_clock(active_file.and_then(|path| state.elapsed_time_if_included(now, path)));
    format!("{icon} {total} | {current}")
}
