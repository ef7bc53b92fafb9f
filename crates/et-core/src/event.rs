//! Transition requests as data.

use serde::{Deserialize, Serialize};

use crate::state::TimerState;
use crate::types::FsPath;

/// A single transition of the timer state machine.
///
/// Every variant that can move time carries the `now` it applies at, so a
/// list of events replays to the same state regardless of when it is run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum TimerEvent {
    Start {
        now: i64,
        fs_path: FsPath,
    },
    Stop {
        now: i64,
    },
    Switch {
        now: i64,
        fs_path: FsPath,
    },
    Pause {
        now: i64,
    },
    Resume {
        now: i64,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        fs_path: Option<FsPath>,
    },
    SwitchTracking {
        now: i64,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        fs_path: Option<FsPath>,
    },
    Reset,
    ToggleExclude {
        now: i64,
        fs_path: FsPath,
    },
}

impl TimerState {
    /// Applies one event.
    #[must_use]
    pub fn apply(self, event: &TimerEvent) -> Self {
        match event {
            TimerEvent::Start { now, fs_path } => self.start_timer(*now, fs_path),
            TimerEvent::Stop { now } => self.stop_timer(*now),
            TimerEvent::Switch { now, fs_path } => self.switch_timer(*now, fs_path),
            TimerEvent::Pause { now } => self.pause(*now),
            TimerEvent::Resume { now, fs_path } => self.resume(*now, fs_path.as_ref()),
            TimerEvent::SwitchTracking { now, fs_path } => {
                self.switch_tracking(*now, fs_path.as_ref())
            }
            TimerEvent::Reset => self.reset(),
            TimerEvent::ToggleExclude { now, fs_path } => self.toggle_exclude(*now, fs_path),
        }
    }
}
