//! The tracking session behind `et run`.
//!
//! A session owns the live [`TimerState`] and turns host events (editor
//! focus changes and user commands) into timer transitions. Each event is
//! handled to completion with a single `now`, and every user command is
//! followed by a save.

use std::collections::HashMap;

use serde::Deserialize;

use et_core::{FsPath, KeyValueStore, Persistence, TimerEvent, TimerState};

use crate::render;

/// Something that happened in the host.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum HostEvent {
    /// The focused file changed. No path means no file has focus.
    Focus {
        #[serde(default)]
        path: Option<FsPath>,
    },
    Pause,
    Resume,
    /// Pause when tracking, resume otherwise.
    Toggle,
    /// Toggle exclusion of `path`, or of the focused file.
    Exclude {
        #[serde(default)]
        path: Option<FsPath>,
    },
    Reset,
    Save,
    /// The status display was hidden.
    Hide,
    /// The status display was shown.
    Show,
}

impl HostEvent {
    /// Whether the event is a user command, which triggers a save.
    pub const fn is_command(&self) -> bool {
        matches!(
            self,
            Self::Pause | Self::Resume | Self::Toggle | Self::Exclude { .. } | Self::Reset | Self::Save
        )
    }
}

/// One line of host input: an event and, optionally, when it happened.
///
/// ```json
/// {"type": "focus", "path": "/repo/src/main.rs", "at": 1767225600000}
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct HostMessage {
    #[serde(flatten)]
    pub event: HostEvent,
    /// Milliseconds since the Unix epoch. Defaults to the time it is read.
    #[serde(default)]
    pub at: Option<i64>,
}

/// Live tracking state plus where it is saved.
pub struct Session<S> {
    state: TimerState,
    persistence: Persistence<S>,
    active_file: Option<FsPath>,
    resume_on_include: bool,
    /// Whether the stored data has been read. Until it has, nothing is
    /// written, so unseen data is never replaced.
    restored: bool,
}

impl<S: KeyValueStore> Session<S> {
    /// Restores the saved state, or starts empty.
    ///
    /// If the store cannot be read the session still runs, and the load is
    /// retried before every save.
    pub fn new(persistence: Persistence<S>, resume_on_include: bool) -> Self {
        let (state, restored) = match persistence.load() {
            Ok(state) => (state.unwrap_or_default(), true),
            Err(e) => {
                tracing::warn!(error = %e, "timer data unavailable, saving is on hold");
                (TimerState::default(), false)
            }
        };
        Self {
            state,
            persistence,
            active_file: None,
            resume_on_include,
            restored,
        }
    }

    pub const fn state(&self) -> &TimerState {
        &self.state
    }

    /// The file the host last reported as focused, excluded or not.
    pub const fn active_file(&self) -> Option<&FsPath> {
        self.active_file.as_ref()
    }

    /// Applies `event` at `now`, saving afterwards if it was a command.
    pub fn handle(&mut self, event: &HostEvent, now: i64) {
        for transition in self.transitions(event, now) {
            tracing::debug!(?transition, "applying transition");
            self.state = std::mem::take(&mut self.state).apply(&transition);
        }

        if event.is_command() {
            self.save(now);
        }
    }

    /// Saves the current state. Failures are logged and retried next time.
    pub fn save(&mut self, now: i64) -> bool {
        if !self.restored && !self.restore(now) {
            tracing::warn!("timer data still unreadable, not saving");
            return false;
        }
        self.persistence.save(&self.state, now)
    }

    pub fn status_line(&self, now: i64) -> String {
        render::status_line(&self.state, self.active_file.as_ref(), now)
    }

    /// Final save. Returns the persistence layer for inspection.
    pub fn shutdown(mut self, now: i64) -> Persistence<S> {
        if !self.save(now) {
            tracing::warn!("final save failed, recent time may be lost");
        }
        self.persistence
    }

    /// Retries the initial load, folding this session's time into the
    /// stored totals.
    fn restore(&mut self, now: i64) -> bool {
        match self.persistence.load() {
            Ok(saved) => {
                let saved = saved.unwrap_or_default();
                tracing::info!("timer data readable again, merging session time");
                self.state = merge(&saved, &self.state, now);
                self.restored = true;
                true
            }
            Err(e) => {
                tracing::debug!(error = %e, "timer data still unavailable");
                false
            }
        }
    }

    fn transitions(&mut self, event: &HostEvent, now: i64) -> Vec<TimerEvent> {
        match event {
            HostEvent::Focus { path: Some(path) } => {
                self.active_file = Some(path.clone());
                vec![TimerEvent::Switch {
                    now,
                    fs_path: path.clone(),
                }]
            }
            HostEvent::Focus { path: None } => {
                self.active_file = None;
                vec![TimerEvent::Stop { now }]
            }
            HostEvent::Pause => vec![TimerEvent::Pause { now }],
            HostEvent::Resume => vec![TimerEvent::Resume {
                now,
                fs_path: self.active_file.clone(),
            }],
            HostEvent::Toggle => vec![TimerEvent::SwitchTracking {
                now,
                fs_path: self.active_file.clone(),
            }],
            HostEvent::Exclude { path } => {
                let Some(fs_path) = path.clone().or_else(|| self.active_file.clone()) else {
                    tracing::info!("no active file to exclude");
                    return Vec::new();
                };
                let becomes_included = self.state.is_excluded(&fs_path);
                tracing::info!(fs_path = %fs_path, excluded = !becomes_included, "toggling exclusion");

                let restart = becomes_included
                    && self.resume_on_include
                    && self.active_file.as_ref() == Some(&fs_path);
                let mut transitions = vec![TimerEvent::ToggleExclude {
                    now,
                    fs_path: fs_path.clone(),
                }];
                if restart {
                    transitions.push(TimerEvent::Start { now, fs_path });
                }
                transitions
            }
            HostEvent::Reset => {
                let mut transitions = vec![TimerEvent::Reset];
                if let Some(fs_path) = self.active_file.clone() {
                    transitions.push(TimerEvent::Start { now, fs_path });
                }
                transitions
            }
            HostEvent::Save | HostEvent::Hide | HostEvent::Show => Vec::new(),
        }
    }
}

/// Adds `live` time on top of `saved` totals at `now`.
///
/// Exclusions are combined, and the live tracking flag and running file win.
fn merge(saved: &TimerState, live: &TimerState, now: i64) -> TimerState {
    let mut totals: HashMap<FsPath, i64> = HashMap::new();
    for (fs_path, timer) in saved.timers().chain(live.timers()) {
        let total = totals.entry(fs_path.clone()).or_default();
        *total = total.saturating_add(timer.elapsed_at(now));
    }

    let mut merged = TimerState::default().load_timer(totals);
    for fs_path in saved.excluded_files().into_iter().chain(live.excluded_files()) {
        merged = merged.add_exclude(now, fs_path);
    }
    if !live.is_tracking() {
        merged = merged.pause(now);
    }
    if let Some(current) = live.current_tracking_file() {
        merged = merged.start_timer(now, current);
    }
    merged
}
