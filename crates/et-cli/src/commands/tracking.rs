//! Pause, resume, and reset commands.

use std::io::Write;

use anyhow::{Result, bail};

use et_core::{KeyValueStore, Persistence};

use crate::commands::util::{load_state_for_update, save_state};
use crate::render::format_clock;

pub fn pause<W: Write, S: KeyValueStore>(
    writer: &mut W,
    persistence: &mut Persistence<S>,
    now: i64,
) -> Result<()> {
    let state = load_state_for_update(persistence)?;
    if !state.is_tracking() {
        writeln!(writer, "Tracking is already paused.")?;
        return Ok(());
    }

    let state = state.pause(now);
    save_state(persistence, &state, now)?;
    writeln!(writer, "Tracking paused.")?;
    Ok(())
}

pub fn resume<W: Write, S: KeyValueStore>(
    writer: &mut W,
    persistence: &mut Persistence<S>,
    now: i64,
) -> Result<()> {
    let state = load_state_for_update(persistence)?;
    if state.is_tracking() {
        writeln!(writer, "Tracking is already on.")?;
        return Ok(());
    }

    let state = state.resume(now, None);
    save_state(persistence, &state, now)?;
    writeln!(writer, "Tracking resumed.")?;
    Ok(())
}

/// Clears every timer. Exclusions and the tracking flag survive.
pub fn reset<W: Write, S: KeyValueStore>(
    writer: &mut W,
    persistence: &mut Persistence<S>,
    yes: bool,
    now: i64,
) -> Result<()> {
    if !yes {
        bail!("refusing to reset all time data without --yes");
    }

    let state = load_state_for_update(persistence)?;
    let cleared = state.total_time(now);
    let state = state.reset();
    save_state(persistence, &state, now)?;
    writeln!(
        writer,
        "All time data has been reset ({} cleared).",
        format_clock(Some(cleared))
    )?;
    Ok(())
}
