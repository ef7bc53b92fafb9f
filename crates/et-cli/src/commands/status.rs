//! Status command for showing the saved tracking state.

use std::io::Write;
use std::path::Path;

use anyhow::{Context, Result};

use et_core::{KeyValueStore, LoadError, Persistence, TimerState};

use crate::commands::util::format_timestamp_ms;
use crate::render::format_clock;

pub fn run<W: Write, S: KeyValueStore>(
    writer: &mut W,
    persistence: &Persistence<S>,
    database_path: &Path,
) -> Result<()> {
    writeln!(writer, "Edit timer status")?;
    writeln!(writer, "Database: {}", database_path.display())?;

    let record = match persistence.load_record() {
        Ok(Some(record)) => record,
        Ok(None) => {
            writeln!(writer, "No timer data recorded.")?;
            return Ok(());
        }
        Err(LoadError::Corrupt(e)) => {
            writeln!(writer, "Timer data is corrupt: {e}")?;
            return Ok(());
        }
        Err(e) => return Err(e).context("failed to read timer data"),
    };
    let state = TimerState::from_record(&record);

    let tracking = if state.is_tracking() { "on" } else { "paused" };
    writeln!(writer, "Tracking: {tracking}")?;
    writeln!(
        writer,
        "Total time: {}",
        format_clock(Some(state.total_time(record.saved_at)))
    )?;
    writeln!(writer, "Files tracked: {}", state.tracked_file_count())?;
    writeln!(writer, "Files excluded: {}", state.excluded_files().len())?;
    writeln!(writer, "Last saved: {}", format_timestamp_ms(record.saved_at))?;

    Ok(())
}
