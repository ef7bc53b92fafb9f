//! Exclude command for managing files that never accrue time.

use std::io::Write;

use anyhow::{Context, Result};

use et_core::{FsPath, KeyValueStore, Persistence};

use crate::cli::ExcludeAction;
use crate::commands::util::{load_state, load_state_for_update, save_state};

pub fn run<W: Write, S: KeyValueStore>(
    writer: &mut W,
    persistence: &mut Persistence<S>,
    action: &ExcludeAction,
    now: i64,
) -> Result<()> {
    let (state, fs_path) = match action {
        ExcludeAction::List => return list(writer, persistence),
        ExcludeAction::Toggle { path } => {
            let fs_path = parse_path(path)?;
            let state = load_state_for_update(persistence)?;
            (state.toggle_exclude(now, &fs_path), fs_path)
        }
        ExcludeAction::Add { path } => {
            let fs_path = parse_path(path)?;
            let state = load_state_for_update(persistence)?;
            (state.add_exclude(now, &fs_path), fs_path)
        }
        ExcludeAction::Remove { path } => {
            let fs_path = parse_path(path)?;
            let state = load_state_for_update(persistence)?;
            (state.remove_exclude(&fs_path), fs_path)
        }
    };

    save_state(persistence, &state, now)?;

    let status = if state.is_excluded(&fs_path) {
        "excluded"
    } else {
        "included"
    };
    writeln!(writer, "{} is now {status}", fs_path.file_name())?;
    Ok(())
}

fn list<W: Write, S: KeyValueStore>(writer: &mut W, persistence: &Persistence<S>) -> Result<()> {
    let state = load_state(persistence)?;
    let excluded = state.excluded_files();
    if excluded.is_empty() {
        writeln!(writer, "No files are currently excluded.")?;
    }
    for fs_path in excluded {
        writeln!(writer, "{fs_path}")?;
    }
    Ok(())
}

fn parse_path(path: &str) -> Result<FsPath> {
    FsPath::new(path).context("invalid file path")
}
