//! Report command for the time card.
//!
//! This module implements `et report`: the total tracked time and the files
//! with the most time, in human-readable or JSON form.

use std::io::{self, Write};

use anyhow::Result;
use serde::Serialize;

use et_core::{KeyValueStore, Persistence};

use crate::commands::util::{format_timestamp_ms, load_state};
use crate::render::{format_clock, progress_bar, truncate};

/// Longest file name shown before truncating.
const NAME_WIDTH: usize = 40;

/// One ranked file on the time card.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ReportFile {
    pub path: String,
    pub name: String,
    pub elapsed_ms: i64,
}

/// Computed time card data.
#[derive(Debug, Serialize)]
pub struct ReportData {
    pub generated_at: String,
    pub total_ms: i64,
    pub is_tracking: bool,
    pub files: Vec<ReportFile>,
}

/// Builds the time card from the saved state, keeping the top `limit` files.
pub fn build_report<S: KeyValueStore>(
    persistence: &Persistence<S>,
    limit: usize,
    now: i64,
) -> Result<ReportData> {
    let state = load_state(persistence)?;
    let files = state
        .ranked_files(now)
        .into_iter()
        .filter(|file| file.elapsed_ms > 0)
        .take(limit)
        .map(|file| ReportFile {
            name: file.fs_path.file_name().to_string(),
            path: file.fs_path.into(),
            elapsed_ms: file.elapsed_ms,
        })
        .collect();

    Ok(ReportData {
        generated_at: format_timestamp_ms(now),
        total_ms: state.total_time(now),
        is_tracking: state.is_tracking(),
        files,
    })
}

/// Writes the human-readable time card.
pub fn write_report<W: Write>(writer: &mut W, data: &ReportData) -> io::Result<()> {
    writeln!(writer, "Edit Timer Report")?;
    writeln!(writer, "Total Time: {}", format_clock(Some(data.total_ms)))?;
    if !data.is_tracking {
        writeln!(writer, "(tracking paused)")?;
    }
    writeln!(writer)?;

    if data.files.is_empty() {
        writeln!(writer, "No tracked time yet.")?;
    } else {
        let max = data.files.first().map_or(0, |file| file.elapsed_ms);
        for (rank, file) in data.files.iter().enumerate() {
            writeln!(
                writer,
                "{:>2}. {:<width$}  {}  {}",
                rank + 1,
                truncate(&file.name, NAME_WIDTH),
                format_clock(Some(file.elapsed_ms)),
                progress_bar(file.elapsed_ms, max),
                width = NAME_WIDTH,
            )?;
        }
    }

    writeln!(writer)?;
    writeln!(writer, "Generated at {}", data.generated_at)?;
    Ok(())
}

pub fn run<W: Write, S: KeyValueStore>(
    writer: &mut W,
    persistence: &Persistence<S>,
    json: bool,
    limit: usize,
    now: i64,
) -> Result<()> {
    let data = build_report(persistence, limit, now)?;
    if json {
        writeln!(writer, "{}", serde_json::to_string_pretty(&data)?)?;
    } else {
        write_report(writer, &data)?;
    }
    Ok(())
}
