//! Command-line argument definitions.

use std::path::PathBuf;

use clap::{Parser, Subcommand};

/// Per-file edit timer.
///
/// Measures how long each file has been in focus, with pause/resume and
/// per-file exclusion. `et run` hosts a tracking session; the other
/// commands inspect or adjust the saved data.
#[derive(Debug, Parser)]
#[command(name = "et", version, about, long_about = None)]
pub struct Cli {
    /// Enable verbose output.
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Path to config file.
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

/// Available subcommands.
#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Run a tracking session, reading host events as JSON lines on stdin.
    Run,

    /// Show the saved tracking state.
    Status,

    /// Show the time card: total time and the most edited files.
    Report {
        /// Output as JSON.
        #[arg(long)]
        json: bool,

        /// Number of files to list.
        #[arg(long, default_value_t = 10)]
        limit: usize,
    },

    /// Manage excluded files.
    #[command(subcommand)]
    Exclude(ExcludeAction),

    /// Pause tracking.
    Pause,

    /// Resume tracking.
    Resume,

    /// Clear all recorded time.
    Reset {
        /// Confirm the reset.
        #[arg(long)]
        yes: bool,
    },
}

/// Exclusion subcommands.
#[derive(Debug, Clone, Subcommand)]
pub enum ExcludeAction {
    /// List excluded files.
    List,
    /// Exclude the file if included, include it otherwise.
    Toggle {
        /// File path as reported by the editor.
        path: String,
    },
    /// Exclude a file.
    Add {
        /// File path as reported by the editor.
        path: String,
    },
    /// Include a previously excluded file.
    Remove {
        /// File path as reported by the editor.
        path: String,
    },
}
