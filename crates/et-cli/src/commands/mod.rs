//! CLI subcommand implementations.

pub mod exclude;
pub mod report;
pub mod run;
pub mod status;
pub mod tracking;
pub mod util;
