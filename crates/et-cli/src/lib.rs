//! Edit timer CLI library.
//!
//! This crate provides the `et` command line interface and the session loop
//! that hosts a live timer.

mod cli;
pub mod commands;
mod config;
pub mod render;
pub mod session;
#[cfg(test)]
mod test_support;
pub mod ticker;

pub use cli::{Cli, Commands, ExcludeAction};
pub use config::Config;
