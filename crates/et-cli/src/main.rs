use std::io::Write;
use std::path::Path;

use anyhow::{Context, Result};
use clap::Parser;
use tracing_subscriber::EnvFilter;

use et_cli::commands::util::now_ms;
use et_cli::commands::{exclude, report, run, status, tracking};
use et_cli::{Cli, Commands, Config};
use et_core::Persistence;

/// Load config and open database, ensuring the parent directory exists.
fn open_database(config_path: Option<&Path>) -> Result<(Persistence<et_db::Database>, Config)> {
    let config = Config::load_from(config_path).context("failed to load configuration")?;
    tracing::debug!(?config, "loaded configuration");

    if let Some(parent) = config.database_path.parent() {
        std::fs::create_dir_all(parent).context("failed to create database directory")?;
    }

    let db = et_db::Database::open(&config.database_path).context("failed to open database")?;
    Ok((Persistence::new(db), config))
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize tracing with verbose flag support
    let filter = if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::from_default_env()
    };
    // Tracing goes to stderr so stdout stays clean for reports
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init();

    let mut stdout = std::io::stdout().lock();

    match &cli.command {
        Some(Commands::Run) => {
            let (persistence, config) = open_database(cli.config.as_deref())?;
            let runtime = tokio::runtime::Builder::new_current_thread()
                .enable_all()
                .build()
                .context("failed to start runtime")?;
            runtime.block_on(run::run(&config, persistence));
        }
        Some(Commands::Status) => {
            let (persistence, config) = open_database(cli.config.as_deref())?;
            status::run(&mut stdout, &persistence, &config.database_path)?;
        }
        Some(Commands::Report { json, limit }) => {
            let (persistence, _config) = open_database(cli.config.as_deref())?;
            report::run(&mut stdout, &persistence, *json, *limit, now_ms())?;
        }
        Some(Commands::Exclude(action)) => {
            let (mut persistence, _config) = open_database(cli.config.as_deref())?;
            exclude::run(&mut stdout, &mut persistence, action, now_ms())?;
        }
        Some(Commands::Pause) => {
            let (mut persistence, _config) = open_database(cli.config.as_deref())?;
            tracking::pause(&mut stdout, &mut persistence, now_ms())?;
        }
        Some(Commands::Resume) => {
            let (mut persistence, _config) = open_database(cli.config.as_deref())?;
            tracking::resume(&mut stdout, &mut persistence, now_ms())?;
        }
        Some(Commands::Reset { yes }) => {
            let (mut persistence, _config) = open_database(cli.config.as_deref())?;
            tracking::reset(&mut stdout, &mut persistence, *yes, now_ms())?;
        }
        None => {
            // No subcommand, show help
            use clap::CommandFactory;
            Cli::command().print_help()?;
            writeln!(stdout)?;
        }
    }

    stdout.flush()?;
    Ok(())
}
