//! tubesort - sort YouTube playlists by the timestamps in their titles.
//!
//! Main entry point for the tubesort CLI.

mod adapters;
mod cli;
mod cmd_config;
mod cmd_sort;
mod cmd_watch;

use std::path::Path;

use clap::Parser;
use tracing::{info, warn};
use tracing_appender::rolling::{RollingFileAppender, Rotation};
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use tubesort_config::{Config, ConfigError, ConfigLoader, ConfigValidator, LoggingConfig};

use crate::adapters::Components;
use crate::cli::{Cli, Commands};

/// Load the configuration file; a missing default file means defaults.
fn load_config(path: Option<&Path>) -> Result<Config, ConfigError> {
    match path {
        Some(path) => ConfigLoader::load(path),
        None => ConfigLoader::load_or_default(&ConfigLoader::default_path()),
    }
}

/// Initialize tracing with console and optional file output.
///
/// `RUST_LOG` takes precedence over `logging.level`. Log files rotate daily
/// under `logging.directory`.
fn init_tracing(logging: &LoggingConfig) -> Result<(), Box<dyn std::error::Error>> {
    let file_layer = if logging.file {
        std::fs::create_dir_all(&logging.directory)?;
        let file_appender = RollingFileAppender::builder()
            .rotation(Rotation::DAILY)
            .filename_prefix("tubesort")
            .filename_suffix("log")
            .max_log_files(30)
            .build(&logging.directory)?;

        let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);

        // The guard flushes the writer on drop, so it lives for the whole run.
        static GUARD: std::sync::OnceLock<tracing_appender::non_blocking::WorkerGuard> =
            std::sync::OnceLock::new();
        let _ = GUARD.set(guard);

        Some(fmt::layer().with_writer(non_blocking).with_ansi(false))
    } else {
        None
    };

    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&logging.level))
        .unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::registry()
        .with(env_filter)
        // Console layer (stderr; stdout carries command output)
        .with(
            fmt::layer()
                .with_target(true)
                .with_writer(std::io::stderr),
        )
        .with(file_layer)
        .init();

    Ok(())
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    let config = load_config(cli.config.as_deref())?;
    init_tracing(&config.logging)?;

    if let Commands::CheckConfig = cli.command {
        let path = cli.config.unwrap_or_else(ConfigLoader::default_path);
        return cmd_config::check_config(&path, &config);
    }

    info!("tubesort v{}", env!("CARGO_PKG_VERSION"));
    let warnings = ConfigValidator::validate(&config)?.into_result()?;
    for warning in warnings {
        if cli.playlist.is_some() && warning.path == "remote.playlist_id" {
            continue;
        }
        warn!("Config {}: {}", warning.path, warning.message);
    }

    match cli.command {
        Commands::Watch(args) => {
            let components = Components::build(&config, cli.playlist, &args)?;
            cmd_watch::run_watch(&config, components).await
        }
        Commands::Sort(args) => {
            let components = Components::build(&config, cli.playlist, &args)?;
            cmd_sort::run_sort(&components).await
        }
        Commands::Plan { page, json } => {
            let components = Components::build(&config, cli.playlist, &page)?;
            cmd_sort::run_plan(&components, json).await
        }
        Commands::CheckConfig => Ok(()),
    }
}
