//! CLI definitions for tubesort.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

/// tubesort CLI.
#[derive(Parser)]
#[command(name = "tubesort")]
#[command(about = "Sort YouTube playlists by the timestamps in their video titles")]
#[command(version)]
pub(crate) struct Cli {
    /// Configuration file path (default: ~/.tubesort/config.toml)
    #[arg(short, long, env = "TUBESORT_CONFIG", global = true)]
    pub config: Option<PathBuf>,

    /// Playlist id, overriding `remote.playlist_id`
    #[arg(short, long, global = true)]
    pub playlist: Option<String>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub(crate) enum Commands {
    /// Watch the page and sort whenever a playlist is shown
    Watch(PageArgs),

    /// Run one sort attempt now
    Sort(PageArgs),

    /// Show the target order without changing anything
    Plan {
        #[command(flatten)]
        page: PageArgs,

        /// Print the report as JSON
        #[arg(long)]
        json: bool,
    },

    /// Validate the configuration file
    CheckConfig,
}

/// Options selecting and shaping the observed page.
#[derive(Args, Clone, Default)]
pub(crate) struct PageArgs {
    /// Page snapshot file, overriding `page.snapshot_path`
    #[arg(long)]
    pub snapshot: Option<PathBuf>,

    /// Observe the remote playlist instead of a page snapshot
    #[arg(long, conflicts_with = "snapshot")]
    pub mirror: bool,

    /// Sort newest first, overriding `sorter.newest_first`
    #[arg(long)]
    pub newest_first: bool,
}
