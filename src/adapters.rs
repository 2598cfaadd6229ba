//! Builds the page, remote and reconciler for a command from configuration.

use std::path::PathBuf;
use std::sync::Arc;

use tubesort_config::{Config, ConfigError};
use tubesort_pages::{MirrorPage, SnapshotPage};
use tubesort_protocols::{PageObserver, RemotePlaylist};
use tubesort_reconcile::{Reconciler, SortDirection};
use tubesort_remote_youtube::YouTubePlaylistClient;

use crate::cli::PageArgs;

/// Where the observed page comes from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum PageSource {
    Snapshot(PathBuf),
    Mirror,
}

impl PageSource {
    /// `--mirror` wins, then `--snapshot`, then `page.snapshot_path`.
    pub(crate) fn select(config: &Config, args: &PageArgs) -> Self {
        if args.mirror {
            return PageSource::Mirror;
        }
        match args.snapshot.clone().or_else(|| config.page.snapshot_path.clone()) {
            Some(path) => PageSource::Snapshot(path),
            None => PageSource::Mirror,
        }
    }
}

/// Playlist id from the command line or `remote.playlist_id`.
pub(crate) fn playlist_id(config: &Config, cli_override: Option<String>) -> Result<String, ConfigError> {
    cli_override
        .or_else(|| config.remote.playlist_id.clone())
        .filter(|id| !id.trim().is_empty())
        .ok_or_else(|| ConfigError::MissingField("remote.playlist_id".to_string()))
}

pub(crate) fn playlist_url(playlist_id: &str) -> String {
    format!("https://www.youtube.com/playlist?list={}", playlist_id)
}

/// Everything a command needs to reconcile one playlist.
pub(crate) struct Components {
    pub playlist_id: String,
    pub source: PageSource,
    pub reconciler: Arc<Reconciler>,
}

impl Components {
    pub(crate) fn build(
        config: &Config,
        cli_playlist: Option<String>,
        args: &PageArgs,
    ) -> Result<Self, Box<dyn std::error::Error>> {
        let playlist_id = playlist_id(config, cli_playlist)?;
        let client: Arc<dyn RemotePlaylist> =
            Arc::new(YouTubePlaylistClient::from_config(&config.remote)?);

        let source = PageSource::select(config, args);
        let (page, remote): (Arc<dyn PageObserver>, Arc<dyn RemotePlaylist>) = match &source {
            PageSource::Snapshot(path) => {
                let page: Arc<dyn PageObserver> = Arc::new(SnapshotPage::new(path.clone()));
                (page, client)
            }
            PageSource::Mirror => {
                // The mirror serves the listing it observed to the reconciler.
                let mirror = Arc::new(MirrorPage::new(client, playlist_id.clone()));
                let page: Arc<dyn PageObserver> = mirror.clone();
                let remote: Arc<dyn RemotePlaylist> = mirror;
                (page, remote)
            }
        };

        let direction = SortDirection::from_newest_first(config.sorter.newest_first || args.newest_first);
        let reconciler = Reconciler::new(page, remote, playlist_id.clone()).with_direction(direction);

        Ok(Self {
            playlist_id,
            source,
            reconciler: Arc::new(reconciler),
        })
    }
}
