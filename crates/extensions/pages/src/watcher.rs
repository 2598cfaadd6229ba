//! Snapshot file watcher producing page events.

use std::ffi::OsString;
use std::path::{Path, PathBuf};
use std::time::Duration;

use notify::{Config, Event, RecommendedWatcher, RecursiveMode, Watcher};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};
use tubesort_protocols::{PageError, PageEvent};

use crate::snapshot::PageSnapshot;

#[cfg(test)]
#[path = "watcher_tests.rs"]
mod tests;

/// Watches a snapshot file and reports navigations and content changes.
///
/// A change of the snapshot's `url` is a navigation; any other change to the
/// file is a content change. Bursts of writes inside the debounce window are
/// reported once.
pub struct SnapshotWatcher {
    path: PathBuf,
    debounce: Duration,
}

impl SnapshotWatcher {
    pub fn new(path: impl Into<PathBuf>, debounce: Duration) -> Self {
        Self {
            path: path.into(),
            debounce,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn debounce_duration(&self) -> Duration {
        self.debounce
    }

    /// Start watching until `cancel` fires.
    ///
    /// An existing snapshot is reported as a navigation right away.
    pub fn spawn(
        self,
        events: mpsc::Sender<PageEvent>,
        cancel: CancellationToken,
    ) -> Result<JoinHandle<()>, PageError> {
        let file_name = self
            .path
            .file_name()
            .map(|name| name.to_os_string())
            .ok_or_else(|| PageError::Unavailable(format!("not a file path: {:?}", self.path)))?;

        let (fs_tx, fs_rx) = mpsc::channel(100);
        let watcher = self.create_watcher(fs_tx)?;

        Ok(tokio::spawn(self.run(watcher, file_name, fs_rx, events, cancel)))
    }

    fn watch_dir(&self) -> PathBuf {
        match self.path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
            _ => PathBuf::from("."),
        }
    }

    /// Watch the parent directory so the file may be created or replaced.
    fn create_watcher(
        &self,
        event_tx: mpsc::Sender<notify::Result<Event>>,
    ) -> Result<RecommendedWatcher, PageError> {
        let mut watcher = RecommendedWatcher::new(
            move |res| {
                let _ = event_tx.blocking_send(res);
            },
            Config::default().with_poll_interval(Duration::from_secs(1)),
        )
        .map_err(|e| PageError::Unavailable(format!("Failed to create watcher: {}", e)))?;

        let dir = self.watch_dir();
        watcher
            .watch(&dir, RecursiveMode::NonRecursive)
            .map_err(|e| PageError::Unavailable(format!("Failed to watch {:?}: {}", dir, e)))?;
        info!("Watching page snapshot: {:?}", self.path);

        Ok(watcher)
    }

    async fn run(
        self,
        _watcher: RecommendedWatcher,
        file_name: OsString,
        mut fs_rx: mpsc::Receiver<notify::Result<Event>>,
        events: mpsc::Sender<PageEvent>,
        cancel: CancellationToken,
    ) {
        let mut last_url: Option<String> = None;
        self.emit(&mut last_url, &events).await;

        loop {
            tokio::select! {
                biased;
                _ = cancel.cancelled() => break,
                received = fs_rx.recv() => {
                    let Some(result) = received else { break };
                    match result {
                        Ok(event) if touches(&event, &file_name) => {}
                        Ok(_) => continue,
                        Err(e) => {
                            warn!("Snapshot watcher error: {}", e);
                            continue;
                        }
                    }

                    tokio::select! {
                        biased;
                        _ = cancel.cancelled() => break,
                        _ = tokio::time::sleep(self.debounce) => {}
                    }
                    while fs_rx.try_recv().is_ok() {}

                    if !self.emit(&mut last_url, &events).await {
                        break;
                    }
                }
            }
        }

        info!("Snapshot watcher stopped: {:?}", self.path);
    }

    /// Read the snapshot and send the matching event. Returns false once the
    /// receiver is gone.
    async fn emit(&self, last_url: &mut Option<String>, events: &mpsc::Sender<PageEvent>) -> bool {
        let snapshot = match PageSnapshot::read(&self.path).await {
            Ok(Some(snapshot)) => snapshot,
            Ok(None) => {
                debug!("No page snapshot at {:?}", self.path);
                return true;
            }
            Err(e) => {
                warn!("Failed to read page snapshot: {}", e);
                return true;
            }
        };

        let event = classify(last_url, snapshot.url);
        debug!("Page event: {:?}", event);
        events.send(event).await.is_ok()
    }
}

fn touches(event: &Event, file_name: &OsString) -> bool {
    event
        .paths
        .iter()
        .any(|path| path.file_name() == Some(file_name.as_os_str()))
}

/// Navigation when the URL differs from the last one seen.
fn classify(last_url: &mut Option<String>, url: String) -> PageEvent {
    if last_url.as_deref() == Some(url.as_str()) {
        PageEvent::ContentChanged { url }
    } else {
        *last_url = Some(url.clone());
        PageEvent::Navigated { url }
    }
}
