//! Page state read from a JSON snapshot file.
//!
//! ```json
//! { "url": "https://www.youtube.com/playlist?list=PL123",
//!   "items": [ { "title": "Stream 2024 1 1 10 0 0", "video_id": "dQw4w9WgXcQ" } ] }
//! ```
//!
//! A missing file or `"items": null` means the playlist container has not
//! rendered yet.

use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tubesort_protocols::{ObservedItem, PageError, PageObserver};

use crate::view::LocalView;

#[cfg(test)]
#[path = "snapshot_tests.rs"]
mod tests;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageSnapshot {
    pub url: String,
    #[serde(default)]
    pub items: Option<Vec<SnapshotItem>>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SnapshotItem {
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub video_id: Option<String>,
}

impl From<SnapshotItem> for ObservedItem {
    fn from(item: SnapshotItem) -> Self {
        ObservedItem {
            label: item.title,
            external_id: item.video_id,
        }
    }
}

impl PageSnapshot {
    pub fn parse(content: &str) -> Result<Self, PageError> {
        serde_json::from_str(content).map_err(|e| PageError::InvalidSnapshot(e.to_string()))
    }

    /// Read a snapshot, returning `None` when the file does not exist.
    pub async fn read(path: &Path) -> Result<Option<Self>, PageError> {
        match tokio::fs::read_to_string(path).await {
            Ok(content) => Self::parse(&content).map(Some),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }
}

/// [`PageObserver`] over a snapshot file.
pub struct SnapshotPage {
    path: PathBuf,
    view: LocalView,
}

impl SnapshotPage {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            view: LocalView::default(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Items in their current local order, after any `move_to_end` calls.
    pub fn current_order(&self) -> Vec<ObservedItem> {
        self.view.current_order()
    }
}

#[async_trait]
impl PageObserver for SnapshotPage {
    async fn observe_container(&self) -> Result<Option<Vec<ObservedItem>>, PageError> {
        let items = PageSnapshot::read(&self.path)
            .await?
            .and_then(|snapshot| snapshot.items);

        match items {
            Some(items) => {
                let observed: Vec<ObservedItem> = items.into_iter().map(ObservedItem::from).collect();
                self.view.replace(observed.clone());
                Ok(Some(observed))
            }
            None => {
                self.view.clear();
                Ok(None)
            }
        }
    }

    async fn move_to_end(&self, item_index: usize) -> Result<(), PageError> {
        self.view.move_to_end(item_index)
    }
}
