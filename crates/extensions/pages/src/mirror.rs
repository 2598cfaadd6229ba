//! The remote playlist used as its own page.

use std::sync::Arc;

use async_trait::async_trait;
use parking_lot::Mutex;
use tracing::debug;
use tubesort_protocols::{
    ObservedItem, PageError, PageObserver, PositionUpdate, RemoteError, RemoteItem, RemotePlaylist,
};

use crate::view::LocalView;

/// Observes the remote listing, so a sort needs no browser at all.
///
/// `MirrorPage` is also a [`RemotePlaylist`]: the first `fetch_items` after an
/// observation reuses the listing that observation fetched, so an attempt
/// lists the playlist once.
pub struct MirrorPage {
    remote: Arc<dyn RemotePlaylist>,
    collection_id: String,
    view: LocalView,
    listing: Mutex<Option<Vec<RemoteItem>>>,
}

impl MirrorPage {
    pub fn new(remote: Arc<dyn RemotePlaylist>, collection_id: impl Into<String>) -> Self {
        Self {
            remote,
            collection_id: collection_id.into(),
            view: LocalView::default(),
            listing: Mutex::new(None),
        }
    }

    pub fn current_order(&self) -> Vec<ObservedItem> {
        self.view.current_order()
    }
}

#[async_trait]
impl PageObserver for MirrorPage {
    async fn observe_container(&self) -> Result<Option<Vec<ObservedItem>>, PageError> {
        let items = self
            .remote
            .fetch_items(&self.collection_id)
            .await
            .map_err(|e| PageError::Unavailable(e.to_string()))?;

        let observed: Vec<ObservedItem> = items
            .iter()
            .map(|item| ObservedItem {
                label: Some(item.label.clone()),
                external_id: item.video_id.clone(),
            })
            .collect();
        *self.listing.lock() = Some(items);
        self.view.replace(observed.clone());
        Ok(Some(observed))
    }

    async fn move_to_end(&self, item_index: usize) -> Result<(), PageError> {
        self.view.move_to_end(item_index)
    }
}

#[async_trait]
impl RemotePlaylist for MirrorPage {
    async fn fetch_items(&self, collection_id: &str) -> Result<Vec<RemoteItem>, RemoteError> {
        if collection_id == self.collection_id {
            let cached = self.listing.lock().take();
            if let Some(items) = cached {
                debug!("Reusing observed listing of {}", collection_id);
                return Ok(items);
            }
        }
        self.remote.fetch_items(collection_id).await
    }

    async fn set_position(&self, update: PositionUpdate) -> Result<(), RemoteError> {
        self.remote.set_position(update).await
    }
}
