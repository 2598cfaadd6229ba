//! Remote playlist protocol.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::RemoteError;

#[cfg(test)]
#[path = "remote_tests.rs"]
mod tests;

/// Default number of items returned by a single listing call.
pub const DEFAULT_PAGE_SIZE: u32 = 50;

/// One entry of the remote playlist.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RemoteItem {
    /// Stable id of the playlist entry (not the video).
    pub remote_id: String,
    /// Title as known to the remote service.
    pub label: String,
    /// Id of the underlying video.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub video_id: Option<String>,
    /// Current position in the remote playlist.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub position: Option<u32>,
}

impl RemoteItem {
    /// Create a remote item.
    pub fn new(remote_id: impl Into<String>, label: impl Into<String>) -> Self {
        Self {
            remote_id: remote_id.into(),
            label: label.into(),
            video_id: None,
            position: None,
        }
    }

    /// Attach the video id.
    pub fn with_video_id(mut self, video_id: impl Into<String>) -> Self {
        self.video_id = Some(video_id.into());
        self
    }

    /// Attach the current position.
    pub fn with_position(mut self, position: u32) -> Self {
        self.position = Some(position);
        self
    }
}

/// A single "move item to absolute index" request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PositionUpdate {
    pub collection_id: String,
    pub remote_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub video_id: Option<String>,
    pub position: u32,
}

/// Remote playlist-management API, assumed pre-authenticated.
#[async_trait]
pub trait RemotePlaylist: Send + Sync {
    /// Fetch the entries of a playlist.
    async fn fetch_items(&self, collection_id: &str) -> Result<Vec<RemoteItem>, RemoteError>;

    /// Move one entry to an absolute position. Idempotent.
    async fn set_position(&self, update: PositionUpdate) -> Result<(), RemoteError>;
}
