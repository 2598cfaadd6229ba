//! Page observation protocol.
//!
//! A page is any ordered, locally displayed view of a playlist. The core only
//! needs to read the items in display order and to move one of them to the
//! end of the container so the local view follows the remote reorder.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::PageError;

#[cfg(test)]
#[path = "page_tests.rs"]
mod tests;

/// One displayed playlist item as scraped from the page.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ObservedItem {
    /// Displayed title. `None` when the item has no title element.
    #[serde(default)]
    pub label: Option<String>,

    /// Stable external id (the video id) when the page exposes one.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub external_id: Option<String>,
}

impl ObservedItem {
    /// Create an item with a title and no external id.
    pub fn new(label: impl Into<String>) -> Self {
        Self {
            label: Some(label.into()),
            external_id: None,
        }
    }

    /// Create an item whose title element is missing.
    pub fn untitled() -> Self {
        Self {
            label: None,
            external_id: None,
        }
    }

    /// Attach the external id.
    pub fn with_external_id(mut self, id: impl Into<String>) -> Self {
        self.external_id = Some(id.into());
        self
    }
}

/// Typed "page state changed" notification.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum PageEvent {
    /// The page now shows a different URL.
    Navigated { url: String },
    /// The content of the current page changed without a navigation.
    ContentChanged { url: String },
}

impl PageEvent {
    /// URL the event refers to.
    pub fn url(&self) -> &str {
        match self {
            PageEvent::Navigated { url } | PageEvent::ContentChanged { url } => url,
        }
    }

    /// Whether this event is a navigation.
    pub fn is_navigation(&self) -> bool {
        matches!(self, PageEvent::Navigated { .. })
    }
}

/// Source of the locally displayed playlist.
#[async_trait]
pub trait PageObserver: Send + Sync {
    /// Current ordered list of displayable items, or `None` if the container
    /// has not been rendered yet.
    async fn observe_container(&self) -> Result<Option<Vec<ObservedItem>>, PageError>;

    /// Move the item found at `item_index` in the latest observation to the end
    /// of the container. Purely cosmetic.
    async fn move_to_end(&self, item_index: usize) -> Result<(), PageError>;
}
