//! YouTube Data API wire types.

use serde::{Deserialize, Serialize};
use tubesort_protocols::RemoteItem;

#[cfg(test)]
#[path = "api_tests.rs"]
mod tests;

pub const VIDEO_KIND: &str = "youtube#video";

/// Response of `playlistItems.list`.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlaylistItemListResponse {
    #[serde(default)]
    pub items: Vec<PlaylistItem>,
    pub next_page_token: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct PlaylistItem {
    pub id: String,
    pub snippet: ItemSnippet,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ItemSnippet {
    #[serde(default)]
    pub title: String,
    pub position: Option<u32>,
    pub resource_id: Option<ResourceId>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResourceId {
    pub kind: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub video_id: Option<String>,
}

impl From<PlaylistItem> for RemoteItem {
    fn from(item: PlaylistItem) -> Self {
        RemoteItem {
            remote_id: item.id,
            label: item.snippet.title,
            video_id: item.snippet.resource_id.and_then(|r| r.video_id),
            position: item.snippet.position,
        }
    }
}

/// Body of `playlistItems.update`.
#[derive(Debug, Serialize)]
pub struct PlaylistItemUpdate {
    pub id: String,
    pub snippet: UpdateSnippet,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateSnippet {
    pub playlist_id: String,
    pub position: u32,
    pub resource_id: ResourceId,
}

impl PlaylistItemUpdate {
    pub fn new(id: String, playlist_id: String, video_id: String, position: u32) -> Self {
        Self {
            id,
            snippet: UpdateSnippet {
                playlist_id,
                position,
                resource_id: ResourceId {
                    kind: VIDEO_KIND.to_string(),
                    video_id: Some(video_id),
                },
            },
        }
    }
}

/// Google API error envelope.
#[derive(Debug, Deserialize)]
pub struct ErrorEnvelope {
    pub error: ErrorBody,
}

#[derive(Debug, Deserialize)]
pub struct ErrorBody {
    #[serde(default)]
    pub message: String,
    #[serde(default)]
    pub errors: Vec<ErrorDetail>,
}

#[derive(Debug, Deserialize)]
pub struct ErrorDetail {
    #[serde(default)]
    pub reason: String,
}

/// Reason code of the first error detail, when the body is a Google error envelope.
pub fn error_reason(body: &str) -> Option<String> {
    serde_json::from_str::<ErrorEnvelope>(body)
        .ok()?
        .error
        .errors
        .into_iter()
        .map(|d| d.reason)
        .find(|reason| !reason.is_empty())
}

/// Human-readable message for an error response body.
pub fn error_message(body: &str) -> String {
    if let Ok(envelope) = serde_json::from_str::<ErrorEnvelope>(body) {
        let reason = envelope.error.errors.first().map(|d| d.reason.as_str());
        return match reason {
            Some(reason) if !reason.is_empty() => {
                format!("{} ({})", envelope.error.message, reason)
            }
            _ => envelope.error.message,
        };
    }
    let trimmed = body.trim();
    if trimmed.is_empty() {
        "empty response body".to_string()
    } else {
        trimmed.to_string()
    }
}
