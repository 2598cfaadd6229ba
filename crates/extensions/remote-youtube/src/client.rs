//! `RemotePlaylist` over the YouTube Data API.

use async_trait::async_trait;
use tracing::debug;

use tubesort_config::RemoteConfig;
use tubesort_protocols::{PositionUpdate, RemoteError, RemoteItem, RemotePlaylist, DEFAULT_PAGE_SIZE};

use crate::api::{error_message, error_reason, PlaylistItemListResponse, PlaylistItemUpdate};

#[cfg(test)]
#[path = "client_tests.rs"]
mod tests;

pub const DEFAULT_API_URL: &str = "https://www.googleapis.com/youtube/v3";

/// The API never returns more than this many items per page.
const MAX_PAGE_SIZE: u32 = 50;

/// 403 reasons that signal exhausted quota rather than bad credentials.
const QUOTA_REASONS: &[&str] = &["quotaExceeded", "rateLimitExceeded", "dailyLimitExceeded"];

const PLAYLIST_NOT_FOUND: &str = "playlistNotFound";

/// YouTube playlist client.
pub struct YouTubePlaylistClient {
    api_url: String,
    access_token: Option<String>,
    api_key: Option<String>,
    page_size: u32,
    fetch_all_pages: bool,
    client: reqwest::Client,
}

impl YouTubePlaylistClient {
    pub fn new(access_token: String) -> Self {
        Self::with_url(Some(access_token), DEFAULT_API_URL.to_string())
    }

    /// Create a client against a custom API base URL.
    pub fn with_url(access_token: Option<String>, api_url: String) -> Self {
        Self {
            api_url: api_url.trim_end_matches('/').to_string(),
            access_token,
            api_key: None,
            page_size: DEFAULT_PAGE_SIZE,
            fetch_all_pages: false,
            client: reqwest::Client::new(),
        }
    }

    /// Build a client from the `[remote]` configuration section.
    pub fn from_config(config: &RemoteConfig) -> Result<Self, RemoteError> {
        let client = reqwest::Client::builder()
            .timeout(config.timeout())
            .build()
            .map_err(|e| RemoteError::Network(e.to_string()))?;

        let mut this = Self::with_url(config.access_token.clone(), config.base_url.clone())
            .with_page_size(config.page_size)
            .with_fetch_all_pages(config.fetch_all_pages);
        this.api_key = config.api_key.clone();
        this.client = client;
        Ok(this)
    }

    pub fn with_api_key(mut self, api_key: String) -> Self {
        self.api_key = Some(api_key);
        self
    }

    /// Items requested per page, clamped to `1..=50`.
    pub fn with_page_size(mut self, page_size: u32) -> Self {
        self.page_size = page_size.clamp(1, MAX_PAGE_SIZE);
        self
    }

    /// Follow `nextPageToken` instead of stopping after the first page.
    pub fn with_fetch_all_pages(mut self, fetch_all_pages: bool) -> Self {
        self.fetch_all_pages = fetch_all_pages;
        self
    }

    fn endpoint(&self) -> String {
        format!("{}/playlistItems", self.api_url)
    }

    fn authorize(&self, request: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        let request = match &self.access_token {
            Some(token) => request.bearer_auth(token),
            None => request,
        };
        match &self.api_key {
            Some(key) => request.query(&[("key", key)]),
            None => request,
        }
    }

    async fn send(&self, request: reqwest::RequestBuilder) -> Result<reqwest::Response, RemoteError> {
        let response = self
            .authorize(request)
            .send()
            .await
            .map_err(|e| RemoteError::Network(e.to_string()))?;

        if !response.status().is_success() {
            let status = response.status().as_u16();
            let text = response.text().await.unwrap_or_default();
            return Err(classify_error(status, &text));
        }

        Ok(response)
    }

    async fn fetch_page(
        &self,
        playlist_id: &str,
        page_token: Option<&str>,
    ) -> Result<PlaylistItemListResponse, RemoteError> {
        let mut query = vec![
            ("part", "snippet".to_string()),
            ("maxResults", self.page_size.to_string()),
            ("playlistId", playlist_id.to_string()),
        ];
        if let Some(token) = page_token {
            query.push(("pageToken", token.to_string()));
        }

        let response = self
            .send(self.client.get(self.endpoint()).query(&query))
            .await?;
        response
            .json()
            .await
            .map_err(|e| RemoteError::InvalidResponse(e.to_string()))
    }
}

fn classify_error(status: u16, body: &str) -> RemoteError {
    let message = error_message(body);
    let reason = error_reason(body);
    match (status, reason.as_deref()) {
        (401, _) => RemoteError::AuthenticationFailed(message),
        (403, Some(reason)) if QUOTA_REASONS.contains(&reason) => RemoteError::Api { status, message },
        (403, _) => RemoteError::AuthenticationFailed(message),
        (404, Some(PLAYLIST_NOT_FOUND)) => RemoteError::CollectionNotFound(message),
        _ => RemoteError::Api { status, message },
    }
}

#[async_trait]
impl RemotePlaylist for YouTubePlaylistClient {
    async fn fetch_items(&self, collection_id: &str) -> Result<Vec<RemoteItem>, RemoteError> {
        let mut items = Vec::new();
        let mut page_token: Option<String> = None;

        loop {
            let page = self.fetch_page(collection_id, page_token.as_deref()).await?;
            items.extend(page.items.into_iter().map(RemoteItem::from));

            match page.next_page_token {
                Some(token) if self.fetch_all_pages => page_token = Some(token),
                _ => break,
            }
        }

        debug!("Fetched {} item(s) from playlist {}", items.len(), collection_id);
        Ok(items)
    }

    async fn set_position(&self, update: PositionUpdate) -> Result<(), RemoteError> {
        let video_id = update.video_id.ok_or_else(|| {
            RemoteError::InvalidResponse(format!(
                "no video id known for playlist item {}",
                update.remote_id
            ))
        })?;

        let body = PlaylistItemUpdate::new(
            update.remote_id,
            update.collection_id,
            video_id,
            update.position,
        );

        self.send(
            self.client
                .put(self.endpoint())
                .query(&[("part", "snippet")])
                .json(&body),
        )
        .await?;
        Ok(())
    }
}
