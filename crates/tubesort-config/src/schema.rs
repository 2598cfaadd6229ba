//! Configuration schema definitions.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

#[cfg(test)]
#[path = "schema_tests.rs"]
mod tests;

/// Root configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub sorter: SorterConfig,

    #[serde(default)]
    pub page: PageConfig,

    #[serde(default)]
    pub remote: RemoteConfig,

    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Sorting and retry behaviour.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SorterConfig {
    /// Delay before the first automatic attempt of an activation.
    #[serde(default = "default_auto_sort_delay_ms")]
    pub auto_sort_delay_ms: u64,

    /// Fixed delay between automatic attempts.
    #[serde(default = "default_retry_sort_interval_ms")]
    pub retry_sort_interval_ms: u64,

    /// Maximum automatic attempts per activation.
    #[serde(default = "default_max_sort_attempts")]
    pub max_sort_attempts: u32,

    /// Sort newest first instead of oldest first.
    #[serde(default)]
    pub newest_first: bool,
}

impl Default for SorterConfig {
    fn default() -> Self {
        Self {
            auto_sort_delay_ms: default_auto_sort_delay_ms(),
            retry_sort_interval_ms: default_retry_sort_interval_ms(),
            max_sort_attempts: default_max_sort_attempts(),
            newest_first: false,
        }
    }
}

impl SorterConfig {
    /// Get the auto sort delay as Duration.
    pub fn auto_sort_delay(&self) -> Duration {
        Duration::from_millis(self.auto_sort_delay_ms)
    }

    /// Get the retry interval as Duration.
    pub fn retry_sort_interval(&self) -> Duration {
        Duration::from_millis(self.retry_sort_interval_ms)
    }
}

fn default_auto_sort_delay_ms() -> u64 {
    3000
}

fn default_retry_sort_interval_ms() -> u64 {
    5000
}

fn default_max_sort_attempts() -> u32 {
    5
}

/// Page observation configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PageConfig {
    /// URL fragment that marks a playlist page.
    #[serde(default = "default_collection_url_marker")]
    pub collection_url_marker: String,

    #[serde(default = "default_container_selector")]
    pub container_selector: String,

    #[serde(default = "default_item_selector")]
    pub item_selector: String,

    #[serde(default = "default_title_selector")]
    pub title_selector: String,

    /// JSON page snapshot to observe instead of mirroring the remote playlist.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub snapshot_path: Option<PathBuf>,

    /// Debounce window for snapshot change notifications.
    #[serde(default = "default_debounce_ms")]
    pub debounce_ms: u64,
}

impl Default for PageConfig {
    fn default() -> Self {
        Self {
            collection_url_marker: default_collection_url_marker(),
            container_selector: default_container_selector(),
            item_selector: default_item_selector(),
            title_selector: default_title_selector(),
            snapshot_path: None,
            debounce_ms: default_debounce_ms(),
        }
    }
}

impl PageConfig {
    /// Whether `url` points at a playlist page.
    pub fn is_collection_url(&self, url: &str) -> bool {
        url.contains(&self.collection_url_marker)
    }
}

fn default_collection_url_marker() -> String {
    "/playlist".to_string()
}

fn default_container_selector() -> String {
    "ytd-playlist-video-list-renderer".to_string()
}

fn default_item_selector() -> String {
    "ytd-playlist-video-renderer".to_string()
}

fn default_title_selector() -> String {
    "#video-title".to_string()
}

fn default_debounce_ms() -> u64 {
    500
}

/// Remote playlist API configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RemoteConfig {
    #[serde(default = "default_base_url")]
    pub base_url: String,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub playlist_id: Option<String>,

    /// OAuth bearer token, sent as `Authorization: Bearer ...`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub access_token: Option<String>,

    /// API key, sent as the `key` query parameter.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,

    #[serde(default = "default_page_size")]
    pub page_size: u32,

    /// Follow `nextPageToken` until the whole playlist is listed.
    #[serde(default)]
    pub fetch_all_pages: bool,

    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

impl Default for RemoteConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            playlist_id: None,
            access_token: None,
            api_key: None,
            page_size: default_page_size(),
            fetch_all_pages: false,
            timeout_secs: default_timeout_secs(),
        }
    }
}

impl RemoteConfig {
    /// Get the request timeout as Duration.
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

fn default_base_url() -> String {
    "https://www.googleapis.com/youtube/v3".to_string()
}

fn default_page_size() -> u32 {
    50
}

fn default_timeout_secs() -> u64 {
    30
}

/// Logging configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Default filter when `RUST_LOG` is not set.
    #[serde(default = "default_log_level")]
    pub level: String,

    /// Also write a daily-rotated log file.
    #[serde(default)]
    pub file: bool,

    #[serde(default = "default_log_directory")]
    pub directory: PathBuf,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            file: false,
            directory: default_log_directory(),
        }
    }
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_log_directory() -> PathBuf {
    dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(".tubesort")
        .join("logs")
}
