//! YouTube Data API v3 playlist client for tubesort.

mod api;
mod client;

pub use client::{YouTubePlaylistClient, DEFAULT_API_URL};
