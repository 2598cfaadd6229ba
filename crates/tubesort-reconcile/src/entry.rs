//! Matching observed page items to remote playlist entries.
//!
//! Matching prefers the stable video id when the page supplies one. Otherwise
//! it falls back to exact title equality, and when several remote entries
//! share a title the first one in remote order wins. Duplicate titles
//! therefore all resolve to the same remote entry; give the page ids to avoid
//! that.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use tubesort_protocols::{ObservedItem, RemoteItem};

use crate::timestamp::Timestamp;

#[cfg(test)]
#[path = "entry_tests.rs"]
mod tests;

/// How an entry was resolved to its remote counterpart.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MatchKind {
    ExternalId,
    Label,
}

/// One observed item with its derived sort key and remote identity.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LocalEntry {
    /// Index of the item in the observation it came from.
    pub index: usize,
    pub label: String,
    pub sort_key: Option<Timestamp>,
    pub remote_id: Option<String>,
    pub video_id: Option<String>,
    pub matched_by: Option<MatchKind>,
}

impl LocalEntry {
    /// Only entries with both a timestamp and a remote id are reordered.
    pub fn is_sortable(&self) -> bool {
        self.sort_key.is_some() && self.remote_id.is_some()
    }
}

/// Why an observed item was left out of the reorder.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExclusionReason {
    MissingLabel,
    NoTimestamp,
    NoRemoteMatch,
}

/// An observed item that takes no part in the reorder.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Exclusion {
    pub index: usize,
    pub label: Option<String>,
    pub reason: ExclusionReason,
}

/// Result of matching one observation against the remote playlist.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EntrySet {
    /// Sortable entries, in observed order.
    pub sortable: Vec<LocalEntry>,
    pub excluded: Vec<Exclusion>,
}

/// Lookup tables over the remote playlist.
struct RemoteIndex<'a> {
    by_video_id: HashMap<&'a str, &'a RemoteItem>,
    by_label: HashMap<&'a str, &'a RemoteItem>,
}

impl<'a> RemoteIndex<'a> {
    fn new(remote: &'a [RemoteItem]) -> Self {
        let mut by_video_id = HashMap::new();
        let mut by_label = HashMap::new();
        for item in remote {
            if let Some(video_id) = item.video_id.as_deref() {
                by_video_id.entry(video_id).or_insert(item);
            }
            by_label.entry(item.label.as_str()).or_insert(item);
        }
        Self {
            by_video_id,
            by_label,
        }
    }

    fn resolve(&self, observed: &ObservedItem, label: &str) -> Option<(&'a RemoteItem, MatchKind)> {
        if let Some(item) = observed
            .external_id
            .as_deref()
            .and_then(|id| self.by_video_id.get(id))
        {
            return Some((*item, MatchKind::ExternalId));
        }
        self.by_label.get(label).map(|item| (*item, MatchKind::Label))
    }
}

/// Build the entry set for one attempt.
pub fn build_entries(observed: &[ObservedItem], remote: &[RemoteItem]) -> EntrySet {
    let index = RemoteIndex::new(remote);
    let mut set = EntrySet::default();

    for (position, item) in observed.iter().enumerate() {
        let Some(label) = item.label.as_deref() else {
            set.excluded.push(Exclusion {
                index: position,
                label: None,
                reason: ExclusionReason::MissingLabel,
            });
            continue;
        };

        let sort_key = Timestamp::parse(label);
        let resolved = index.resolve(item, label);

        let entry = LocalEntry {
            index: position,
            label: label.to_string(),
            sort_key,
            remote_id: resolved.map(|(r, _)| r.remote_id.clone()),
            video_id: resolved
                .and_then(|(r, _)| r.video_id.clone())
                .or_else(|| item.external_id.clone()),
            matched_by: resolved.map(|(_, kind)| kind),
        };

        if entry.is_sortable() {
            set.sortable.push(entry);
        } else {
            let reason = if entry.sort_key.is_none() {
                ExclusionReason::NoTimestamp
            } else {
                ExclusionReason::NoRemoteMatch
            };
            set.excluded.push(Exclusion {
                index: position,
                label: Some(entry.label),
                reason,
            });
        }
    }

    set
}
