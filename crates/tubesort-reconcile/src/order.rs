//! Target ordering of sortable entries.

use serde::{Deserialize, Serialize};

use crate::entry::LocalEntry;

/// Sort direction by timestamp.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SortDirection {
    /// Ascending, oldest first.
    #[default]
    OldestFirst,
    /// Descending, newest first.
    NewestFirst,
}

impl SortDirection {
    /// Direction from the `newest_first` configuration flag.
    pub fn from_newest_first(newest_first: bool) -> Self {
        if newest_first {
            SortDirection::NewestFirst
        } else {
            SortDirection::OldestFirst
        }
    }
}

impl std::fmt::Display for SortDirection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SortDirection::OldestFirst => write!(f, "oldest first"),
            SortDirection::NewestFirst => write!(f, "newest first"),
        }
    }
}

/// Sort entries by timestamp in place.
///
/// The sort is stable in both directions: entries with equal timestamps keep
/// their relative input order.
pub fn sort_entries(entries: &mut [LocalEntry], direction: SortDirection) {
    match direction {
        SortDirection::OldestFirst => entries.sort_by(|a, b| a.sort_key.cmp(&b.sort_key)),
        SortDirection::NewestFirst => entries.sort_by(|a, b| b.sort_key.cmp(&a.sort_key)),
    }
}
