//! Page observers for tubesort.
//!
//! - [`SnapshotPage`] reads the rendered playlist from a JSON snapshot file
//!   that a browser bridge keeps up to date.
//! - [`SnapshotWatcher`] turns changes to that file into [`PageEvent`]s.
//! - [`MirrorPage`] treats the remote playlist itself as the page.
//!
//! [`PageEvent`]: tubesort_protocols::PageEvent

mod mirror;
mod snapshot;
mod view;
mod watcher;

pub use mirror::MirrorPage;
pub use snapshot::{PageSnapshot, SnapshotItem, SnapshotPage};
pub use watcher::SnapshotWatcher;
