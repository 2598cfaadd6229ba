//! # tubesort Protocols
//!
//! Interfaces the reconciliation core consumes from its collaborators.
//! Contains only interface definitions and shared data types.
//!
//! ## Core Traits
//!
//! - [`PageObserver`] - The locally displayed, ordered list of playlist items
//! - [`RemotePlaylist`] - The remote playlist-management API
//!
//! ## Events
//!
//! - [`PageEvent`] - Typed "page state changed" notifications

pub mod error;
pub mod page;
pub mod remote;

pub use error::{PageError, RemoteError};
pub use page::{ObservedItem, PageEvent, PageObserver};
pub use remote::{DEFAULT_PAGE_SIZE, PositionUpdate, RemoteItem, RemotePlaylist};
