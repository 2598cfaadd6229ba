//! # tubesort Reconcile
//!
//! Reorders a remote playlist so that it follows the timestamps embedded in
//! the titles shown on a playlist page.
//!
//! ## Flow
//!
//! ```text
//! PageEvent ──▶ SessionController ──▶ Session (per activation)
//!                     │                    │  initial delay, then run_with_retry
//!                     │ manual trigger     ▼
//!                     └────────────▶ Reconciler::attempt
//!                                          │ observe ─ fetch ─ match ─ sort
//!                                          ▼
//!                              move_to_end + set_position, one at a time
//! ```
//!
//! ## Key Components
//!
//! - [`Timestamp`]: `YYYY M D H M S` sort key parsed from a title
//! - [`LocalEntry`] / [`build_entries`]: observed items matched to remote items
//! - [`Reconciler`]: one reconcile attempt (and a dry-run plan)
//! - [`run_with_retry`]: fixed-interval, bounded retry driver
//! - [`SessionController`]: per-activation sessions driven by typed page events

pub mod entry;
pub mod error;
pub mod order;
pub mod reconciler;
pub mod retry;
pub mod session;
pub mod timestamp;

#[cfg(test)]
mod test_support;

pub use entry::{build_entries, EntrySet, Exclusion, ExclusionReason, LocalEntry, MatchKind};
pub use error::{NotReadyReason, ReconcileError, ReconcileResult};
pub use order::{sort_entries, SortDirection};
pub use reconciler::{ReconcileReport, Reconciler};
pub use retry::{drive, run_with_retry, AttemptState, RetryOutcome, RetryPolicy};
pub use session::{
    ControlEvent, ControllerConfig, ControllerHandle, SessionController, SessionOutcome,
    SessionReport,
};
pub use timestamp::Timestamp;

// Re-export CancellationToken for convenience
pub use tokio_util::sync::CancellationToken;
