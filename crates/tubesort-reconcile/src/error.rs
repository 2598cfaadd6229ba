//! Error types for reconciliation.

use std::fmt;

use thiserror::Error;
use tubesort_protocols::{PageError, RemoteError};

/// Why an attempt found nothing it could reorder yet.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NotReadyReason {
    /// The playlist container has not been rendered.
    ContainerMissing,
    /// Fewer than two items are displayed.
    TooFewItems { found: usize },
    /// Fewer than two items have both a timestamp and a remote match.
    TooFewSortable { found: usize },
}

impl fmt::Display for NotReadyReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            NotReadyReason::ContainerMissing => write!(f, "playlist container not found"),
            NotReadyReason::TooFewItems { found } => {
                write!(f, "only {} item(s) displayed", found)
            }
            NotReadyReason::TooFewSortable { found } => {
                write!(f, "only {} item(s) with a timestamp and a remote match", found)
            }
        }
    }
}

/// Errors that can occur while reconciling.
#[derive(Debug, Error)]
pub enum ReconcileError {
    /// Preconditions not met yet.
    #[error("Not ready: {0}")]
    NotReady(NotReadyReason),

    /// The page observer failed.
    #[error("Page error: {0}")]
    Page(#[from] PageError),

    /// Listing the remote playlist failed.
    #[error("Failed to fetch remote items: {0}")]
    RemoteFetch(#[source] RemoteError),

    /// A position update was rejected.
    #[error("Failed to move {remote_id} to position {position}: {source}")]
    RemoteCall {
        remote_id: String,
        position: u32,
        #[source]
        source: RemoteError,
    },

    /// The retry bound was reached without a successful attempt.
    #[error("Gave up after {attempts} attempt(s)")]
    ExhaustedRetries { attempts: u32 },

    /// A manual attempt was requested while another attempt was running.
    #[error("Another reconcile attempt is already in flight")]
    AttemptInFlight,

    /// The session controller has stopped.
    #[error("Session controller is not running")]
    ControllerClosed,
}

impl ReconcileError {
    /// The remote failure behind this error, if any.
    pub fn remote_source(&self) -> Option<&RemoteError> {
        match self {
            ReconcileError::RemoteFetch(source) | ReconcileError::RemoteCall { source, .. } => {
                Some(source)
            }
            _ => None,
        }
    }

    /// Whether the remote rejected our credentials.
    pub fn is_auth_failure(&self) -> bool {
        self.remote_source().is_some_and(RemoteError::is_auth_failure)
    }

    /// Whether a later attempt may succeed without outside intervention.
    pub fn is_retryable(&self) -> bool {
        match self {
            ReconcileError::NotReady(_) | ReconcileError::Page(_) => true,
            ReconcileError::RemoteFetch(source) | ReconcileError::RemoteCall { source, .. } => {
                !source.is_auth_failure()
                    && !matches!(source, RemoteError::CollectionNotFound(_))
            }
            _ => false,
        }
    }
}

/// Result type for reconcile operations.
pub type ReconcileResult<T> = Result<T, ReconcileError>;
