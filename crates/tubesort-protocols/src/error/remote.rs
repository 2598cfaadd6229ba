//! Remote playlist API errors.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum RemoteError {
    #[error("API error: {status} - {message}")]
    Api { status: u16, message: String },

    #[error("Authentication failed: {0}")]
    AuthenticationFailed(String),

    #[error("Network error: {0}")]
    Network(String),

    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    #[error("Collection not found: {0}")]
    CollectionNotFound(String),
}

impl RemoteError {
    /// Whether the failure came from credentials rather than the request itself.
    pub fn is_auth_failure(&self) -> bool {
        match self {
            RemoteError::AuthenticationFailed(_) => true,
            RemoteError::Api { status, .. } => *status == 401,
            _ => false,
        }
    }
}
