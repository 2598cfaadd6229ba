//! Bounded fixed-interval retry of reconcile attempts.

use std::future::Future;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use tokio_util::sync::CancellationToken;
use tracing::debug;
use tubesort_config::SorterConfig;

use crate::error::ReconcileError;

/// Timing and bound for automatic attempts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Wait before the first attempt of an activation.
    pub initial_delay: Duration,
    /// Wait between a failed attempt and the next one.
    pub retry_interval: Duration,
    pub max_attempts: u32,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            initial_delay: Duration::from_millis(3000),
            retry_interval: Duration::from_millis(5000),
            max_attempts: 5,
        }
    }
}

impl From<&SorterConfig> for RetryPolicy {
    fn from(config: &SorterConfig) -> Self {
        Self {
            initial_delay: config.auto_sort_delay(),
            retry_interval: config.retry_sort_interval(),
            max_attempts: config.max_sort_attempts,
        }
    }
}

impl RetryPolicy {
    pub fn new(initial_delay: Duration, retry_interval: Duration, max_attempts: u32) -> Self {
        Self {
            initial_delay,
            retry_interval,
            max_attempts,
        }
    }
}

/// Attempt bookkeeping for one activation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct AttemptState {
    pub attempt_count: u32,
    pub max_attempts: u32,
    pub succeeded: bool,
}

impl AttemptState {
    /// A bound of zero still allows one attempt.
    pub fn new(max_attempts: u32) -> Self {
        Self {
            attempt_count: 0,
            max_attempts: max_attempts.max(1),
            succeeded: false,
        }
    }

    pub fn is_exhausted(&self) -> bool {
        self.attempt_count >= self.max_attempts
    }
}

/// How a retry run ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum RetryOutcome {
    Succeeded { attempts: u32 },
    Exhausted { attempts: u32 },
    Cancelled { attempts: u32 },
}

impl RetryOutcome {
    pub fn attempts(&self) -> u32 {
        match self {
            RetryOutcome::Succeeded { attempts }
            | RetryOutcome::Exhausted { attempts }
            | RetryOutcome::Cancelled { attempts } => *attempts,
        }
    }

    pub fn is_success(&self) -> bool {
        matches!(self, RetryOutcome::Succeeded { .. })
    }

    /// The terminal error for an exhausted run.
    pub fn as_error(&self) -> Option<ReconcileError> {
        match self {
            RetryOutcome::Exhausted { attempts } => {
                Some(ReconcileError::ExhaustedRetries { attempts: *attempts })
            }
            _ => None,
        }
    }
}

/// Sleep for `delay` unless `cancel` fires first. Returns false on cancellation.
async fn wait(delay: Duration, cancel: &CancellationToken) -> bool {
    tokio::select! {
        biased;
        _ = cancel.cancelled() => false,
        _ = tokio::time::sleep(delay) => true,
    }
}

/// Drive attempts against an existing state until success, exhaustion or
/// cancellation.
///
/// `attempt_fn` receives the 1-based attempt number. An attempt that has
/// started always runs to completion; cancellation is observed only while
/// waiting.
pub async fn drive<F, Fut>(
    state: &mut AttemptState,
    policy: &RetryPolicy,
    cancel: &CancellationToken,
    mut attempt_fn: F,
) -> RetryOutcome
where
    F: FnMut(u32) -> Fut,
    Fut: Future<Output = bool>,
{
    if !wait(policy.initial_delay, cancel).await {
        return RetryOutcome::Cancelled {
            attempts: state.attempt_count,
        };
    }

    loop {
        state.attempt_count += 1;
        debug!(
            "Attempt {}/{}",
            state.attempt_count, state.max_attempts
        );

        if attempt_fn(state.attempt_count).await {
            state.succeeded = true;
            return RetryOutcome::Succeeded {
                attempts: state.attempt_count,
            };
        }

        if state.is_exhausted() {
            return RetryOutcome::Exhausted {
                attempts: state.attempt_count,
            };
        }

        if !wait(policy.retry_interval, cancel).await {
            return RetryOutcome::Cancelled {
                attempts: state.attempt_count,
            };
        }
    }
}

/// Run attempts with a fresh [`AttemptState`].
pub async fn run_with_retry<F, Fut>(
    attempt_fn: F,
    policy: &RetryPolicy,
    cancel: &CancellationToken,
) -> RetryOutcome
where
    F: FnMut(u32) -> Fut,
    Fut: Future<Output = bool>,
{
    let mut state = AttemptState::new(policy.max_attempts);
    drive(&mut state, policy, cancel, attempt_fn).await
}
