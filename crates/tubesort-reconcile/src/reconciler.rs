//! One reconcile attempt: observe, match, sort, then push positions remotely.

use std::sync::Arc;

use serde::Serialize;
use tracing::{debug, error, info, warn};
use tubesort_protocols::{PageObserver, PositionUpdate, RemotePlaylist};

use crate::entry::{build_entries, Exclusion, LocalEntry};
use crate::error::{NotReadyReason, ReconcileError, ReconcileResult};
use crate::order::{sort_entries, SortDirection};

#[cfg(test)]
#[path = "reconciler_tests.rs"]
mod tests;

/// What one attempt saw and did.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ReconcileReport {
    /// Number of items the page displayed.
    pub observed: usize,
    /// Sortable entries in target order.
    pub ordered: Vec<LocalEntry>,
    pub excluded: Vec<Exclusion>,
    /// Number of `set_position` calls that completed.
    pub calls_issued: usize,
}

impl ReconcileReport {
    /// Remote ids in their target order.
    pub fn target_order(&self) -> Vec<&str> {
        self.ordered
            .iter()
            .filter_map(|entry| entry.remote_id.as_deref())
            .collect()
    }
}

/// Reorders a remote playlist to match the timestamps in its titles.
pub struct Reconciler {
    page: Arc<dyn PageObserver>,
    remote: Arc<dyn RemotePlaylist>,
    collection_id: String,
    direction: SortDirection,
}

impl Reconciler {
    pub fn new(
        page: Arc<dyn PageObserver>,
        remote: Arc<dyn RemotePlaylist>,
        collection_id: impl Into<String>,
    ) -> Self {
        Self {
            page,
            remote,
            collection_id: collection_id.into(),
            direction: SortDirection::default(),
        }
    }

    pub fn with_direction(mut self, direction: SortDirection) -> Self {
        self.direction = direction;
        self
    }

    pub fn collection_id(&self) -> &str {
        &self.collection_id
    }

    pub fn direction(&self) -> SortDirection {
        self.direction
    }

    /// Compute the target order without touching the page or the remote.
    pub async fn plan(&self) -> ReconcileResult<ReconcileReport> {
        let observed = self
            .page
            .observe_container()
            .await?
            .ok_or(ReconcileError::NotReady(NotReadyReason::ContainerMissing))?;

        if observed.len() < 2 {
            return Err(ReconcileError::NotReady(NotReadyReason::TooFewItems {
                found: observed.len(),
            }));
        }

        let remote_items = self
            .remote
            .fetch_items(&self.collection_id)
            .await
            .map_err(ReconcileError::RemoteFetch)?;

        let mut entries = build_entries(&observed, &remote_items);
        for exclusion in &entries.excluded {
            debug!(
                "Excluding item {} ({:?}): {:?}",
                exclusion.index, exclusion.label, exclusion.reason
            );
        }

        if entries.sortable.len() < 2 {
            return Err(ReconcileError::NotReady(NotReadyReason::TooFewSortable {
                found: entries.sortable.len(),
            }));
        }

        sort_entries(&mut entries.sortable, self.direction);

        Ok(ReconcileReport {
            observed: observed.len(),
            ordered: entries.sortable,
            excluded: entries.excluded,
            calls_issued: 0,
        })
    }

    /// Run one full attempt.
    ///
    /// Position updates are issued one at a time in target order. The first
    /// rejected update ends the attempt; positions already written stay
    /// written and are rewritten by the next attempt.
    pub async fn reconcile(&self) -> ReconcileResult<ReconcileReport> {
        let mut report = self.plan().await?;

        info!(
            "Sorting {} entries {} ({} excluded)",
            report.ordered.len(),
            self.direction,
            report.excluded.len()
        );

        for (entry, position) in report.ordered.iter().zip(0u32..) {
            if let Err(e) = self.page.move_to_end(entry.index).await {
                warn!("Failed to move item {} on the page: {}", entry.index, e);
            }

            // Sortable entries always carry a remote id.
            let Some(remote_id) = entry.remote_id.clone() else {
                continue;
            };

            let update = PositionUpdate {
                collection_id: self.collection_id.clone(),
                remote_id: remote_id.clone(),
                video_id: entry.video_id.clone(),
                position,
            };

            self.remote
                .set_position(update)
                .await
                .map_err(|source| ReconcileError::RemoteCall {
                    remote_id,
                    position,
                    source,
                })?;

            report.calls_issued += 1;
            debug!("Moved {} to position {}", entry.label, position);
        }

        Ok(report)
    }

    /// Run one attempt and log the outcome.
    pub async fn attempt(&self) -> ReconcileResult<ReconcileReport> {
        match self.reconcile().await {
            Ok(report) => {
                info!(
                    "Playlist {} sorted: {} position update(s)",
                    self.collection_id, report.calls_issued
                );
                Ok(report)
            }
            Err(e @ ReconcileError::NotReady(_)) => {
                info!("Playlist {} not ready: {}", self.collection_id, e);
                Err(e)
            }
            Err(e) if e.is_auth_failure() => {
                error!(
                    "Sort attempt for {} rejected, check remote.access_token: {}",
                    self.collection_id, e
                );
                Err(e)
            }
            Err(e) if !e.is_retryable() => {
                error!("Sort attempt for {} failed: {}", self.collection_id, e);
                Err(e)
            }
            Err(e) => {
                warn!("Sort attempt for {} failed: {}", self.collection_id, e);
                Err(e)
            }
        }
    }

    /// Run one attempt, reporting only whether it succeeded.
    pub async fn attempt_reconcile(&self) -> bool {
        self.attempt().await.is_ok()
    }
}
