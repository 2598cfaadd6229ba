//! Per-activation sort sessions driven by page events.
//!
//! The controller owns at most one live session. A session waits the initial
//! delay, then retries the reconcile attempt on a fixed interval until it
//! succeeds, runs out of attempts, or is cancelled by navigation or shutdown.
//! Every attempt, automatic or manual, holds the shared attempt lock, so two
//! attempts never interleave their position updates.

use std::collections::HashMap;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::Serialize;
use tokio::sync::{broadcast, mpsc, oneshot, Mutex};
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};
use tubesort_config::{Config, PageConfig};
use tubesort_protocols::PageEvent;
use uuid::Uuid;

use crate::error::{ReconcileError, ReconcileResult};
use crate::reconciler::{ReconcileReport, Reconciler};
use crate::retry::{drive, AttemptState, RetryOutcome, RetryPolicy};

#[cfg(test)]
#[path = "session_tests.rs"]
mod tests;

const EVENT_CHANNEL_CAPACITY: usize = 64;
const REPORT_CHANNEL_CAPACITY: usize = 32;

/// How a session ended.
pub type SessionOutcome = RetryOutcome;

type ManualReply = oneshot::Sender<ReconcileResult<ReconcileReport>>;

/// Input to the session controller.
#[derive(Debug)]
pub enum ControlEvent {
    Page(PageEvent),
    /// Run one attempt now, outside any session's attempt budget.
    ManualTrigger(ManualReply),
    Shutdown,
}

/// Published once per finished session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SessionReport {
    pub session_id: Uuid,
    pub url: String,
    pub outcome: SessionOutcome,
    pub finished_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct ControllerConfig {
    pub policy: RetryPolicy,
    /// Decides which URLs are playlist pages.
    pub page: PageConfig,
}

impl Default for ControllerConfig {
    fn default() -> Self {
        Self {
            policy: RetryPolicy::default(),
            page: PageConfig::default(),
        }
    }
}

impl ControllerConfig {
    pub fn from_config(config: &Config) -> Self {
        Self {
            policy: RetryPolicy::from(&config.sorter),
            page: config.page.clone(),
        }
    }
}

/// Cloneable front end of a running [`SessionController`].
#[derive(Clone)]
pub struct ControllerHandle {
    events: mpsc::Sender<ControlEvent>,
    reports: broadcast::Sender<SessionReport>,
}

impl ControllerHandle {
    pub async fn page_event(&self, event: PageEvent) -> ReconcileResult<()> {
        self.events
            .send(ControlEvent::Page(event))
            .await
            .map_err(|_| ReconcileError::ControllerClosed)
    }

    /// Run one attempt immediately and wait for its result.
    ///
    /// Rejected with [`ReconcileError::AttemptInFlight`] when another attempt
    /// is running.
    pub async fn trigger_manual(&self) -> ReconcileResult<ReconcileReport> {
        let (reply_tx, reply_rx) = oneshot::channel();
        self.events
            .send(ControlEvent::ManualTrigger(reply_tx))
            .await
            .map_err(|_| ReconcileError::ControllerClosed)?;
        reply_rx.await.map_err(|_| ReconcileError::ControllerClosed)?
    }

    pub async fn shutdown(&self) -> ReconcileResult<()> {
        self.events
            .send(ControlEvent::Shutdown)
            .await
            .map_err(|_| ReconcileError::ControllerClosed)
    }

    pub fn subscribe(&self) -> broadcast::Receiver<SessionReport> {
        self.reports.subscribe()
    }
}

struct LiveSession {
    id: Uuid,
    url: String,
    cancel: CancellationToken,
    task: JoinHandle<()>,
}

struct SessionDone {
    id: Uuid,
    url: String,
    outcome: SessionOutcome,
}

/// Turns page events into sort sessions.
pub struct SessionController {
    reconciler: Arc<Reconciler>,
    config: ControllerConfig,
    attempt_lock: Arc<Mutex<()>>,
    events: mpsc::Receiver<ControlEvent>,
    reports: broadcast::Sender<SessionReport>,
    live: Option<LiveSession>,
    /// Tasks still winding down: cancelled sessions and manual attempts.
    background: Vec<JoinHandle<()>>,
    /// Whether the last settled session for a URL succeeded.
    last_settled: HashMap<String, bool>,
}

impl SessionController {
    pub fn new(reconciler: Arc<Reconciler>, config: ControllerConfig) -> (Self, ControllerHandle) {
        let (event_tx, event_rx) = mpsc::channel(EVENT_CHANNEL_CAPACITY);
        let (report_tx, _) = broadcast::channel(REPORT_CHANNEL_CAPACITY);

        let handle = ControllerHandle {
            events: event_tx,
            reports: report_tx.clone(),
        };
        let controller = Self {
            reconciler,
            config,
            attempt_lock: Arc::new(Mutex::new(())),
            events: event_rx,
            reports: report_tx,
            live: None,
            background: Vec::new(),
            last_settled: HashMap::new(),
        };
        (controller, handle)
    }

    /// Process events until shutdown or until every handle is dropped.
    pub async fn run(mut self) {
        let (done_tx, mut done_rx) = mpsc::unbounded_channel();
        info!("Session controller started");

        loop {
            tokio::select! {
                Some(done) = done_rx.recv() => self.on_session_done(done),
                event = self.events.recv() => match event {
                    Some(ControlEvent::Page(event)) => self.on_page_event(event, &done_tx),
                    Some(ControlEvent::ManualTrigger(reply)) => self.on_manual_trigger(reply),
                    Some(ControlEvent::Shutdown) | None => break,
                },
            }
        }

        self.cancel_live("shutdown");
        for task in self.background.drain(..) {
            if let Err(e) = task.await {
                warn!("Session task ended abnormally: {}", e);
            }
        }
        drop(done_tx);
        while let Some(done) = done_rx.recv().await {
            self.on_session_done(done);
        }
        info!("Session controller stopped");
    }

    fn is_collection_url(&self, url: &str) -> bool {
        self.config.page.is_collection_url(url)
    }

    fn on_page_event(&mut self, event: PageEvent, done_tx: &mpsc::UnboundedSender<SessionDone>) {
        match event {
            PageEvent::Navigated { url } => {
                self.cancel_live("navigation");
                if self.is_collection_url(&url) {
                    self.start_session(url, done_tx);
                } else {
                    debug!("Not a playlist page: {}", url);
                }
            }
            PageEvent::ContentChanged { url } => {
                if !self.is_collection_url(&url) {
                    return;
                }
                let live = self.live.as_ref().map(|live| (live.id, live.url == url));
                match live {
                    Some((id, true)) => {
                        debug!("Session {} already live for {}", id, url);
                    }
                    Some((_, false)) => {
                        self.cancel_live("page changed");
                        self.start_session(url, done_tx);
                    }
                    None if self.last_settled.get(&url).copied() == Some(true) => {
                        debug!("Already sorted {}, ignoring content change", url);
                    }
                    None => self.start_session(url, done_tx),
                }
            }
        }
    }

    fn on_manual_trigger(&mut self, reply: ManualReply) {
        let guard = match self.attempt_lock.clone().try_lock_owned() {
            Ok(guard) => guard,
            Err(_) => {
                info!("Manual sort rejected: an attempt is already running");
                let _ = reply.send(Err(ReconcileError::AttemptInFlight));
                return;
            }
        };

        info!("Manual sort triggered");
        let reconciler = self.reconciler.clone();
        self.background.retain(|task| !task.is_finished());
        self.background.push(tokio::spawn(async move {
            let result = reconciler.attempt().await;
            drop(guard);
            let _ = reply.send(result);
        }));
    }

    fn start_session(&mut self, url: String, done_tx: &mpsc::UnboundedSender<SessionDone>) {
        let id = Uuid::new_v4();
        let cancel = CancellationToken::new();
        info!("Starting sort session {} for {}", id, url);

        let task = tokio::spawn(run_session(
            id,
            url.clone(),
            self.reconciler.clone(),
            self.attempt_lock.clone(),
            self.config.policy,
            cancel.clone(),
            done_tx.clone(),
        ));

        self.live = Some(LiveSession {
            id,
            url,
            cancel,
            task,
        });
    }

    fn cancel_live(&mut self, reason: &str) {
        if let Some(live) = self.live.take() {
            info!("Cancelling session {} for {} ({})", live.id, live.url, reason);
            live.cancel.cancel();
            self.background.retain(|task| !task.is_finished());
            self.background.push(live.task);
        }
    }

    fn on_session_done(&mut self, done: SessionDone) {
        if self.live.as_ref().is_some_and(|live| live.id == done.id) {
            self.live = None;
        }

        match done.outcome {
            RetryOutcome::Succeeded { attempts } => {
                info!("Session {} sorted {} after {} attempt(s)", done.id, done.url, attempts);
                self.last_settled.insert(done.url.clone(), true);
            }
            RetryOutcome::Exhausted { .. } => {
                if let Some(e) = done.outcome.as_error() {
                    warn!("Session {} for {}: {}", done.id, done.url, e);
                }
                self.last_settled.insert(done.url.clone(), false);
            }
            RetryOutcome::Cancelled { attempts } => {
                debug!("Session {} cancelled after {} attempt(s)", done.id, attempts);
            }
        }

        let _ = self.reports.send(SessionReport {
            session_id: done.id,
            url: done.url,
            outcome: done.outcome,
            finished_at: Utc::now(),
        });
    }
}

async fn run_session(
    id: Uuid,
    url: String,
    reconciler: Arc<Reconciler>,
    attempt_lock: Arc<Mutex<()>>,
    policy: RetryPolicy,
    cancel: CancellationToken,
    done_tx: mpsc::UnboundedSender<SessionDone>,
) {
    let mut state = AttemptState::new(policy.max_attempts);

    let outcome = drive(&mut state, &policy, &cancel, |attempt| {
        let reconciler = reconciler.clone();
        let attempt_lock = attempt_lock.clone();
        let cancel = cancel.clone();
        async move {
            // Wait behind a running manual attempt.
            let _guard = tokio::select! {
                biased;
                _ = cancel.cancelled() => return false,
                guard = attempt_lock.lock_owned() => guard,
            };
            debug!("Session {} attempt {}", id, attempt);
            reconciler.attempt_reconcile().await
        }
    })
    .await;

    let outcome = match outcome {
        RetryOutcome::Exhausted { attempts } if cancel.is_cancelled() => {
            RetryOutcome::Cancelled { attempts }
        }
        other => other,
    };

    let _ = done_tx.send(SessionDone { id, url, outcome });
}
