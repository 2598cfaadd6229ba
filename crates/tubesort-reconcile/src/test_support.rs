//! Hand-written fakes for the page and remote seams.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use parking_lot::Mutex;
use tubesort_protocols::{
    ObservedItem, PageError, PageObserver, PositionUpdate, RemoteError, RemoteItem,
    RemotePlaylist,
};

/// A side effect seen by either fake, in the order it happened.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FakeEvent {
    Move(usize),
    Set { remote_id: String, position: u32 },
}

/// Event log shared between a `FakePage` and a `FakeRemote`.
pub type EventLog = Arc<Mutex<Vec<FakeEvent>>>;

/// A page whose container contents are set by the test.
#[derive(Default)]
pub struct FakePage {
    items: Mutex<Option<Vec<ObservedItem>>>,
    moves: Mutex<Vec<usize>>,
    observations: AtomicUsize,
    fail_moves: bool,
    log: Option<EventLog>,
}

impl FakePage {
    pub fn with_titles(titles: &[&str]) -> Self {
        let items = titles.iter().map(|t| ObservedItem::new(*t)).collect();
        Self {
            items: Mutex::new(Some(items)),
            ..Default::default()
        }
    }

    /// A page that has not rendered its container.
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn failing_moves(mut self) -> Self {
        self.fail_moves = true;
        self
    }

    pub fn with_log(mut self, log: EventLog) -> Self {
        self.log = Some(log);
        self
    }

    pub fn set_titles(&self, titles: &[&str]) {
        *self.items.lock() = Some(titles.iter().map(|t| ObservedItem::new(*t)).collect());
    }

    pub fn moves(&self) -> Vec<usize> {
        self.moves.lock().clone()
    }

    pub fn observations(&self) -> usize {
        self.observations.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl PageObserver for FakePage {
    async fn observe_container(&self) -> Result<Option<Vec<ObservedItem>>, PageError> {
        self.observations.fetch_add(1, Ordering::SeqCst);
        Ok(self.items.lock().clone())
    }

    async fn move_to_end(&self, item_index: usize) -> Result<(), PageError> {
        if self.fail_moves {
            return Err(PageError::Unavailable("detached".to_string()));
        }
        self.moves.lock().push(item_index);
        if let Some(log) = &self.log {
            log.lock().push(FakeEvent::Move(item_index));
        }
        Ok(())
    }
}

/// A remote playlist that records every position update.
pub struct FakeRemote {
    items: Vec<RemoteItem>,
    calls: Mutex<Vec<PositionUpdate>>,
    /// 1-based call numbers that fail, counted across the fake's lifetime.
    failing_calls: Mutex<Vec<usize>>,
    fail_fetch: Mutex<bool>,
    total_calls: AtomicUsize,
    in_flight: AtomicUsize,
    max_in_flight: AtomicUsize,
    call_delay: Option<Duration>,
    log: Option<EventLog>,
}

impl FakeRemote {
    /// Remote items with ids `PLI-0..` and labels taken from `titles`.
    pub fn with_titles(titles: &[&str]) -> Self {
        let items = titles
            .iter()
            .enumerate()
            .map(|(i, t)| RemoteItem::new(format!("PLI-{}", i), *t).with_video_id(format!("vid{}", i)))
            .collect();
        Self::with_items(items)
    }

    pub fn with_items(items: Vec<RemoteItem>) -> Self {
        Self {
            items,
            calls: Mutex::new(Vec::new()),
            failing_calls: Mutex::new(Vec::new()),
            fail_fetch: Mutex::new(false),
            total_calls: AtomicUsize::new(0),
            in_flight: AtomicUsize::new(0),
            max_in_flight: AtomicUsize::new(0),
            call_delay: None,
            log: None,
        }
    }

    pub fn failing_on_call(self, call_number: usize) -> Self {
        self.failing_calls.lock().push(call_number);
        self
    }

    pub fn with_log(mut self, log: EventLog) -> Self {
        self.log = Some(log);
        self
    }

    pub fn with_call_delay(mut self, delay: Duration) -> Self {
        self.call_delay = Some(delay);
        self
    }

    pub fn set_fail_fetch(&self, fail: bool) {
        *self.fail_fetch.lock() = fail;
    }

    pub fn calls(&self) -> Vec<PositionUpdate> {
        self.calls.lock().clone()
    }

    /// Remote ids of successful calls, in call order.
    pub fn called_ids(&self) -> Vec<String> {
        self.calls.lock().iter().map(|c| c.remote_id.clone()).collect()
    }

    pub fn total_calls(&self) -> usize {
        self.total_calls.load(Ordering::SeqCst)
    }

    pub fn max_in_flight(&self) -> usize {
        self.max_in_flight.load(Ordering::SeqCst)
    }

    pub fn clear_calls(&self) {
        self.calls.lock().clear();
    }
}

#[async_trait]
impl RemotePlaylist for FakeRemote {
    async fn fetch_items(&self, _collection_id: &str) -> Result<Vec<RemoteItem>, RemoteError> {
        if *self.fail_fetch.lock() {
            return Err(RemoteError::Network("connection refused".to_string()));
        }
        Ok(self.items.clone())
    }

    async fn set_position(&self, update: PositionUpdate) -> Result<(), RemoteError> {
        let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.max_in_flight.fetch_max(now, Ordering::SeqCst);
        let call_number = self.total_calls.fetch_add(1, Ordering::SeqCst) + 1;

        if let Some(delay) = self.call_delay {
            tokio::time::sleep(delay).await;
        }

        let result = if self.failing_calls.lock().contains(&call_number) {
            Err(RemoteError::Api {
                status: 500,
                message: "backend error".to_string(),
            })
        } else {
            if let Some(log) = &self.log {
                log.lock().push(FakeEvent::Set {
                    remote_id: update.remote_id.clone(),
                    position: update.position,
                });
            }
            self.calls.lock().push(update);
            Ok(())
        };

        self.in_flight.fetch_sub(1, Ordering::SeqCst);
        result
    }
}
