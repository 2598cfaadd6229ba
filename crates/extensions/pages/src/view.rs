//! Local display order kept alongside the latest observation.

use parking_lot::Mutex;
use tubesort_protocols::{ObservedItem, PageError};

#[derive(Default)]
struct ViewState {
    observed: Vec<ObservedItem>,
    /// Indices into `observed`, in display order.
    order: Vec<usize>,
}

/// Items as last observed plus the order they are currently displayed in.
#[derive(Default)]
pub(crate) struct LocalView {
    state: Mutex<ViewState>,
}

impl LocalView {
    /// Start a new observation; the display order resets to observed order.
    pub(crate) fn replace(&self, items: Vec<ObservedItem>) {
        let mut state = self.state.lock();
        state.order = (0..items.len()).collect();
        state.observed = items;
    }

    pub(crate) fn clear(&self) {
        let mut state = self.state.lock();
        state.observed.clear();
        state.order.clear();
    }

    /// Move the item at `index` of the latest observation to the end.
    pub(crate) fn move_to_end(&self, index: usize) -> Result<(), PageError> {
        let mut state = self.state.lock();
        let len = state.observed.len();
        let position = state
            .order
            .iter()
            .position(|i| *i == index)
            .ok_or(PageError::ItemOutOfRange { index, len })?;
        let item = state.order.remove(position);
        state.order.push(item);
        Ok(())
    }

    pub(crate) fn current_order(&self) -> Vec<ObservedItem> {
        let state = self.state.lock();
        state
            .order
            .iter()
            .map(|i| state.observed[*i].clone())
            .collect()
    }
}
