use std::sync::Arc;
use std::sync::Mutex as StdMutex;
use std::sync::PoisonError;

use crate::observability::SessionEvent;

use super::types::CoalescerState;

/// One caller's stake in a pending batch.
///
/// Releasing decrements the waiter count and frees the batch once it reaches zero.
/// Dropping an unreleased permit (the caller's future was cancelled) does the same.
pub(super) struct WaiterPermit {
    pub(super) inner: Arc<StdMutex<CoalescerState>>,
    pub(super) session_key: String,
    pub(super) batch_id: u64,
    pub(super) released: bool,
}

impl WaiterPermit {
    pub(super) fn release(&mut self, state: &mut CoalescerState) {
        if self.released {
            return;
        }
        self.released = true;
        release_waiter(state, &self.session_key, self.batch_id);
    }
}

impl Drop for WaiterPermit {
    fn drop(&mut self) {
        if self.released {
            return;
        }
        self.released = true;
        let mut state = self.inner.lock().unwrap_or_else(PoisonError::into_inner);
        let still_waiting = state.batches.contains_key(&self.batch_id);
        release_waiter(&mut state, &self.session_key, self.batch_id);
        if still_waiting {
            tracing::debug!(
                event = SessionEvent::WaiterCancelled.as_str(),
                session_key = %self.session_key,
                batch_id = self.batch_id,
                "coalescer waiter cancelled"
            );
        }
    }
}

fn release_waiter(state: &mut CoalescerState, session_key: &str, batch_id: u64) {
    let Some(batch) = state.batches.get_mut(&batch_id) else {
        return;
    };
    debug_assert!(batch.waiters > 0, "coalescer waiter underflow");
    batch.waiters = batch.waiters.saturating_sub(1);
    if batch.waiters > 0 {
        return;
    }

    let closed = batch.bundle.is_some();
    state.batches.remove(&batch_id);
    if state.open.get(session_key) == Some(&batch_id) {
        state.open.remove(session_key);
    }
    tracing::debug!(
        event = SessionEvent::BatchReleased.as_str(),
        session_key,
        batch_id,
        closed,
        "coalescer batch released"
    );
}
