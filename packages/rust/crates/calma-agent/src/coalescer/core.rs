use std::sync::Arc;
use std::sync::Mutex as StdMutex;
use std::sync::PoisonError;
use std::time::Duration;

use tokio::sync::watch;

use crate::error::ChatError;
use crate::observability::SessionEvent;

use super::permit::WaiterPermit;
use super::types::{
    Bundle, ChatContext, CoalescerState, Collected, MIN_BUFFER_WINDOW, MessageCoalescer,
    PendingBatch,
};

impl MessageCoalescer {
    /// Create a coalescer whose windows last `window` (at least [`MIN_BUFFER_WINDOW`]).
    #[must_use]
    pub fn new(window: Duration) -> Self {
        Self {
            inner: Arc::new(StdMutex::new(CoalescerState::default())),
            window: window.max(MIN_BUFFER_WINDOW),
        }
    }

    /// Effective window length.
    #[must_use]
    pub fn window(&self) -> Duration {
        self.window
    }

    /// Add `message` to the session's open batch (opening one if needed) and wait
    /// until that batch's window closes.
    ///
    /// The window is anchored to the first message of the batch; later joiners do
    /// not extend it. Primary status goes to the first caller that observes the
    /// closed batch. An empty `message` returns at once with an empty bundle and
    /// `is_primary = true`.
    ///
    /// Cancel-safe: dropping the future before it resolves withdraws the caller
    /// from the batch.
    pub async fn collect(
        &self,
        session_key: &str,
        message: &str,
        context: ChatContext,
    ) -> Result<Collected, ChatError> {
        if message.is_empty() {
            return Ok(Collected {
                bundle: Bundle::empty(context),
                is_primary: true,
            });
        }

        let (mut permit, mut closed_rx) = self.join(session_key, message, context);

        // A closed sender means the batch is gone; the lookup below reports it.
        let _ = closed_rx.wait_for(|closed| *closed).await;

        let mut state = self.lock();
        let batch_id = permit.batch_id;
        let Some(batch) = state.batches.get_mut(&batch_id) else {
            return Err(ChatError::CoalescingInconsistency {
                session_key: session_key.to_string(),
                batch_id,
            });
        };
        let Some(bundle) = batch.bundle.clone() else {
            return Err(ChatError::CoalescingInconsistency {
                session_key: session_key.to_string(),
                batch_id,
            });
        };
        let is_primary = !batch.leader_assigned;
        batch.leader_assigned = true;
        if is_primary {
            tracing::debug!(
                event = SessionEvent::PrimaryElected.as_str(),
                session_key,
                batch_id,
                utterances = bundle.len(),
                waiters = batch.waiters,
                "coalescer primary elected"
            );
        }
        permit.release(&mut state);

        Ok(Collected { bundle, is_primary })
    }

    /// Number of batches with at least one waiter.
    #[doc(hidden)]
    #[must_use]
    pub fn active_batches(&self) -> usize {
        self.lock().batches.len()
    }

    fn join(
        &self,
        session_key: &str,
        message: &str,
        context: ChatContext,
    ) -> (WaiterPermit, watch::Receiver<bool>) {
        let mut state = self.lock();

        if let Some(batch_id) = state.open.get(session_key).copied()
            && let Some(batch) = state.batches.get_mut(&batch_id)
        {
            batch.utterances.push(message.to_string());
            if !context.is_empty() {
                batch.context = context;
            }
            batch.waiters += 1;
            tracing::debug!(
                event = SessionEvent::BatchJoined.as_str(),
                session_key,
                batch_id,
                utterances = batch.utterances.len(),
                waiters = batch.waiters,
                "coalescer batch joined"
            );
            let closed_rx = batch.closed_tx.subscribe();
            return (self.permit(session_key, batch_id), closed_rx);
        }

        state.next_batch_id += 1;
        let batch_id = state.next_batch_id;
        let (closed_tx, closed_rx) = watch::channel(false);
        state.batches.insert(
            batch_id,
            PendingBatch {
                utterances: vec![message.to_string()],
                context,
                waiters: 1,
                bundle: None,
                leader_assigned: false,
                closed_tx,
            },
        );
        state.open.insert(session_key.to_string(), batch_id);
        drop(state);

        tracing::debug!(
            event = SessionEvent::BatchOpened.as_str(),
            session_key,
            batch_id,
            window_ms = u64::try_from(self.window.as_millis()).unwrap_or(u64::MAX),
            "coalescer batch opened"
        );
        self.schedule_close(session_key, batch_id);
        (self.permit(session_key, batch_id), closed_rx)
    }

    fn schedule_close(&self, session_key: &str, batch_id: u64) {
        let inner = Arc::clone(&self.inner);
        let window = self.window;
        let session_key = session_key.to_string();
        tokio::spawn(async move {
            tokio::time::sleep(window).await;
            close_window(&inner, &session_key, batch_id);
        });
    }

    fn permit(&self, session_key: &str, batch_id: u64) -> WaiterPermit {
        WaiterPermit {
            inner: Arc::clone(&self.inner),
            session_key: session_key.to_string(),
            batch_id,
            released: false,
        }
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, CoalescerState> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

/// Freeze the batch into a bundle and wake every waiter, all under the lock.
fn close_window(inner: &StdMutex<CoalescerState>, session_key: &str, batch_id: u64) {
    let mut state = inner.lock().unwrap_or_else(PoisonError::into_inner);
    if state.open.get(session_key) == Some(&batch_id) {
        state.open.remove(session_key);
    }
    // Every waiter may already have been cancelled.
    let Some(batch) = state.batches.get_mut(&batch_id) else {
        return;
    };
    let bundle = Bundle {
        utterances: std::mem::take(&mut batch.utterances),
        context: std::mem::take(&mut batch.context),
    };
    tracing::debug!(
        event = SessionEvent::WindowClosed.as_str(),
        session_key,
        batch_id,
        utterances = bundle.len(),
        waiters = batch.waiters,
        "coalescer window closed"
    );
    batch.bundle = Some(bundle);
    batch.closed_tx.send_replace(true);
}
