use std::collections::HashMap;
use std::sync::Arc;
use std::sync::Mutex as StdMutex;
use std::time::Duration;

use serde::Serialize;
use tokio::sync::watch;

/// Side context supplied with a message (free-form JSON object).
pub type ChatContext = serde_json::Map<String, serde_json::Value>;

/// Shortest accepted coalescing window.
pub const MIN_BUFFER_WINDOW: Duration = Duration::from_millis(100);

/// Groups messages for one session that arrive within a window into a single [`Bundle`].
///
/// State lives behind one `std::sync::Mutex`, never held across an `.await`;
/// waiters park on a `watch` channel that flips once when the window closes.
#[derive(Clone)]
pub struct MessageCoalescer {
    pub(super) inner: Arc<StdMutex<CoalescerState>>,
    pub(super) window: Duration,
}

#[derive(Default)]
pub(super) struct CoalescerState {
    /// Live batches by id, open or closed. Removed when their last waiter leaves.
    pub(super) batches: HashMap<u64, PendingBatch>,
    /// Session key → id of the batch still accepting messages.
    pub(super) open: HashMap<String, u64>,
    pub(super) next_batch_id: u64,
}

pub(super) struct PendingBatch {
    pub(super) utterances: Vec<String>,
    pub(super) context: ChatContext,
    pub(super) waiters: usize,
    /// Set exactly once, when the window closes.
    pub(super) bundle: Option<Bundle>,
    pub(super) leader_assigned: bool,
    pub(super) closed_tx: watch::Sender<bool>,
}

/// Finalized, immutable content of one coalescing window.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Bundle {
    /// Messages in arrival order.
    pub utterances: Vec<String>,
    /// Latest non-empty side context supplied during the window.
    pub context: ChatContext,
}

impl Bundle {
    /// Bundle carrying no utterances (empty-message short-circuit).
    #[must_use]
    pub fn empty(context: ChatContext) -> Self {
        Self {
            utterances: Vec::new(),
            context,
        }
    }

    /// Utterances joined by a blank line.
    #[must_use]
    pub fn joined_text(&self) -> String {
        self.utterances.join("\n\n")
    }

    /// Number of utterances.
    #[must_use]
    pub fn len(&self) -> usize {
        self.utterances.len()
    }

    /// Whether the bundle carries no utterances.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.utterances.is_empty()
    }

    /// Utterances beyond the first one (callers that were folded into this turn).
    #[must_use]
    pub fn queued_count(&self) -> usize {
        self.utterances.len().saturating_sub(1)
    }
}

/// Result of [`MessageCoalescer::collect`].
#[derive(Debug, Clone)]
pub struct Collected {
    /// Shared bundle for every caller of the batch.
    pub bundle: Bundle,
    /// Exactly one caller per bundle sees `true`.
    pub is_primary: bool,
}
