use std::sync::Arc;

use tokio::sync::mpsc;
use tokio::sync::mpsc::error::TrySendError;
use tokio::task::JoinHandle;

use crate::observability::SessionEvent;

use super::types::{TranscriptRecord, TranscriptSink};

/// Handle to the background transcript writer.
///
/// `submit` never waits: records go onto a bounded queue drained by one worker task,
/// so a slow or failing sink cannot delay or fail a chat reply.
#[derive(Clone)]
pub struct TranscriptArchive {
    queue_tx: mpsc::Sender<TranscriptRecord>,
}

impl TranscriptArchive {
    /// Spawn the worker. It stops once every handle is dropped and the queue is drained.
    pub fn start(sink: Arc<dyn TranscriptSink>, queue_capacity: usize) -> (Self, JoinHandle<()>) {
        let (queue_tx, queue_rx) = mpsc::channel(queue_capacity.max(1));
        let worker = tokio::spawn(drain_queue(sink, queue_rx));
        (Self { queue_tx }, worker)
    }

    /// Hand a record to the worker. Returns `false` when it was dropped (queue full or closed).
    pub fn submit(&self, record: TranscriptRecord) -> bool {
        let session_key = record.session_key.clone();
        match self.queue_tx.try_send(record) {
            Ok(()) => {
                tracing::debug!(
                    event = SessionEvent::ArchiveEnqueued.as_str(),
                    session_key = %session_key,
                    "transcript enqueued"
                );
                true
            }
            Err(TrySendError::Full(_)) => {
                tracing::warn!(
                    event = SessionEvent::ArchiveQueueFull.as_str(),
                    session_key = %session_key,
                    "transcript archive queue full; record dropped"
                );
                false
            }
            Err(TrySendError::Closed(_)) => {
                tracing::warn!(
                    event = SessionEvent::ArchiveWorkerStopped.as_str(),
                    session_key = %session_key,
                    "transcript archive worker stopped; record dropped"
                );
                false
            }
        }
    }
}

async fn drain_queue(sink: Arc<dyn TranscriptSink>, mut queue_rx: mpsc::Receiver<TranscriptRecord>) {
    while let Some(record) = queue_rx.recv().await {
        match sink.write(&record).await {
            Ok(()) => tracing::debug!(
                event = SessionEvent::ArchiveWriteSucceeded.as_str(),
                session_key = %record.session_key,
                utterances = record.utterances.len(),
                "transcript persisted"
            ),
            Err(error) => tracing::warn!(
                event = SessionEvent::ArchiveWriteFailed.as_str(),
                session_key = %record.session_key,
                error = ?error,
                "transcript persistence failed; in-memory reply unaffected"
            ),
        }
    }
    tracing::debug!(
        event = SessionEvent::ArchiveWorkerStopped.as_str(),
        "transcript archive worker stopped"
    );
}
