//! In-memory session memory: session_key → bounded history with idle expiry.
//!
//! Guarded by one `std::sync::Mutex`; every method is synchronous and the lock is
//! never held across an `.await`. Expired sessions are swept lazily at the start
//! of `append` / `get`, so no cleanup task is needed.

use std::collections::HashMap;
use std::sync::{Arc, Mutex as StdMutex, PoisonError};
use std::time::Duration;

use calma_window::{HistoryEntry, HistoryWindow};
use tokio::time::Instant;

use crate::observability::SessionEvent;

struct SessionRecord {
    history: HistoryWindow,
    expires_at: Instant,
}

/// Bounded per-session history. Cheap to clone; clones share state.
#[derive(Clone)]
pub struct SessionMemory {
    inner: Arc<StdMutex<HashMap<String, SessionRecord>>>,
    max_messages: usize,
    ttl: Duration,
}

impl SessionMemory {
    /// Create a memory keeping at most `max_messages` entries per session and
    /// dropping sessions idle (no append) for `ttl`.
    #[must_use]
    pub fn new(max_messages: usize, ttl: Duration) -> Self {
        Self {
            inner: Arc::new(StdMutex::new(HashMap::new())),
            max_messages: max_messages.max(1),
            ttl,
        }
    }

    /// Append one entry, evicting the oldest when over capacity. Extends the TTL.
    pub fn append(&self, session_key: &str, entry: HistoryEntry) {
        self.append_many(session_key, std::iter::once(entry));
    }

    /// Append entries in order under a single critical section. Extends the TTL.
    ///
    /// Used by the orchestrator so a turn's utterances and reply land together.
    pub fn append_many<I>(&self, session_key: &str, entries: I)
    where
        I: IntoIterator<Item = HistoryEntry>,
    {
        let now = Instant::now();
        let mut sessions = self.lock();
        prune_expired(&mut sessions, now);
        let record = sessions
            .entry(session_key.to_string())
            .or_insert_with(|| SessionRecord {
                history: HistoryWindow::new(self.max_messages),
                expires_at: now + self.ttl,
            });
        let evicted = record.history.extend(entries);
        record.expires_at = now + self.ttl;
        tracing::debug!(
            event = SessionEvent::MemoryAppended.as_str(),
            session_key,
            total_messages = record.history.len(),
            evicted,
            "session memory appended"
        );
    }

    /// Copy of the session history, oldest first. Empty when absent or expired.
    ///
    /// Does not extend the TTL: polling a conversation never keeps it alive.
    #[must_use]
    pub fn get(&self, session_key: &str) -> Vec<HistoryEntry> {
        let now = Instant::now();
        let mut sessions = self.lock();
        prune_expired(&mut sessions, now);
        let messages = sessions
            .get(session_key)
            .map(|record| record.history.snapshot())
            .unwrap_or_default();
        tracing::debug!(
            event = SessionEvent::MemoryLoaded.as_str(),
            session_key,
            loaded_messages = messages.len(),
            "session memory loaded"
        );
        messages
    }

    /// Drop the session unconditionally.
    pub fn reset(&self, session_key: &str) {
        let removed = self.lock().remove(session_key).is_some();
        tracing::debug!(
            event = SessionEvent::MemoryReset.as_str(),
            session_key,
            removed,
            "session memory reset"
        );
    }

    /// Configured per-session history cap.
    #[must_use]
    pub fn max_messages(&self) -> usize {
        self.max_messages
    }

    /// Configured idle expiry.
    #[must_use]
    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    /// Number of session records currently held, expired ones included until the next sweep.
    #[doc(hidden)]
    #[must_use]
    pub fn active_sessions(&self) -> usize {
        self.lock().len()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, HashMap<String, SessionRecord>> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

fn prune_expired(sessions: &mut HashMap<String, SessionRecord>, now: Instant) {
    sessions.retain(|session_key, record| {
        let alive = record.expires_at > now;
        if !alive {
            tracing::debug!(
                event = SessionEvent::MemoryExpired.as_str(),
                session_key = %session_key,
                dropped_messages = record.history.len(),
                "session memory expired"
            );
        }
        alive
    });
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn append_many_lands_in_order() {
        let memory = SessionMemory::new(10, Duration::from_secs(60));
        memory.append_many(
            "s1",
            vec![
                HistoryEntry::user("hola"),
                HistoryEntry::user("tengo examen"),
                HistoryEntry::assistant("¡Vamos paso a paso!"),
            ],
        );
        let history = memory.get("s1");
        let contents: Vec<_> = history.iter().map(|e| e.content.as_str()).collect();
        assert_eq!(contents, vec!["hola", "tengo examen", "¡Vamos paso a paso!"]);
    }

    #[test]
    fn zero_capacity_is_clamped() {
        let memory = SessionMemory::new(0, Duration::from_secs(60));
        assert_eq!(memory.max_messages(), 1);
    }
}
