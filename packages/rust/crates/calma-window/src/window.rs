//! History window: bounded ring buffer of `HistoryEntry`s.

use std::collections::VecDeque;

use crate::HistoryEntry;

/// Bounded history for one conversation. O(1) append, drops oldest when over capacity.
#[derive(Debug, Clone)]
pub struct HistoryWindow {
    ring: VecDeque<HistoryEntry>,
    max_entries: usize,
    evicted_total: u64,
}

impl HistoryWindow {
    /// Create a window with a fixed capacity (at least one entry).
    #[must_use]
    pub fn new(max_entries: usize) -> Self {
        let max_entries = max_entries.max(1);
        Self {
            ring: VecDeque::with_capacity(max_entries.min(4096)),
            max_entries,
            evicted_total: 0,
        }
    }

    /// Append one entry. Returns how many old entries were evicted to make room.
    pub fn push(&mut self, entry: HistoryEntry) -> usize {
        self.ring.push_back(entry);
        let mut evicted = 0;
        while self.ring.len() > self.max_entries {
            if self.ring.pop_front().is_none() {
                break;
            }
            evicted += 1;
        }
        self.evicted_total += evicted as u64;
        evicted
    }

    /// Append entries in order. Returns the total number of evicted entries.
    pub fn extend<I>(&mut self, entries: I) -> usize
    where
        I: IntoIterator<Item = HistoryEntry>,
    {
        entries.into_iter().map(|entry| self.push(entry)).sum()
    }

    /// Owned copy of the current history (oldest to newest).
    #[must_use]
    pub fn snapshot(&self) -> Vec<HistoryEntry> {
        self.ring.iter().cloned().collect()
    }

    /// Borrowing iterator over the current history (oldest to newest).
    pub fn iter(&self) -> impl Iterator<Item = &HistoryEntry> {
        self.ring.iter()
    }

    /// Number of entries currently held.
    #[must_use]
    pub fn len(&self) -> usize {
        self.ring.len()
    }

    /// Whether the window holds no entries.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.ring.is_empty()
    }

    /// Hard cap on held entries.
    #[must_use]
    pub fn capacity(&self) -> usize {
        self.max_entries
    }

    /// Entries dropped over the lifetime of this window.
    #[must_use]
    pub fn evicted_total(&self) -> u64 {
        self.evicted_total
    }
}
