//! Session namespace: bounded, TTL-expiring conversation memory.

mod memory;

pub use calma_window::{HistoryEntry, Role};
pub use memory::SessionMemory;
