//! calma-window: bounded history window for one conversation.
//!
//! Ring buffer of role-tagged entries; the oldest entry is evicted first once
//! the configured capacity is exceeded.

mod entry;
mod window;

pub use entry::{HistoryEntry, Role};
pub use window::HistoryWindow;
