//! Per-session message coalescing with a timed window and first-to-wake primary election.

mod core;
mod permit;
mod types;

pub use types::{Bundle, ChatContext, Collected, MIN_BUFFER_WINDOW, MessageCoalescer};
