//! Best-effort transcript persistence, decoupled from the reply path.

mod jsonl;
mod types;
mod worker;

pub use jsonl::JsonlTranscriptSink;
pub use types::{TranscriptRecord, TranscriptSink};
pub use worker::TranscriptArchive;
