use serde::Serialize;

use crate::coalescer::ChatContext;
use crate::llm::ModelMeta;

/// Sent when a reply yields no chunks.
pub const FALLBACK_REPLY: &str =
    "Necesité un momento, pero estoy aquí contigo. ¿Quieres que lo intentemos de nuevo?";

/// One human-sent chat message.
#[derive(Debug, Clone, Default)]
pub struct ChatTurnRequest {
    pub session_key: String,
    pub message: String,
    pub context: ChatContext,
    /// Client metadata kept with the archived user utterances.
    pub metadata: ChatContext,
}

impl ChatTurnRequest {
    pub fn new(session_key: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            session_key: session_key.into(),
            message: message.into(),
            ..Self::default()
        }
    }

    #[must_use]
    pub fn with_context(mut self, context: ChatContext) -> Self {
        self.context = context;
        self
    }

    #[must_use]
    pub fn with_metadata(mut self, metadata: ChatContext) -> Self {
        self.metadata = metadata;
        self
    }
}

/// Terminal state of one inbound message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum TurnOutcome {
    /// Empty message: nothing coalesced, nothing generated.
    Skipped,
    /// Folded into another caller's turn; that caller delivers the reply.
    Buffered,
    /// This caller generated, recorded and chunked the reply.
    Recorded,
}

/// Reply to one inbound message.
#[derive(Debug, Clone, Serialize)]
pub struct ChatTurnReply {
    pub chunks: Vec<String>,
    /// First chunk, or empty.
    pub primary_chunk: String,
    pub session_key: String,
    /// Utterances in the bundle beyond the first one.
    pub queued_count: usize,
    pub buffered: bool,
    pub meta: ModelMeta,
    pub outcome: TurnOutcome,
}

impl ChatTurnReply {
    pub(super) fn empty(
        session_key: String,
        queued_count: usize,
        meta: ModelMeta,
        outcome: TurnOutcome,
    ) -> Self {
        Self {
            chunks: Vec::new(),
            primary_chunk: String::new(),
            session_key,
            queued_count,
            buffered: outcome == TurnOutcome::Buffered,
            meta,
            outcome,
        }
    }

    pub(super) fn recorded(
        session_key: String,
        chunks: Vec<String>,
        queued_count: usize,
        meta: ModelMeta,
    ) -> Self {
        Self {
            primary_chunk: chunks.first().cloned().unwrap_or_default(),
            chunks,
            session_key,
            queued_count,
            buffered: false,
            meta,
            outcome: TurnOutcome::Recorded,
        }
    }
}
