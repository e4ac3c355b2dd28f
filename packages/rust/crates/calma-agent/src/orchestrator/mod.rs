//! Conversation orchestrator: coalesce → generate → record → chunk, per inbound message.

mod turn;
mod types;

use std::sync::Arc;

use crate::archive::TranscriptArchive;
use crate::chunking::ChunkingLimits;
use crate::coalescer::MessageCoalescer;
use crate::config::ChatConfig;
use crate::llm::Generator;
use crate::session::SessionMemory;

pub use types::{ChatTurnReply, ChatTurnRequest, FALLBACK_REPLY, TurnOutcome};

/// Owns the per-process chat state and the generation collaborator.
///
/// The coalescer and the memory each guard their own state; neither lock is held
/// while the generator runs.
pub struct ConversationOrchestrator {
    coalescer: MessageCoalescer,
    memory: SessionMemory,
    generator: Arc<dyn Generator>,
    archive: Option<TranscriptArchive>,
    chunking: ChunkingLimits,
}

impl ConversationOrchestrator {
    /// Fresh coalescer and memory sized from `config`.
    pub fn new(config: &ChatConfig, generator: Arc<dyn Generator>) -> Self {
        Self::from_parts(
            MessageCoalescer::new(config.buffer_window),
            SessionMemory::new(config.memory_max_messages, config.session_ttl),
            generator,
            config.chunking,
        )
    }

    pub fn from_parts(
        coalescer: MessageCoalescer,
        memory: SessionMemory,
        generator: Arc<dyn Generator>,
        chunking: ChunkingLimits,
    ) -> Self {
        Self {
            coalescer,
            memory,
            generator,
            archive: None,
            chunking,
        }
    }

    /// Hand successful exchanges to a transcript archive.
    #[must_use]
    pub fn with_archive(mut self, archive: TranscriptArchive) -> Self {
        self.archive = Some(archive);
        self
    }

    pub fn coalescer(&self) -> &MessageCoalescer {
        &self.coalescer
    }

    pub fn memory(&self) -> &SessionMemory {
        &self.memory
    }

    pub fn generator(&self) -> &Arc<dyn Generator> {
        &self.generator
    }

    /// Forget a conversation's history.
    pub fn reset_session(&self, session_key: &str) {
        self.memory.reset(session_key);
    }
}
