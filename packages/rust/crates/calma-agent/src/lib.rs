//! Chat agent core: per-session message coalescing, bounded session memory,
//! reply chunking and an HTTP gateway.
//!
//! - **Coalescer**: messages a student sends in quick succession are folded into one turn.
//! - **Turn**: bundle + history → model → memory → chat-bubble chunks (+ transcript archive).

#![allow(missing_docs)]

mod archive;
mod chunking;
mod coalescer;
mod config;
mod error;
mod gateway;
mod llm;
mod observability;
mod orchestrator;
mod session;

pub use archive::{JsonlTranscriptSink, TranscriptArchive, TranscriptRecord, TranscriptSink};
pub use chunking::{
    ChunkingLimits, DEFAULT_PARAGRAPH_MAX_CHARS, DEFAULT_SENTENCE_BUFFER_MAX_CHARS,
    split_response, split_response_chunks,
};
pub use coalescer::{Bundle, ChatContext, Collected, MIN_BUFFER_WINDOW, MessageCoalescer};
pub use config::{
    ArchiveConfig, ArchiveSettings, ChatConfig, ChatSettings, DEFAULT_INFERENCE_URL,
    GatewaySettings, LlmConfig, LlmSettings, RuntimeSettings, load_runtime_settings,
    load_runtime_settings_from_paths, runtime_settings_paths, set_config_home_override,
};
pub use error::{BoxError, ChatError};
pub use gateway::{
    ChatRequest, ChatResponse, DEFAULT_STDIO_SESSION_KEY, GatewayHealthResponse, GatewayState,
    resolve_session_key, router, run_http, run_stdio, serve_lines, validate_chat_request,
};
pub use llm::{Generator, LlmClient, ModelMeta, SYSTEM_PROMPT};
pub use orchestrator::{
    ChatTurnReply, ChatTurnRequest, ConversationOrchestrator, FALLBACK_REPLY, TurnOutcome,
};
pub use session::{HistoryEntry, Role, SessionMemory};
