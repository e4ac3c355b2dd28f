//! Resolved configuration: runtime settings with defaults applied.

use std::path::PathBuf;
use std::time::Duration;

use crate::chunking::{
    ChunkingLimits, DEFAULT_PARAGRAPH_MAX_CHARS, DEFAULT_SENTENCE_BUFFER_MAX_CHARS,
};

use super::settings::RuntimeSettings;

/// OpenAI-compatible chat completions endpoint used when none is configured.
pub const DEFAULT_INFERENCE_URL: &str = "https://api.openai.com/v1/chat/completions";

const DEFAULT_BUFFER_WINDOW_MS: u64 = 1_500;
const DEFAULT_MEMORY_MAX_MESSAGES: usize = 20;
const DEFAULT_SESSION_TTL_SECS: u64 = 1_800;
const DEFAULT_TURN_TIMEOUT_SECS: u64 = 120;
const DEFAULT_MAX_MESSAGE_CHARS: usize = 2_000;
const DEFAULT_MODEL: &str = "gpt-4o-mini";
const DEFAULT_TEMPERATURE: f32 = 0.7;
const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 60;
const DEFAULT_ARCHIVE_PATH: &str = ".data/calma/transcripts.jsonl";
const DEFAULT_ARCHIVE_QUEUE_CAPACITY: usize = 256;

/// Coalescing, memory and chunking knobs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChatConfig {
    pub buffer_window: Duration,
    pub memory_max_messages: usize,
    pub session_ttl: Duration,
    pub chunking: ChunkingLimits,
    /// Upper bound on one whole turn, applied by the gateway around the orchestrator.
    pub turn_timeout: Duration,
    pub max_message_chars: usize,
}

impl Default for ChatConfig {
    fn default() -> Self {
        Self {
            buffer_window: Duration::from_millis(DEFAULT_BUFFER_WINDOW_MS),
            memory_max_messages: DEFAULT_MEMORY_MAX_MESSAGES,
            session_ttl: Duration::from_secs(DEFAULT_SESSION_TTL_SECS),
            chunking: ChunkingLimits {
                paragraph_max_chars: DEFAULT_PARAGRAPH_MAX_CHARS,
                sentence_buffer_max_chars: DEFAULT_SENTENCE_BUFFER_MAX_CHARS,
            },
            turn_timeout: Duration::from_secs(DEFAULT_TURN_TIMEOUT_SECS),
            max_message_chars: DEFAULT_MAX_MESSAGE_CHARS,
        }
    }
}

impl ChatConfig {
    #[must_use]
    pub fn from_settings(settings: &RuntimeSettings) -> Self {
        let chat = &settings.chat;
        let defaults = Self::default();
        Self {
            buffer_window: chat
                .buffer_window_ms
                .map_or(defaults.buffer_window, Duration::from_millis),
            memory_max_messages: chat
                .memory_max_messages
                .unwrap_or(defaults.memory_max_messages)
                .max(1),
            session_ttl: chat
                .session_ttl_secs
                .map_or(defaults.session_ttl, Duration::from_secs),
            chunking: ChunkingLimits {
                paragraph_max_chars: chat
                    .paragraph_max_chars
                    .unwrap_or(defaults.chunking.paragraph_max_chars)
                    .max(1),
                sentence_buffer_max_chars: chat
                    .sentence_buffer_max_chars
                    .unwrap_or(defaults.chunking.sentence_buffer_max_chars)
                    .max(1),
            },
            turn_timeout: chat
                .turn_timeout_secs
                .map_or(defaults.turn_timeout, |secs| Duration::from_secs(secs.max(1))),
            max_message_chars: chat
                .max_message_chars
                .unwrap_or(defaults.max_message_chars)
                .max(1),
        }
    }
}

/// Chat model endpoint and sampling.
#[derive(Debug, Clone, PartialEq)]
pub struct LlmConfig {
    pub inference_url: String,
    pub model: String,
    pub temperature: f32,
    /// Explicit key; `OPENAI_API_KEY` is used when absent.
    pub api_key: Option<String>,
    pub request_timeout_secs: u64,
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            inference_url: DEFAULT_INFERENCE_URL.to_string(),
            model: DEFAULT_MODEL.to_string(),
            temperature: DEFAULT_TEMPERATURE,
            api_key: None,
            request_timeout_secs: DEFAULT_REQUEST_TIMEOUT_SECS,
        }
    }
}

impl LlmConfig {
    #[must_use]
    pub fn from_settings(settings: &RuntimeSettings) -> Self {
        let llm = &settings.llm;
        let defaults = Self::default();
        Self {
            inference_url: non_blank(llm.inference_url.as_deref())
                .unwrap_or(defaults.inference_url),
            model: non_blank(llm.model.as_deref()).unwrap_or(defaults.model),
            temperature: llm.temperature.unwrap_or(defaults.temperature),
            api_key: non_blank(llm.api_key.as_deref()),
            request_timeout_secs: llm
                .request_timeout_secs
                .unwrap_or(defaults.request_timeout_secs)
                .max(1),
        }
    }

    /// API key from config, else `OPENAI_API_KEY`.
    #[must_use]
    pub fn resolve_api_key(&self) -> Option<String> {
        self.api_key
            .clone()
            .or_else(|| non_blank(std::env::var("OPENAI_API_KEY").ok().as_deref()))
    }
}

/// Transcript archive hand-off.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArchiveConfig {
    pub enabled: bool,
    pub path: PathBuf,
    pub queue_capacity: usize,
}

impl Default for ArchiveConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            path: PathBuf::from(DEFAULT_ARCHIVE_PATH),
            queue_capacity: DEFAULT_ARCHIVE_QUEUE_CAPACITY,
        }
    }
}

impl ArchiveConfig {
    #[must_use]
    pub fn from_settings(settings: &RuntimeSettings) -> Self {
        let archive = &settings.archive;
        let defaults = Self::default();
        Self {
            enabled: archive.enabled.unwrap_or(defaults.enabled),
            path: non_blank(archive.path.as_deref()).map_or(defaults.path, PathBuf::from),
            queue_capacity: archive
                .queue_capacity
                .unwrap_or(defaults.queue_capacity)
                .max(1),
        }
    }
}

fn non_blank(value: Option<&str>) -> Option<String> {
    value
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(ToString::to_string)
}
