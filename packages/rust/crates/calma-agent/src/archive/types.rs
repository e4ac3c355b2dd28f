use anyhow::Result;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::coalescer::ChatContext;

/// One completed exchange: the coalesced student utterances and the full reply.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TranscriptRecord {
    pub session_key: String,
    pub utterances: Vec<String>,
    pub reply: String,
    /// Client-supplied metadata attached to the user messages.
    #[serde(default)]
    pub user_metadata: ChatContext,
    pub model: String,
    pub temperature: f32,
    pub chunk_count: usize,
    pub recorded_at: DateTime<Utc>,
}

/// Durable destination for transcripts.
#[async_trait]
pub trait TranscriptSink: Send + Sync {
    /// Persist one record. Failures are logged by the archive worker and dropped.
    async fn write(&self, record: &TranscriptRecord) -> Result<()>;
}
