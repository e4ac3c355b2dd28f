use calma_window::HistoryEntry;
use chrono::Utc;

use crate::archive::TranscriptRecord;
use crate::chunking::split_response;
use crate::coalescer::Collected;
use crate::error::ChatError;
use crate::observability::SessionEvent;

use super::ConversationOrchestrator;
use super::types::{ChatTurnReply, ChatTurnRequest, FALLBACK_REPLY, TurnOutcome};

impl ConversationOrchestrator {
    /// Run one inbound message through the pipeline.
    ///
    /// Empty messages return an empty reply immediately; whitespace-only text is a normal message. Otherwise the caller waits
    /// for its coalescing window; non-primary callers get an empty `buffered` reply,
    /// the primary caller generates the reply for the whole bundle. Session memory is
    /// only written after generation succeeds.
    pub async fn handle_message(
        &self,
        request: ChatTurnRequest,
    ) -> Result<ChatTurnReply, ChatError> {
        let ChatTurnRequest {
            session_key,
            message,
            context,
            metadata,
        } = request;
        let meta = self.generator.meta();

        if message.is_empty() {
            tracing::debug!(
                event = SessionEvent::TurnSkipped.as_str(),
                session_key = %session_key,
                "empty chat message skipped"
            );
            return Ok(ChatTurnReply::empty(
                session_key,
                0,
                meta,
                TurnOutcome::Skipped,
            ));
        }

        let Collected { bundle, is_primary } =
            self.coalescer.collect(&session_key, &message, context).await?;
        let queued_count = bundle.queued_count();

        if !is_primary {
            tracing::debug!(
                event = SessionEvent::TurnBuffered.as_str(),
                session_key = %session_key,
                queued_count,
                "chat message buffered into primary turn"
            );
            return Ok(ChatTurnReply::empty(
                session_key,
                queued_count,
                meta,
                TurnOutcome::Buffered,
            ));
        }

        let mut prompt_history = self.memory.get(&session_key);
        let prior_messages = prompt_history.len();
        prompt_history.extend(bundle.utterances.iter().cloned().map(HistoryEntry::user));

        let reply = match self
            .generator
            .generate(&prompt_history, &bundle.context)
            .await
        {
            Ok(reply) => reply,
            Err(error) => {
                tracing::warn!(
                    event = SessionEvent::TurnGenerationFailed.as_str(),
                    session_key = %session_key,
                    utterances = bundle.len(),
                    error = ?error,
                    "assistant generation failed; session memory untouched"
                );
                return Err(ChatError::generation(&session_key, error));
            }
        };

        self.memory.append_many(
            &session_key,
            bundle
                .utterances
                .iter()
                .cloned()
                .map(HistoryEntry::user)
                .chain(std::iter::once(HistoryEntry::assistant(reply.clone()))),
        );

        let mut chunks = split_response(&reply, self.chunking);
        if chunks.is_empty() {
            tracing::warn!(
                event = SessionEvent::TurnFallbackReply.as_str(),
                session_key = %session_key,
                "assistant reply produced no chunks; sending fallback"
            );
            chunks.push(FALLBACK_REPLY.to_string());
        }

        if let Some(archive) = &self.archive {
            archive.submit(TranscriptRecord {
                session_key: session_key.clone(),
                utterances: bundle.utterances.clone(),
                reply,
                user_metadata: metadata,
                model: meta.model.clone(),
                temperature: meta.temperature,
                chunk_count: chunks.len(),
                recorded_at: Utc::now(),
            });
        }

        tracing::info!(
            event = SessionEvent::TurnRecorded.as_str(),
            session_key = %session_key,
            utterances = bundle.len(),
            prior_messages,
            chunks = chunks.len(),
            "chat turn recorded"
        );
        Ok(ChatTurnReply::recorded(session_key, chunks, queued_count, meta))
    }
}
