use std::sync::Arc;

use anyhow::Result;
use tokio::task::JoinHandle;

use calma_agent::{
    ArchiveConfig, ChatConfig, ConversationOrchestrator, JsonlTranscriptSink, LlmClient,
    LlmConfig, RuntimeSettings, TranscriptArchive,
};

pub(crate) struct BuiltOrchestrator {
    pub(crate) orchestrator: Arc<ConversationOrchestrator>,
    /// Archive worker; finishes once the orchestrator is dropped and the queue drains.
    pub(crate) archive_worker: Option<JoinHandle<()>>,
}

pub(crate) fn build_orchestrator(
    chat_config: &ChatConfig,
    runtime_settings: &RuntimeSettings,
) -> Result<BuiltOrchestrator> {
    let llm_config = LlmConfig::from_settings(runtime_settings);
    if llm_config.resolve_api_key().is_none() {
        tracing::warn!(
            inference_url = %llm_config.inference_url,
            "no api key configured (llm.api_key / OPENAI_API_KEY); requests go out unauthenticated"
        );
    }
    let generator = Arc::new(LlmClient::from_config(&llm_config)?);
    let mut orchestrator = ConversationOrchestrator::new(chat_config, generator);

    let archive_config = ArchiveConfig::from_settings(runtime_settings);
    let archive_worker = if archive_config.enabled {
        let sink = Arc::new(JsonlTranscriptSink::new(archive_config.path.clone()));
        let (archive, worker) = TranscriptArchive::start(sink, archive_config.queue_capacity);
        orchestrator = orchestrator.with_archive(archive);
        tracing::info!(
            path = %archive_config.path.display(),
            queue_capacity = archive_config.queue_capacity,
            "transcript archive enabled"
        );
        Some(worker)
    } else {
        None
    };

    tracing::info!(
        model = %llm_config.model,
        buffer_window_ms = u64::try_from(chat_config.buffer_window.as_millis()).unwrap_or(u64::MAX),
        memory_max_messages = chat_config.memory_max_messages,
        session_ttl_secs = chat_config.session_ttl.as_secs(),
        "chat orchestrator ready"
    );
    Ok(BuiltOrchestrator {
        orchestrator: Arc::new(orchestrator),
        archive_worker,
    })
}

/// Drop the orchestrator and give the archive worker a bounded chance to flush.
pub(crate) async fn shutdown(built: BuiltOrchestrator) {
    let BuiltOrchestrator {
        orchestrator,
        archive_worker,
    } = built;
    drop(orchestrator);
    if let Some(worker) = archive_worker
        && tokio::time::timeout(std::time::Duration::from_secs(5), worker)
            .await
            .is_err()
    {
        tracing::warn!("transcript archive did not drain within 5s");
    }
}
