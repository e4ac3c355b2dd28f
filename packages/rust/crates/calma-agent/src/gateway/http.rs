//! HTTP gateway: POST /api/chat → chat turn → JSON reply.
//!
//! Oversized messages get 400; empty messages get an empty 200 reply. Each turn is
//! bounded by the configured timeout (504); generation failures map to 502.

use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use axum::{
    Json, Router,
    extract::State,
    http::StatusCode,
    routing::{get, post},
};
use serde::{Deserialize, Serialize};
use tokio::net::TcpListener;

use crate::coalescer::ChatContext;
use crate::config::ChatConfig;
use crate::error::ChatError;
use crate::llm::ModelMeta;
use crate::observability::SessionEvent;
use crate::orchestrator::{ChatTurnRequest, ConversationOrchestrator};

/// Request body for POST /api/chat.
#[derive(Debug, Deserialize)]
pub struct ChatRequest {
    pub message: String,
    /// Conversation to continue; a new `mem-<uuid>` key is issued when absent.
    #[serde(default)]
    pub conversation_id: Option<String>,
    #[serde(default)]
    pub context: ChatContext,
    #[serde(default)]
    pub metadata: ChatContext,
}

/// Response body for POST /api/chat.
#[derive(Debug, Serialize)]
pub struct ChatResponse {
    pub responses: Vec<String>,
    pub response: String,
    pub conversation_id: String,
    pub queued_messages: usize,
    pub buffered: bool,
    pub ai_metadata: ModelMeta,
}

/// Response body for GET /health.
#[derive(Debug, Serialize)]
pub struct GatewayHealthResponse {
    pub status: &'static str,
    pub buffer_window_ms: u64,
    pub active_batches: usize,
    pub active_sessions: usize,
    pub memory_max_messages: usize,
    pub session_ttl_secs: u64,
}

/// Shared state for the HTTP server.
#[derive(Clone)]
pub struct GatewayState {
    pub orchestrator: Arc<ConversationOrchestrator>,
    pub turn_timeout: Duration,
    pub max_message_chars: usize,
}

/// Session key for a request: the trimmed `conversation_id`, or a fresh `mem-<uuid>`.
pub fn resolve_session_key(conversation_id: Option<&str>) -> String {
    conversation_id
        .map(str::trim)
        .filter(|id| !id.is_empty())
        .map_or_else(|| format!("mem-{}", uuid::Uuid::new_v4()), ToString::to_string)
}

/// Validate a chat request; returns the session key to use.
///
/// Empty messages are accepted (they produce an empty reply); only the length cap is enforced.
pub fn validate_chat_request(
    body: &ChatRequest,
    max_message_chars: usize,
) -> Result<String, (StatusCode, String)> {
    if body.message.chars().count() > max_message_chars {
        return Err((
            StatusCode::BAD_REQUEST,
            format!("message must be at most {max_message_chars} characters"),
        ));
    }
    Ok(resolve_session_key(body.conversation_id.as_deref()))
}

async fn handle_chat(
    State(state): State<GatewayState>,
    Json(body): Json<ChatRequest>,
) -> Result<Json<ChatResponse>, (StatusCode, String)> {
    let session_key = validate_chat_request(&body, state.max_message_chars)?;
    let request = ChatTurnRequest {
        session_key,
        message: body.message,
        context: body.context,
        metadata: body.metadata,
    };

    let reply = match tokio::time::timeout(
        state.turn_timeout,
        state.orchestrator.handle_message(request),
    )
    .await
    {
        Ok(Ok(reply)) => reply,
        Ok(Err(error @ ChatError::Generation { .. })) => {
            return Err((
                StatusCode::BAD_GATEWAY,
                format!("the assistant could not answer: {error}"),
            ));
        }
        Ok(Err(error)) => {
            tracing::error!(
                session_key = %error.session_key(),
                error = %error,
                "chat turn failed on broken coalescer state"
            );
            return Err((StatusCode::INTERNAL_SERVER_ERROR, error.to_string()));
        }
        Err(_) => {
            return Err((
                StatusCode::GATEWAY_TIMEOUT,
                format!(
                    "chat turn timed out after {}s",
                    state.turn_timeout.as_secs()
                ),
            ));
        }
    };

    Ok(Json(ChatResponse {
        response: reply.primary_chunk,
        responses: reply.chunks,
        conversation_id: reply.session_key,
        queued_messages: reply.queued_count,
        buffered: reply.buffered,
        ai_metadata: reply.meta,
    }))
}

async fn handle_health(State(state): State<GatewayState>) -> Json<GatewayHealthResponse> {
    let orchestrator = &state.orchestrator;
    Json(GatewayHealthResponse {
        status: "healthy",
        buffer_window_ms: u64::try_from(orchestrator.coalescer().window().as_millis())
            .unwrap_or(u64::MAX),
        active_batches: orchestrator.coalescer().active_batches(),
        active_sessions: orchestrator.memory().active_sessions(),
        memory_max_messages: orchestrator.memory().max_messages(),
        session_ttl_secs: orchestrator.memory().ttl().as_secs(),
    })
}

/// Build the gateway router (POST /api/chat, GET /health).
pub fn router(orchestrator: Arc<ConversationOrchestrator>, config: &ChatConfig) -> Router {
    let state = GatewayState {
        orchestrator,
        turn_timeout: config.turn_timeout,
        max_message_chars: config.max_message_chars,
    };
    Router::new()
        .route("/health", get(handle_health))
        .route("/api/chat", post(handle_chat))
        .with_state(state)
}

/// Run the HTTP server on `bind_addr` until Ctrl+C / SIGTERM; in-flight requests complete first.
pub async fn run_http(
    orchestrator: Arc<ConversationOrchestrator>,
    bind_addr: &str,
    config: &ChatConfig,
) -> Result<()> {
    let app = router(orchestrator, config);
    let listener = TcpListener::bind(bind_addr)
        .await
        .with_context(|| format!("failed to bind gateway on {bind_addr}"))?;
    tracing::info!(
        event = SessionEvent::GatewayStarted.as_str(),
        bind_addr,
        buffer_window_ms = u64::try_from(config.buffer_window.as_millis()).unwrap_or(u64::MAX),
        turn_timeout_secs = config.turn_timeout.as_secs(),
        "gateway listening (Ctrl+C/SIGTERM to stop)"
    );
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;
    tracing::info!(
        event = SessionEvent::GatewayStopped.as_str(),
        "gateway stopped"
    );
    Ok(())
}

async fn shutdown_signal() {
    #[cfg(unix)]
    {
        use tokio::signal::unix::{SignalKind, signal};
        let ctrl_c = tokio::signal::ctrl_c();
        match signal(SignalKind::terminate()) {
            Ok(mut sigterm) => {
                tokio::select! {
                    _ = ctrl_c => {}
                    _ = sigterm.recv() => {}
                }
            }
            Err(error) => {
                tracing::warn!("failed to listen for SIGTERM: {error}");
                let _ = ctrl_c.await;
            }
        }
    }
    #[cfg(not(unix))]
    {
        if let Err(error) = tokio::signal::ctrl_c().await {
            tracing::warn!("failed to listen for Ctrl+C: {error}");
        }
    }
}
