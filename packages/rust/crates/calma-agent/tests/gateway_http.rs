//! HTTP gateway integration tests: validation (400), status mapping, response shape.
//! Uses a scripted generator so no model endpoint is required.

use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use async_trait::async_trait;
use axum::Router;
use axum::body::Body;
use axum::body::to_bytes;
use axum::http::{Request, StatusCode};
use calma_agent::{
    ChatConfig, ChatContext, ConversationOrchestrator, Generator, HistoryEntry, ModelMeta, router,
};
use serde_json::{Value, json};
use tower::ServiceExt;

enum Script {
    Reply(&'static str),
    Fail(&'static str),
    Stall(Duration),
}

struct ScriptedGenerator(Script);

#[async_trait]
impl Generator for ScriptedGenerator {
    async fn generate(&self, _history: &[HistoryEntry], _context: &ChatContext) -> Result<String> {
        match self.0 {
            Script::Reply(reply) => Ok(reply.to_string()),
            Script::Fail(error) => Err(anyhow::anyhow!(error)),
            Script::Stall(delay) => {
                tokio::time::sleep(delay).await;
                Ok("too late".to_string())
            }
        }
    }

    fn meta(&self) -> ModelMeta {
        ModelMeta {
            model: "gpt-4o-mini".to_string(),
            temperature: 0.7,
        }
    }
}

fn chat_config() -> ChatConfig {
    ChatConfig {
        buffer_window: Duration::from_millis(100),
        turn_timeout: Duration::from_secs(5),
        max_message_chars: 50,
        ..ChatConfig::default()
    }
}

fn app_with(script: Script) -> Router {
    let config = chat_config();
    let orchestrator = Arc::new(ConversationOrchestrator::new(
        &config,
        Arc::new(ScriptedGenerator(script)),
    ));
    router(orchestrator, &config)
}

async fn post_chat(app: Router, body: Value) -> (StatusCode, Option<Value>) {
    let response = app
        .oneshot(
            Request::post("/api/chat")
                .header("content-type", "application/json")
                .body(Body::from(body.to_string()))
                .unwrap(),
        )
        .await
        .unwrap();
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    (status, serde_json::from_slice(&bytes).ok())
}

#[tokio::test(start_paused = true)]
async fn chat_returns_chunked_reply_for_conversation() {
    let app = app_with(Script::Reply("¡Hola Ana!\n\n¿Qué tal el examen?"));

    let (status, payload) =
        post_chat(app, json!({"message": "hola", "conversation_id": "conv-1"})).await;

    assert_eq!(status, StatusCode::OK);
    let payload = payload.expect("json body");
    assert_eq!(
        payload["responses"],
        json!(["¡Hola Ana!", "¿Qué tal el examen?"])
    );
    assert_eq!(payload["response"], json!("¡Hola Ana!"));
    assert_eq!(payload["conversation_id"], json!("conv-1"));
    assert_eq!(payload["queued_messages"], json!(0));
    assert_eq!(payload["buffered"], json!(false));
    assert_eq!(payload["ai_metadata"]["model"], json!("gpt-4o-mini"));
}

#[tokio::test(start_paused = true)]
async fn chat_issues_memory_key_when_conversation_id_missing() {
    let app = app_with(Script::Reply("¡Hola!"));

    let (status, payload) = post_chat(app, json!({"message": "hola"})).await;

    assert_eq!(status, StatusCode::OK);
    let conversation_id = payload
        .as_ref()
        .and_then(|payload| payload["conversation_id"].as_str())
        .expect("conversation_id");
    assert!(conversation_id.starts_with("mem-"), "{conversation_id}");
}

#[tokio::test(start_paused = true)]
async fn chat_returns_400_for_oversized_message() {
    let app = app_with(Script::Reply("unused"));

    let (status, _) = post_chat(app, json!({"message": "a".repeat(51)})).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test(start_paused = true)]
async fn chat_accepts_message_at_length_limit() {
    let app = app_with(Script::Reply("ok"));

    let (status, _) = post_chat(app, json!({"message": "ñ".repeat(50)})).await;

    assert_eq!(status, StatusCode::OK);
}

#[tokio::test(start_paused = true)]
async fn chat_returns_empty_reply_for_empty_message() {
    let app = app_with(Script::Fail("must not be called"));

    let (status, payload) = post_chat(app, json!({"message": ""})).await;

    assert_eq!(status, StatusCode::OK);
    let payload = payload.expect("json body");
    assert_eq!(payload["responses"], json!([]));
    assert_eq!(payload["response"], json!(""));
}

#[tokio::test(start_paused = true)]
async fn chat_returns_502_when_generation_fails() {
    let app = app_with(Script::Fail("upstream unavailable"));

    let (status, _) = post_chat(app, json!({"message": "hola"})).await;

    assert_eq!(status, StatusCode::BAD_GATEWAY);
}

#[tokio::test(start_paused = true)]
async fn chat_returns_504_when_turn_times_out() {
    let app = app_with(Script::Stall(Duration::from_secs(60)));

    let (status, _) = post_chat(app, json!({"message": "hola"})).await;

    assert_eq!(status, StatusCode::GATEWAY_TIMEOUT);
}

#[tokio::test]
async fn chat_returns_422_for_missing_message_field() {
    let app = app_with(Script::Reply("unused"));

    let (status, _) = post_chat(app, json!({"conversation_id": "conv-1"})).await;

    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
}

#[tokio::test]
async fn gateway_returns_404_for_unknown_route() {
    let app = app_with(Script::Reply("unused"));

    let response = app
        .oneshot(Request::get("/unknown").body(Body::empty()).unwrap())
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn gateway_health_returns_structured_summary() {
    let app = app_with(Script::Reply("unused"));

    let response = app
        .oneshot(Request::get("/health").body(Body::empty()).unwrap())
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let payload: Value = serde_json::from_slice(&bytes).expect("json body");

    assert_eq!(payload["status"], json!("healthy"));
    assert_eq!(payload["buffer_window_ms"], json!(100));
    assert_eq!(payload["active_batches"], json!(0));
    assert_eq!(payload["active_sessions"], json!(0));
    assert_eq!(payload["memory_max_messages"], json!(20));
    assert_eq!(payload["session_ttl_secs"], json!(1800));
}
