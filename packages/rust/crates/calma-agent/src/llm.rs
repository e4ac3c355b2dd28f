//! Generation collaborator: `Generator` seam + OpenAI-compatible chat completions client.

use std::time::Duration;

use anyhow::{Context, Result};
use async_trait::async_trait;
use calma_window::HistoryEntry;
use serde::{Deserialize, Serialize};

use crate::coalescer::ChatContext;
use crate::config::LlmConfig;

/// Mentor persona sent as the first system message of every request.
pub const SYSTEM_PROMPT: &str = "Eres CalmaBot, un mentor académico enfocado en cuidar la salud \
mental y bienestar de estudiantes. Tu objetivo es brindar apoyo empático, sugerir estrategias \
para manejar el estrés académico y acompañar al alumno para que mantenga equilibrio entre sus \
metas escolares y su bienestar personal. Ofrece pasos concretos, reconoce sus esfuerzos y \
promueve hábitos saludables (sueño, pausas activas, pedir ayuda). Evita dar diagnósticos \
médicos; en situaciones serias recomienda acudir a un profesional.\n\n\
Instrucciones de estilo para cada respuesta:\n\
- Comunícate con naturalidad y calidez, como un acompañante humano por chat.\n\
- Usa frases cortas, tono amable, preguntas ligeras y validación emocional.\n\
- Evita conectores formales o lenguaje corporativo (ej. 'por consiguiente', 'en este sentido').\n\
- Utiliza emojis con moderación (máximo uno o dos por mensaje) para transmitir cercanía.\n\
- Entrega tu respuesta en 2 a 4 mensajes diferenciados por saltos de línea dobles. Cada mensaje \
debe ser breve (1 a 3 oraciones).\n\
- La primera sección puede incluir un saludo o acercamiento, la siguiente una \
observación/pregunta, y la última un cierre con compañía o sugerencia suave.\n\
- Si el estudiante comparte su nombre o contexto, úsalo de forma respetuosa.";

const CONTEXT_PREAMBLE: &str = "Información adicional del alumno para apoyar mejor:";

/// Model identity echoed back to chat clients.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ModelMeta {
    pub model: String,
    pub temperature: f32,
}

/// Produces the assistant reply for a conversation.
///
/// Latency is unbounded and failures are expected; callers own any timeout or retry.
#[async_trait]
pub trait Generator: Send + Sync {
    /// Generate a reply from the history (oldest first, current utterances last) and side context.
    async fn generate(&self, history: &[HistoryEntry], context: &ChatContext) -> Result<String>;

    /// Model identity reported alongside replies.
    fn meta(&self) -> ModelMeta;
}

/// One message in OpenAI-compatible chat format.
#[derive(Debug, Clone, Serialize)]
struct WireMessage {
    role: &'static str,
    content: String,
}

/// Request body for chat completions (OpenAI format).
#[derive(Debug, Serialize)]
struct ChatCompletionRequest {
    model: String,
    messages: Vec<WireMessage>,
    temperature: f32,
}

/// Response: choices[0].message.
#[derive(Debug, Deserialize)]
struct ChatCompletionResponse {
    choices: Vec<Choice>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: AssistantMessage,
}

#[derive(Debug, Deserialize)]
struct AssistantMessage {
    #[serde(default)]
    content: Option<String>,
}

/// HTTP client for chat completions.
pub struct LlmClient {
    client: reqwest::Client,
    inference_url: String,
    model: String,
    temperature: f32,
    api_key: Option<String>,
}

impl LlmClient {
    pub fn new(
        inference_url: String,
        model: String,
        temperature: f32,
        api_key: Option<String>,
        request_timeout: Duration,
    ) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(request_timeout)
            .build()
            .context("failed to build LLM http client")?;
        Ok(Self {
            client,
            inference_url,
            model,
            temperature,
            api_key,
        })
    }

    pub fn from_config(config: &LlmConfig) -> Result<Self> {
        Self::new(
            config.inference_url.clone(),
            config.model.clone(),
            config.temperature,
            config.resolve_api_key(),
            Duration::from_secs(config.request_timeout_secs),
        )
    }
}

#[async_trait]
impl Generator for LlmClient {
    async fn generate(&self, history: &[HistoryEntry], context: &ChatContext) -> Result<String> {
        let body = ChatCompletionRequest {
            model: self.model.clone(),
            messages: build_prompt_messages(history, context),
            temperature: self.temperature,
        };
        tracing::debug!(
            history_messages = history.len(),
            context_keys = context.len(),
            model = %self.model,
            "invoking chat model"
        );
        let mut req = self
            .client
            .post(&self.inference_url)
            .json(&body)
            .header("Content-Type", "application/json");
        if let Some(ref key) = self.api_key {
            req = req.header("Authorization", format!("Bearer {key}"));
        }
        let res = req.send().await.context("LLM request failed")?;
        let status = res.status();
        let text = res.text().await.context("LLM response body unreadable")?;
        if !status.is_success() {
            return Err(anyhow::anyhow!("LLM API error {status}: {text}"));
        }
        let parsed: ChatCompletionResponse = serde_json::from_str(&text)
            .map_err(|e| anyhow::anyhow!("LLM response parse error: {e}; body: {text}"))?;
        let content = parsed
            .choices
            .into_iter()
            .next()
            .ok_or_else(|| anyhow::anyhow!("LLM response has no choices"))?
            .message
            .content
            .unwrap_or_default();
        if content.trim().is_empty() {
            return Err(anyhow::anyhow!("LLM returned an empty reply"));
        }
        Ok(content)
    }

    fn meta(&self) -> ModelMeta {
        ModelMeta {
            model: self.model.clone(),
            temperature: self.temperature,
        }
    }
}

/// System prompt, optional context message, then the history.
fn build_prompt_messages(history: &[HistoryEntry], context: &ChatContext) -> Vec<WireMessage> {
    let mut messages = Vec::with_capacity(history.len() + 2);
    messages.push(WireMessage {
        role: "system",
        content: SYSTEM_PROMPT.to_string(),
    });
    if !context.is_empty() {
        let serialized = serde_json::to_string_pretty(context)
            .unwrap_or_else(|_| serde_json::Value::Object(context.clone()).to_string());
        messages.push(WireMessage {
            role: "system",
            content: format!("{CONTEXT_PREAMBLE}\n{serialized}"),
        });
    }
    messages.extend(history.iter().map(|entry| WireMessage {
        role: entry.role.as_str(),
        content: entry.content.clone(),
    }));
    messages
}
