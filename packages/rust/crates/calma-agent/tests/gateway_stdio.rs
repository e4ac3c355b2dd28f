#![allow(missing_docs)]

use std::collections::VecDeque;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use anyhow::Result;
use async_trait::async_trait;
use calma_agent::{
    ChatConfig, ChatContext, ConversationOrchestrator, Generator, HistoryEntry, ModelMeta,
    serve_lines,
};

struct ScriptedGenerator {
    replies: Mutex<VecDeque<Result<&'static str, &'static str>>>,
    calls: Mutex<Vec<Vec<HistoryEntry>>>,
}

impl ScriptedGenerator {
    fn new(replies: Vec<Result<&'static str, &'static str>>) -> Arc<Self> {
        Arc::new(Self {
            replies: Mutex::new(replies.into()),
            calls: Mutex::new(Vec::new()),
        })
    }

    fn calls(&self) -> Vec<Vec<HistoryEntry>> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl Generator for ScriptedGenerator {
    async fn generate(&self, history: &[HistoryEntry], _context: &ChatContext) -> Result<String> {
        self.calls.lock().unwrap().push(history.to_vec());
        match self.replies.lock().unwrap().pop_front() {
            Some(Ok(reply)) => Ok(reply.to_string()),
            Some(Err(error)) => Err(anyhow::anyhow!(error)),
            None => Err(anyhow::anyhow!("script exhausted")),
        }
    }

    fn meta(&self) -> ModelMeta {
        ModelMeta {
            model: "scripted".to_string(),
            temperature: 0.7,
        }
    }
}

fn orchestrator(generator: Arc<ScriptedGenerator>) -> ConversationOrchestrator {
    let config = ChatConfig {
        buffer_window: Duration::from_millis(100),
        ..ChatConfig::default()
    };
    ConversationOrchestrator::new(&config, generator)
}

#[tokio::test(start_paused = true)]
async fn each_chunk_is_written_on_its_own_line() -> Result<()> {
    let generator = ScriptedGenerator::new(vec![Ok("¡Hola!\n\n¿Cómo va la semana?")]);
    let orchestrator = orchestrator(generator);
    let mut output = Vec::new();
    let mut errors = Vec::new();

    serve_lines(
        &orchestrator,
        "cli",
        "hola\n".as_bytes(),
        &mut output,
        &mut errors,
    )
    .await?;

    assert_eq!(String::from_utf8(output)?, "¡Hola!\n¿Cómo va la semana?\n");
    assert!(errors.is_empty());
    Ok(())
}

#[tokio::test(start_paused = true)]
async fn blank_lines_are_skipped() -> Result<()> {
    let generator = ScriptedGenerator::new(vec![Ok("Uno."), Ok("Dos.")]);
    let orchestrator = orchestrator(generator.clone());
    let mut output = Vec::new();

    serve_lines(
        &orchestrator,
        "cli",
        "\n   \nprimero\n\t\n  segundo  \n".as_bytes(),
        &mut output,
        tokio::io::sink(),
    )
    .await?;

    assert_eq!(String::from_utf8(output)?, "Uno.\nDos.\n");
    let calls = generator.calls();
    assert_eq!(calls.len(), 2);
    assert_eq!(
        calls[1].last().map(|entry| entry.content.as_str()),
        Some("segundo")
    );
    Ok(())
}

#[tokio::test(start_paused = true)]
async fn failed_turn_is_reported_and_loop_continues() -> Result<()> {
    let generator = ScriptedGenerator::new(vec![
        Ok("¡Hola!"),
        Err("upstream unavailable"),
        Ok("Cuídate mucho."),
    ]);
    let orchestrator = orchestrator(generator.clone());
    let mut output = Vec::new();
    let mut errors = Vec::new();

    serve_lines(
        &orchestrator,
        "cli",
        "hola\n¿sigues ahí?\nadiós\n".as_bytes(),
        &mut output,
        &mut errors,
    )
    .await?;

    assert_eq!(String::from_utf8(output)?, "¡Hola!\nCuídate mucho.\n");
    let errors = String::from_utf8(errors)?;
    assert!(errors.starts_with("error: "), "{errors}");
    assert!(errors.contains("upstream unavailable"), "{errors}");
    assert_eq!(generator.calls().len(), 3);

    let history: Vec<_> = orchestrator
        .memory()
        .get("cli")
        .into_iter()
        .map(|entry| entry.content)
        .collect();
    assert_eq!(history, vec!["hola", "¡Hola!", "adiós", "Cuídate mucho."]);
    Ok(())
}
