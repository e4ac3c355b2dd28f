use std::sync::Arc;

use calma_agent::{ChatConfig, RuntimeSettings, run_stdio};

use crate::orchestrator_builder::{build_orchestrator, shutdown};

pub(crate) async fn run_stdio_mode(
    session_id: String,
    runtime_settings: &RuntimeSettings,
) -> anyhow::Result<()> {
    let chat_config = ChatConfig::from_settings(runtime_settings);
    let built = build_orchestrator(&chat_config, runtime_settings)?;
    let result = run_stdio(Arc::clone(&built.orchestrator), session_id).await;
    shutdown(built).await;
    result
}
