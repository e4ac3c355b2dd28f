use std::sync::Arc;
use std::time::Duration;

use calma_agent::{ChatConfig, RuntimeSettings, run_http};

use crate::orchestrator_builder::{build_orchestrator, shutdown};

const DEFAULT_GATEWAY_BIND: &str = "0.0.0.0:8000";

pub(crate) async fn run_gateway_mode(
    bind: Option<String>,
    turn_timeout: Option<u64>,
    runtime_settings: &RuntimeSettings,
) -> anyhow::Result<()> {
    let mut chat_config = ChatConfig::from_settings(runtime_settings);
    if let Some(secs) = turn_timeout {
        chat_config.turn_timeout = Duration::from_secs(secs.max(1));
    }
    let bind_addr = bind
        .or_else(|| runtime_settings.gateway.bind.clone())
        .unwrap_or_else(|| DEFAULT_GATEWAY_BIND.to_string());

    let built = build_orchestrator(&chat_config, runtime_settings)?;
    let result = run_http(Arc::clone(&built.orchestrator), &bind_addr, &chat_config).await;
    shutdown(built).await;
    result
}
