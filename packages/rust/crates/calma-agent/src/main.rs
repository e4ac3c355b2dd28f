//! calma-agent CLI: gateway or stdio mode.
//!
//! Settings from `packages/conf/settings.yaml`, overridden by `<conf>/calma/settings.yaml`.
//!
//! Logging: set `RUST_LOG=calma_agent=info` (or `warn`, `debug`) to see agent logs on stderr.

mod cli;
mod nodes;
mod orchestrator_builder;

use clap::Parser;
use tracing_subscriber::EnvFilter;

use calma_agent::{load_runtime_settings, set_config_home_override};

use crate::cli::{Cli, Command};
use crate::nodes::{run_gateway_mode, run_stdio_mode};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    if let Some(conf_dir) = cli.conf.clone() {
        set_config_home_override(conf_dir);
    }

    // RUST_LOG overrides; --verbose => debug; else info
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        EnvFilter::new(if cli.verbose {
            "calma_agent=debug"
        } else {
            "calma_agent=info"
        })
    });
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init();

    let runtime_settings = load_runtime_settings();

    match cli.command {
        Command::Gateway { bind, turn_timeout } => {
            run_gateway_mode(bind, turn_timeout, &runtime_settings).await
        }
        Command::Stdio { session_id } => run_stdio_mode(session_id, &runtime_settings).await,
    }
}
