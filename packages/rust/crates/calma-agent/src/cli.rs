use std::path::PathBuf;

use clap::{Parser, Subcommand};

use calma_agent::DEFAULT_STDIO_SESSION_KEY;

#[derive(Parser)]
#[command(name = "calma-agent")]
#[command(about = "Wellbeing chat agent: coalesced turns over HTTP or stdio.")]
pub(crate) struct Cli {
    /// Override config directory (reads `<conf>/calma/settings.yaml`).
    #[arg(long, global = true)]
    pub(crate) conf: Option<PathBuf>,

    /// Debug logging for calma_agent (ignored when RUST_LOG is set).
    #[arg(long, short, global = true)]
    pub(crate) verbose: bool,

    #[command(subcommand)]
    pub(crate) command: Command,
}

#[derive(Subcommand)]
pub(crate) enum Command {
    /// Run HTTP server (POST /api/chat, GET /health). Default bind: 0.0.0.0:8000
    Gateway {
        /// Listen address; falls back to `gateway.bind`, then 0.0.0.0:8000
        #[arg(long)]
        bind: Option<String>,

        /// Per-turn timeout in seconds (default: `chat.turn_timeout_secs` or 120)
        #[arg(long)]
        turn_timeout: Option<u64>,
    },
    /// Read lines from stdin, print each reply chunk on its own line. Exit on EOF.
    Stdio {
        /// Conversation key for the whole stdin session
        #[arg(long, default_value = DEFAULT_STDIO_SESSION_KEY)]
        session_id: String,
    },
}
