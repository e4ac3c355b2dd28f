//! Stdio gateway: read line from stdin → chat turn → print each chunk on its own line.

use std::sync::Arc;

use anyhow::Result;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncWrite, AsyncWriteExt, BufReader};

use crate::orchestrator::{ChatTurnRequest, ConversationOrchestrator};

/// Default session key when not overridden by flag.
pub const DEFAULT_STDIO_SESSION_KEY: &str = "stdio";

/// Run the line loop over the process stdin/stdout/stderr until EOF.
pub async fn run_stdio(
    orchestrator: Arc<ConversationOrchestrator>,
    session_key: String,
) -> Result<()> {
    serve_lines(
        &orchestrator,
        &session_key,
        BufReader::new(tokio::io::stdin()),
        tokio::io::stdout(),
        tokio::io::stderr(),
    )
    .await
}

/// Treat each non-blank input line as one message of `session_key`.
///
/// Reply chunks go to `output`, one per line. A failed turn is reported on `errors`
/// and the loop moves on to the next line; only I/O failures end it early.
pub async fn serve_lines<R, W, E>(
    orchestrator: &ConversationOrchestrator,
    session_key: &str,
    input: R,
    mut output: W,
    mut errors: E,
) -> Result<()>
where
    R: AsyncBufRead + Unpin,
    W: AsyncWrite + Unpin,
    E: AsyncWrite + Unpin,
{
    let mut lines = input.lines();
    while let Some(line) = lines.next_line().await? {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        match orchestrator
            .handle_message(ChatTurnRequest::new(session_key, line))
            .await
        {
            Ok(reply) => {
                for chunk in &reply.chunks {
                    output.write_all(chunk.as_bytes()).await?;
                    output.write_all(b"\n").await?;
                }
                output.flush().await?;
            }
            Err(error) => {
                errors
                    .write_all(format!("error: {error}\n").as_bytes())
                    .await?;
                errors.flush().await?;
            }
        }
    }
    Ok(())
}
