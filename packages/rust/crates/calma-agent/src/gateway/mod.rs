//! Gateway namespace: HTTP and stdio entrypoints.

mod http;
mod stdio;

pub use http::{
    ChatRequest, ChatResponse, GatewayHealthResponse, GatewayState, resolve_session_key, router,
    run_http, validate_chat_request,
};
pub use stdio::{DEFAULT_STDIO_SESSION_KEY, run_stdio, serve_lines};
