//! Observability helpers: stable structured-log event identifiers.

mod session_events;

pub(crate) use session_events::SessionEvent;
