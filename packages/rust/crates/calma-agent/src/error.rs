//! Caller-visible failures of a chat turn.

use thiserror::Error;

/// Boxed source error kept on [`ChatError::Generation`].
pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Errors surfaced by the coalescer and the orchestrator.
///
/// Empty messages are not an error: they short-circuit to a trivial reply.
/// Archive write failures are logged by the archive worker and never reach callers.
#[derive(Debug, Error)]
pub enum ChatError {
    /// A waiter woke up and its batch record was gone. Broken invariant, never expected.
    #[error("coalescing state inconsistent for session {session_key}: batch {batch_id} missing on wake")]
    CoalescingInconsistency {
        /// Session whose batch vanished.
        session_key: String,
        /// Batch the waiter had joined.
        batch_id: u64,
    },

    /// The generation collaborator failed; session memory was left untouched.
    #[error("generation failed for session {session_key}: {source}")]
    Generation {
        /// Session of the failed turn.
        session_key: String,
        /// Underlying failure.
        #[source]
        source: BoxError,
    },
}

impl ChatError {
    pub(crate) fn generation(session_key: &str, error: anyhow::Error) -> Self {
        Self::Generation {
            session_key: session_key.to_string(),
            source: error.into(),
        }
    }

    /// Session the failure belongs to.
    #[must_use]
    pub fn session_key(&self) -> &str {
        match self {
            Self::CoalescingInconsistency { session_key, .. }
            | Self::Generation { session_key, .. } => session_key,
        }
    }
}
