//! ActionError type definition

use thiserror::Error;

/// Terminal errors surfaced by the engine
///
/// Two kinds exist so callers can tell "the operation itself failed" from
/// "this invocation lost the race":
/// - [`ActionError::Failed`]: a rejection from the opaque action, surfaced
///   once the retry budget is exhausted
/// - [`ActionError::Aborted`]: the invocation was cancelled, either
///   explicitly or because a newer invocation on the same handle superseded
///   it
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ActionError {
    #[error("action failed: {0}")]
    Failed(String),

    #[error("invocation aborted")]
    Aborted,
}

impl ActionError {
    /// Convenience: create a failure from any displayable error
    pub fn failed(message: impl Into<String>) -> Self {
        Self::Failed(message.into())
    }

    /// Check if the error is an action failure
    pub fn is_failed(&self) -> bool {
        matches!(self, Self::Failed(_))
    }

    /// Check if the error marks a cancelled invocation
    pub fn is_aborted(&self) -> bool {
        matches!(self, Self::Aborted)
    }
}
