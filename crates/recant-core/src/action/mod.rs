//! Action abstraction module
//!
//! This module defines the Action trait and related types:
//! - Action: the opaque async operation the engine drives
//! - ActionInput: input payload for one invocation
//! - ActionError: the engine's error taxonomy
//! - ActionOptions: per-invocation configuration

mod error;
mod input;
mod options;

use async_trait::async_trait;
use serde_json::Value;

pub use error::ActionError;
pub use input::ActionInput;
pub use options::ActionOptions;

// Re-export CancellationToken for convenience
pub use tokio_util::sync::CancellationToken;

/// Action trait - an opaque, fallible asynchronous operation
///
/// Actions are black boxes to the [`Executor`](crate::executor::Executor):
/// the engine only observes the returned future. Any error is treated
/// uniformly as "attempt failed" and is eligible for retry.
///
/// Cancellation is cooperative. A running action is never interrupted; the
/// engine discards its result when the invocation's token was cancelled by
/// the time the call settles.
#[async_trait]
pub trait Action: Send + Sync {
    /// Action name, used in logs only (must not affect execution)
    fn name(&self) -> &str;

    /// Run one attempt against the given input
    async fn run(&self, input: ActionInput) -> Result<Value, ActionError>;
}
