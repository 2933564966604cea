//! # Recant Core
//!
//! Core engine for optimistic, cached, cancellable action execution.
//!
//! This crate contains:
//! - The [`Action`] trait: an opaque, fallible async operation
//! - [`ActionOptions`]: per-invocation configuration (key, retries,
//!   optimistic update, lifecycle callbacks)
//! - [`ActionHandle`]: per-handle observable state and supersession scope
//! - [`Executor`]: the per-invocation state machine (optimistic apply,
//!   attempt loop, rollback, cache synchronization)
//! - The [`CacheStore`] trait: shared key→value result cache with prefetch
//!
//! This crate does NOT care about:
//! - How `data`/`error`/`is_pending` are rendered
//! - What the action actually does (network, database, anything async)
//! - How the cache is backed (see the `recant-stores` crate)

pub mod action;
pub mod executor;
pub mod store;

/// Prelude for convenient imports
pub mod prelude {
    pub use crate::action::{Action, ActionError, ActionInput, ActionOptions, CancellationToken};
    pub use crate::executor::{ActionHandle, Executor};
    pub use crate::store::CacheStore;
}

// Re-export key types at crate root
pub use action::{Action, ActionError, ActionInput, ActionOptions};
pub use executor::{ActionHandle, Executor};
pub use store::CacheStore;
