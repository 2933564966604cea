//! ActionHandle - per-handle observable state and supersession scope

use std::sync::{Mutex, MutexGuard, PoisonError};

use serde_json::Value;
use tokio::sync::watch;
use tokio_util::sync::CancellationToken;

use crate::action::ActionError;

/// One invocation's claim on a handle
///
/// The generation is the currency guard: settlement paths write observable
/// state and cache only while their generation is still the handle's current
/// one. The token is this invocation's cooperative cancellation flag.
pub(crate) struct Invocation {
    pub(crate) generation: u64,
    pub(crate) token: CancellationToken,
}

#[derive(Default)]
struct ActiveInvocation {
    generation: u64,
    token: Option<CancellationToken>,
    key: Option<String>,
}

/// Observable state for one logical action call-site
///
/// A handle owns three independently observable slots - `data`, `error` and
/// `is_pending` - and the bookkeeping for its single active invocation.
/// Slots are `tokio::sync::watch` channels: every write synchronously
/// publishes a new value, and publishing with no subscribers is not an
/// error. The engine only ever writes the slots; it never reads them to make
/// decisions, aside from the rollback snapshot and the previous value handed
/// to an optimistic-update function.
///
/// Handles are exclusive to one call-site; concurrent invocations on the
/// same handle supersede each other. Different handles never share slots.
pub struct ActionHandle {
    data: watch::Sender<Option<Value>>,
    error: watch::Sender<Option<ActionError>>,
    pending: watch::Sender<bool>,
    active: Mutex<ActiveInvocation>,
}

impl ActionHandle {
    /// Create a handle with empty state and no associated cache key
    pub fn new() -> Self {
        let (data, _) = watch::channel(None);
        let (error, _) = watch::channel(None);
        let (pending, _) = watch::channel(false);
        Self {
            data,
            error,
            pending,
            active: Mutex::new(ActiveInvocation::default()),
        }
    }

    /// Snapshot of the last committed result
    pub fn data(&self) -> Option<Value> {
        self.data.borrow().clone()
    }

    /// Snapshot of the terminal error of the last settled invocation
    pub fn error(&self) -> Option<ActionError> {
        self.error.borrow().clone()
    }

    /// True while an invocation on this handle is unsettled
    pub fn is_pending(&self) -> bool {
        *self.pending.borrow()
    }

    /// Subscribe to `data` changes
    pub fn watch_data(&self) -> watch::Receiver<Option<Value>> {
        self.data.subscribe()
    }

    /// Subscribe to `error` changes
    pub fn watch_error(&self) -> watch::Receiver<Option<ActionError>> {
        self.error.subscribe()
    }

    /// Subscribe to `is_pending` changes
    pub fn watch_pending(&self) -> watch::Receiver<bool> {
        self.pending.subscribe()
    }

    /// The cache key recorded by mount or by the most recent keyed
    /// invocation
    pub fn key(&self) -> Option<String> {
        self.active().key.clone()
    }

    // A poisoned lock only means some writer panicked mid-update; the
    // bookkeeping itself stays usable.
    fn active(&self) -> MutexGuard<'_, ActiveInvocation> {
        self.active.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Start a new invocation: cancel the previous one, bump the
    /// generation, and mark the handle pending.
    ///
    /// The previous invocation settles with `Aborted` on its own schedule;
    /// it observes the cancelled token at its next check point and its
    /// stale generation keeps it from writing state.
    pub(crate) fn begin(&self, key: Option<String>) -> Invocation {
        let mut active = self.active();
        if let Some(superseded) = active.token.take() {
            superseded.cancel();
        }
        active.generation += 1;
        let token = CancellationToken::new();
        active.token = Some(token.clone());
        if key.is_some() {
            active.key = key;
        }
        let invocation = Invocation {
            generation: active.generation,
            token,
        };
        drop(active);
        self.pending.send_replace(true);
        invocation
    }

    pub(crate) fn is_current(&self, generation: u64) -> bool {
        self.active().generation == generation
    }

    pub(crate) fn set_data(&self, value: Option<Value>) {
        self.data.send_replace(value);
    }

    pub(crate) fn set_error(&self, error: Option<ActionError>) {
        self.error.send_replace(error);
    }

    /// Record the handle's associated cache key (mount)
    pub(crate) fn bind_key(&self, key: String) {
        self.active().key = Some(key);
    }

    /// Settle an invocation: clears `is_pending` and releases the token,
    /// but only when the invocation is still current - a superseded
    /// invocation's settlement must not clear the newer invocation's
    /// pending flag.
    pub(crate) fn settle(&self, generation: u64) {
        let mut active = self.active();
        if active.generation == generation {
            active.token = None;
            drop(active);
            self.pending.send_replace(false);
        }
    }

    /// Cancel the active invocation's token, if any. The invocation stays
    /// current, so its abort path performs the rollback-or-clear.
    pub(crate) fn cancel_active(&self) {
        if let Some(token) = &self.active().token {
            token.cancel();
        }
    }

    /// Reset the handle: cancel and de-current any in-flight invocation,
    /// clear all three slots, and return the associated key so the caller
    /// can invalidate the cache entry.
    pub(crate) fn clear(&self) -> Option<String> {
        let mut active = self.active();
        if let Some(token) = active.token.take() {
            token.cancel();
        }
        // Bumping past the in-flight generation keeps the aborted
        // invocation from resurrecting state after the reset.
        active.generation += 1;
        let key = active.key.clone();
        drop(active);
        self.data.send_replace(None);
        self.error.send_replace(None);
        self.pending.send_replace(false);
        key
    }
}

impl Default for ActionHandle {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for ActionHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ActionHandle")
            .field("data", &*self.data.borrow())
            .field("is_pending", &*self.pending.borrow())
            .finish_non_exhaustive()
    }
}
