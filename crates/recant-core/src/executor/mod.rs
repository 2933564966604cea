//! Executor module
//!
//! The Executor runs one action invocation to completion:
//! - Supersession of the previous invocation on the same handle
//! - Optimistic apply and rollback
//! - Sequential attempt loop with immediate retry
//! - Cache and observable-state synchronization at settlement

mod handle;

use std::sync::Arc;

use serde_json::Value;

use crate::action::{Action, ActionError, ActionInput, ActionOptions};
use crate::store::CacheStore;

pub use handle::ActionHandle;
use handle::Invocation;

/// The executor - drives the per-invocation state machine
///
/// `Idle → OptimisticApplied → Attempting(n) → {Succeeded | RetryExhausted | Aborted}`
///
/// One executor is shared by any number of handles; the cache store is the
/// only state they share. Every commit point re-checks the invocation's
/// cancellation token and generation, so a superseded invocation can fire
/// its callbacks and reject without ever overwriting the newer invocation's
/// state.
pub struct Executor {
    cache: Arc<dyn CacheStore>,
    default_retries: u32,
}

impl Executor {
    /// Create an executor over a shared cache store
    pub fn new(cache: Arc<dyn CacheStore>) -> Self {
        Self {
            cache,
            default_retries: 0,
        }
    }

    /// Retry budget applied when an invocation does not configure its own
    pub fn with_default_retries(mut self, retries: u32) -> Self {
        self.default_retries = retries;
        self
    }

    /// The shared cache store
    pub fn cache(&self) -> &Arc<dyn CacheStore> {
        &self.cache
    }

    /// Create an unbound handle with empty observable state
    pub fn handle(&self) -> ActionHandle {
        ActionHandle::new()
    }

    /// Create a handle bound to a cache key, seeding `data` from the cache
    pub fn handle_with_key(&self, key: impl Into<String>) -> ActionHandle {
        let key = key.into();
        let handle = ActionHandle::new();
        if let Some(cached) = self.cache.get(&key) {
            handle.set_data(Some(cached));
        }
        handle.bind_key(key);
        handle
    }

    /// Run one invocation of `action` on `handle` to settlement
    ///
    /// Supersedes any invocation still active on the handle, applies the
    /// optimistic value if configured, then attempts the action up to
    /// `1 + retries` times. The terminal outcome is committed to the
    /// handle's observable slots and, when a key is configured, to the
    /// cache store; exactly one of `on_success`/`on_error` fires, followed
    /// by `on_settled`, and the same outcome is returned.
    pub async fn execute(
        &self,
        handle: &ActionHandle,
        action: &dyn Action,
        input: ActionInput,
        options: &ActionOptions,
    ) -> Result<Value, ActionError> {
        let invocation = handle.begin(options.key.clone());
        let execution_id = uuid::Uuid::new_v4().to_string();
        let retries = options.retries.unwrap_or(self.default_retries);
        tracing::info!(
            action = action.name(),
            key = options.key(),
            execution_id = %execution_id,
            retries,
            "action invocation started"
        );

        // What rollback restores: the handle's data before this
        // invocation's optimistic update, not the cache's raw value.
        let rollback = handle.data();

        if let Some(update) = options.optimistic_update.as_deref() {
            let optimistic = update(rollback.as_ref(), &input);
            handle.set_data(Some(optimistic.clone()));
            if let Some(key) = options.key() {
                self.cache.set(key, optimistic);
            }
            tracing::debug!(
                action = action.name(),
                execution_id = %execution_id,
                "optimistic value applied"
            );
        }

        let mut attempt: u32 = 0;
        let last_error = loop {
            if invocation.token.is_cancelled() {
                return self.settle_aborted(
                    handle,
                    &invocation,
                    options,
                    rollback.as_ref(),
                    action.name(),
                    &execution_id,
                );
            }

            match action.run(input.clone()).await {
                Ok(result) => {
                    if invocation.token.is_cancelled() {
                        // The call outlived its invocation; the result
                        // must not land.
                        return self.settle_aborted(
                            handle,
                            &invocation,
                            options,
                            rollback.as_ref(),
                            action.name(),
                            &execution_id,
                        );
                    }
                    return self.settle_succeeded(
                        handle,
                        &invocation,
                        options,
                        result,
                        action.name(),
                        &execution_id,
                    );
                }
                Err(error) => {
                    attempt += 1;
                    if attempt > retries {
                        break error;
                    }
                    tracing::warn!(
                        action = action.name(),
                        execution_id = %execution_id,
                        attempt,
                        error = %error,
                        "attempt failed, retrying"
                    );
                }
            }
        };

        if invocation.token.is_cancelled() {
            return self.settle_aborted(
                handle,
                &invocation,
                options,
                rollback.as_ref(),
                action.name(),
                &execution_id,
            );
        }
        self.settle_failed(
            handle,
            &invocation,
            options,
            rollback.as_ref(),
            last_error,
            attempt,
            action.name(),
            &execution_id,
        )
    }

    /// Cancel the handle's active invocation; no effect when none is active
    ///
    /// The cancelled invocation settles with [`ActionError::Aborted`] at its
    /// next check point and, being still current, performs the
    /// rollback-or-clear.
    pub fn cancel(&self, handle: &ActionHandle) {
        handle.cancel_active();
    }

    /// Clear the handle's observable state and invalidate its cache entry
    ///
    /// Also cancels and de-currents any in-flight invocation, so a slow
    /// call settling later cannot resurrect the cleared state.
    pub fn reset(&self, handle: &ActionHandle) {
        if let Some(key) = handle.clear() {
            self.cache.invalidate(&key);
        }
    }

    fn settle_succeeded(
        &self,
        handle: &ActionHandle,
        invocation: &Invocation,
        options: &ActionOptions,
        result: Value,
        action_name: &str,
        execution_id: &str,
    ) -> Result<Value, ActionError> {
        if handle.is_current(invocation.generation) {
            handle.set_data(Some(result.clone()));
            handle.set_error(None);
            if let Some(key) = options.key() {
                self.cache.set(key, result.clone());
            }
        }
        if let Some(callback) = &options.on_success {
            callback(&result);
        }
        if let Some(callback) = &options.on_settled {
            callback(Some(&result), None);
        }
        handle.settle(invocation.generation);
        tracing::info!(
            action = action_name,
            execution_id = %execution_id,
            "action invocation succeeded"
        );
        Ok(result)
    }

    #[allow(clippy::too_many_arguments)]
    fn settle_failed(
        &self,
        handle: &ActionHandle,
        invocation: &Invocation,
        options: &ActionOptions,
        rollback: Option<&Value>,
        error: ActionError,
        attempts: u32,
        action_name: &str,
        execution_id: &str,
    ) -> Result<Value, ActionError> {
        if handle.is_current(invocation.generation) {
            self.restore(handle, options, rollback);
            handle.set_error(Some(error.clone()));
        }
        if let Some(callback) = &options.on_error {
            callback(&error);
        }
        if let Some(callback) = &options.on_settled {
            callback(None, Some(&error));
        }
        handle.settle(invocation.generation);
        tracing::warn!(
            action = action_name,
            execution_id = %execution_id,
            attempts,
            error = %error,
            "action invocation failed, retries exhausted"
        );
        Err(error)
    }

    fn settle_aborted(
        &self,
        handle: &ActionHandle,
        invocation: &Invocation,
        options: &ActionOptions,
        rollback: Option<&Value>,
        action_name: &str,
        execution_id: &str,
    ) -> Result<Value, ActionError> {
        let error = ActionError::Aborted;
        // Rollback only while still current: an explicitly cancelled
        // invocation undoes its optimistic value, while one superseded or
        // reset must not touch the newer state. Callbacks fire either way.
        if handle.is_current(invocation.generation) {
            self.restore(handle, options, rollback);
            handle.set_error(Some(error.clone()));
        }
        if let Some(callback) = &options.on_error {
            callback(&error);
        }
        if let Some(callback) = &options.on_settled {
            callback(None, Some(&error));
        }
        handle.settle(invocation.generation);
        tracing::info!(
            action = action_name,
            execution_id = %execution_id,
            "action invocation aborted"
        );
        Err(error)
    }

    /// The rollback-or-clear shared by the failure and abort paths
    fn restore(&self, handle: &ActionHandle, options: &ActionOptions, rollback: Option<&Value>) {
        if options.optimistic_update.is_some() {
            handle.set_data(rollback.cloned());
            if let Some(key) = options.key() {
                match rollback {
                    Some(value) => self.cache.set(key, value.clone()),
                    None => self.cache.invalidate(key),
                }
            }
        } else {
            handle.set_data(None);
            if let Some(key) = options.key() {
                self.cache.invalidate(key);
            }
        }
    }
}

impl std::fmt::Debug for Executor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Executor")
            .field("default_retries", &self.default_retries)
            .finish_non_exhaustive()
    }
}
