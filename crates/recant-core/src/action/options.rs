//! ActionOptions type definition

use serde_json::Value;

use crate::action::{ActionError, ActionInput};

/// Pure function computing the optimistic value from the previous data and
/// the invocation input
pub type OptimisticUpdateFn = dyn Fn(Option<&Value>, &ActionInput) -> Value + Send + Sync;

/// Callback invoked with the committed result
pub type SuccessCallback = dyn Fn(&Value) + Send + Sync;

/// Callback invoked with the terminal error
pub type ErrorCallback = dyn Fn(&ActionError) + Send + Sync;

/// Callback invoked at settlement with exactly one of result or error
pub type SettledCallback = dyn Fn(Option<&Value>, Option<&ActionError>) + Send + Sync;

/// Per-invocation configuration
///
/// Everything is optional; an empty configuration is valid and disables
/// caching, retry and optimism. Callbacks are fire-and-forget and invoked
/// synchronously at settlement.
///
/// ```
/// use recant_core::{ActionInput, ActionOptions};
///
/// let options = ActionOptions::new()
///     .with_key("profile:1")
///     .with_retries(2)
///     .with_optimistic_update(|_prev, input: &ActionInput| input.params.clone());
/// ```
#[derive(Default)]
pub struct ActionOptions {
    pub(crate) key: Option<String>,
    pub(crate) retries: Option<u32>,
    pub(crate) optimistic_update: Option<Box<OptimisticUpdateFn>>,
    pub(crate) on_success: Option<Box<SuccessCallback>>,
    pub(crate) on_error: Option<Box<ErrorCallback>>,
    pub(crate) on_settled: Option<Box<SettledCallback>>,
}

impl ActionOptions {
    /// Create an empty configuration
    pub fn new() -> Self {
        Self::default()
    }

    /// Cache key: enables the cache read on mount, cache writes on
    /// commit/rollback, and supersession-scope bookkeeping
    pub fn with_key(mut self, key: impl Into<String>) -> Self {
        self.key = Some(key.into());
        self
    }

    /// Extra attempts after the first; overrides the executor default
    pub fn with_retries(mut self, retries: u32) -> Self {
        self.retries = Some(retries);
        self
    }

    /// Optimistic update function; enables the optimistic-apply and
    /// rollback-on-failure steps
    pub fn with_optimistic_update<F>(mut self, update: F) -> Self
    where
        F: Fn(Option<&Value>, &ActionInput) -> Value + Send + Sync + 'static,
    {
        self.optimistic_update = Some(Box::new(update));
        self
    }

    /// Callback fired once with the committed result
    pub fn on_success<F>(mut self, callback: F) -> Self
    where
        F: Fn(&Value) + Send + Sync + 'static,
    {
        self.on_success = Some(Box::new(callback));
        self
    }

    /// Callback fired once with the terminal error
    pub fn on_error<F>(mut self, callback: F) -> Self
    where
        F: Fn(&ActionError) + Send + Sync + 'static,
    {
        self.on_error = Some(Box::new(callback));
        self
    }

    /// Callback fired once at settlement, success or failure
    pub fn on_settled<F>(mut self, callback: F) -> Self
    where
        F: Fn(Option<&Value>, Option<&ActionError>) + Send + Sync + 'static,
    {
        self.on_settled = Some(Box::new(callback));
        self
    }

    /// The configured cache key, if any
    pub fn key(&self) -> Option<&str> {
        self.key.as_deref()
    }

    /// The configured retry budget, if any
    pub fn retries(&self) -> Option<u32> {
        self.retries
    }
}

impl std::fmt::Debug for ActionOptions {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ActionOptions")
            .field("key", &self.key)
            .field("retries", &self.retries)
            .field("optimistic", &self.optimistic_update.is_some())
            .finish_non_exhaustive()
    }
}
