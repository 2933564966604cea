//! Store module
//!
//! Declares the shared result-cache contract. Implementations live in the
//! `recant-stores` crate; the executor only ever sees `Arc<dyn CacheStore>`.

use std::future::Future;

use serde_json::Value;

/// Shared key→result mapping, visible to every invocation of every action
/// built on the engine
///
/// The synchronous operations are infallible and must appear atomic relative
/// to each other. `prefetch` is the single async operation and the only one
/// that can fail: its await window is the only place two callers can race on
/// the same key, and the last writer to complete wins, consistent with
/// [`set`](CacheStore::set) semantics generally.
pub trait CacheStore: Send + Sync {
    /// Look up the committed value for `key`
    fn get(&self, key: &str) -> Option<Value>;

    /// Store `value` under `key`, overwriting unconditionally
    fn set(&self, key: &str, value: Value);

    /// Remove the entry for `key`; no-op when absent
    fn invalidate(&self, key: &str);

    /// Warm the cache outside the full executor lifecycle
    ///
    /// Awaits `producer` and stores its result under `key` on success. A
    /// producer failure propagates verbatim and caches nothing; there is no
    /// retry and no rollback on this path.
    fn prefetch<F, Fut, E>(
        &self,
        key: &str,
        producer: F,
    ) -> impl Future<Output = Result<Value, E>> + Send
    where
        Self: Sized,
        F: FnOnce() -> Fut + Send,
        Fut: Future<Output = Result<Value, E>> + Send,
        E: Send,
    {
        async move {
            let value = producer().await?;
            self.set(key, value.clone());
            Ok(value)
        }
    }
}
