//! Optimistic profile editing example
//!
//! This example demonstrates:
//! - Creating an Executor over a shared InMemoryCacheStore
//! - A keyed action committing its result to handle and cache
//! - An optimistic update rolling back when every attempt fails
//! - A flaky action rescued by the retry budget
//! - Warming the cache with prefetch

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use serde_json::{json, Value};

use recant_core::prelude::*;
use recant_stores::InMemoryCacheStore;

/// Pretends to persist a profile rename upstream
struct RenameProfile;

#[async_trait]
impl Action for RenameProfile {
    fn name(&self) -> &str {
        "rename_profile"
    }

    async fn run(&self, input: ActionInput) -> Result<Value, ActionError> {
        let name = input
            .param("name")
            .and_then(|v| v.as_str())
            .ok_or_else(|| ActionError::failed("missing name"))?;
        Ok(json!({ "name": name, "saved": true }))
    }
}

/// Always rejects, as an unreachable upstream would
struct RejectedRename;

#[async_trait]
impl Action for RejectedRename {
    fn name(&self) -> &str {
        "rejected_rename"
    }

    async fn run(&self, _input: ActionInput) -> Result<Value, ActionError> {
        Err(ActionError::failed("upstream rejected the rename"))
    }
}

/// Fails on the first call, succeeds afterwards
struct FlakySave {
    calls: AtomicUsize,
}

#[async_trait]
impl Action for FlakySave {
    fn name(&self) -> &str {
        "flaky_save"
    }

    async fn run(&self, input: ActionInput) -> Result<Value, ActionError> {
        let call = self.calls.fetch_add(1, Ordering::SeqCst) + 1;
        if call == 1 {
            return Err(ActionError::failed("connection reset"));
        }
        Ok(json!({ "payload": input.params, "attempts": call }))
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    println!("=== Recant Optimistic Profile Example ===\n");

    let cache = Arc::new(InMemoryCacheStore::new());
    let executor = Executor::new(cache.clone());

    // 1. A plain keyed invocation commits to handle and cache.
    let handle = executor.handle_with_key("profile:1");
    let saved = executor
        .execute(
            &handle,
            &RenameProfile,
            ActionInput::with_params(json!({"name": "Ada"})),
            &ActionOptions::new().with_key("profile:1"),
        )
        .await?;
    println!("committed: {saved}");
    println!("cache now holds: {:?}\n", cache.get("profile:1"));

    // 2. An optimistic rename shows immediately, then rolls back when the
    //    upstream rejects it.
    let options = ActionOptions::new()
        .with_key("profile:1")
        .with_optimistic_update(|previous, input| {
            let mut next = previous.cloned().unwrap_or_else(|| json!({}));
            next["name"] = input.param("name").cloned().unwrap_or(Value::Null);
            next
        })
        .on_error(|error| println!("rename failed: {error}"));
    let rejected = executor
        .execute(
            &handle,
            &RejectedRename,
            ActionInput::with_params(json!({"name": "Grace"})),
            &options,
        )
        .await;
    println!("outcome: {rejected:?}");
    println!("data rolled back to: {:?}\n", handle.data());

    // 3. A retry budget absorbs transient failures.
    let flaky = FlakySave {
        calls: AtomicUsize::new(0),
    };
    let recovered = executor
        .execute(
            &handle,
            &flaky,
            ActionInput::with_params(json!({"note": "retry me"})),
            &ActionOptions::new().with_retries(1),
        )
        .await?;
    println!("recovered after retry: {recovered}\n");

    // 4. Prefetch warms the cache outside the executor lifecycle.
    let warmed = cache
        .prefetch("profile:2", || async {
            Ok::<_, ActionError>(json!({"name": "Hopper"}))
        })
        .await?;
    println!("prefetched: {warmed}");

    Ok(())
}
