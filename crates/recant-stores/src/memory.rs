//! In-memory CacheStore implementation

use std::collections::{HashMap, VecDeque};
use std::sync::{PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

use serde_json::Value;

use recant_core::CacheStore;

const DEFAULT_IN_MEMORY_ENTRY_LIMIT: usize = 10_000;

#[derive(Default)]
struct CacheState {
    values: HashMap<String, Value>,
    order: VecDeque<String>,
}

/// In-memory cache for applications and tests
///
/// Holds at most one entry per key with last-write-wins overwrites. A hard
/// entry limit bounds the map; once exceeded, the oldest entries (by last
/// write) are evicted first.
pub struct InMemoryCacheStore {
    state: RwLock<CacheState>,
    max_entries: usize,
}

impl InMemoryCacheStore {
    /// Create a new in-memory store with the default entry limit
    pub fn new() -> Self {
        Self::with_max_entries(DEFAULT_IN_MEMORY_ENTRY_LIMIT)
    }

    /// Create a new in-memory store with a hard entry limit
    pub fn with_max_entries(max_entries: usize) -> Self {
        Self {
            state: RwLock::new(CacheState::default()),
            max_entries: max_entries.max(1),
        }
    }

    /// Number of entries currently cached
    pub fn len(&self) -> usize {
        self.read().values.len()
    }

    /// Returns true when no entries are cached
    pub fn is_empty(&self) -> bool {
        self.read().values.is_empty()
    }

    // A poisoned lock only means a writer panicked mid-update; the map
    // itself stays usable, and the cache operations are infallible by
    // contract.
    fn read(&self) -> RwLockReadGuard<'_, CacheState> {
        self.state.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> RwLockWriteGuard<'_, CacheState> {
        self.state.write().unwrap_or_else(PoisonError::into_inner)
    }
}

impl Default for InMemoryCacheStore {
    fn default() -> Self {
        Self::new()
    }
}

impl CacheStore for InMemoryCacheStore {
    fn get(&self, key: &str) -> Option<Value> {
        self.read().values.get(key).cloned()
    }

    fn set(&self, key: &str, value: Value) {
        let mut state = self.write();
        state.values.insert(key.to_string(), value);
        state.order.retain(|entry| entry != key);
        state.order.push_back(key.to_string());
        while state.values.len() > self.max_entries {
            let Some(oldest) = state.order.pop_front() else {
                break;
            };
            state.values.remove(&oldest);
        }
    }

    fn invalidate(&self, key: &str) {
        let mut state = self.write();
        if state.values.remove(key).is_some() {
            state.order.retain(|entry| entry != key);
        }
    }
}
