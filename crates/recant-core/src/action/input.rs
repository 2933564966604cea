//! ActionInput type definition

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Input payload for one action invocation
///
/// The engine never inspects the payload; it is handed verbatim to every
/// attempt and to the optimistic-update function.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ActionInput {
    /// Opaque parameters for the action
    #[serde(default)]
    pub params: Value,
}

impl ActionInput {
    /// Create a new empty input
    pub fn new() -> Self {
        Self::default()
    }

    /// Create input from a params value
    pub fn with_params(params: Value) -> Self {
        Self { params }
    }

    /// Get a top-level parameter by key
    pub fn param(&self, key: &str) -> Option<&Value> {
        self.params.get(key)
    }

    /// Get a parameter by JSON pointer (e.g., "/user/id")
    pub fn param_at(&self, pointer: &str) -> Option<&Value> {
        self.params.pointer(pointer)
    }
}
