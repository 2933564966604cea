//! # Recant Stores
//!
//! Cache store implementations for the recant action engine.
//!
//! This crate provides:
//! - InMemory CacheStore with a bounded entry count
//!
//! Durable backends are deliberately absent: cache persistence beyond the
//! process lifetime is out of scope for the engine.

mod memory;

pub use memory::InMemoryCacheStore;

// Re-export the core trait for convenience
pub use recant_core::store::CacheStore;
