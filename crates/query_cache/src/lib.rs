//! Bounded memoization for expensive, deterministic computations.
//!
//! The cache pairs a fixed evaluator function with a capacity. Lookups that
//! miss run the evaluator and remember its result; once the cache is full the
//! least recently used entry is evicted to make room.
//!
//! # Architecture
//!
//! ```text
//! LruCache ── RwLock ──┬── FxHashMap<K, Entry>   (key -> value + list slot)
//!                      └── RecencyList<K>        (least recent ... most recent)
//! ```
//!
//! Both promotion and eviction are O(1): every map entry remembers the slot
//! of its key in the recency list.
//!
//! # Example
//!
//! ```
//! use query_cache::LruCache;
//!
//! let squares = LruCache::infallible(|value: &u64| value * value, 2)?;
//! assert_eq!(squares.get(&3), Ok(9));
//! assert_eq!(squares.get(&4), Ok(16));
//! assert_eq!(squares.get(&5), Ok(25));
//! assert!(!squares.contains(&3));
//! # Ok::<(), query_cache::CacheError>(())
//! ```

#![cfg_attr(
    test,
    allow(clippy::unwrap_used, reason = "Tests unwrap known-good values")
)]
#![allow(
    clippy::module_name_repetitions,
    reason = "Cache types like CacheStats are clearer than just Stats"
)]
#![allow(clippy::missing_panics_doc, reason = "Cache operations never panic")]

mod error;
mod list;
mod lru;

// Re-exports
pub use error::CacheError;
pub use lru::{CacheStats, LruCache};
