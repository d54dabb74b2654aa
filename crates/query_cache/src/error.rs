//! Cache configuration errors.

use thiserror::Error;

/// Errors raised when configuring an [`LruCache`](crate::LruCache).
///
/// Evaluator failures are not represented here; they are returned to the
/// caller of `get` unchanged.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum CacheError {
    /// The requested capacity cannot hold a single entry.
    #[error("cache capacity must be positive, got {0}")]
    InvalidCapacity(usize),
}
