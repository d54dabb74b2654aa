//! Stage-level memoization for compiled selectors.
//!
//! A stage built only from literal operands (a tag name, a class, an
//! attribute test) is registered under a key naming the operation and its
//! operands. Equal stages compiled from different selector strings then share
//! one [`LruCache`] mapping an input sequence to the stage's output.
//!
//! Stages whose behavior depends on a nested selector are never memoized,
//! since the nested selector has no stable key.
//!
//! A memo must only be shared by generators compiling against the same host
//! tree, and must be [cleared](StageMemo::clear) when that tree changes.

use crate::error::{Result, SelectorError};
use crate::namespace::NamespacePrefix;
use crate::selector::{self, Selector};
use core::fmt;
use core::hash::Hash;
use dashmap::DashMap;
use log::trace;
use query_cache::{CacheStats, LruCache};
use std::sync::Arc;

/// Identity of a memoizable stage: the operation and its literal operands.
///
/// Operands are kept apart so no operand text can alias another split of
/// the same characters.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct StageKey {
    operation: &'static str,
    operands: Vec<String>,
}

impl StageKey {
    #[inline]
    pub const fn new(operation: &'static str) -> Self {
        Self {
            operation,
            operands: Vec::new(),
        }
    }

    /// Append one literal operand.
    #[must_use]
    pub fn with(mut self, operand: impl fmt::Display) -> Self {
        self.operands.push(operand.to_string());
        self
    }

    /// Append a namespace prefix, keeping its variant distinct from any name.
    #[must_use]
    pub fn with_prefix(mut self, prefix: &NamespacePrefix) -> Self {
        self.operands.push(format!("{prefix:?}"));
        self
    }

    #[inline]
    pub const fn operation(&self) -> &'static str {
        self.operation
    }

    #[inline]
    pub fn operands(&self) -> &[String] {
        &self.operands
    }
}

impl fmt::Display for StageKey {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(formatter, "{}{:?}", self.operation, self.operands)
    }
}

/// Cache of one stage's results keyed by input sequence.
type StageCache<E> = LruCache<Vec<E>, Vec<E>, SelectorError>;

/// Shared table of memoized stages.
pub struct StageMemo<E> {
    stages: DashMap<StageKey, Arc<StageCache<E>>>,
    /// Entries retained per stage.
    capacity: usize,
}

impl<E> fmt::Debug for StageMemo<E> {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter
            .debug_struct("StageMemo")
            .field("stages", &self.stages.len())
            .field("capacity", &self.capacity)
            .finish()
    }
}

impl<E> StageMemo<E>
where
    E: Clone + Eq + Hash + Send + Sync + 'static,
{
    /// Create a memo retaining up to `capacity` inputs per stage.
    ///
    /// # Errors
    /// [`SelectorError::Argument`] when `capacity` is zero.
    pub fn new(capacity: usize) -> Result<Self> {
        if capacity == 0 {
            return Err(SelectorError::argument(
                "stage memo capacity must be positive, got 0",
            ));
        }
        Ok(Self {
            stages: DashMap::new(),
            capacity,
        })
    }

    /// Wrap `stage` so results are shared with every other stage registered
    /// under `key`.
    ///
    /// # Errors
    /// [`SelectorError::Argument`] if the stage cache cannot be created.
    pub fn memoize(&self, key: StageKey, stage: Selector<E>) -> Result<Selector<E>> {
        let cache = if let Some(existing) = self.stages.get(&key) {
            Arc::clone(existing.value())
        } else {
            let capacity = self.capacity;
            let entry = self.stages.entry(key.clone()).or_try_insert_with(|| {
                trace!("memoizing stage {key}");
                LruCache::new(move |input: &Vec<E>| stage(input.as_slice()), capacity)
                    .map(Arc::new)
                    .map_err(|error| SelectorError::argument(error.to_string()))
            })?;
            Arc::clone(entry.value())
        };
        Ok(selector::from_fn(move |elements: &[E]| {
            cache.get(&elements.to_vec())
        }))
    }

    /// Number of distinct memoized stages.
    #[inline]
    pub fn len(&self) -> usize {
        self.stages.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.stages.is_empty()
    }

    /// Entries retained per stage.
    #[inline]
    pub const fn capacity(&self) -> usize {
        self.capacity
    }

    /// Forget every memoized result, keeping the stages registered.
    pub fn clear(&self) {
        for stage in &self.stages {
            stage.value().clear();
        }
    }

    /// Usage counters summed over all stages.
    pub fn stats(&self) -> CacheStats {
        self.stages
            .iter()
            .map(|stage| stage.value().stats())
            .fold(CacheStats::default(), |total, stats| CacheStats {
                hits: total.hits.saturating_add(stats.hits),
                misses: total.misses.saturating_add(stats.misses),
                evictions: total.evictions.saturating_add(stats.evictions),
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use core::sync::atomic::{AtomicUsize, Ordering};

    fn counting_stage(calls: &Arc<AtomicUsize>) -> Selector<u32> {
        let calls = Arc::clone(calls);
        selector::from_fn(move |elements: &[u32]| {
            calls.fetch_add(1, Ordering::SeqCst);
            Ok(elements.iter().map(|value| value * 2).collect())
        })
    }

    #[test]
    fn equal_keys_share_results() {
        let memo = StageMemo::new(4).unwrap();
        let calls = Arc::new(AtomicUsize::new(0));
        let first = memo.memoize(StageKey::new("Double"), counting_stage(&calls)).unwrap();
        let second = memo.memoize(StageKey::new("Double"), counting_stage(&calls)).unwrap();

        assert_eq!(first(&[1, 2]).unwrap(), vec![2, 4]);
        assert_eq!(second(&[1, 2]).unwrap(), vec![2, 4]);
        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert_eq!(memo.len(), 1);
        assert_eq!(memo.stats().hits, 1);
    }

    #[test]
    fn clear_forces_recomputation() {
        let memo = StageMemo::new(4).unwrap();
        let calls = Arc::new(AtomicUsize::new(0));
        let stage = memo.memoize(StageKey::new("Double"), counting_stage(&calls)).unwrap();
        stage(&[3]).unwrap();
        memo.clear();
        stage(&[3]).unwrap();
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn operands_do_not_alias_across_boundaries() {
        let split_value = StageKey::new("AttributeExact")
            .with_prefix(&NamespacePrefix::None)
            .with("x")
            .with("a|b");
        let split_name = StageKey::new("AttributeExact")
            .with_prefix(&NamespacePrefix::None)
            .with("x|a")
            .with("b");
        assert_ne!(split_value, split_name);

        let memo = StageMemo::new(4).unwrap();
        let calls = Arc::new(AtomicUsize::new(0));
        memo.memoize(split_value, counting_stage(&calls)).unwrap();
        memo.memoize(split_name, counting_stage(&calls)).unwrap();
        assert_eq!(memo.len(), 2);
    }

    #[test]
    fn prefix_variants_stay_distinct() {
        let any = StageKey::new("Type").with_prefix(&NamespacePrefix::Any).with("p");
        let star = StageKey::new("Type")
            .with_prefix(&NamespacePrefix::Specific("*".to_owned()))
            .with("p");
        assert_ne!(any, star);
    }

    #[test]
    fn zero_capacity_is_rejected() {
        assert!(StageMemo::<u32>::new(0).unwrap_err().is_argument());
    }
}
