//! Least-recently-used memoization cache.
//!
//! Lookups take a shared read lock, so concurrent hits only contend when they
//! promote their entry. A miss runs the evaluator with no lock held and then
//! takes the write lock to insert; two threads missing on the same key may
//! both evaluate, and the later insertion wins. Evaluators are expected to be
//! deterministic, so either result is correct.

use crate::error::CacheError;
use crate::list::RecencyList;
use core::convert::Infallible;
use core::fmt;
use core::hash::Hash;
use core::sync::atomic::{AtomicU64, Ordering};
use log::trace;
use parking_lot::RwLock;
use rustc_hash::FxHashMap;

/// Evaluator producing the value for a missing key.
type Evaluator<K, V, Er> = Box<dyn Fn(&K) -> Result<V, Er> + Send + Sync>;

/// A cached value and the recency slot of its key.
#[derive(Debug)]
struct Entry<V> {
    value: V,
    slot: usize,
}

/// Lock-protected cache contents.
#[derive(Debug)]
struct LruState<K, V> {
    /// Values keyed by input.
    entries: FxHashMap<K, Entry<V>>,
    /// Keys from least to most recently used.
    order: RecencyList<K>,
    /// Maximum number of entries retained.
    capacity: usize,
}

impl<K: Eq + Hash + Clone, V> LruState<K, V> {
    /// Insert or overwrite `key`, making it the most recently used entry.
    fn store(&mut self, key: K, value: V) -> usize {
        if let Some(entry) = self.entries.get_mut(&key) {
            entry.value = value;
            self.order.move_to_back(entry.slot);
            return 0;
        }
        let slot = self.order.push_back(key.clone());
        self.entries.insert(key, Entry { value, slot });
        self.evict_to_capacity()
    }

    /// Promote `key` if it is still cached.
    fn touch(&mut self, key: &K) {
        if let Some(entry) = self.entries.get(key) {
            self.order.move_to_back(entry.slot);
        }
    }

    /// Drop least recently used entries until the capacity bound holds.
    fn evict_to_capacity(&mut self) -> usize {
        let mut evicted = 0_usize;
        while self.entries.len() > self.capacity {
            let Some(oldest) = self.order.pop_front() else {
                break;
            };
            self.entries.remove(&oldest);
            evicted = evicted.saturating_add(1);
        }
        evicted
    }
}

/// Counters describing how a cache has been used.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CacheStats {
    /// Lookups answered from the cache.
    pub hits: u64,
    /// Lookups that ran the evaluator.
    pub misses: u64,
    /// Entries dropped to honour the capacity.
    pub evictions: u64,
}

impl CacheStats {
    /// Fraction of lookups answered from the cache, in `0.0..=1.0`.
    pub fn hit_rate(&self) -> f64 {
        let total = self.hits.saturating_add(self.misses);
        if total == 0 {
            0.0
        } else {
            self.hits as f64 / total as f64
        }
    }
}

/// A capacity-bounded memoization cache with LRU eviction.
///
/// The evaluator is fixed at construction. Evaluator errors are returned to
/// the caller of [`LruCache::get`] unchanged and are never cached.
pub struct LruCache<K, V, Er = Infallible> {
    /// Computes values for keys that are not cached.
    evaluator: Evaluator<K, V, Er>,
    /// Entries and recency order.
    state: RwLock<LruState<K, V>>,
    /// Lookups answered from the cache.
    hits: AtomicU64,
    /// Lookups that ran the evaluator.
    misses: AtomicU64,
    /// Entries dropped to honour the capacity.
    evictions: AtomicU64,
}

impl<K, V> LruCache<K, V, Infallible>
where
    K: Eq + Hash + Clone,
    V: Clone,
{
    /// Create a cache around an evaluator that cannot fail.
    ///
    /// # Errors
    /// Returns [`CacheError::InvalidCapacity`] when `capacity` is zero.
    pub fn infallible<F>(evaluator: F, capacity: usize) -> Result<Self, CacheError>
    where
        F: Fn(&K) -> V + Send + Sync + 'static,
    {
        Self::new(move |key: &K| Ok(evaluator(key)), capacity)
    }
}

impl<K, V, Er> LruCache<K, V, Er>
where
    K: Eq + Hash + Clone,
    V: Clone,
{
    /// Create a cache that memoizes `evaluator`, holding at most `capacity`
    /// entries.
    ///
    /// # Errors
    /// Returns [`CacheError::InvalidCapacity`] when `capacity` is zero.
    pub fn new<F>(evaluator: F, capacity: usize) -> Result<Self, CacheError>
    where
        F: Fn(&K) -> Result<V, Er> + Send + Sync + 'static,
    {
        if capacity == 0 {
            return Err(CacheError::InvalidCapacity(capacity));
        }
        Ok(Self {
            evaluator: Box::new(evaluator),
            state: RwLock::new(LruState {
                entries: FxHashMap::with_capacity_and_hasher(capacity, Default::default()),
                order: RecencyList::with_capacity(capacity),
                capacity,
            }),
            hits: AtomicU64::new(0),
            misses: AtomicU64::new(0),
            evictions: AtomicU64::new(0),
        })
    }

    /// Return the value for `key`, computing and caching it on a miss.
    ///
    /// A hit promotes `key` to most recently used.
    ///
    /// # Errors
    /// Propagates the evaluator's error; nothing is cached in that case.
    pub fn get(&self, key: &K) -> Result<V, Er> {
        let cached = self
            .state
            .read()
            .entries
            .get(key)
            .map(|entry| entry.value.clone());

        if let Some(value) = cached {
            self.state.write().touch(key);
            self.hits.fetch_add(1, Ordering::Relaxed);
            trace!("LRU hit");
            return Ok(value);
        }

        self.misses.fetch_add(1, Ordering::Relaxed);
        trace!("LRU miss, evaluating");
        let value = (self.evaluator)(key)?;
        self.insert(key.clone(), value.clone());
        Ok(value)
    }

    /// Store `value` under `key` without consulting the evaluator.
    pub fn insert(&self, key: K, value: V) {
        let evicted = self.state.write().store(key, value);
        self.record_evictions(evicted);
    }

    /// Look up `key` without evaluating or promoting it.
    pub fn peek(&self, key: &K) -> Option<V> {
        self.state
            .read()
            .entries
            .get(key)
            .map(|entry| entry.value.clone())
    }

    /// Whether `key` is currently cached.
    pub fn contains(&self, key: &K) -> bool {
        self.state.read().entries.contains_key(key)
    }

    /// Remove `key`, returning its value if it was cached.
    pub fn remove(&self, key: &K) -> Option<V> {
        let mut state = self.state.write();
        let entry = state.entries.remove(key)?;
        state.order.remove(entry.slot);
        Some(entry.value)
    }

    /// Drop every entry. Counters are preserved.
    pub fn clear(&self) {
        let mut state = self.state.write();
        state.entries.clear();
        state.order.clear();
    }

    /// Number of cached entries.
    pub fn len(&self) -> usize {
        self.state.read().entries.len()
    }

    /// Whether the cache holds no entries.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Maximum number of entries retained.
    pub fn capacity(&self) -> usize {
        self.state.read().capacity
    }

    /// Change the capacity, evicting least recently used entries right away
    /// when the cache shrinks.
    ///
    /// # Errors
    /// Returns [`CacheError::InvalidCapacity`] when `capacity` is zero; the
    /// cache is left untouched.
    pub fn set_capacity(&self, capacity: usize) -> Result<(), CacheError> {
        if capacity == 0 {
            return Err(CacheError::InvalidCapacity(capacity));
        }
        let evicted = {
            let mut state = self.state.write();
            state.capacity = capacity;
            state.evict_to_capacity()
        };
        self.record_evictions(evicted);
        Ok(())
    }

    /// Keys from least to most recently used.
    pub fn keys(&self) -> Vec<K> {
        self.state.read().order.iter().cloned().collect()
    }

    /// Snapshot of the usage counters.
    pub fn stats(&self) -> CacheStats {
        CacheStats {
            hits: self.hits.load(Ordering::Relaxed),
            misses: self.misses.load(Ordering::Relaxed),
            evictions: self.evictions.load(Ordering::Relaxed),
        }
    }

    #[inline]
    fn record_evictions(&self, evicted: usize) {
        if evicted > 0 {
            trace!("LRU evicted {evicted} entries");
            self.evictions.fetch_add(evicted as u64, Ordering::Relaxed);
        }
    }
}

impl<K, V, Er> fmt::Debug for LruCache<K, V, Er> {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        let state = self.state.read();
        formatter
            .debug_struct("LruCache")
            .field("len", &state.entries.len())
            .field("capacity", &state.capacity)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::thread;

    fn counting_cache(capacity: usize) -> (LruCache<u32, u32>, Arc<AtomicU64>) {
        let calls = Arc::new(AtomicU64::new(0));
        let seen = Arc::clone(&calls);
        let cache = LruCache::infallible(
            move |key: &u32| {
                seen.fetch_add(1, Ordering::SeqCst);
                key * 10
            },
            capacity,
        )
        .unwrap();
        (cache, calls)
    }

    #[test]
    fn zero_capacity_is_rejected() {
        let result = LruCache::infallible(|key: &u32| *key, 0);
        assert_eq!(result.err(), Some(CacheError::InvalidCapacity(0)));
    }

    #[test]
    fn miss_then_hit_evaluates_once() {
        let (cache, calls) = counting_cache(4);
        assert_eq!(cache.get(&1), Ok(10));
        assert_eq!(cache.get(&1), Ok(10));
        assert_eq!(calls.load(Ordering::SeqCst), 1);
        let stats = cache.stats();
        assert_eq!((stats.hits, stats.misses), (1, 1));
        assert!((stats.hit_rate() - 0.5).abs() < f64::EPSILON);
    }

    #[test]
    fn evicts_least_recently_used() {
        let (cache, _) = counting_cache(2);
        cache.get(&1).unwrap();
        cache.get(&2).unwrap();
        // Touch 1 so that 2 becomes the eviction candidate.
        cache.get(&1).unwrap();
        cache.get(&3).unwrap();
        assert!(cache.contains(&1));
        assert!(!cache.contains(&2));
        assert!(cache.contains(&3));
        assert_eq!(cache.keys(), vec![1, 3]);
        assert_eq!(cache.stats().evictions, 1);
    }

    #[test]
    fn shrinking_capacity_evicts_immediately() {
        let (cache, _) = counting_cache(4);
        for key in 0..4 {
            cache.get(&key).unwrap();
        }
        cache.set_capacity(2).unwrap();
        assert_eq!(cache.len(), 2);
        assert_eq!(cache.keys(), vec![2, 3]);
        assert_eq!(cache.set_capacity(0), Err(CacheError::InvalidCapacity(0)));
        assert_eq!(cache.capacity(), 2);
    }

    #[test]
    fn evaluator_errors_are_not_cached() {
        let cache: LruCache<i32, i32, String> = LruCache::new(
            |key: &i32| {
                if *key < 0 {
                    Err(format!("negative key {key}"))
                } else {
                    Ok(key + 1)
                }
            },
            2,
        )
        .unwrap();
        assert_eq!(cache.get(&-1), Err("negative key -1".to_owned()));
        assert!(cache.is_empty());
        assert_eq!(cache.get(&1), Ok(2));
        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn insert_overwrites_and_promotes() {
        let (cache, calls) = counting_cache(2);
        cache.get(&1).unwrap();
        cache.get(&2).unwrap();
        cache.insert(1, 99);
        assert_eq!(cache.keys(), vec![2, 1]);
        assert_eq!(cache.get(&1), Ok(99));
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn remove_and_clear() {
        let (cache, _) = counting_cache(3);
        cache.get(&1).unwrap();
        cache.get(&2).unwrap();
        assert_eq!(cache.remove(&1), Some(10));
        assert_eq!(cache.remove(&1), None);
        assert_eq!(cache.keys(), vec![2]);
        cache.clear();
        assert!(cache.is_empty());
        assert_eq!(cache.peek(&2), None);
    }

    #[test]
    fn concurrent_readers_share_results() {
        let (cache, _) = counting_cache(8);
        let cache = Arc::new(cache);
        thread::scope(|scope| {
            for _ in 0..4 {
                let shared = Arc::clone(&cache);
                scope.spawn(move || {
                    for key in 0..16 {
                        assert_eq!(shared.get(&(key % 8)), Ok((key % 8) * 10));
                    }
                });
            }
        });
        assert_eq!(cache.len(), 8);
    }
}
