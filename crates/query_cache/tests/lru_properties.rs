//! Property-based tests for the LRU cache using proptest.
//!
//! These tests check the capacity and recency invariants across randomly
//! generated access sequences.

#![allow(clippy::unwrap_used, reason = "Tests unwrap known-good values")]

use proptest::prelude::*;
use query_cache::LruCache;
use std::collections::VecDeque;

fn identity_cache(capacity: usize) -> LruCache<u16, u16> {
    LruCache::infallible(|key: &u16| *key, capacity).unwrap()
}

/// Reference model: a deque of keys ordered from least to most recent.
fn model_access(model: &mut VecDeque<u16>, key: u16, capacity: usize) {
    if let Some(position) = model.iter().position(|existing| *existing == key) {
        model.remove(position);
    }
    model.push_back(key);
    while model.len() > capacity {
        model.pop_front();
    }
}

proptest! {
    #[test]
    fn distinct_inserts_keep_most_recent(capacity in 1_usize..16, extra in 1_usize..32) {
        let _ = env_logger::builder().is_test(true).try_init();
        let cache = identity_cache(capacity);
        let total = capacity + extra;
        for key in 0..total as u16 {
            cache.get(&key).unwrap();
        }
        prop_assert_eq!(cache.len(), capacity);
        // The very first key is the least recently touched and must be gone.
        prop_assert!(!cache.contains(&0));
        let expected: Vec<u16> = ((total - capacity) as u16..total as u16).collect();
        prop_assert_eq!(cache.keys(), expected);
    }

    #[test]
    fn never_exceeds_capacity(capacity in 1_usize..8, keys in prop::collection::vec(0_u16..20, 0..200)) {
        let cache = identity_cache(capacity);
        for key in &keys {
            prop_assert_eq!(cache.get(key).unwrap(), *key);
            prop_assert!(cache.len() <= capacity);
        }
    }

    #[test]
    fn matches_reference_model(capacity in 1_usize..8, keys in prop::collection::vec(0_u16..12, 0..120)) {
        let cache = identity_cache(capacity);
        let mut model = VecDeque::new();
        for key in keys {
            cache.get(&key).unwrap();
            model_access(&mut model, key, capacity);
            prop_assert_eq!(cache.keys(), model.iter().copied().collect::<Vec<_>>());
        }
    }

    #[test]
    fn hit_promotes_without_shrinking(capacity in 2_usize..10) {
        let cache = identity_cache(capacity);
        for key in 0..capacity as u16 {
            cache.get(&key).unwrap();
        }
        cache.get(&0).unwrap();
        prop_assert_eq!(cache.len(), capacity);
        prop_assert_eq!(cache.keys().last().copied(), Some(0));
    }
}
