//! Slot-indexed doubly linked list tracking recency order.
//!
//! Nodes live in a `Vec` and link to each other by index, so a caller that
//! remembers a node's slot can unlink or promote it in constant time. Freed
//! slots are recycled before the vector grows.

use core::iter;

/// A single node of the list.
#[derive(Debug)]
struct Slot<K> {
    /// Key stored in this slot, `None` while the slot is on the free list.
    key: Option<K>,
    /// Slot of the next less recently used key.
    prev: Option<usize>,
    /// Slot of the next more recently used key.
    next: Option<usize>,
}

/// Keys ordered from least to most recently used.
#[derive(Debug)]
pub struct RecencyList<K> {
    /// Node storage.
    slots: Vec<Slot<K>>,
    /// Vacant slots available for reuse.
    free: Vec<usize>,
    /// Least recently used slot.
    head: Option<usize>,
    /// Most recently used slot.
    tail: Option<usize>,
}

impl<K> Default for RecencyList<K> {
    fn default() -> Self {
        Self::new()
    }
}

impl<K> RecencyList<K> {
    /// Create an empty list.
    #[inline]
    pub const fn new() -> Self {
        Self {
            slots: Vec::new(),
            free: Vec::new(),
            head: None,
            tail: None,
        }
    }

    /// Create an empty list with room for `capacity` keys.
    #[inline]
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            slots: Vec::with_capacity(capacity),
            ..Self::new()
        }
    }

    /// Append `key` as the most recently used entry, returning its slot.
    pub fn push_back(&mut self, key: K) -> usize {
        let slot = Slot {
            key: Some(key),
            prev: self.tail,
            next: None,
        };
        let index = if let Some(index) = self.free.pop() {
            if let Some(vacant) = self.slots.get_mut(index) {
                *vacant = slot;
            }
            index
        } else {
            self.slots.push(slot);
            self.slots.len().saturating_sub(1)
        };

        match self.tail {
            Some(tail) => self.set_next(tail, Some(index)),
            None => self.head = Some(index),
        }
        self.tail = Some(index);
        index
    }

    /// Move the key stored at `index` to the most recently used position.
    pub fn move_to_back(&mut self, index: usize) {
        if self.tail == Some(index) {
            return;
        }
        if let Some(key) = self.unlink(index) {
            let new_index = self.push_back(key);
            debug_assert_eq!(new_index, index, "a freed slot is reused first");
        }
    }

    /// Remove and return the least recently used key.
    pub fn pop_front(&mut self) -> Option<K> {
        let head = self.head?;
        self.unlink(head)
    }

    /// Remove the key stored at `index`.
    pub fn remove(&mut self, index: usize) -> Option<K> {
        self.unlink(index)
    }

    /// Iterate keys from least to most recently used.
    pub fn iter(&self) -> impl Iterator<Item = &K> + '_ {
        let mut cursor = self.head;
        iter::from_fn(move || {
            let slot = self.slots.get(cursor?)?;
            cursor = slot.next;
            slot.key.as_ref()
        })
    }

    /// Drop every key.
    pub fn clear(&mut self) {
        self.slots.clear();
        self.free.clear();
        self.head = None;
        self.tail = None;
    }

    /// Detach the slot at `index` from its neighbours and free it.
    fn unlink(&mut self, index: usize) -> Option<K> {
        let slot = self.slots.get_mut(index)?;
        let key = slot.key.take()?;
        let prev = slot.prev.take();
        let next = slot.next.take();

        match prev {
            Some(prev) => self.set_next(prev, next),
            None => self.head = next,
        }
        match next {
            Some(next) => self.set_prev(next, prev),
            None => self.tail = prev,
        }

        self.free.push(index);
        Some(key)
    }

    #[inline]
    fn set_next(&mut self, index: usize, next: Option<usize>) {
        if let Some(slot) = self.slots.get_mut(index) {
            slot.next = next;
        }
    }

    #[inline]
    fn set_prev(&mut self, index: usize, prev: Option<usize>) {
        if let Some(slot) = self.slots.get_mut(index) {
            slot.prev = prev;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn keys(list: &RecencyList<u32>) -> Vec<u32> {
        list.iter().copied().collect()
    }

    #[test]
    fn push_keeps_insertion_order() {
        let mut list = RecencyList::new();
        list.push_back(1);
        list.push_back(2);
        list.push_back(3);
        assert_eq!(keys(&list), vec![1, 2, 3]);
    }

    #[test]
    fn move_to_back_promotes() {
        let mut list = RecencyList::new();
        let first = list.push_back(1);
        list.push_back(2);
        list.push_back(3);
        list.move_to_back(first);
        assert_eq!(keys(&list), vec![2, 3, 1]);
    }

    #[test]
    fn move_to_back_keeps_slot() {
        let mut list = RecencyList::new();
        let first = list.push_back(10);
        list.push_back(20);
        list.move_to_back(first);
        // The slot index is still valid for the moved key.
        assert_eq!(list.remove(first), Some(10));
        assert_eq!(keys(&list), vec![20]);
    }

    #[test]
    fn pop_front_removes_least_recent() {
        let mut list = RecencyList::new();
        list.push_back(1);
        list.push_back(2);
        assert_eq!(list.pop_front(), Some(1));
        assert_eq!(list.pop_front(), Some(2));
        assert_eq!(list.pop_front(), None);
        assert!(keys(&list).is_empty());
    }

    #[test]
    fn remove_middle_relinks_neighbours() {
        let mut list = RecencyList::new();
        list.push_back(1);
        let middle = list.push_back(2);
        list.push_back(3);
        assert_eq!(list.remove(middle), Some(2));
        assert_eq!(keys(&list), vec![1, 3]);
        // Removing twice is a no-op.
        assert_eq!(list.remove(middle), None);
    }

    #[test]
    fn freed_slots_are_reused() {
        let mut list = RecencyList::with_capacity(2);
        let first = list.push_back(1);
        list.push_back(2);
        list.remove(first);
        let reused = list.push_back(3);
        assert_eq!(reused, first);
        assert_eq!(keys(&list), vec![2, 3]);
    }

    #[test]
    fn clear_empties_everything() {
        let mut list = RecencyList::new();
        list.push_back(1);
        list.push_back(2);
        list.clear();
        assert!(keys(&list).is_empty());
        assert_eq!(list.pop_front(), None);
        assert_eq!(list.push_back(3), 0);
    }
}
