//! LRU Store Module
//!
//! Capacity-bounded store with least-recently-used eviction.
//!
//! Entries live in a `Vec` arena and are linked into a doubly-linked list by
//! slot index. Slots 0 and 1 are permanent sentinels (head and tail), so
//! linking and unlinking never special-case an empty list. The node after head
//! is the most recently used; the node before tail is the least recently used.

use std::collections::HashMap;
use std::fmt;
use std::mem;

use parking_lot::RwLock;
use tracing::{debug, trace};

use crate::cache::{require_positive, CacheStats, Stash};
use crate::error::{Result, StashError};

/// Arena slot of the head sentinel.
const HEAD: usize = 0;
/// Arena slot of the tail sentinel.
const TAIL: usize = 1;

// == Node ==
#[derive(Debug, Default)]
struct Node {
    key: String,
    value: String,
    prev: usize,
    next: usize,
}

// == LRU List ==
/// Unsynchronized LRU state. Always accessed through the lock in [`MemStash`].
#[derive(Debug)]
struct LruList {
    capacity: usize,
    /// Entry count, kept in step with `index`
    size: usize,
    /// Key to arena slot
    index: HashMap<String, usize>,
    /// Arena; slots 0 and 1 are the sentinels
    nodes: Vec<Node>,
    /// Recycled slots
    free: Vec<usize>,
    stats: CacheStats,
}

impl LruList {
    fn new(capacity: usize) -> Self {
        let mut list = Self {
            capacity,
            size: 0,
            index: HashMap::new(),
            nodes: vec![Node::default(), Node::default()],
            free: Vec::new(),
            stats: CacheStats::new(),
        };
        list.link_sentinels();
        list
    }

    fn link_sentinels(&mut self) {
        self.nodes[HEAD].prev = HEAD;
        self.nodes[HEAD].next = TAIL;
        self.nodes[TAIL].prev = HEAD;
        self.nodes[TAIL].next = TAIL;
    }

    // == Link Operations ==
    fn unlink(&mut self, idx: usize) {
        let (prev, next) = (self.nodes[idx].prev, self.nodes[idx].next);
        self.nodes[prev].next = next;
        self.nodes[next].prev = prev;
    }

    fn push_front(&mut self, idx: usize) {
        let first = self.nodes[HEAD].next;
        self.nodes[idx].prev = HEAD;
        self.nodes[idx].next = first;
        self.nodes[first].prev = idx;
        self.nodes[HEAD].next = idx;
    }

    fn move_to_front(&mut self, idx: usize) {
        if self.nodes[HEAD].next == idx {
            return;
        }
        self.unlink(idx);
        self.push_front(idx);
    }

    // == Slot Management ==
    fn alloc(&mut self, key: String, value: String) -> usize {
        match self.free.pop() {
            Some(idx) => {
                let node = &mut self.nodes[idx];
                node.key = key;
                node.value = value;
                idx
            }
            None => {
                self.nodes.push(Node {
                    key,
                    value,
                    prev: HEAD,
                    next: TAIL,
                });
                self.nodes.len() - 1
            }
        }
    }

    /// Unlinks a live slot and returns its key. The caller owns the index.
    fn release(&mut self, idx: usize) -> String {
        self.unlink(idx);
        let node = &mut self.nodes[idx];
        let key = mem::take(&mut node.key);
        node.value = String::new();
        self.free.push(idx);
        self.size -= 1;
        key
    }

    // == Eviction ==
    /// Removes the node just before the tail sentinel.
    fn evict_lru(&mut self) -> Option<String> {
        let idx = self.nodes[TAIL].prev;
        if idx == HEAD {
            return None;
        }
        let key = self.release(idx);
        self.index.remove(&key);
        self.stats.record_eviction();
        Some(key)
    }

    // == Contract Operations ==
    /// Inserts or updates `key`. Returns the evicted key, if any.
    fn put(&mut self, key: &str, value: &str) -> Option<String> {
        if let Some(&idx) = self.index.get(key) {
            self.nodes[idx].value = value.to_string();
            self.move_to_front(idx);
            return None;
        }

        let evicted = if self.size >= self.capacity {
            self.evict_lru()
        } else {
            None
        };

        let idx = self.alloc(key.to_string(), value.to_string());
        self.push_front(idx);
        self.index.insert(key.to_string(), idx);
        self.size += 1;

        evicted
    }

    fn get(&mut self, key: &str) -> Option<String> {
        match self.index.get(key) {
            Some(&idx) => {
                self.move_to_front(idx);
                self.stats.record_hit();
                Some(self.nodes[idx].value.clone())
            }
            None => {
                self.stats.record_miss();
                None
            }
        }
    }

    fn contains(&self, key: &str) -> bool {
        self.index.contains_key(key)
    }

    fn delete(&mut self, key: &str) -> bool {
        match self.index.remove(key) {
            Some(idx) => {
                self.release(idx);
                true
            }
            None => false,
        }
    }

    fn clear(&mut self) {
        self.index.clear();
        self.nodes.truncate(2);
        self.free.clear();
        self.link_sentinels();
        self.size = 0;
    }

    /// Keys from most to least recently used.
    fn keys(&self) -> Vec<String> {
        let mut keys = Vec::with_capacity(self.size);
        let mut idx = self.nodes[HEAD].next;
        while idx != TAIL {
            keys.push(self.nodes[idx].key.clone());
            idx = self.nodes[idx].next;
        }
        keys
    }

    /// Walks the list in both directions and checks it against the index.
    #[cfg(test)]
    fn assert_consistent(&self) {
        assert!(self.size <= self.capacity, "size exceeds capacity");
        assert_eq!(self.size, self.index.len(), "size out of step with index");

        let mut count = 0;
        let mut prev = HEAD;
        let mut idx = self.nodes[HEAD].next;
        while idx != TAIL {
            assert_eq!(self.nodes[idx].prev, prev, "broken back link at {}", idx);
            assert_eq!(self.index.get(&self.nodes[idx].key), Some(&idx));
            count += 1;
            prev = idx;
            idx = self.nodes[idx].next;
        }
        assert_eq!(self.nodes[TAIL].prev, prev);
        assert_eq!(count, self.size, "reachable nodes out of step with size");
    }
}

// == Mem Stash ==
/// Thread-safe LRU store with a fixed capacity.
///
/// `put`, `get`, `delete` and `clear` take the write lock because they may
/// reorder the list. `contains` and `size` only read and share the lock.
pub struct MemStash {
    capacity: usize,
    inner: RwLock<LruList>,
}

impl MemStash {
    // == Constructor ==
    /// Creates a store holding at most `capacity` entries.
    ///
    /// # Errors
    /// Returns [`StashError::Validation`] if `capacity` is zero or negative.
    pub fn new(capacity: i64) -> Result<Self> {
        let capacity = require_positive(capacity, "MEMSTASH capacity must be positive")?;
        Self::with_capacity(usize::try_from(capacity).unwrap_or(usize::MAX))
    }

    /// Creates a store holding at most `capacity` entries.
    ///
    /// # Errors
    /// Returns [`StashError::Validation`] if `capacity` is zero.
    pub fn with_capacity(capacity: usize) -> Result<Self> {
        if capacity == 0 {
            return Err(StashError::Validation(
                "MEMSTASH capacity must be positive".to_string(),
            ));
        }
        debug!(capacity, "created LRU stash");
        Ok(Self {
            capacity,
            inner: RwLock::new(LruList::new(capacity)),
        })
    }

    /// Returns the maximum number of entries.
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Returns the keys ordered from most to least recently used.
    ///
    /// Does not change the order.
    pub fn keys(&self) -> Vec<String> {
        self.inner.read().keys()
    }

    #[cfg(test)]
    pub(crate) fn assert_consistent(&self) {
        self.inner.read().assert_consistent();
    }
}

impl Stash for MemStash {
    fn put(&self, key: &str, value: &str) {
        let evicted = self.inner.write().put(key, value);
        if let Some(evicted) = evicted {
            debug!(key = %evicted, capacity = self.capacity, "evicted least recently used entry");
        }
    }

    fn get(&self, key: &str) -> Option<String> {
        self.inner.write().get(key)
    }

    fn contains(&self, key: &str) -> bool {
        self.inner.read().contains(key)
    }

    fn delete(&self, key: &str) -> bool {
        self.inner.write().delete(key)
    }

    fn clear(&self) {
        self.inner.write().clear();
        trace!("cleared LRU stash");
    }

    fn size(&self) -> usize {
        self.inner.read().size
    }

    fn stats(&self) -> CacheStats {
        let inner = self.inner.read();
        inner.stats.snapshot(inner.size)
    }
}

impl fmt::Debug for MemStash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MemStash")
            .field("capacity", &self.capacity)
            .field("size", &self.inner.try_read().map(|inner| inner.size))
            .finish()
    }
}
