//! Capacity-bounded map with insertion-order eviction.

use std::collections::{HashMap, VecDeque};

/// Fraction of the capacity evicted at once when the cache is full.
const EVICTION_DIVISOR: usize = 10;

/// A hash map with a hard capacity and deterministic eviction order.
///
/// Keys are tracked in a ring buffer in the order they were first inserted.
/// Overwriting an existing key keeps its original position.
#[derive(Debug, Clone)]
pub struct BoundedCache<V> {
    entries: HashMap<String, V>,
    order: VecDeque<String>,
    capacity: usize,
}

impl<V: Clone> BoundedCache<V> {
    /// Creates an empty cache holding at most `capacity` entries (minimum 1).
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            entries: HashMap::new(),
            order: VecDeque::new(),
            capacity,
        }
    }

    /// Returns a clone of the value stored under `key`.
    pub fn get(&self, key: &str) -> Option<V> {
        self.entries.get(key).cloned()
    }

    /// Returns true if `key` is present.
    pub fn contains(&self, key: &str) -> bool {
        self.entries.contains_key(key)
    }

    /// Inserts a value, evicting the oldest slice first if the cache is full.
    ///
    /// Returns the number of evicted entries.
    pub fn insert(&mut self, key: String, value: V) -> usize {
        if let Some(existing) = self.entries.get_mut(&key) {
            *existing = value;
            return 0;
        }

        let evicted = if self.entries.len() >= self.capacity {
            self.evict_oldest(self.eviction_batch())
        } else {
            0
        };

        self.order.push_back(key.clone());
        self.entries.insert(key, value);
        evicted
    }

    /// Number of entries evicted at once when the cache is full.
    pub fn eviction_batch(&self) -> usize {
        (self.capacity / EVICTION_DIVISOR).max(1)
    }

    fn evict_oldest(&mut self, count: usize) -> usize {
        let mut evicted = 0;
        while evicted < count {
            match self.order.pop_front() {
                Some(key) => {
                    self.entries.remove(&key);
                    evicted += 1;
                }
                None => break,
            }
        }
        evicted
    }

    /// Removes every entry.
    pub fn clear(&mut self) {
        self.entries.clear();
        self.order.clear();
    }

    /// Current number of entries.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns true if the cache holds no entries.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Maximum number of entries.
    pub fn capacity(&self) -> usize {
        self.capacity
    }
}
