//! Bounded least-recently-used map.
//!
//! Backs the message and direct-message channel indexes. Reads count as
//! use: `get` refreshes the entry's recency, so eviction always removes the
//! entry untouched for longest.
//!
//! Recency is tracked with per-entry stamps and an append-only queue;
//! superseded queue slots are skipped lazily at eviction time and swept out
//! whenever the queue grows past twice its live size.

use std::collections::{HashMap, VecDeque};
use std::hash::Hash;

struct Entry<V> {
    stamp: u64,
    value: V,
}

/// A map holding at most `capacity` entries, evicting the least recently
/// used entry on overflow.
pub struct LruMap<K, V> {
    capacity: usize,
    next_stamp: u64,
    entries: HashMap<K, Entry<V>>,
    recency: VecDeque<(u64, K)>,
}

impl<K: Eq + Hash + Clone, V> LruMap<K, V> {
    /// Create a map bounded to `capacity` entries (at least one).
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        LruMap {
            capacity,
            next_stamp: 0,
            entries: HashMap::with_capacity(capacity),
            recency: VecDeque::with_capacity(capacity),
        }
    }

    /// Number of live entries.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// True if the map holds no entries.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Configured bound.
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// True if the key is present. Does not refresh recency.
    pub fn contains_key(&self, key: &K) -> bool {
        self.entries.contains_key(key)
    }

    /// Look up a value, refreshing its recency.
    pub fn get(&mut self, key: &K) -> Option<&V> {
        let stamp = self.bump_stamp();
        let entry = self.entries.get_mut(key)?;
        entry.stamp = stamp;
        self.recency.push_back((stamp, key.clone()));
        self.maybe_compact();
        Some(&self.entries[key].value)
    }

    /// Insert or replace a value, refreshing its recency. When inserting a
    /// new key into a full map, the least recently used entry is evicted
    /// and returned.
    pub fn insert(&mut self, key: K, value: V) -> Option<(K, V)> {
        let stamp = self.bump_stamp();

        if let Some(entry) = self.entries.get_mut(&key) {
            entry.stamp = stamp;
            entry.value = value;
            self.recency.push_back((stamp, key));
            self.maybe_compact();
            return None;
        }

        let evicted = if self.entries.len() >= self.capacity {
            self.evict_lru()
        } else {
            None
        };

        self.recency.push_back((stamp, key.clone()));
        self.entries.insert(key, Entry { stamp, value });
        self.maybe_compact();
        evicted
    }

    /// Remove an entry by key. Stale recency slots are cleaned up lazily.
    pub fn remove(&mut self, key: &K) -> Option<V> {
        self.entries.remove(key).map(|entry| entry.value)
    }

    /// Iterate over live values in arbitrary order.
    pub fn values(&self) -> impl Iterator<Item = &V> {
        self.entries.values().map(|entry| &entry.value)
    }

    fn bump_stamp(&mut self) -> u64 {
        self.next_stamp += 1;
        self.next_stamp
    }

    fn evict_lru(&mut self) -> Option<(K, V)> {
        while let Some((stamp, key)) = self.recency.pop_front() {
            // A slot is live only if it carries the entry's current stamp;
            // anything older was superseded by a later touch.
            let live = self
                .entries
                .get(&key)
                .is_some_and(|entry| entry.stamp == stamp);
            if live {
                let entry = self.entries.remove(&key)?;
                return Some((key, entry.value));
            }
        }
        None
    }

    fn maybe_compact(&mut self) {
        if self.recency.len() > self.entries.len().max(self.capacity) * 2 {
            let entries = &self.entries;
            self.recency.retain(|(stamp, key)| {
                entries.get(key).is_some_and(|entry| entry.stamp == *stamp)
            });
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_insert_within_capacity() {
        let mut map = LruMap::new(3);
        assert!(map.insert(1, "a").is_none());
        assert!(map.insert(2, "b").is_none());
        assert!(map.insert(3, "c").is_none());
        assert_eq!(map.len(), 3);
    }

    #[test]
    fn test_overflow_evicts_oldest() {
        let mut map = LruMap::new(2);
        map.insert(1, "a");
        map.insert(2, "b");
        let evicted = map.insert(3, "c");
        assert_eq!(evicted, Some((1, "a")));
        assert!(!map.contains_key(&1));
        assert!(map.contains_key(&2));
        assert!(map.contains_key(&3));
    }

    #[test]
    fn test_get_refreshes_recency() {
        let mut map = LruMap::new(2);
        map.insert(1, "a");
        map.insert(2, "b");
        // Touch 1 so that 2 becomes the eviction candidate.
        assert_eq!(map.get(&1), Some(&"a"));
        let evicted = map.insert(3, "c");
        assert_eq!(evicted, Some((2, "b")));
        assert!(map.contains_key(&1));
    }

    #[test]
    fn test_reinsert_replaces_without_eviction() {
        let mut map = LruMap::new(2);
        map.insert(1, "a");
        map.insert(2, "b");
        assert!(map.insert(1, "a2").is_none());
        assert_eq!(map.len(), 2);
        assert_eq!(map.get(&1), Some(&"a2"));
    }

    #[test]
    fn test_remove() {
        let mut map = LruMap::new(2);
        map.insert(1, "a");
        assert_eq!(map.remove(&1), Some("a"));
        assert_eq!(map.remove(&1), None);
        assert!(map.is_empty());
    }

    #[test]
    fn test_removed_entry_does_not_poison_eviction() {
        let mut map = LruMap::new(2);
        map.insert(1, "a");
        map.insert(2, "b");
        map.remove(&1);
        map.insert(3, "c");
        // Removing 1 freed a slot, so nothing should have been evicted.
        assert!(map.contains_key(&2));
        assert!(map.contains_key(&3));
    }

    #[test]
    fn test_heavy_touching_stays_bounded() {
        let mut map = LruMap::new(4);
        for i in 0..4 {
            map.insert(i, i);
        }
        for _ in 0..1000 {
            map.get(&0);
            map.get(&1);
        }
        assert_eq!(map.len(), 4);
        // The recency queue compacts rather than growing without bound.
        assert!(map.recency.len() <= 1000);
    }

    #[test]
    fn test_zero_capacity_clamps_to_one() {
        let mut map = LruMap::new(0);
        map.insert(1, "a");
        let evicted = map.insert(2, "b");
        assert_eq!(evicted, Some((1, "a")));
        assert_eq!(map.len(), 1);
    }
}
