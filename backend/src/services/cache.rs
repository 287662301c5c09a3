//! Bounded in-memory caches with per-entry expiry
//!
//! Each cache instance is owned by the weather engine and shared between
//! in-flight requests; all reads and writes on one instance serialize on
//! its internal lock so eviction stays consistent. There is no background
//! sweeper: expiry is checked lazily on read.

use std::collections::HashMap;
use std::hash::Hash;
use std::sync::Mutex;
use std::time::{Duration, Instant};

struct CacheEntry<V> {
    stored_at: Instant,
    value: V,
}

/// Key-value store with a TTL and a maximum entry count.
///
/// A `get` that finds an entry older than the TTL removes it and reports a
/// miss. An `insert` that pushes the cache over capacity evicts the entry
/// with the oldest store time.
pub struct TtlCache<K, V> {
    entries: Mutex<HashMap<K, CacheEntry<V>>>,
    ttl: Duration,
    capacity: usize,
}

impl<K, V> TtlCache<K, V>
where
    K: Eq + Hash + Clone,
    V: Clone,
{
    pub fn new(ttl: Duration, capacity: usize) -> Self {
        Self {
            entries: Mutex::new(HashMap::new()),
            ttl,
            capacity,
        }
    }

    /// Look up a key, treating an expired entry as a miss and removing it.
    pub fn get(&self, key: &K) -> Option<V> {
        let mut entries = self.lock();

        match entries.get(key) {
            Some(entry) if entry.stored_at.elapsed() <= self.ttl => Some(entry.value.clone()),
            Some(_) => {
                entries.remove(key);
                None
            }
            None => None,
        }
    }

    /// Store a value, evicting the oldest entry when over capacity.
    pub fn insert(&self, key: K, value: V) {
        let mut entries = self.lock();

        entries.insert(
            key,
            CacheEntry {
                stored_at: Instant::now(),
                value,
            },
        );

        if entries.len() > self.capacity {
            let oldest = entries
                .iter()
                .min_by_key(|(_, entry)| entry.stored_at)
                .map(|(key, _)| key.clone());
            if let Some(key) = oldest {
                entries.remove(&key);
            }
        }
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, HashMap<K, CacheEntry<V>>> {
        self.entries
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::thread::sleep;

    #[test]
    fn stored_value_round_trips_until_ttl() {
        let cache = TtlCache::new(Duration::from_secs(60), 8);
        cache.insert("a", 1);
        assert_eq!(cache.get(&"a"), Some(1));
        assert_eq!(cache.get(&"missing"), None);
    }

    #[test]
    fn expired_entry_is_a_miss() {
        let cache = TtlCache::new(Duration::from_millis(10), 8);
        cache.insert("a", 1);
        sleep(Duration::from_millis(30));
        assert_eq!(cache.get(&"a"), None);
    }

    #[test]
    fn overwriting_a_key_does_not_count_against_capacity() {
        let cache = TtlCache::new(Duration::from_secs(60), 2);
        cache.insert("a", 1);
        sleep(Duration::from_millis(2));
        cache.insert("a", 2);
        sleep(Duration::from_millis(2));
        cache.insert("b", 3);

        // Both keys fit: the overwrite did not occupy a second slot.
        assert_eq!(cache.get(&"a"), Some(2));
        assert_eq!(cache.get(&"b"), Some(3));
    }

    #[test]
    fn over_capacity_insert_evicts_exactly_the_oldest_entry() {
        let cache = TtlCache::new(Duration::from_secs(60), 3);
        for (i, key) in ["a", "b", "c", "d"].iter().enumerate() {
            cache.insert(*key, i);
            // Instants on consecutive inserts must differ for the order to
            // be observable.
            sleep(Duration::from_millis(2));
        }

        assert_eq!(cache.get(&"a"), None);
        assert_eq!(cache.get(&"b"), Some(1));
        assert_eq!(cache.get(&"c"), Some(2));
        assert_eq!(cache.get(&"d"), Some(3));
    }

    #[test]
    fn single_slot_cache_keeps_only_the_latest_key() {
        let cache = TtlCache::new(Duration::from_secs(60), 1);
        cache.insert("2025-01-15|12:00".to_string(), 1);
        sleep(Duration::from_millis(2));
        cache.insert("2025-01-15|18:00".to_string(), 2);

        assert_eq!(cache.get(&"2025-01-15|12:00".to_string()), None);
        assert_eq!(cache.get(&"2025-01-15|18:00".to_string()), Some(2));
    }
}
