//! Bounded in-process cache with optional time-to-live.
//!
//! Each component that memoizes remote data owns one of these, keyed by the
//! call arguments. Eviction is least-recently-used once `capacity` is
//! reached; with a TTL, entries older than it are dropped on lookup.

use lru::LruCache;
use std::hash::Hash;
use std::num::NonZeroUsize;
use std::time::{Duration, Instant};

struct Entry<V> {
    value: V,
    inserted_at: Instant,
}

pub struct TtlCache<K: Hash + Eq, V> {
    entries: LruCache<K, Entry<V>>,
    ttl: Option<Duration>,
}

impl<K: Hash + Eq, V: Clone> TtlCache<K, V> {
    /// A capacity of zero is treated as one.
    pub fn new(capacity: usize, ttl: Option<Duration>) -> Self {
        let capacity = NonZeroUsize::new(capacity).unwrap_or(NonZeroUsize::MIN);
        Self {
            entries: LruCache::new(capacity),
            ttl,
        }
    }

    /// Cached value for `key`, unless absent or expired.
    pub fn get(&mut self, key: &K) -> Option<V> {
        let ttl = self.ttl;
        let expired = match self.entries.peek(key) {
            None => return None,
            Some(entry) => ttl.is_some_and(|ttl| entry.inserted_at.elapsed() >= ttl),
        };
        if expired {
            self.entries.pop(key);
            return None;
        }
        self.entries.get(key).map(|entry| entry.value.clone())
    }

    pub fn insert(&mut self, key: K, value: V) {
        self.entries.put(
            key,
            Entry {
                value,
                inserted_at: Instant::now(),
            },
        );
    }

    /// Return the cached value or compute, store and return it.
    ///
    /// Errors from `load` are returned as-is and nothing is cached.
    pub fn get_or_try_insert<E>(&mut self, key: K, load: impl FnOnce() -> Result<V, E>) -> Result<V, E> {
        if let Some(hit) = self.get(&key) {
            return Ok(hit);
        }
        let value = load()?;
        self.insert(key, value.clone());
        Ok(value)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hit_after_insert() {
        let mut cache: TtlCache<String, u32> = TtlCache::new(4, None);
        assert_eq!(cache.get(&"a".into()), None);
        cache.insert("a".into(), 1);
        assert_eq!(cache.get(&"a".into()), Some(1));
        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn evicts_least_recently_used() {
        let mut cache: TtlCache<u32, u32> = TtlCache::new(2, None);
        cache.insert(1, 10);
        cache.insert(2, 20);
        assert_eq!(cache.get(&1), Some(10)); // 2 is now least recent
        cache.insert(3, 30);
        assert_eq!(cache.get(&2), None);
        assert_eq!(cache.get(&1), Some(10));
        assert_eq!(cache.get(&3), Some(30));
    }

    #[test]
    fn entries_expire_after_ttl() {
        let mut cache: TtlCache<u32, u32> = TtlCache::new(4, Some(Duration::from_millis(10)));
        cache.insert(1, 10);
        assert_eq!(cache.get(&1), Some(10));
        std::thread::sleep(Duration::from_millis(15));
        assert_eq!(cache.get(&1), None);
        assert!(cache.is_empty());
    }

    #[test]
    fn failed_load_is_not_cached() {
        let mut cache: TtlCache<u32, u32> = TtlCache::new(4, None);
        let r: Result<u32, &str> = cache.get_or_try_insert(1, || Err("down"));
        assert!(r.is_err());
        let r: Result<u32, &str> = cache.get_or_try_insert(1, || Ok(7));
        assert_eq!(r, Ok(7));
        let r: Result<u32, &str> = cache.get_or_try_insert(1, || panic!("should hit cache"));
        assert_eq!(r, Ok(7));
    }

    #[test]
    fn zero_capacity_holds_one() {
        let mut cache: TtlCache<u32, u32> = TtlCache::new(0, None);
        cache.insert(1, 1);
        cache.insert(2, 2);
        assert_eq!(cache.len(), 1);
        assert_eq!(cache.get(&2), Some(2));
    }
}
