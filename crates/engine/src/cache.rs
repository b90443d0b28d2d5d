// In crates/engine/src/cache.rs

use std::collections::HashMap;
use std::hash::Hash;
use std::time::{Duration, Instant};

/// A time-to-live cache of computed results.
///
/// Entries are never evicted in the background. An entry older than the TTL
/// is simply ignored on read and overwritten by the next insert.
#[derive(Debug)]
pub struct ResultCache<K, V> {
    ttl: Duration,
    entries: HashMap<K, (Instant, V)>,
}

impl<K: Eq + Hash, V: Clone> ResultCache<K, V> {
    pub fn new(ttl: Duration) -> Self {
        Self { ttl, entries: HashMap::new() }
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    pub fn get(&self, key: &K) -> Option<V> {
        self.get_at(key, Instant::now())
    }

    /// Returns the entry if it was stored less than one TTL before `now`.
    pub fn get_at(&self, key: &K, now: Instant) -> Option<V> {
        let (stored_at, value) = self.entries.get(key)?;
        (now.saturating_duration_since(*stored_at) < self.ttl).then(|| value.clone())
    }

    pub fn insert(&mut self, key: K, value: V) {
        self.insert_at(key, value, Instant::now());
    }

    pub fn insert_at(&mut self, key: K, value: V, stored_at: Instant) {
        self.entries.insert(key, (stored_at, value));
    }

    /// Drops every entry, fresh or stale.
    pub fn clear(&mut self) {
        self.entries.clear();
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
    fn entries_expire_after_ttl() {
        let mut cache = ResultCache::new(Duration::from_secs(300));
        let t0 = Instant::now();
        cache.insert_at("bitcoin", 1, t0);

        assert_eq!(cache.get_at(&"bitcoin", t0), Some(1));
        assert_eq!(cache.get_at(&"bitcoin", t0 + Duration::from_secs(299)), Some(1));
        assert_eq!(cache.get_at(&"bitcoin", t0 + Duration::from_secs(300)), None);
        assert_eq!(cache.get_at(&"ethereum", t0), None);
    }

    #[test]
    fn insert_refreshes_the_timestamp() {
        let mut cache = ResultCache::new(Duration::from_secs(10));
        let t0 = Instant::now();
        cache.insert_at("k", "old", t0);
        cache.insert_at("k", "new", t0 + Duration::from_secs(20));
        assert_eq!(cache.get_at(&"k", t0 + Duration::from_secs(25)), Some("new"));
        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn clear_empties_the_cache() {
        let mut cache = ResultCache::new(Duration::from_secs(10));
        cache.insert("k", 1);
        cache.clear();
        assert!(cache.is_empty());
        assert_eq!(cache.get(&"k"), None);
    }
}
