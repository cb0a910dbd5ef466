use std::collections::HashMap;
use std::hash::Hash;
use std::sync::RwLock;
use std::time::{Duration, Instant};

struct Entry<V> {
    value: V,
    cached_at: Instant,
}

/// In-memory key/value cache with an optional per-entry TTL.
///
/// All operations are synchronous and take the lock for the duration of a
/// single call only, so a lookup or insert can never interleave with
/// another cache operation. A `ttl` of `None` means entries never expire
/// (used for immutable historic day prices).
pub struct TtlCache<K, V> {
    ttl: Option<Duration>,
    entries: RwLock<HashMap<K, Entry<V>>>,
}

impl<K: Eq + Hash, V: Clone> TtlCache<K, V> {
    pub fn new(ttl: Option<Duration>) -> Self {
        Self {
            ttl,
            entries: RwLock::new(HashMap::new()),
        }
    }

    /// Returns the cached value, dropping it first if its TTL lapsed.
    pub fn get(&self, key: &K) -> Option<V> {
        {
            let entries = self.entries.read().expect("cache lock poisoned");
            match entries.get(key) {
                Some(entry) if !self.expired(entry) => return Some(entry.value.clone()),
                Some(_) => {}
                None => return None,
            }
        }

        self.entries
            .write()
            .expect("cache lock poisoned")
            .remove(key);
        None
    }

    /// Inserts or overwrites; the entry's TTL restarts now.
    pub fn insert(&self, key: K, value: V) {
        self.entries.write().expect("cache lock poisoned").insert(
            key,
            Entry {
                value,
                cached_at: Instant::now(),
            },
        );
    }

    /// Number of stored entries, counting not-yet-collected expired ones.
    pub fn len(&self) -> usize {
        self.entries.read().expect("cache lock poisoned").len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn expired(&self, entry: &Entry<V>) -> bool {
        self.ttl
            .is_some_and(|ttl| entry.cached_at.elapsed() >= ttl)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn returns_inserted_value() {
        let cache: TtlCache<&str, f64> = TtlCache::new(None);
        cache.insert("btc", 40_000.0);
        assert_eq!(cache.get(&"btc"), Some(40_000.0));
        assert_eq!(cache.get(&"eth"), None);
    }

    #[test]
    fn overwrites_on_insert() {
        let cache: TtlCache<&str, f64> = TtlCache::new(None);
        cache.insert("btc", 1.0);
        cache.insert("btc", 2.0);
        assert_eq!(cache.get(&"btc"), Some(2.0));
        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn expires_after_ttl() {
        let cache: TtlCache<&str, f64> = TtlCache::new(Some(Duration::from_millis(10)));
        cache.insert("btc", 40_000.0);
        assert_eq!(cache.get(&"btc"), Some(40_000.0));

        std::thread::sleep(Duration::from_millis(20));
        assert_eq!(cache.get(&"btc"), None);
        assert!(cache.is_empty());
    }

    #[test]
    fn no_ttl_never_expires() {
        let cache: TtlCache<&str, f64> = TtlCache::new(None);
        cache.insert("btc", 40_000.0);
        std::thread::sleep(Duration::from_millis(20));
        assert_eq!(cache.get(&"btc"), Some(40_000.0));
    }
}
