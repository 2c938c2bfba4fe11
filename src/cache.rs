//! In-memory TTL cache shared by the resolver and the search engine.
//!
//! Expiration is lazy: an entry is checked (and evicted) only by the
//! read that observes it; there is no background sweeper. The map is
//! guarded by a plain mutex; concurrent discovery requests share one
//! instance per concern (locations, facility results).

use chrono::Utc;
use std::collections::HashMap;
use std::sync::Mutex;

/// A stored value plus the bookkeeping needed to expire it.
#[derive(Debug, Clone)]
pub struct CacheEntry<T> {
    pub value: T,
    pub created_at_ms: i64,
    pub ttl_ms: i64,
}

impl<T> CacheEntry<T> {
    fn is_expired(&self, now_ms: i64) -> bool {
        now_ms - self.created_at_ms > self.ttl_ms
    }
}

/// String-keyed cache with per-entry TTL.
///
/// Entries are replaced wholesale on `set`; nothing is ever patched in
/// place. A `get` after the TTL has elapsed behaves exactly like a miss.
pub struct TtlCache<T: Clone> {
    entries: Mutex<HashMap<String, CacheEntry<T>>>,
}

impl<T: Clone> TtlCache<T> {
    pub fn new() -> Self {
        Self {
            entries: Mutex::new(HashMap::new()),
        }
    }

    /// Look up a key. Returns `None` if absent or expired; an expired
    /// entry is evicted by this call.
    pub fn get(&self, key: &str) -> Option<T> {
        let mut entries = self.entries.lock().unwrap();
        let now = Utc::now().timestamp_millis();
        match entries.get(key) {
            Some(entry) if entry.is_expired(now) => {
                entries.remove(key);
                None
            }
            Some(entry) => Some(entry.value.clone()),
            None => None,
        }
    }

    /// Store a value under `key` for `ttl_ms` milliseconds.
    pub fn set(&self, key: &str, value: T, ttl_ms: i64) {
        let entry = CacheEntry {
            value,
            created_at_ms: Utc::now().timestamp_millis(),
            ttl_ms,
        };
        self.entries.lock().unwrap().insert(key.to_string(), entry);
    }

    /// Drop every entry.
    pub fn clear(&self) {
        self.entries.lock().unwrap().clear();
    }

    /// Number of stored entries, expired or not (for tests).
    pub fn len(&self) -> usize {
        self.entries.lock().unwrap().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl<T: Clone> Default for TtlCache<T> {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::thread::sleep;
    use std::time::Duration;

    #[test]
    fn test_set_get() {
        let cache: TtlCache<String> = TtlCache::new();
        cache.set("k", "value".into(), 60_000);
        assert_eq!(cache.get("k"), Some("value".to_string()));
    }

    #[test]
    fn test_miss_on_absent_key() {
        let cache: TtlCache<u32> = TtlCache::new();
        assert_eq!(cache.get("nope"), None);
    }

    #[test]
    fn test_fresh_entry_returned_unchanged() {
        let cache: TtlCache<Vec<u32>> = TtlCache::new();
        cache.set("list", vec![3, 1, 2], 10_000);
        // Well within TTL: stored value comes back as stored
        assert_eq!(cache.get("list"), Some(vec![3, 1, 2]));
    }

    #[test]
    fn test_expiry_after_ttl() {
        let cache: TtlCache<u32> = TtlCache::new();
        cache.set("k", 7, 20);
        assert_eq!(cache.get("k"), Some(7));
        sleep(Duration::from_millis(40));
        assert_eq!(cache.get("k"), None);
    }

    #[test]
    fn test_expired_entry_is_evicted() {
        let cache: TtlCache<u32> = TtlCache::new();
        cache.set("k", 7, 10);
        sleep(Duration::from_millis(30));
        assert_eq!(cache.get("k"), None);
        assert_eq!(cache.len(), 0, "lazy expiration must evict on read");
    }

    #[test]
    fn test_set_replaces_wholesale() {
        let cache: TtlCache<u32> = TtlCache::new();
        cache.set("k", 1, 20);
        sleep(Duration::from_millis(15));
        cache.set("k", 2, 20);
        sleep(Duration::from_millis(15));
        // First entry would have expired by now; the refresh restarted the clock
        assert_eq!(cache.get("k"), Some(2));
    }

    #[test]
    fn test_clear() {
        let cache: TtlCache<u32> = TtlCache::new();
        cache.set("a", 1, 60_000);
        cache.set("b", 2, 60_000);
        assert_eq!(cache.len(), 2);
        cache.clear();
        assert!(cache.is_empty());
        assert_eq!(cache.get("a"), None);
    }

    #[test]
    fn test_concurrent_access() {
        use std::sync::Arc;
        let cache: Arc<TtlCache<u64>> = Arc::new(TtlCache::new());
        let mut handles = Vec::new();
        for i in 0..8u64 {
            let cache = Arc::clone(&cache);
            handles.push(std::thread::spawn(move || {
                let key = format!("k{}", i % 4);
                cache.set(&key, i, 60_000);
                cache.get(&key);
            }));
        }
        for h in handles {
            h.join().unwrap();
        }
        assert!(cache.len() <= 4);
    }
}
