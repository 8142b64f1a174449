//! Key/value cache with a fixed time-to-live per instance.
//!
//! Entries carry an absolute expiry instant computed at insertion. Expired
//! entries are evicted lazily, the first time a `get` observes them; there is
//! no background sweep and no capacity bound, so a cache should only be used
//! for small, naturally bounded key sets (one key per held symbol).

use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard};
use std::time::{Duration, Instant};

use log::{debug, warn};

#[derive(Debug)]
struct CacheEntry<V> {
    value: V,
    expires_at: Instant,
}

/// Thread-safe TTL cache.
///
/// Each logical kind of data gets its own instance (and TTL); instances never
/// share entries.
pub struct TtlCache<V> {
    ttl: Duration,
    entries: Mutex<HashMap<String, CacheEntry<V>>>,
}

impl<V: Clone> TtlCache<V> {
    /// Create an empty cache whose entries live for `ttl`.
    pub fn new(ttl: Duration) -> Self {
        Self {
            ttl,
            entries: Mutex::new(HashMap::new()),
        }
    }

    /// Lock the entries mutex, recovering from poison if necessary.
    fn lock_entries(&self) -> MutexGuard<'_, HashMap<String, CacheEntry<V>>> {
        self.entries.lock().unwrap_or_else(|poisoned| {
            warn!("TTL cache mutex was poisoned, recovering");
            poisoned.into_inner()
        })
    }

    /// Get a live value. An expired entry is removed and reported as absent.
    pub fn get(&self, key: &str) -> Option<V> {
        self.get_at(key, Instant::now())
    }

    /// Insert or overwrite `key`, expiring `ttl` from now.
    pub fn set(&self, key: impl Into<String>, value: V) {
        self.set_at(key.into(), value, Instant::now());
    }

    fn get_at(&self, key: &str, now: Instant) -> Option<V> {
        let mut entries = self.lock_entries();

        let expired = match entries.get(key) {
            None => return None,
            Some(entry) => entry.expires_at <= now,
        };

        if expired {
            entries.remove(key);
            debug!("Cache entry '{}' expired, evicted", key);
            return None;
        }

        entries.get(key).map(|entry| entry.value.clone())
    }

    fn set_at(&self, key: String, value: V, now: Instant) {
        let expires_at = now + self.ttl;
        self.lock_entries()
            .insert(key, CacheEntry { value, expires_at });
    }

    /// Configured time-to-live.
    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    /// Number of stored entries, including expired ones not yet observed.
    pub fn len(&self) -> usize {
        self.lock_entries().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
