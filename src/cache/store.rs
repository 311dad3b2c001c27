//! TTL cache storage.

use std::collections::HashMap;
use std::sync::Mutex;
use std::time::Duration;

use metrics::counter;
use tokio::time::Instant;
use tracing::debug;

use super::keys::resource_of;
use super::lock::mutex_lock;

const SOURCE: &str = "cache::store";

struct CacheEntry<V> {
    value: V,
    expires_at: Instant,
}

/// Key/value store with per-entry expiry and prefix invalidation.
///
/// Expired entries are removed lazily by the read that observes them; there is no
/// background sweep and no size bound. The lock is only held for the map
/// operation itself, never across I/O.
pub struct TtlCache<V> {
    entries: Mutex<HashMap<String, CacheEntry<V>>>,
}

impl<V> Default for TtlCache<V> {
    fn default() -> Self {
        Self {
            entries: Mutex::new(HashMap::new()),
        }
    }
}

impl<V: Clone> TtlCache<V> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Return the live value for `key`, evicting it if it has expired.
    pub fn get(&self, key: &str) -> Option<V> {
        let now = Instant::now();
        let (value, expired) = {
            let mut entries = mutex_lock(&self.entries, SOURCE, "get");
            match entries.get(key) {
                Some(entry) if entry.expires_at > now => (Some(entry.value.clone()), false),
                Some(_) => {
                    entries.remove(key);
                    (None, true)
                }
                None => (None, false),
            }
        };

        let resource = resource_of(key).to_string();
        if value.is_some() {
            counter!("annonces_cache_hit_total", "resource" => resource).increment(1);
        } else {
            if expired {
                debug!(cache = "ttl", outcome = "expired", key, "evicted expired entry");
                counter!("annonces_cache_expired_total", "resource" => resource.clone())
                    .increment(1);
            }
            counter!("annonces_cache_miss_total", "resource" => resource).increment(1);
        }
        value
    }

    /// Store `value` until `now + ttl`, replacing any previous entry.
    pub fn set(&self, key: impl Into<String>, value: V, ttl: Duration) {
        let expires_at = Instant::now() + ttl;
        mutex_lock(&self.entries, SOURCE, "set")
            .insert(key.into(), CacheEntry { value, expires_at });
    }

    /// Remove a single entry; returns whether one was present.
    pub fn delete(&self, key: &str) -> bool {
        let removed = mutex_lock(&self.entries, SOURCE, "delete")
            .remove(key)
            .is_some();
        if removed {
            counter!("annonces_cache_invalidated_total", "resource" => resource_of(key).to_string())
                .increment(1);
        }
        removed
    }

    /// Remove every entry whose key starts with `prefix`; returns how many were removed.
    pub fn invalidate_prefix(&self, prefix: &str) -> usize {
        let removed = {
            let mut entries = mutex_lock(&self.entries, SOURCE, "invalidate_prefix");
            let before = entries.len();
            entries.retain(|key, _| !key.starts_with(prefix));
            before - entries.len()
        };
        if removed > 0 {
            counter!("annonces_cache_invalidated_total", "resource" => resource_of(prefix).to_string())
                .increment(removed as u64);
        }
        debug!(cache = "ttl", outcome = "invalidated", prefix, removed, "prefix invalidation");
        removed
    }

    /// Number of stored entries, including expired ones not yet observed.
    pub fn len(&self) -> usize {
        mutex_lock(&self.entries, SOURCE, "len").len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
