//! Best-effort TTL cache for dashboard responses.
//!
//! The cache is explicitly constructed with its TTL (no module-level
//! singleton) and exposes `invalidate` so write paths can drop stale
//! entries eagerly.  It is never authoritative: a miss simply recomputes.

use std::collections::HashMap;
use std::hash::Hash;
use std::sync::Arc;
use std::time::{Duration, Instant};

use tokio::sync::RwLock;
use tracing::debug;

#[derive(Debug, Clone)]
struct Entry<V> {
    value: V,
    inserted_at: Instant,
}

/// A small async TTL cache.
#[derive(Clone)]
pub struct TtlCache<K, V> {
    ttl: Duration,
    entries: Arc<RwLock<HashMap<K, Entry<V>>>>,
}

impl<K, V> TtlCache<K, V>
where
    K: Eq + Hash + Clone,
    V: Clone,
{
    pub fn new(ttl: Duration) -> Self {
        Self {
            ttl,
            entries: Arc::new(RwLock::new(HashMap::new())),
        }
    }

    /// Fetch a value if present and not yet expired.
    pub async fn get(&self, key: &K) -> Option<V> {
        let entries = self.entries.read().await;
        entries.get(key).and_then(|entry| {
            if entry.inserted_at.elapsed() < self.ttl {
                Some(entry.value.clone())
            } else {
                None
            }
        })
    }

    pub async fn put(&self, key: K, value: V) {
        let mut entries = self.entries.write().await;
        entries.insert(
            key,
            Entry {
                value,
                inserted_at: Instant::now(),
            },
        );
    }

    /// Drop one entry, typically after a write that made it stale.
    pub async fn invalidate(&self, key: &K) {
        let mut entries = self.entries.write().await;
        entries.remove(key);
    }

    /// Drop everything.
    pub async fn invalidate_all(&self) {
        let mut entries = self.entries.write().await;
        entries.clear();
    }

    /// Evict expired entries.  Run periodically from a background task.
    pub async fn purge_expired(&self) {
        let mut entries = self.entries.write().await;
        let before = entries.len();
        let ttl = self.ttl;
        entries.retain(|_, entry| entry.inserted_at.elapsed() < ttl);
        let removed = before - entries.len();
        if removed > 0 {
            debug!(removed, "Purged expired cache entries");
        }
    }
}
