//! Bounded TTL cache and periodic maintenance
//!
//! `TtlCache` backs both the emergency cache and the phonetic score cache.
//! Expired entries are dropped lazily on read and eagerly by a
//! `MaintenanceTask` sweep; when the cache is full the least recently used
//! entry is evicted.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::hash::Hash;
use std::sync::Mutex;
use std::time::{Duration, Instant};
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::debug;

struct CacheEntry<V> {
    value: V,
    inserted_at: Instant,
    last_access: u64,
}

struct CacheInner<K, V> {
    entries: HashMap<K, CacheEntry<V>>,
    tick: u64,
    stats: CacheStats,
}

/// Hit/miss counters
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CacheStats {
    pub hits: u64,
    pub misses: u64,
    pub evictions: u64,
    pub expirations: u64,
}

impl CacheStats {
    pub fn hit_rate(&self) -> f64 {
        let total = self.hits + self.misses;
        if total == 0 {
            0.0
        } else {
            self.hits as f64 / total as f64
        }
    }
}

/// Thread-safe map with per-entry TTL and LRU eviction
pub struct TtlCache<K, V> {
    inner: Mutex<CacheInner<K, V>>,
    capacity: usize,
    ttl: Duration,
}

impl<K, V> TtlCache<K, V>
where
    K: Eq + Hash + Clone,
    V: Clone,
{
    pub fn new(capacity: usize, ttl: Duration) -> Self {
        Self {
            inner: Mutex::new(CacheInner {
                entries: HashMap::new(),
                tick: 0,
                stats: CacheStats::default(),
            }),
            capacity: capacity.max(1),
            ttl,
        }
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, CacheInner<K, V>> {
        self.inner.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    pub fn get(&self, key: &K) -> Option<V> {
        self.get_at(key, Instant::now())
    }

    pub(crate) fn get_at(&self, key: &K, now: Instant) -> Option<V> {
        let mut guard = self.lock();
        let inner = &mut *guard;
        inner.tick += 1;
        let tick = inner.tick;

        let expired = match inner.entries.get_mut(key) {
            None => {
                inner.stats.misses += 1;
                return None;
            }
            Some(entry) if now.saturating_duration_since(entry.inserted_at) >= self.ttl => true,
            Some(entry) => {
                entry.last_access = tick;
                let value = entry.value.clone();
                inner.stats.hits += 1;
                return Some(value);
            }
        };

        if expired {
            inner.entries.remove(key);
            inner.stats.expirations += 1;
            inner.stats.misses += 1;
        }
        None
    }

    pub fn insert(&self, key: K, value: V) {
        self.insert_at(key, value, Instant::now());
    }

    pub(crate) fn insert_at(&self, key: K, value: V, now: Instant) {
        let mut guard = self.lock();
        let inner = &mut *guard;
        inner.tick += 1;
        let tick = inner.tick;

        if !inner.entries.contains_key(&key) && inner.entries.len() >= self.capacity {
            let ttl = self.ttl;
            let before = inner.entries.len();
            inner
                .entries
                .retain(|_, e| now.saturating_duration_since(e.inserted_at) < ttl);
            let expired = (before - inner.entries.len()) as u64;
            inner.stats.expirations += expired;

            if inner.entries.len() >= self.capacity {
                let lru = inner
                    .entries
                    .iter()
                    .min_by_key(|(_, e)| e.last_access)
                    .map(|(k, _)| k.clone());
                if let Some(lru) = lru {
                    inner.entries.remove(&lru);
                    inner.stats.evictions += 1;
                }
            }
        }

        inner.entries.insert(
            key,
            CacheEntry {
                value,
                inserted_at: now,
                last_access: tick,
            },
        );
    }

    /// Drop expired entries; returns how many were removed
    pub fn sweep(&self) -> usize {
        self.sweep_at(Instant::now())
    }

    pub(crate) fn sweep_at(&self, now: Instant) -> usize {
        let mut guard = self.lock();
        let inner = &mut *guard;
        let ttl = self.ttl;
        let before = inner.entries.len();
        inner
            .entries
            .retain(|_, e| now.saturating_duration_since(e.inserted_at) < ttl);
        let removed = before - inner.entries.len();
        inner.stats.expirations += removed as u64;
        removed
    }

    pub fn len(&self) -> usize {
        self.lock().entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn clear(&self) {
        self.lock().entries.clear();
    }

    pub fn stats(&self) -> CacheStats {
        self.lock().stats.clone()
    }
}

/// Background job run on a fixed interval until cancelled or dropped
///
/// Spawning requires a tokio runtime; `spawn` returns `None` outside one and
/// callers rely on lazy expiry instead.
pub struct MaintenanceTask {
    name: &'static str,
    token: CancellationToken,
    handle: Option<JoinHandle<()>>,
}

impl MaintenanceTask {
    pub fn spawn<F>(name: &'static str, period: Duration, mut job: F) -> Option<Self>
    where
        F: FnMut() + Send + 'static,
    {
        let runtime = match tokio::runtime::Handle::try_current() {
            Ok(handle) => handle,
            Err(_) => {
                debug!(task = name, "No tokio runtime, maintenance task not started");
                return None;
            }
        };

        let period = period.max(Duration::from_millis(10));
        let token = CancellationToken::new();
        let child = token.clone();

        let handle = runtime.spawn(async move {
            let mut interval = tokio::time::interval(period);
            interval.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);
            // First tick completes immediately
            interval.tick().await;

            loop {
                tokio::select! {
                    _ = child.cancelled() => break,
                    _ = interval.tick() => job(),
                }
            }
            debug!(task = name, "Maintenance task stopped");
        });

        Some(Self {
            name,
            token,
            handle: Some(handle),
        })
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    pub fn cancel(&self) {
        self.token.cancel();
    }

    pub fn is_cancelled(&self) -> bool {
        self.token.is_cancelled()
    }

    /// Cancel and wait for the task to finish
    pub async fn shutdown(mut self) {
        self.token.cancel();
        if let Some(handle) = self.handle.take() {
            let _ = handle.await;
        }
    }
}

impl Drop for MaintenanceTask {
    fn drop(&mut self) {
        self.token.cancel();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    #[test]
    fn test_get_after_ttl_is_miss() {
        let cache: TtlCache<String, u32> = TtlCache::new(10, Duration::from_secs(60));
        let start = Instant::now();

        cache.insert_at("a".to_string(), 1, start);
        assert_eq!(cache.get_at(&"a".to_string(), start + Duration::from_secs(59)), Some(1));
        assert_eq!(cache.get_at(&"a".to_string(), start + Duration::from_secs(60)), None);
        assert!(cache.is_empty());

        let stats = cache.stats();
        assert_eq!(stats.hits, 1);
        assert_eq!(stats.misses, 1);
        assert_eq!(stats.expirations, 1);
    }

    #[test]
    fn test_capacity_evicts_least_recently_used() {
        let cache: TtlCache<&'static str, u32> = TtlCache::new(2, Duration::from_secs(60));
        let now = Instant::now();

        cache.insert_at("a", 1, now);
        cache.insert_at("b", 2, now);
        // Touch "a" so "b" becomes the LRU entry
        assert_eq!(cache.get_at(&"a", now), Some(1));
        cache.insert_at("c", 3, now);

        assert_eq!(cache.len(), 2);
        assert_eq!(cache.get_at(&"b", now), None);
        assert_eq!(cache.get_at(&"a", now), Some(1));
        assert_eq!(cache.get_at(&"c", now), Some(3));
        assert_eq!(cache.stats().evictions, 1);
    }

    #[test]
    fn test_full_cache_prefers_dropping_expired() {
        let cache: TtlCache<&'static str, u32> = TtlCache::new(2, Duration::from_secs(10));
        let start = Instant::now();

        cache.insert_at("old", 1, start);
        cache.insert_at("fresh", 2, start + Duration::from_secs(9));
        cache.insert_at("new", 3, start + Duration::from_secs(11));

        let later = start + Duration::from_secs(12);
        assert_eq!(cache.get_at(&"fresh", later), Some(2));
        assert_eq!(cache.get_at(&"new", later), Some(3));
        assert_eq!(cache.stats().evictions, 0);
    }

    #[test]
    fn test_sweep_removes_expired_only() {
        let cache: TtlCache<u32, u32> = TtlCache::new(10, Duration::from_secs(5));
        let start = Instant::now();
        cache.insert_at(1, 1, start);
        cache.insert_at(2, 2, start + Duration::from_secs(4));

        assert_eq!(cache.sweep_at(start + Duration::from_secs(6)), 1);
        assert_eq!(cache.len(), 1);
    }

    #[tokio::test]
    async fn test_maintenance_task_runs_and_stops() {
        let runs = Arc::new(AtomicUsize::new(0));
        let counter = runs.clone();

        let task = MaintenanceTask::spawn("test-sweep", Duration::from_millis(10), move || {
            counter.fetch_add(1, Ordering::SeqCst);
        })
        .expect("runtime available");

        tokio::time::sleep(Duration::from_millis(60)).await;
        task.shutdown().await;

        let after_shutdown = runs.load(Ordering::SeqCst);
        assert!(after_shutdown >= 1);

        tokio::time::sleep(Duration::from_millis(30)).await;
        assert_eq!(runs.load(Ordering::SeqCst), after_shutdown);
    }

    #[test]
    fn test_maintenance_task_without_runtime() {
        assert!(MaintenanceTask::spawn("no-runtime", Duration::from_secs(1), || {}).is_none());
    }
}
