//! Shared keyed store of cached query instances.

use std::any::Any;
use std::collections::hash_map::Entry;
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use parking_lot::{Mutex, MutexGuard, RwLock};
use serde::{Deserialize, Serialize};
use tracing::debug;

use querycache_core::error::{QueryCacheError, Result};
use querycache_core::traits::Query;
use querycache_core::types::{CacheKey, QueryArgs};

use crate::config::CacheConfig;
use crate::descriptor::QueryDescriptor;
use crate::handle::QueryHandle;

/// One cached query instance and the time it was last refreshed.
pub struct CacheEntry {
    instance: Arc<dyn Any + Send + Sync>,
    last_update: Option<Duration>,
}

impl CacheEntry {
    fn new<Q: Query>(query: Q) -> Self {
        let instance: Arc<dyn Any + Send + Sync> = Arc::new(RwLock::new(query));
        Self {
            instance,
            last_update: None,
        }
    }

    /// Time of the last successful refresh, or `None` if never executed.
    pub fn last_update(&self) -> Option<Duration> {
        self.last_update
    }

    /// Returns true if the entry must be refreshed at `now`.
    ///
    /// An entry is stale once strictly more than `ttl` has elapsed since its
    /// last refresh; an age of exactly `ttl` is still fresh. A never-executed
    /// entry is always stale.
    pub fn is_stale(&self, now: Duration, ttl: Duration) -> bool {
        match self.last_update {
            Some(last) => now.saturating_sub(last) > ttl,
            None => true,
        }
    }

    /// Records a successful refresh at `now`.
    pub fn mark_refreshed(&mut self, now: Duration) {
        self.last_update = Some(now);
    }

    /// Swaps in a new instance, returning a handle to it.
    ///
    /// Handles to the previous instance keep reading the previous results.
    /// The refresh time is left unchanged.
    pub fn replace<Q: Query>(&mut self, query: Q) -> QueryHandle<Q> {
        let shared = Arc::new(RwLock::new(query));
        let instance: Arc<dyn Any + Send + Sync> = shared.clone();
        self.instance = instance;
        QueryHandle::from_shared(shared)
    }

    /// Returns a typed handle to the cached instance.
    pub fn handle<Q: Query>(&self, key: &CacheKey) -> Result<QueryHandle<Q>> {
        Arc::clone(&self.instance)
            .downcast::<RwLock<Q>>()
            .map(QueryHandle::from_shared)
            .map_err(|_| QueryCacheError::TypeMismatch {
                key: key.to_string(),
                expected: std::any::type_name::<Q>(),
            })
    }
}

#[derive(Debug, Default)]
struct Counters {
    hits: AtomicU64,
    misses: AtomicU64,
    refreshes: AtomicU64,
    failed_refreshes: AtomicU64,
    resets: AtomicU64,
}

impl Counters {
    fn clear(&self) {
        self.hits.store(0, Ordering::Relaxed);
        self.misses.store(0, Ordering::Relaxed);
        self.refreshes.store(0, Ordering::Relaxed);
        self.failed_refreshes.store(0, Ordering::Relaxed);
    }
}

/// Process-wide map from cache key to cached query instance.
///
/// A single mutex guards the whole map. Every lookup, insertion, refresh and
/// reset happens while holding it, so at most one of them runs at a time
/// across all keys.
pub struct CacheStore {
    entries: Mutex<HashMap<CacheKey, CacheEntry>>,
    counters: Counters,
    config: CacheConfig,
}

impl CacheStore {
    /// Creates an empty store with default configuration.
    pub fn new() -> Self {
        Self::with_config(CacheConfig::default())
    }

    /// Creates an empty store with custom configuration.
    pub fn with_config(config: CacheConfig) -> Self {
        Self {
            entries: Mutex::new(HashMap::new()),
            counters: Counters::default(),
            config,
        }
    }

    /// Returns the store configuration.
    pub fn config(&self) -> &CacheConfig {
        &self.config
    }

    /// Derives the cache key for a query type and its arguments.
    pub fn key_for(&self, type_name: &str, args: &QueryArgs) -> CacheKey {
        CacheKey::derive(
            type_name,
            args,
            &self.config.key_separator,
            self.config.key_named_args,
        )
    }

    /// Acquires the coordination lock.
    ///
    /// Entries are only reachable through the returned guard. Calling any
    /// other locking method on this store while the guard is alive on the
    /// same thread deadlocks.
    pub fn lock(&self) -> StoreGuard<'_> {
        StoreGuard {
            entries: self.entries.lock(),
            counters: &self.counters,
        }
    }

    /// Clears all cached entries.
    ///
    /// Waits for any in-flight lookup or refresh to finish first. Hit, miss
    /// and refresh counters start over; the reset count is kept.
    pub fn reset(&self) {
        let mut entries = self.entries.lock();
        let dropped = entries.len();
        *entries = HashMap::new();
        self.counters.clear();
        self.counters.resets.fetch_add(1, Ordering::Relaxed);
        debug!(dropped, "Cache reset");
    }

    /// Returns the number of cached entries.
    pub fn len(&self) -> usize {
        self.entries.lock().len()
    }

    /// Returns true if the store holds no entries.
    pub fn is_empty(&self) -> bool {
        self.entries.lock().is_empty()
    }

    /// Returns true if an entry exists for `key`.
    pub fn contains(&self, key: &str) -> bool {
        self.entries.lock().contains_key(key)
    }

    /// Returns the last refresh time of `key`, if the entry exists and has
    /// been executed successfully.
    pub fn last_update(&self, key: &str) -> Option<Duration> {
        self.entries.lock().get(key).and_then(CacheEntry::last_update)
    }

    /// Returns store statistics.
    pub fn stats(&self) -> CacheStats {
        let entries = self.entries.lock().len();
        CacheStats {
            entries,
            hits: self.counters.hits.load(Ordering::Relaxed),
            misses: self.counters.misses.load(Ordering::Relaxed),
            refreshes: self.counters.refreshes.load(Ordering::Relaxed),
            failed_refreshes: self.counters.failed_refreshes.load(Ordering::Relaxed),
            resets: self.counters.resets.load(Ordering::Relaxed),
        }
    }
}

impl Default for CacheStore {
    fn default() -> Self {
        Self::new()
    }
}

/// Exclusive access to the store's entries, held for the duration of a
/// lookup and any refresh it triggers.
pub struct StoreGuard<'a> {
    entries: MutexGuard<'a, HashMap<CacheKey, CacheEntry>>,
    counters: &'a Counters,
}

impl StoreGuard<'_> {
    /// Returns the entry for `key`, creating it from `descriptor` if absent.
    ///
    /// A new entry has never been executed. If the constructor fails, nothing
    /// is inserted and the error is returned.
    pub fn get_or_create<Q: Query>(
        &mut self,
        key: CacheKey,
        descriptor: &QueryDescriptor<Q>,
    ) -> Result<&mut CacheEntry> {
        match self.entries.entry(key) {
            Entry::Occupied(entry) => Ok(entry.into_mut()),
            Entry::Vacant(entry) => {
                let query = descriptor.construct()?;
                debug!(key = %entry.key(), "Cache miss, created entry");
                self.counters.misses.fetch_add(1, Ordering::Relaxed);
                Ok(entry.insert(CacheEntry::new(query)))
            }
        }
    }

    /// Returns the number of entries.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns true if there are no entries.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub(crate) fn record_hit(&self) {
        self.counters.hits.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn record_refresh(&self) {
        self.counters.refreshes.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn record_failed_refresh(&self) {
        self.counters.failed_refreshes.fetch_add(1, Ordering::Relaxed);
    }
}

/// Cache statistics.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CacheStats {
    /// Entries currently held (fresh or stale)
    pub entries: usize,
    /// Calls served from a fresh entry
    pub hits: u64,
    /// Calls that created a new entry
    pub misses: u64,
    /// Successful executions of cached queries
    pub refreshes: u64,
    /// Executions of cached queries that failed
    pub failed_refreshes: u64,
    /// Number of resets since the store was created
    pub resets: u64,
}

impl CacheStats {
    /// Fraction of cached calls served without executing, in `[0, 1]`.
    pub fn hit_rate(&self) -> f64 {
        let served = self.hits + self.refreshes + self.failed_refreshes;
        if served == 0 {
            0.0
        } else {
            self.hits as f64 / served as f64
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use test_case::test_case;

    #[derive(Default)]
    struct Numbers {
        values: Vec<u32>,
    }

    impl Query for Numbers {
        fn execute(&mut self, _args: &QueryArgs) -> Result<()> {
            self.values = vec![1, 2, 3];
            Ok(())
        }
    }

    #[derive(Debug, Default)]
    struct Words;

    impl Query for Words {
        fn execute(&mut self, _args: &QueryArgs) -> Result<()> {
            Ok(())
        }
    }

    fn numbers() -> QueryDescriptor<Numbers> {
        QueryDescriptor::new("Numbers").cache_results(Duration::from_secs(30))
    }

    #[test]
    fn test_get_or_create_inserts_once() {
        let store = CacheStore::new();
        let key = store.key_for("Numbers", &QueryArgs::new().arg("a"));

        {
            let mut guard = store.lock();
            let entry = guard.get_or_create(key.clone(), &numbers()).unwrap();
            assert_eq!(entry.last_update(), None);
            entry.mark_refreshed(Duration::from_secs(5));
        }
        {
            let mut guard = store.lock();
            let entry = guard.get_or_create(key.clone(), &numbers()).unwrap();
            assert_eq!(entry.last_update(), Some(Duration::from_secs(5)));
            assert_eq!(guard.len(), 1);
        }

        assert_eq!(store.stats().misses, 1);
        assert!(store.contains("Numbers.a"));
    }

    #[test]
    fn test_failed_construction_inserts_nothing() {
        let store = CacheStore::new();
        let failing = QueryDescriptor::<Numbers>::with_constructor("Numbers", || {
            Err(QueryCacheError::construction("Numbers", "unavailable"))
        })
        .cache_results(Duration::from_secs(30));

        let mut guard = store.lock();
        let result = guard.get_or_create(CacheKey::from("Numbers"), &failing);
        assert!(matches!(result, Err(QueryCacheError::ConstructionFailed { .. })));
        assert!(guard.is_empty());
    }

    #[test]
    fn test_handle_shares_instance() {
        let store = CacheStore::new();
        let key = CacheKey::from("Numbers");
        let mut guard = store.lock();
        let entry = guard.get_or_create(key.clone(), &numbers()).unwrap();

        let first = entry.handle::<Numbers>(&key).unwrap();
        first
            .try_write()
            .unwrap()
            .execute(&QueryArgs::new())
            .unwrap();
        let second = entry.handle::<Numbers>(&key).unwrap();

        assert!(first.ptr_eq(&second));
        assert_eq!(second.read().values, vec![1, 2, 3]);
    }

    #[test]
    fn test_handle_type_mismatch() {
        let store = CacheStore::new();
        let key = CacheKey::from("Shared");
        let mut guard = store.lock();
        let entry = guard.get_or_create(key.clone(), &numbers()).unwrap();

        let err = entry.handle::<Words>(&key).unwrap_err();
        assert!(matches!(err, QueryCacheError::TypeMismatch { ref key, .. } if key == "Shared"));
    }

    #[test]
    fn test_replace_swaps_instance() {
        let store = CacheStore::new();
        let key = CacheKey::from("Numbers");
        let mut guard = store.lock();
        let entry = guard.get_or_create(key.clone(), &numbers()).unwrap();
        entry.mark_refreshed(Duration::from_secs(3));
        let old = entry.handle::<Numbers>(&key).unwrap();

        let new = entry.replace(Numbers {
            values: vec![9],
        });

        assert!(!old.ptr_eq(&new));
        assert!(new.ptr_eq(&entry.handle::<Numbers>(&key).unwrap()));
        assert!(old.read().values.is_empty());
        assert_eq!(entry.last_update(), Some(Duration::from_secs(3)));
    }

    #[test_case(None, 0, true ; "never executed is stale at zero")]
    #[test_case(None, 1_000, true ; "never executed is stale later")]
    #[test_case(Some(0), 10, false ; "within ttl")]
    #[test_case(Some(0), 30, false ; "exactly at ttl is fresh")]
    #[test_case(Some(0), 31, true ; "past ttl")]
    #[test_case(Some(50), 40, false ; "clock moved backwards")]
    fn test_is_stale(last: Option<u64>, now: u64, expected: bool) {
        let mut entry = CacheEntry::new(Numbers::default());
        if let Some(last) = last {
            entry.mark_refreshed(Duration::from_secs(last));
        }
        assert_eq!(entry.is_stale(Duration::from_secs(now), Duration::from_secs(30)), expected);
    }

    #[test]
    fn test_reset_clears_entries_and_counters() {
        let store = CacheStore::new();
        {
            let mut guard = store.lock();
            guard.get_or_create(CacheKey::from("Numbers.a"), &numbers()).unwrap();
            guard.get_or_create(CacheKey::from("Numbers.b"), &numbers()).unwrap();
            guard.record_hit();
        }
        assert_eq!(store.len(), 2);

        store.reset();

        assert!(store.is_empty());
        let stats = store.stats();
        assert_eq!(stats.hits, 0);
        assert_eq!(stats.misses, 0);
        assert_eq!(stats.resets, 1);
        assert_eq!(store.last_update("Numbers.a"), None);
    }

    #[test]
    fn test_key_for_uses_config() {
        let store = CacheStore::with_config(CacheConfig {
            key_separator: "|".into(),
            key_named_args: true,
            ..Default::default()
        });
        let key = store.key_for("Numbers", &QueryArgs::new().arg(1).named("page", 2));
        assert_eq!(key.as_str(), "Numbers|1|page=2");
    }

    #[test]
    fn test_hit_rate() {
        let stats = CacheStats {
            hits: 3,
            refreshes: 1,
            ..Default::default()
        };
        assert!((stats.hit_rate() - 0.75).abs() < f64::EPSILON);
        assert_eq!(CacheStats::default().hit_rate(), 0.0);
    }
}
