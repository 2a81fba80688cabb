//! Query execution through the cache.

use std::sync::Arc;

use tracing::{debug, instrument, warn};

use querycache_core::clock::SystemClock;
use querycache_core::error::Result;
use querycache_core::traits::{Clock, Query};
use querycache_core::types::QueryArgs;

use crate::config::CacheConfig;
use crate::descriptor::QueryDescriptor;
use crate::handle::QueryHandle;
use crate::store::{CacheStats, CacheStore};

/// Executes queries, reusing cached results while they are fresh.
///
/// Cloning is cheap and every clone shares the same store and clock, so one
/// instance can be created at startup and handed to every caller.
///
/// # Concurrency
///
/// All cacheable executions are serialized by the store's single
/// coordination lock, including the refresh itself: while one caller runs a
/// stale query, every other cacheable caller waits, whatever its key.
/// Uncached queries never touch the lock.
#[derive(Clone)]
pub struct QueryCache {
    store: Arc<CacheStore>,
    clock: Arc<dyn Clock>,
}

impl QueryCache {
    /// Creates a cache with default configuration and the system clock.
    pub fn new() -> Self {
        Self::with_config(CacheConfig::default())
    }

    /// Creates a cache with custom configuration and the system clock.
    pub fn with_config(config: CacheConfig) -> Self {
        Self {
            store: Arc::new(CacheStore::with_config(config)),
            clock: Arc::new(SystemClock),
        }
    }

    /// Creates a cache configured from the environment.
    pub fn from_env() -> Result<Self> {
        let config = CacheConfig::from_env();
        config.validate()?;
        Ok(Self::with_config(config))
    }

    /// Replaces the clock used for staleness decisions.
    pub fn with_clock(mut self, clock: impl Clock + 'static) -> Self {
        self.clock = Arc::new(clock);
        self
    }

    /// Executes a query, returning a handle to its results.
    ///
    /// Without a TTL the query is constructed and executed on every call.
    /// With a TTL, the cached instance for the derived key is returned
    /// unchanged while fresh, and executed again in place once strictly more
    /// than the TTL has passed since its last successful run. If a caller is
    /// still reading the cached instance, a new instance is executed and
    /// replaces it instead, and the old handle keeps its previous results.
    /// The refresh time is only recorded after `execute` succeeds, so a
    /// failed refresh is retried on the next call.
    ///
    /// # Errors
    ///
    /// Construction and execution failures from the query are returned
    /// unchanged. `TypeMismatch` is returned if the key already holds a
    /// different query type.
    #[instrument(skip(self, descriptor, args), fields(query = descriptor.type_name()))]
    pub fn execute<Q: Query>(
        &self,
        descriptor: &QueryDescriptor<Q>,
        args: &QueryArgs,
    ) -> Result<QueryHandle<Q>> {
        let Some(ttl) = descriptor.ttl() else {
            return Self::execute_uncached(descriptor, args);
        };

        let key = self.store.key_for(descriptor.type_name(), args);
        let mut guard = self.store.lock();
        let entry = guard.get_or_create(key.clone(), descriptor)?;
        let handle = entry.handle::<Q>(&key)?;

        let now = self.clock.now();
        if !entry.is_stale(now, ttl) {
            debug!(%key, "Cache hit");
            guard.record_hit();
            return Ok(handle);
        }

        debug!(%key, "Refreshing stale entry");
        let refreshed = match handle.try_write() {
            Some(mut query) => query.execute(args).map(|()| None),
            None => {
                debug!(%key, "Instance is being read, refreshing a new one");
                Self::run_fresh(descriptor, args).map(Some)
            }
        };
        match refreshed {
            Ok(fresh) => {
                let handle = match fresh {
                    Some(query) => entry.replace(query),
                    None => handle,
                };
                entry.mark_refreshed(now);
                guard.record_refresh();
                Ok(handle)
            }
            Err(error) => {
                warn!(%key, %error, "Refresh failed");
                guard.record_failed_refresh();
                Err(error)
            }
        }
    }

    /// Executes a query and reads a value out of it.
    pub fn fetch<Q: Query, R>(
        &self,
        descriptor: &QueryDescriptor<Q>,
        args: &QueryArgs,
        read: impl FnOnce(&Q) -> R,
    ) -> Result<R> {
        Ok(self.execute(descriptor, args)?.map(read))
    }

    fn execute_uncached<Q: Query>(
        descriptor: &QueryDescriptor<Q>,
        args: &QueryArgs,
    ) -> Result<QueryHandle<Q>> {
        debug!("Executing uncached query");
        Self::run_fresh(descriptor, args).map(QueryHandle::new)
    }

    fn run_fresh<Q: Query>(descriptor: &QueryDescriptor<Q>, args: &QueryArgs) -> Result<Q> {
        let mut query = descriptor.construct()?;
        query.execute(args)?;
        Ok(query)
    }

    /// Clears all cached entries.
    pub fn reset(&self) {
        self.store.reset();
    }

    /// Returns the underlying store.
    pub fn store(&self) -> &CacheStore {
        &self.store
    }

    /// Returns the cache configuration.
    pub fn config(&self) -> &CacheConfig {
        self.store.config()
    }

    /// Returns cache statistics.
    pub fn stats(&self) -> CacheStats {
        self.store.stats()
    }
}

impl Default for QueryCache {
    fn default() -> Self {
        Self::new()
    }
}
