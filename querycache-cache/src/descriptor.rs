//! Query registration.
//!
//! A [`QueryDescriptor`] names a query type, says how to build an instance,
//! and carries the optional TTL that makes its results cacheable.

use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use querycache_core::constants::DEFAULT_CACHE_TIMEOUT;
use querycache_core::error::Result;
use querycache_core::traits::Query;

use crate::config::CacheConfig;

type Constructor<Q> = Arc<dyn Fn() -> Result<Q> + Send + Sync>;

/// Describes how to build and cache a query type.
///
/// # Example
/// ```
/// use std::time::Duration;
///
/// use querycache_cache::QueryDescriptor;
/// use querycache_core::{Query, QueryArgs, Result};
///
/// #[derive(Default)]
/// struct Regions {
///     names: Vec<String>,
/// }
///
/// impl Query for Regions {
///     fn execute(&mut self, _args: &QueryArgs) -> Result<()> {
///         self.names = vec!["eu-west".into()];
///         Ok(())
///     }
/// }
///
/// let uncached = QueryDescriptor::<Regions>::new("Regions");
/// assert!(!uncached.is_cacheable());
///
/// let cached = QueryDescriptor::<Regions>::new("Regions").cache_results(Duration::from_secs(30));
/// assert_eq!(cached.ttl(), Some(Duration::from_secs(30)));
/// ```
pub struct QueryDescriptor<Q> {
    type_name: &'static str,
    ttl: Option<Duration>,
    constructor: Constructor<Q>,
}

impl<Q: Query + Default> QueryDescriptor<Q> {
    /// Creates an uncached descriptor whose instances start from `Q::default()`.
    pub fn new(type_name: &'static str) -> Self {
        Self::with_constructor(type_name, || Ok(Q::default()))
    }

    /// Like [`QueryDescriptor::new`], naming the query after its Rust type.
    pub fn of() -> Self {
        Self::new(short_type_name::<Q>())
    }
}

impl<Q: Query> QueryDescriptor<Q> {
    /// Creates an uncached descriptor with a fallible constructor.
    pub fn with_constructor<F>(type_name: &'static str, constructor: F) -> Self
    where
        F: Fn() -> Result<Q> + Send + Sync + 'static,
    {
        Self {
            type_name,
            ttl: None,
            constructor: Arc::new(constructor),
        }
    }

    /// Marks the query as cacheable with the given TTL.
    pub fn cache_results(mut self, ttl: Duration) -> Self {
        self.ttl = Some(ttl);
        self
    }

    /// Marks the query as cacheable with the five-minute default TTL.
    pub fn cache_results_default(self) -> Self {
        self.cache_results(DEFAULT_CACHE_TIMEOUT)
    }

    /// Marks the query as cacheable with the configured default TTL.
    pub fn cache_results_from(self, config: &CacheConfig) -> Self {
        self.cache_results(config.default_timeout())
    }

    /// Returns the stable type name used in cache keys.
    pub fn type_name(&self) -> &'static str {
        self.type_name
    }

    /// Returns the TTL, or `None` if results are never cached.
    pub fn ttl(&self) -> Option<Duration> {
        self.ttl
    }

    /// Returns true if the query declares a TTL.
    pub fn is_cacheable(&self) -> bool {
        self.ttl.is_some()
    }

    /// Builds a new, not yet executed instance.
    pub fn construct(&self) -> Result<Q> {
        (self.constructor)()
    }
}

impl<Q> Clone for QueryDescriptor<Q> {
    fn clone(&self) -> Self {
        Self {
            type_name: self.type_name,
            ttl: self.ttl,
            constructor: Arc::clone(&self.constructor),
        }
    }
}

impl<Q> fmt::Debug for QueryDescriptor<Q> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("QueryDescriptor")
            .field("type_name", &self.type_name)
            .field("ttl", &self.ttl)
            .finish_non_exhaustive()
    }
}

/// Last path segment of a type name (`my_crate::queries::Foo` → `Foo`).
fn short_type_name<T>() -> &'static str {
    let full = std::any::type_name::<T>();
    let base = full.split('<').next().unwrap_or(full);
    base.rsplit("::").next().unwrap_or(base)
}
