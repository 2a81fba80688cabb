//! # QueryCache
//!
//! TTL-based memoization of query executions.
//!
//! A query registers through a [`QueryDescriptor`]; descriptors with a TTL
//! have their executed instances kept in a shared [`CacheStore`] and reused
//! until the TTL passes, while descriptors without one run on every call.
//!
//! ## Example
//!
//! ```rust
//! use std::time::Duration;
//!
//! use querycache_cache::{QueryCache, QueryDescriptor};
//! use querycache_core::{Query, QueryArgs, Result};
//!
//! #[derive(Default)]
//! struct Prices {
//!     symbol: String,
//!     last: f64,
//! }
//!
//! impl Query for Prices {
//!     fn execute(&mut self, args: &QueryArgs) -> Result<()> {
//!         self.symbol = args.positional(0)?;
//!         self.last = 101.5;
//!         Ok(())
//!     }
//! }
//!
//! let cache = QueryCache::new();
//! let prices = QueryDescriptor::<Prices>::new("Prices").cache_results(Duration::from_secs(30));
//!
//! let handle = cache.execute(&prices, &QueryArgs::new().arg("ACME"))?;
//! assert_eq!(handle.read().symbol, "ACME");
//! # Ok::<(), querycache_core::QueryCacheError>(())
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs, rust_2018_idioms)]

mod config;
mod coordinator;
mod descriptor;
mod handle;
mod store;


pub use config::CacheConfig;
pub use coordinator::QueryCache;
pub use descriptor::QueryDescriptor;
pub use handle::QueryHandle;
pub use store::{CacheEntry, CacheStats, CacheStore, StoreGuard};
