//! # QueryCache Queries
//!
//! Sample query types showing both registration styles:
//!
//! - [`FooQuery`]: registered without a TTL, so every call executes it
//! - [`BarQuery`]: cached for thirty seconds per `option` argument
//!
//! [`foos`] and [`bars`] are the accessors callers use; they run the query
//! through a shared [`QueryCache`](querycache_cache::QueryCache) and copy the
//! result fields out.

#![forbid(unsafe_code)]
#![warn(missing_docs, rust_2018_idioms)]

mod bar;
mod foo;

pub use bar::{bar_query, bars, BarQuery, BAR_CACHE_TIMEOUT};
pub use foo::{foo_query, foos, FooQuery};
