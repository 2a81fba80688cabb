//! Domain types for QueryCache.
//!
//! - [`QueryArgs`]: Positional and named arguments passed to a query
//! - [`CacheKey`]: Deterministic key derived from a query type and its arguments

mod args;
mod key;

pub use args::*;
pub use key::*;
