//! # QueryCache Core
//!
//! Core types, errors, and traits for the QueryCache result-caching layer.
//!
//! This crate provides the building blocks shared by the other QueryCache crates:
//!
//! - **Types**: Query arguments and the cache keys derived from them
//! - **Errors**: A single error enum covering query and argument failures
//! - **Constants**: Default timeout and key separator
//! - **Traits**: The `Query` unit of work and the `Clock` time source
//!
//! ## Example
//!
//! ```rust
//! use querycache_core::{CacheKey, QueryArgs};
//!
//! let args = QueryArgs::new().arg("option-a").arg(7);
//! let key = CacheKey::derive("BarQuery", &args, ".", false);
//! assert_eq!(key.as_str(), "BarQuery.option-a.7");
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs, rust_2018_idioms, clippy::all)]

pub mod clock;
pub mod constants;
pub mod error;
pub mod traits;
pub mod types;

// Re-export commonly used items at crate root
pub use clock::{ManualClock, SystemClock};
pub use constants::*;
pub use error::{QueryCacheError, Result};
pub use traits::*;
pub use types::*;
