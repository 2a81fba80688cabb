//! Common traits for QueryCache.
//!
//! These traits define the seams between the cache coordinator and the code
//! around it: the queries it runs and the clock it reads.

use std::time::Duration;

use crate::error::Result;
use crate::types::QueryArgs;

// ═══════════════════════════════════════════════════════════════════════════════
// QUERY TRAIT
// ═══════════════════════════════════════════════════════════════════════════════

/// A unit of work whose results are stored on the instance itself.
///
/// `execute` has no return value beyond success or failure: a query populates
/// its own fields, and callers read them from the handle returned by the
/// cache. A cached instance is executed again each time its entry goes stale,
/// so implementations should overwrite (not accumulate) their result fields.
pub trait Query: Send + Sync + 'static {
    /// Runs the query, storing its results on `self`.
    ///
    /// # Arguments
    /// * `args` - Positional and named arguments supplied by the caller
    fn execute(&mut self, args: &QueryArgs) -> Result<()>;
}

// ═══════════════════════════════════════════════════════════════════════════════
// CLOCK TRAIT
// ═══════════════════════════════════════════════════════════════════════════════

/// Source of wall-clock time for staleness decisions.
pub trait Clock: Send + Sync {
    /// Returns the current time as a duration since the Unix epoch.
    fn now(&self) -> Duration;
}
