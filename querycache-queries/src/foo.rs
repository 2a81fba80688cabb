//! Uncached example query.

use serde::Serialize;
use tracing::debug;

use querycache_cache::{QueryCache, QueryDescriptor};
use querycache_core::{Query, QueryArgs, Result};

/// Query whose results are never cached.
#[derive(Clone, Debug, Default, Serialize)]
pub struct FooQuery {
    /// Result field populated by `execute`
    pub foos: Vec<u32>,
}

impl Query for FooQuery {
    fn execute(&mut self, _args: &QueryArgs) -> Result<()> {
        self.foos = vec![1, 2, 3];
        debug!(count = self.foos.len(), "Loaded foos");
        Ok(())
    }
}

/// Descriptor for [`FooQuery`]; no TTL.
pub fn foo_query() -> QueryDescriptor<FooQuery> {
    QueryDescriptor::new("FooQuery")
}

/// Runs [`FooQuery`] and returns its results.
pub fn foos(cache: &QueryCache) -> Result<Vec<u32>> {
    cache.fetch(&foo_query(), &QueryArgs::new(), |q| q.foos.clone())
}
