//! Cached example query.

use std::time::Duration;

use serde::Serialize;
use tracing::debug;

use querycache_cache::{QueryCache, QueryDescriptor};
use querycache_core::{Query, QueryArgs, Result};

/// How long [`BarQuery`] results stay fresh.
pub const BAR_CACHE_TIMEOUT: Duration = Duration::from_secs(30);

/// Query cached per `option` argument.
///
/// Expects one positional argument, the option string, which also selects
/// the cache entry.
#[derive(Clone, Debug, Default, Serialize)]
pub struct BarQuery {
    /// Option the results were loaded for
    pub option: String,
    /// Result field populated by `execute`
    pub bars: Vec<String>,
}

impl Query for BarQuery {
    fn execute(&mut self, args: &QueryArgs) -> Result<()> {
        self.option = args.positional(0)?;
        self.bars = vec!["bar1".to_string(), "bar2".to_string()];
        debug!(option = %self.option, "Loaded bars");
        Ok(())
    }
}

/// Descriptor for [`BarQuery`], cached for [`BAR_CACHE_TIMEOUT`].
pub fn bar_query() -> QueryDescriptor<BarQuery> {
    QueryDescriptor::new("BarQuery").cache_results(BAR_CACHE_TIMEOUT)
}

/// Runs [`BarQuery`] for `option` through the cache and returns its results.
pub fn bars(cache: &QueryCache, option: &str) -> Result<Vec<String>> {
    cache.fetch(&bar_query(), &QueryArgs::new().arg(option), |q| q.bars.clone())
}
