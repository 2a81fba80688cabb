//! Constants for QueryCache.

use std::time::Duration;

// ═══════════════════════════════════════════════════════════════════════════════
// CACHE TIMEOUTS
// ═══════════════════════════════════════════════════════════════════════════════

/// Default cache timeout in seconds (five minutes).
pub const DEFAULT_CACHE_TIMEOUT_SECONDS: u64 = 5 * 60;

/// Default cache timeout applied when a query is registered as cacheable
/// without an explicit TTL.
pub const DEFAULT_CACHE_TIMEOUT: Duration = Duration::from_secs(DEFAULT_CACHE_TIMEOUT_SECONDS);

// ═══════════════════════════════════════════════════════════════════════════════
// CACHE KEYS
// ═══════════════════════════════════════════════════════════════════════════════

/// Separator placed between the query type name and each argument in a cache key.
pub const DEFAULT_KEY_SEPARATOR: &str = ".";

/// Separator between a named argument's name and value when named arguments
/// participate in the key.
pub const NAMED_ARG_ASSIGN: char = '=';

// ═══════════════════════════════════════════════════════════════════════════════
// ENVIRONMENT
// ═══════════════════════════════════════════════════════════════════════════════

/// Environment variable overriding the default cache timeout (seconds).
pub const ENV_DEFAULT_TIMEOUT: &str = "QUERYCACHE_DEFAULT_TIMEOUT";

/// Environment variable overriding the key separator.
pub const ENV_KEY_SEPARATOR: &str = "QUERYCACHE_KEY_SEPARATOR";

/// Environment variable enabling named arguments in cache keys.
pub const ENV_KEY_NAMED_ARGS: &str = "QUERYCACHE_KEY_NAMED_ARGS";
