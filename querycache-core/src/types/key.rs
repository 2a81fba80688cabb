//! Cache keys.

use std::borrow::Borrow;
use std::fmt;

use serde::{Deserialize, Serialize};

use super::args::{render_arg, QueryArgs};
use crate::constants::NAMED_ARG_ASSIGN;

/// Identity of a cached query execution.
///
/// Built from the query type name followed by each positional argument, all
/// joined by a separator. Two executions with the same type name and the same
/// positional arguments always share a key.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CacheKey(String);

impl CacheKey {
    /// Derives the key for `type_name` called with `args`.
    ///
    /// When `include_named` is set, named arguments are appended in name
    /// order as `name=value` segments after the positional ones.
    pub fn derive(type_name: &str, args: &QueryArgs, separator: &str, include_named: bool) -> Self {
        let mut key = String::from(type_name);

        for value in &args.positional {
            key.push_str(separator);
            key.push_str(&render_arg(value));
        }

        if include_named {
            for (name, value) in &args.named {
                key.push_str(separator);
                key.push_str(name);
                key.push(NAMED_ARG_ASSIGN);
                key.push_str(&render_arg(value));
            }
        }

        Self(key)
    }

    /// Returns the key as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Consumes the key, returning the underlying string.
    pub fn into_inner(self) -> String {
        self.0
    }
}

impl fmt::Display for CacheKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl Borrow<str> for CacheKey {
    fn borrow(&self) -> &str {
        &self.0
    }
}

impl AsRef<str> for CacheKey {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl From<&str> for CacheKey {
    fn from(raw: &str) -> Self {
        Self(raw.to_string())
    }
}

impl From<String> for CacheKey {
    fn from(raw: String) -> Self {
        Self(raw)
    }
}
