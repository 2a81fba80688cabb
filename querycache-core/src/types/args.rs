//! Query arguments.

use std::collections::BTreeMap;

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::{QueryCacheError, Result};

/// Arguments supplied to a query execution.
///
/// Positional arguments participate in the cache key; named arguments are
/// passed through to the query but only join the key when the cache is
/// configured to include them.
///
/// # Example
/// ```
/// use querycache_core::QueryArgs;
///
/// let args = QueryArgs::new().arg("eu-west").named("limit", 10);
/// let region: String = args.positional(0).unwrap();
/// let limit: u32 = args.named_value("limit").unwrap();
/// assert_eq!(region, "eu-west");
/// assert_eq!(limit, 10);
/// ```
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct QueryArgs {
    /// Positional arguments, in call order
    #[serde(default)]
    pub positional: Vec<Value>,
    /// Named arguments, ordered by name
    #[serde(default)]
    pub named: BTreeMap<String, Value>,
}

impl QueryArgs {
    /// Creates an empty argument list.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates arguments from a sequence of positional values.
    pub fn from_positional<I, V>(values: I) -> Self
    where
        I: IntoIterator<Item = V>,
        V: Into<Value>,
    {
        Self {
            positional: values.into_iter().map(Into::into).collect(),
            named: BTreeMap::new(),
        }
    }

    /// Appends a positional argument.
    pub fn arg(mut self, value: impl Into<Value>) -> Self {
        self.positional.push(value.into());
        self
    }

    /// Sets a named argument, replacing any previous value under that name.
    pub fn named(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.named.insert(name.into(), value.into());
        self
    }

    /// Returns the number of positional arguments.
    pub fn len(&self) -> usize {
        self.positional.len()
    }

    /// Returns true if there are no positional or named arguments.
    pub fn is_empty(&self) -> bool {
        self.positional.is_empty() && self.named.is_empty()
    }

    /// Returns the raw positional argument at `index`.
    pub fn get(&self, index: usize) -> Option<&Value> {
        self.positional.get(index)
    }

    /// Returns the raw named argument.
    pub fn get_named(&self, name: &str) -> Option<&Value> {
        self.named.get(name)
    }

    /// Decodes the positional argument at `index`.
    pub fn positional<T: DeserializeOwned>(&self, index: usize) -> Result<T> {
        let value = self
            .get(index)
            .ok_or(QueryCacheError::MissingArgument { index })?;
        decode(value, || index.to_string())
    }

    /// Decodes a named argument.
    pub fn named_value<T: DeserializeOwned>(&self, name: &str) -> Result<T> {
        let value = self
            .get_named(name)
            .ok_or_else(|| QueryCacheError::MissingNamedArgument(name.to_string()))?;
        decode(value, || name.to_string())
    }

    /// Decodes a named argument, falling back to `default` when it is absent.
    ///
    /// A present value of the wrong shape is still an error.
    pub fn named_or<T: DeserializeOwned>(&self, name: &str, default: T) -> Result<T> {
        match self.get_named(name) {
            Some(value) => decode(value, || name.to_string()),
            None => Ok(default),
        }
    }
}

fn decode<T: DeserializeOwned>(value: &Value, argument: impl FnOnce() -> String) -> Result<T> {
    T::deserialize(value).map_err(|e| QueryCacheError::InvalidArgument {
        argument: argument(),
        reason: e.to_string(),
    })
}

/// Renders an argument the way it appears inside a cache key.
///
/// Strings render as their raw text; everything else as compact JSON.
pub fn render_arg(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}
