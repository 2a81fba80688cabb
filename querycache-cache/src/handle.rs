//! Shared handles to executed queries.

use std::fmt;
use std::sync::Arc;

use parking_lot::{RwLock, RwLockReadGuard, RwLockWriteGuard};

/// Shared handle to a query instance returned by the cache.
///
/// For cached queries every fresh hit hands out a handle to the same
/// instance; a later refresh updates that instance in place, so holders of an
/// older handle see the refreshed results on their next `read`.
///
/// Holding a read guard blocks refreshes of that entry, and a refresh runs
/// under the cache's coordination lock, so do not keep a guard alive across
/// another cached `execute` call.
pub struct QueryHandle<Q> {
    inner: Arc<RwLock<Q>>,
}

impl<Q> QueryHandle<Q> {
    pub(crate) fn new(query: Q) -> Self {
        Self {
            inner: Arc::new(RwLock::new(query)),
        }
    }

    pub(crate) fn from_shared(inner: Arc<RwLock<Q>>) -> Self {
        Self { inner }
    }

    /// Write access for a refresh, or `None` while a caller holds a guard.
    pub(crate) fn try_write(&self) -> Option<RwLockWriteGuard<'_, Q>> {
        self.inner.try_write()
    }

    /// Locks the query for reading its result fields.
    pub fn read(&self) -> RwLockReadGuard<'_, Q> {
        self.inner.read()
    }

    /// Reads a value out of the query.
    pub fn map<R>(&self, f: impl FnOnce(&Q) -> R) -> R {
        f(&*self.inner.read())
    }

    /// Returns true if both handles point to the same query instance.
    pub fn ptr_eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.inner, &other.inner)
    }
}

impl<Q> Clone for QueryHandle<Q> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<Q: fmt::Debug> fmt::Debug for QueryHandle<Q> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("QueryHandle").field(&*self.inner.read()).finish()
    }
}
