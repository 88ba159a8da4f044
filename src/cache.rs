//! Recency cache for range matches.
//!
//! Records addresses recently confirmed by the range binary search so
//! that hot addresses skip the search on later queries. The cache only
//! ever holds positive results and has no effect on correctness.

use quick_cache::sync::Cache;

use crate::addr::AddressKey;

/// Default cache capacity (number of addresses).
pub const DEFAULT_CACHE_CAPACITY: usize = 1_024;

/// Bounded, concurrent cache of recently matched addresses.
///
/// Backed by `quick_cache`, which refreshes an entry on every hit and
/// evicts cold entries once the capacity is reached. A capacity of zero
/// disables the cache.
pub struct RecencyCache<K: AddressKey> {
    inner: Option<Cache<K, ()>>,
    capacity: usize,
}

impl<K: AddressKey> RecencyCache<K> {
    /// Create a cache holding up to `capacity` addresses.
    pub fn new(capacity: usize) -> Self {
        let inner = if capacity > 0 {
            Some(Cache::new(capacity))
        } else {
            None
        };
        Self { inner, capacity }
    }

    /// Create a disabled cache.
    pub fn disabled() -> Self {
        Self::new(0)
    }

    /// Check whether `addr` was recently matched, refreshing it on a hit.
    pub fn contains(&self, addr: &K) -> bool {
        match self.inner {
            Some(ref cache) => cache.get(addr).is_some(),
            None => false,
        }
    }

    /// Record a confirmed match.
    pub fn record(&self, addr: K) {
        if let Some(ref cache) = self.inner {
            cache.insert(addr, ());
        }
    }

    /// Number of cached addresses.
    pub fn len(&self) -> usize {
        self.inner.as_ref().map_or(0, |c| c.len())
    }

    /// Check if the cache holds nothing.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Configured capacity.
    pub fn capacity(&self) -> usize {
        self.capacity
    }

}

impl<K: AddressKey> std::fmt::Debug for RecencyCache<K> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RecencyCache")
            .field("capacity", &self.capacity)
            .field("len", &self.len())
            .finish()
    }
}
