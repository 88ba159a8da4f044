//! Final, immutable storage produced by a build.

use ahash::AHashSet;
use std::net::IpAddr;

use crate::addr::{AddrRange, AddressKey};
use crate::cache::RecencyCache;
use crate::optimizer::{self, Strategy};
use crate::store::{ranges_contain, Accumulator, PendingRules};

/// Storage for one address family.
///
/// Lookups check the discrete set, then the recency cache, then binary
/// search the sorted ranges. Callers see a single `contains` regardless
/// of which strategy the optimizer chose.
#[derive(Debug)]
pub struct FamilyStorage<K: AddressKey> {
    discrete: AHashSet<K>,
    /// Sorted by start, pairwise disjoint
    ranges: Vec<AddrRange<K>>,
    strategy: Strategy,
    cache: RecencyCache<K>,
}

impl<K: AddressKey> FamilyStorage<K> {
    /// Optimize normalized pending rules into final storage.
    pub fn build(rules: &PendingRules<K>, threshold: u64, cache_capacity: usize) -> Self {
        let layout = optimizer::optimize(rules, threshold);
        // No ranges means nothing to shortcut.
        let cache = if layout.ranges.is_empty() {
            RecencyCache::disabled()
        } else {
            RecencyCache::new(cache_capacity)
        };

        Self {
            discrete: layout.discrete,
            ranges: layout.ranges,
            strategy: layout.strategy,
            cache,
        }
    }

    /// Check if an address is covered by any rule.
    pub fn contains(&self, addr: K) -> bool {
        if self.discrete.contains(&addr) {
            return true;
        }
        if self.ranges.is_empty() {
            return false;
        }
        if self.cache.contains(&addr) {
            return true;
        }
        if self.search_ranges(addr) {
            self.cache.record(addr);
            return true;
        }
        false
    }

    fn search_ranges(&self, addr: K) -> bool {
        ranges_contain(&self.ranges, addr)
    }

    /// Storage statistics.
    pub fn stats(&self) -> FamilyStats {
        FamilyStats {
            strategy: self.strategy,
            discrete: self.discrete.len(),
            ranges: self.ranges.len(),
            range_addresses: self
                .ranges
                .iter()
                .fold(0u128, |acc, r| acc.saturating_add(r.size())),
            cached: self.cache.len(),
            cache_capacity: self.cache.capacity(),
        }
    }
}

/// Storage for both families, published atomically by a build.
#[derive(Debug)]
pub struct Storage {
    pub v4: FamilyStorage<u32>,
    pub v6: FamilyStorage<u128>,
}

impl Storage {
    /// Build storage for both families from normalized rules.
    pub fn build(
        rules: &Accumulator,
        ipv4_threshold: u64,
        ipv6_threshold: u64,
        cache_capacity: usize,
    ) -> Self {
        Self {
            v4: FamilyStorage::build(&rules.v4, ipv4_threshold, cache_capacity),
            v6: FamilyStorage::build(&rules.v6, ipv6_threshold, cache_capacity),
        }
    }

    /// Check if an address is covered, dispatching by family.
    pub fn contains(&self, ip: IpAddr) -> bool {
        match ip {
            IpAddr::V4(v4) => self.v4.contains(u32::from(v4)),
            IpAddr::V6(v6) => self.v6.contains(u128::from(v6)),
        }
    }
}

/// Statistics for one family's storage.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FamilyStats {
    /// Strategy the optimizer chose
    pub strategy: Strategy,
    /// Addresses held in the discrete set
    pub discrete: usize,
    /// Number of unexpanded ranges
    pub ranges: usize,
    /// Addresses covered by the unexpanded ranges (saturating)
    pub range_addresses: u128,
    /// Addresses currently in the recency cache
    pub cached: usize,
    /// Recency cache capacity (0 when disabled)
    pub cache_capacity: usize,
}
