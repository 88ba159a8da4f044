//! Build-time accumulation of parsed rules.

use crate::addr::{AddrRange, AddressKey};
use crate::rule::ParsedRule;

/// Rules of one family gathered before optimization.
#[derive(Debug, Clone)]
pub struct PendingRules<K> {
    /// Single addresses
    singles: Vec<K>,
    /// Ranges holding more than one address
    ranges: Vec<AddrRange<K>>,
}

impl<K> Default for PendingRules<K> {
    fn default() -> Self {
        Self {
            singles: Vec::new(),
            ranges: Vec::new(),
        }
    }
}

impl<K: AddressKey> PendingRules<K> {
    /// Create an empty set of pending rules.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a parsed range, routing single addresses to the discrete list.
    pub fn push(&mut self, range: AddrRange<K>) {
        if range.is_single() {
            self.singles.push(range.start);
        } else {
            self.ranges.push(range);
        }
    }

    /// Move all rules of `other` into `self`.
    pub fn append(&mut self, other: &mut Self) {
        self.singles.append(&mut other.singles);
        self.ranges.append(&mut other.ranges);
    }

    /// Single addresses.
    pub fn singles(&self) -> &[K] {
        &self.singles
    }

    /// Multi-address ranges.
    pub fn ranges(&self) -> &[AddrRange<K>] {
        &self.ranges
    }

    /// Total number of entries (singles plus ranges).
    pub fn len(&self) -> usize {
        self.singles.len() + self.ranges.len()
    }

    /// Check if no rules are pending.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Remove every pending rule.
    pub fn clear(&mut self) {
        self.singles.clear();
        self.ranges.clear();
    }

    /// Sort and de-duplicate singles, sort ranges by start and coalesce
    /// overlapping or adjacent ranges, then drop singles a range covers.
    ///
    /// After this call `ranges()` is sorted by start and pairwise disjoint,
    /// which the range binary search relies on, and every address is held
    /// by exactly one entry.
    pub fn normalize(&mut self) {
        self.singles.sort_unstable();
        self.singles.dedup();
        self.coalesce_ranges();

        if !self.ranges.is_empty() {
            let ranges = &self.ranges;
            self.singles.retain(|&addr| !ranges_contain(ranges, addr));
        }
    }

    fn coalesce_ranges(&mut self) {
        if self.ranges.len() < 2 {
            return;
        }

        self.ranges.sort_unstable_by_key(|r| (r.start, r.end));
        let mut merged: Vec<AddrRange<K>> = Vec::with_capacity(self.ranges.len());
        for range in self.ranges.drain(..) {
            match merged.last_mut() {
                Some(last) if range.start.to_u128() <= last.end.to_u128().saturating_add(1) => {
                    if range.end > last.end {
                        last.end = range.end;
                    }
                }
                _ => merged.push(range),
            }
        }
        self.ranges = merged;
    }
}

/// Check `addr` against ranges sorted by start and pairwise disjoint.
///
/// Binary searches for the range with the greatest start not above `addr`.
pub(crate) fn ranges_contain<K: AddressKey>(ranges: &[AddrRange<K>], addr: K) -> bool {
    match ranges.binary_search_by_key(&addr, |r| r.start) {
        Ok(_) => true,
        Err(0) => false,
        Err(idx) => addr <= ranges[idx - 1].end,
    }
}

/// Per-build accumulation store for both families.
#[derive(Debug, Clone, Default)]
pub struct Accumulator {
    pub v4: PendingRules<u32>,
    pub v6: PendingRules<u128>,
}

impl Accumulator {
    /// Create an empty accumulator.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a parsed rule to its family's store.
    pub fn push(&mut self, rule: ParsedRule) {
        match rule {
            ParsedRule::V4(range) => self.v4.push(range),
            ParsedRule::V6(range) => self.v6.push(range),
        }
    }

    /// Move all rules of `other` into `self`.
    pub fn append(&mut self, other: &mut Self) {
        self.v4.append(&mut other.v4);
        self.v6.append(&mut other.v6);
    }

    /// Normalize both families.
    pub fn normalize(&mut self) {
        self.v4.normalize();
        self.v6.normalize();
    }

    /// Total number of pending entries.
    pub fn len(&self) -> usize {
        self.v4.len() + self.v6.len()
    }

    /// Check if nothing is pending.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Remove every pending rule.
    pub fn clear(&mut self) {
        self.v4.clear();
        self.v6.clear();
    }
}

impl Extend<ParsedRule> for Accumulator {
    fn extend<I: IntoIterator<Item = ParsedRule>>(&mut self, iter: I) {
        for rule in iter {
            self.push(rule);
        }
    }
}
