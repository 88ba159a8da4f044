//! Storage optimizer.
//!
//! Decides how much of a rule set is materialized into an O(1) hash set
//! and how much stays as sorted ranges for binary search, under a
//! capacity threshold counted in addresses. The same algorithm serves
//! both families; IPv4 keys are `u32`, IPv6 keys are `u128`, and all
//! budget arithmetic is done in saturating `u128`.

use ahash::AHashSet;

use crate::addr::{AddrRange, AddressKey};
use crate::store::PendingRules;

/// Default IPv4 threshold (addresses materialized into the set).
pub const DEFAULT_IPV4_THRESHOLD: u64 = 100_000;

/// Default IPv6 threshold.
///
/// Smaller than the IPv4 default: IPv6 rules such as a `/64` are far too
/// large to ever expand, so the set mostly holds single addresses.
pub const DEFAULT_IPV6_THRESHOLD: u64 = 50_000;

/// Strategy chosen for one family.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Strategy {
    /// Every rule expanded into the set; no ranges left.
    Expanded,
    /// Singles plus the smallest ranges expanded, the rest kept as ranges.
    Mixed,
    /// Singles alone exhaust the budget; all ranges kept as ranges.
    RangesOnly,
}

/// Optimized storage layout for one family.
#[derive(Debug, Clone)]
pub struct Layout<K> {
    /// Individually held addresses
    pub discrete: AHashSet<K>,
    /// Unexpanded ranges, sorted by start and pairwise disjoint
    pub ranges: Vec<AddrRange<K>>,
    /// Strategy that produced this layout
    pub strategy: Strategy,
}

/// Build the storage layout for normalized pending rules.
///
/// `rules` must be normalized (see [`PendingRules::normalize`]) so that
/// singles are distinct and ranges are sorted and disjoint.
pub fn optimize<K: AddressKey>(rules: &PendingRules<K>, threshold: u64) -> Layout<K> {
    let singles = rules.singles();
    let single_count = singles.len() as u128;
    let range_total = rules
        .ranges()
        .iter()
        .fold(0u128, |acc, r| acc.saturating_add(r.size()));
    let total = single_count.saturating_add(range_total);
    let budget = threshold as u128;

    let mut discrete = AHashSet::with_capacity(singles.len());
    discrete.extend(singles.iter().copied());

    let layout = if total <= budget {
        for range in rules.ranges() {
            discrete.extend(range.addresses());
        }
        Layout {
            discrete,
            ranges: Vec::new(),
            strategy: Strategy::Expanded,
        }
    } else if single_count >= budget {
        Layout {
            discrete,
            ranges: rules.ranges().to_vec(),
            strategy: Strategy::RangesOnly,
        }
    } else {
        let ranges = expand_smallest(&mut discrete, rules.ranges(), budget - single_count);
        Layout {
            discrete,
            ranges,
            strategy: Strategy::Mixed,
        }
    };

    log::debug!(
        "{} storage: {:?}, {} addresses total, threshold {}, {} discrete, {} ranges",
        K::FAMILY,
        layout.strategy,
        total,
        threshold,
        layout.discrete.len(),
        layout.ranges.len()
    );

    layout
}

/// Greedily expand ranges smallest-first until `budget` addresses are used.
///
/// A range that only partly fits is split: its head is expanded and its
/// tail stays a range. Returns the unexpanded ranges sorted by start.
fn expand_smallest<K: AddressKey>(
    discrete: &mut AHashSet<K>,
    ranges: &[AddrRange<K>],
    mut budget: u128,
) -> Vec<AddrRange<K>> {
    let mut by_size: Vec<&AddrRange<K>> = ranges.iter().collect();
    by_size.sort_by_key(|r| (r.size(), r.start));

    let mut remaining = Vec::new();
    for range in by_size {
        let size = range.size();
        if budget == 0 {
            remaining.push(*range);
        } else if size <= budget {
            discrete.extend(range.addresses());
            budget -= size;
        } else {
            let (head, tail) = range.split_at(budget);
            discrete.extend(head.addresses());
            remaining.push(tail);
            budget = 0;
        }
    }

    remaining.sort_unstable_by_key(|r| r.start);
    remaining
}
