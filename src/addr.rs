//! Address families, integer address keys and inclusive ranges.

use std::fmt;
use std::hash::Hash;
use std::net::{IpAddr, Ipv4Addr, Ipv6Addr};

/// IP address family.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Family {
    /// IPv4
    V4,
    /// IPv6
    V6,
}

impl Family {
    /// Family of a parsed address.
    pub fn of(ip: &IpAddr) -> Self {
        match ip {
            IpAddr::V4(_) => Family::V4,
            IpAddr::V6(_) => Family::V6,
        }
    }

    /// Get the string representation.
    pub fn as_str(&self) -> &'static str {
        match self {
            Family::V4 => "IPv4",
            Family::V6 => "IPv6",
        }
    }
}

impl fmt::Display for Family {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Integer representation of an address of one family.
///
/// IPv4 addresses are keyed by `u32` and IPv6 addresses by `u128`.
/// All size and offset arithmetic is done in `u128`, which holds every
/// IPv4 and IPv6 address value.
pub trait AddressKey: Copy + Ord + Hash + fmt::Debug + Send + Sync + 'static {
    /// Family this key type represents.
    const FAMILY: Family;

    /// Widen to `u128`.
    fn to_u128(self) -> u128;

    /// Narrow from `u128`. The value must lie within the family's space.
    fn from_u128(value: u128) -> Self;

    /// Convert back to an IP address.
    fn to_ip(self) -> IpAddr;
}

impl AddressKey for u32 {
    const FAMILY: Family = Family::V4;

    fn to_u128(self) -> u128 {
        self as u128
    }

    fn from_u128(value: u128) -> Self {
        debug_assert!(value <= u32::MAX as u128);
        value as u32
    }

    fn to_ip(self) -> IpAddr {
        IpAddr::V4(Ipv4Addr::from(self))
    }
}

impl AddressKey for u128 {
    const FAMILY: Family = Family::V6;

    fn to_u128(self) -> u128 {
        self
    }

    fn from_u128(value: u128) -> Self {
        value
    }

    fn to_ip(self) -> IpAddr {
        IpAddr::V6(Ipv6Addr::from(self))
    }
}

/// Inclusive address range `[start, end]`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct AddrRange<K> {
    pub start: K,
    pub end: K,
}

/// IPv4 range keyed by `u32`.
pub type Ipv4Range = AddrRange<u32>;

/// IPv6 range keyed by `u128`.
pub type Ipv6Range = AddrRange<u128>;

impl<K: AddressKey> AddrRange<K> {
    /// Create a range. Callers guarantee `start <= end`.
    pub fn new(start: K, end: K) -> Self {
        debug_assert!(start <= end);
        Self { start, end }
    }

    /// Single-address range.
    pub fn single(addr: K) -> Self {
        Self {
            start: addr,
            end: addr,
        }
    }

    /// Whether this range holds exactly one address.
    pub fn is_single(&self) -> bool {
        self.start == self.end
    }

    /// Number of addresses in the range.
    ///
    /// Saturates at `u128::MAX` for the full IPv6 space (2^128 addresses).
    pub fn size(&self) -> u128 {
        (self.end.to_u128() - self.start.to_u128()).saturating_add(1)
    }

    /// Check if an address lies within the range.
    pub fn contains(&self, addr: K) -> bool {
        self.start <= addr && addr <= self.end
    }

    /// Split off the first `count` addresses.
    ///
    /// Returns `(head, tail)`; `count` must be at least 1 and smaller
    /// than the range size.
    pub fn split_at(&self, count: u128) -> (Self, Self) {
        debug_assert!(count > 0 && count < self.size());
        let boundary = self.start.to_u128() + count;
        (
            Self::new(self.start, K::from_u128(boundary - 1)),
            Self::new(K::from_u128(boundary), self.end),
        )
    }

    /// Iterate every address in the range.
    pub fn addresses(&self) -> impl Iterator<Item = K> {
        (self.start.to_u128()..=self.end.to_u128()).map(K::from_u128)
    }
}

impl<K: AddressKey> fmt::Display for AddrRange<K> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_single() {
            write!(f, "{}", self.start.to_ip())
        } else {
            write!(f, "{}-{}", self.start.to_ip(), self.end.to_ip())
        }
    }
}
