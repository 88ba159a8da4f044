//! ipguard - hybrid IPv4/IPv6 address matching for access-control rules.
//!
//! A [`Matcher`] answers one question: is this address covered by the
//! configured rules? Rules are single addresses, CIDR subnets or
//! inclusive `start-end` ranges, in either family.
//!
//! # Features
//!
//! - **Two-phase build**: rules are parsed into an accumulation store,
//!   then optimized once per build
//! - **Hybrid storage**: small rules are expanded into an O(1) hash set
//!   up to a configurable address budget; the rest stay as sorted,
//!   disjoint ranges searched in O(log n)
//! - **Recency cache**: recently matched range addresses skip the search
//! - **Lock-free queries**: builds publish immutable snapshots atomically
//! - **Dynamic mode**: rules can be added and rebuilt while serving
//!
//! # Quick Start
//!
//! ```
//! use ipguard::{Matcher, MatcherConfig};
//!
//! let config = MatcherConfig::new()
//!     .dynamic(true)
//!     .with_ipv4_rules(["10.0.0.5", "192.168.1.0/24", "10.0.0.1-10.0.0.3"]);
//! let matcher = Matcher::new(config)?;
//!
//! assert!(matcher.contains("192.168.1.255"));
//! assert!(!matcher.contains("192.168.2.0"));
//!
//! // Queued rules take effect at the next build
//! matcher.add_ipv6_rule("2001:db8::/32")?;
//! matcher.build()?;
//! assert!(matcher.contains("2001:db8::1"));
//! # Ok::<(), ipguard::Error>(())
//! ```
//!
//! # Semantics
//!
//! - A matcher that was never built matches **every** address.
//! - A malformed candidate address matches **nothing**; queries never
//!   return errors.
//! - Membership is a flat union of rules. Allow and deny lists are two
//!   independent matchers (see [`AccessLists`]).

mod addr;
mod error;

pub mod access;
pub mod cache;
pub mod matcher;
pub mod optimizer;
pub mod rule;
pub mod storage;
pub mod store;

// Re-export core types
pub use addr::{AddrRange, AddressKey, Family, Ipv4Range, Ipv6Range};
pub use error::{Error, Result};

// Re-export matcher types
pub use matcher::{Matcher, MatcherConfig, MatcherStats};
pub use storage::FamilyStats;

// Re-export configuration types
pub use access::{AccessConfig, AccessLists, RuleSetConfig};

// Re-export tuning knobs
pub use cache::DEFAULT_CACHE_CAPACITY;
pub use optimizer::{Strategy, DEFAULT_IPV4_THRESHOLD, DEFAULT_IPV6_THRESHOLD};
