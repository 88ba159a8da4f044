//! Matcher configuration.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::cache::DEFAULT_CACHE_CAPACITY;
use crate::optimizer::{DEFAULT_IPV4_THRESHOLD, DEFAULT_IPV6_THRESHOLD};

/// Configuration for a single [`Matcher`](super::Matcher).
///
/// A matcher only answers membership; allow and deny lists are two
/// matchers built from two configurations.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct MatcherConfig {
    /// Allow rule changes and rebuilds after the first build
    pub dynamic: bool,
    /// Addresses the IPv4 optimizer may expand into the set (0 = default)
    pub ipv4_threshold: u64,
    /// Addresses the IPv6 optimizer may expand into the set (0 = default)
    pub ipv6_threshold: u64,
    /// Recency cache capacity per family (0 disables the cache)
    pub cache_capacity: usize,
    /// Inline IPv4 rules
    pub ipv4_rules: Vec<String>,
    /// IPv4 rule files
    pub ipv4_files: Vec<PathBuf>,
    /// Inline IPv6 rules
    pub ipv6_rules: Vec<String>,
    /// IPv6 rule files
    pub ipv6_files: Vec<PathBuf>,
}

impl Default for MatcherConfig {
    fn default() -> Self {
        Self {
            dynamic: false,
            ipv4_threshold: 0,
            ipv6_threshold: 0,
            cache_capacity: DEFAULT_CACHE_CAPACITY,
            ipv4_rules: Vec::new(),
            ipv4_files: Vec::new(),
            ipv6_rules: Vec::new(),
            ipv6_files: Vec::new(),
        }
    }
}

impl MatcherConfig {
    /// Create an empty configuration.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set dynamic mode.
    pub fn dynamic(mut self, dynamic: bool) -> Self {
        self.dynamic = dynamic;
        self
    }

    /// Set the IPv4 threshold.
    pub fn with_ipv4_threshold(mut self, threshold: u64) -> Self {
        self.ipv4_threshold = threshold;
        self
    }

    /// Set the IPv6 threshold.
    pub fn with_ipv6_threshold(mut self, threshold: u64) -> Self {
        self.ipv6_threshold = threshold;
        self
    }

    /// Set the recency cache capacity.
    pub fn with_cache_capacity(mut self, capacity: usize) -> Self {
        self.cache_capacity = capacity;
        self
    }

    /// Add inline IPv4 rules.
    pub fn with_ipv4_rules<I, S>(mut self, rules: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.ipv4_rules.extend(rules.into_iter().map(Into::into));
        self
    }

    /// Add IPv4 rule files.
    pub fn with_ipv4_files<I, P>(mut self, files: I) -> Self
    where
        I: IntoIterator<Item = P>,
        P: Into<PathBuf>,
    {
        self.ipv4_files.extend(files.into_iter().map(Into::into));
        self
    }

    /// Add inline IPv6 rules.
    pub fn with_ipv6_rules<I, S>(mut self, rules: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.ipv6_rules.extend(rules.into_iter().map(Into::into));
        self
    }

    /// Add IPv6 rule files.
    pub fn with_ipv6_files<I, P>(mut self, files: I) -> Self
    where
        I: IntoIterator<Item = P>,
        P: Into<PathBuf>,
    {
        self.ipv6_files.extend(files.into_iter().map(Into::into));
        self
    }

    /// IPv4 threshold with the default applied.
    pub fn effective_ipv4_threshold(&self) -> u64 {
        match self.ipv4_threshold {
            0 => DEFAULT_IPV4_THRESHOLD,
            n => n,
        }
    }

    /// IPv6 threshold with the default applied.
    pub fn effective_ipv6_threshold(&self) -> u64 {
        match self.ipv6_threshold {
            0 => DEFAULT_IPV6_THRESHOLD,
            n => n,
        }
    }

    /// Whether any rule source is configured.
    pub fn has_sources(&self) -> bool {
        !(self.ipv4_rules.is_empty()
            && self.ipv4_files.is_empty()
            && self.ipv6_rules.is_empty()
            && self.ipv6_files.is_empty())
    }
}
