//! Matcher: build pipeline and query path.

mod config;

pub use config::MatcherConfig;

use arc_swap::ArcSwapOption;
use parking_lot::Mutex;
use std::net::IpAddr;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use crate::addr::Family;
use crate::error::{Error, Result};
use crate::rule::{
    load_rule_file, parse_ipv4_rule, parse_ipv6_rule, parse_rule, ParsedRule,
};
use crate::storage::{FamilyStats, Storage};
use crate::store::Accumulator;

/// Writer-side state, guarded by the build lock.
#[derive(Debug, Default)]
struct BuildState {
    /// Normalized rules behind the published storage
    committed: Accumulator,
    /// Rules queued since the last build
    queued: Accumulator,
    /// Next build starts from `queued` alone (set by `load_rules`)
    reset: bool,
    /// At least one build has been published
    built: bool,
}

/// Decides whether an IP address is covered by a set of rules.
///
/// Lifecycle: construct, load, build, query, and (in dynamic mode) add
/// rules and rebuild. Each build publishes a new immutable storage
/// snapshot with an atomic pointer swap, so queries never take a lock
/// and never see a mixture of old and new rules.
///
/// A matcher that has never been built matches every address: no rules
/// configured means no restriction.
///
/// # Examples
/// ```
/// use ipguard::{Matcher, MatcherConfig};
///
/// let config = MatcherConfig::new()
///     .with_ipv4_rules(["10.0.0.1-10.0.0.10", "192.168.1.0/24"])
///     .with_ipv6_rules(["2001:db8::/32"]);
/// let matcher = Matcher::new(config).unwrap();
///
/// assert!(matcher.contains("10.0.0.10"));
/// assert!(matcher.contains("2001:db8::42"));
/// assert!(!matcher.contains("10.0.0.11"));
/// assert!(!matcher.contains("not an address"));
/// ```
pub struct Matcher {
    config: MatcherConfig,
    state: Mutex<BuildState>,
    storage: ArcSwapOption<Storage>,
    /// Incremented on each published build
    generation: AtomicU64,
}

impl Matcher {
    /// Create a matcher, loading and building the configured rules.
    ///
    /// When no rule source is configured the matcher stays unbuilt and
    /// matches every address until rules are added and built.
    pub fn new(config: MatcherConfig) -> Result<Self> {
        let matcher = Self {
            config,
            state: Mutex::new(BuildState::default()),
            storage: ArcSwapOption::empty(),
            generation: AtomicU64::new(0),
        };

        if matcher.config.has_sources() {
            matcher.load_rules()?;
            matcher.build()?;
        } else {
            log::debug!("No rules configured; matcher is unrestricted until built");
        }

        Ok(matcher)
    }

    /// Get the configuration.
    pub fn config(&self) -> &MatcherConfig {
        &self.config
    }

    /// Whether rules may change after the first build.
    pub fn is_dynamic(&self) -> bool {
        self.config.dynamic
    }

    /// Whether a build has been published.
    pub fn is_built(&self) -> bool {
        self.storage.load().is_some()
    }

    /// Number of published builds.
    pub fn generation(&self) -> u64 {
        self.generation.load(Ordering::SeqCst)
    }

    /// (Re)load the configured inline rules and rule files.
    ///
    /// Every source is parsed before anything is committed: on error the
    /// queued rules are left untouched. On success the loaded rules
    /// replace everything queued or previously built; the change takes
    /// effect at the next [`build`](Self::build).
    pub fn load_rules(&self) -> Result<()> {
        self.ensure_mutable(self.is_built())?;

        let mut loaded = Accumulator::new();
        for rule in &self.config.ipv4_rules {
            if let Some(range) = parse_ipv4_rule(rule)? {
                loaded.v4.push(range);
            }
        }
        for path in &self.config.ipv4_files {
            loaded.extend(load_rule_file(path, Some(Family::V4))?);
        }
        for rule in &self.config.ipv6_rules {
            if let Some(range) = parse_ipv6_rule(rule)? {
                loaded.v6.push(range);
            }
        }
        for path in &self.config.ipv6_files {
            loaded.extend(load_rule_file(path, Some(Family::V6))?);
        }

        let mut state = self.state.lock();
        self.ensure_mutable(state.built)?;

        log::info!(
            "Loaded {} IPv4 and {} IPv6 rule entries",
            loaded.v4.len(),
            loaded.v6.len()
        );
        state.queued = loaded;
        state.reset = true;
        Ok(())
    }

    /// Queue an IPv4 rule for the next build.
    ///
    /// Rejects IPv6 rules with [`Error::FamilyMismatch`].
    pub fn add_ipv4_rule(&self, rule: &str) -> Result<()> {
        let parsed = parse_ipv4_rule(rule)?.map(ParsedRule::V4);
        self.enqueue(parsed)
    }

    /// Queue an IPv6 rule for the next build.
    ///
    /// Rejects IPv4 rules with [`Error::FamilyMismatch`].
    pub fn add_ipv6_rule(&self, rule: &str) -> Result<()> {
        let parsed = parse_ipv6_rule(rule)?.map(ParsedRule::V6);
        self.enqueue(parsed)
    }

    /// Queue a rule of either family for the next build.
    pub fn add_rule(&self, rule: &str) -> Result<()> {
        let parsed = parse_rule(rule)?;
        self.enqueue(parsed)
    }

    /// Queue several rules of either family; nothing is queued if any
    /// rule fails to parse.
    pub fn add_rules<I, S>(&self, rules: I) -> Result<()>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut parsed = Vec::new();
        for rule in rules {
            if let Some(rule) = parse_rule(rule.as_ref())? {
                parsed.push(rule);
            }
        }

        let mut state = self.state.lock();
        self.ensure_mutable(state.built)?;
        state.queued.extend(parsed);
        Ok(())
    }

    fn enqueue(&self, rule: Option<ParsedRule>) -> Result<()> {
        let mut state = self.state.lock();
        self.ensure_mutable(state.built)?;
        if let Some(rule) = rule {
            state.queued.push(rule);
        }
        Ok(())
    }

    /// Optimize the queued rules (plus the previously built ones) into
    /// new storage and publish it atomically.
    ///
    /// A non-dynamic matcher can be built exactly once.
    pub fn build(&self) -> Result<()> {
        let mut state = self.state.lock();
        self.ensure_mutable(state.built)?;

        let mut rules = if state.reset {
            Accumulator::new()
        } else {
            std::mem::take(&mut state.committed)
        };
        rules.append(&mut state.queued);
        rules.normalize();

        let storage = Storage::build(
            &rules,
            self.config.effective_ipv4_threshold(),
            self.config.effective_ipv6_threshold(),
            self.config.cache_capacity,
        );
        self.storage.store(Some(Arc::new(storage)));
        let generation = self.generation.fetch_add(1, Ordering::SeqCst) + 1;

        log::info!(
            "Published rule storage generation {}: {} IPv4 and {} IPv6 entries",
            generation,
            rules.v4.len(),
            rules.v6.len()
        );

        // Only a dynamic matcher can build again.
        if self.config.dynamic {
            state.committed = rules;
        } else {
            state.committed.clear();
        }
        state.reset = false;
        state.built = true;
        Ok(())
    }

    /// Check if an address string is covered by the rules.
    ///
    /// Never fails: an unbuilt matcher returns `true`, and a string that
    /// is not exactly a valid IP address returns `false`.
    pub fn contains(&self, address: &str) -> bool {
        let guard = self.storage.load();
        let storage = match &*guard {
            Some(storage) => storage,
            None => return true,
        };

        match address.parse::<IpAddr>() {
            Ok(ip) => storage.contains(ip),
            Err(_) => false,
        }
    }

    /// Check if a parsed address is covered by the rules.
    ///
    /// An unbuilt matcher returns `true`.
    pub fn contains_addr(&self, ip: IpAddr) -> bool {
        match &*self.storage.load() {
            Some(storage) => storage.contains(ip),
            None => true,
        }
    }

    /// Get storage statistics.
    pub fn stats(&self) -> MatcherStats {
        let queued = self.state.lock().queued.len();
        let guard = self.storage.load();
        let (ipv4, ipv6) = match &*guard {
            Some(storage) => (Some(storage.v4.stats()), Some(storage.v6.stats())),
            None => (None, None),
        };

        MatcherStats {
            generation: self.generation(),
            queued,
            ipv4,
            ipv6,
        }
    }

    fn ensure_mutable(&self, built: bool) -> Result<()> {
        if built && !self.config.dynamic {
            log::warn!("Rejected rule change on a non-dynamic matcher");
            return Err(Error::StaticMatcher);
        }
        Ok(())
    }
}

impl std::fmt::Debug for Matcher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Matcher")
            .field("dynamic", &self.config.dynamic)
            .field("built", &self.is_built())
            .field("generation", &self.generation())
            .finish()
    }
}

/// Matcher statistics.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MatcherStats {
    /// Number of published builds
    pub generation: u64,
    /// Rule entries queued for the next build
    pub queued: usize,
    /// IPv4 storage (None until built)
    pub ipv4: Option<FamilyStats>,
    /// IPv6 storage (None until built)
    pub ipv6: Option<FamilyStats>,
}

impl MatcherStats {
    /// Whether a build has been published.
    pub fn is_built(&self) -> bool {
        self.ipv4.is_some()
    }
}
