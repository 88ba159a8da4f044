//! Access-control configuration: independent allow and deny matchers.
//!
//! The configuration file groups rules per family and per direction:
//!
//! ```yaml
//! dynamic: false
//! ipv4_map_threshold: 100000
//! ipv6_map_threshold: 50000
//! ipv4:
//!   allow: ["10.0.0.0/8", "192.168.1.10-192.168.1.20"]
//!   allow_file: ["allow_v4.txt"]
//!   deny: ["10.0.0.13"]
//! ipv6:
//!   deny_file: ["deny_v6.txt"]
//! ```
//!
//! Each direction becomes its own [`Matcher`]. How the two answers are
//! combined into a decision is up to the caller.

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

use crate::cache::DEFAULT_CACHE_CAPACITY;
use crate::error::{Error, Result};
use crate::matcher::{Matcher, MatcherConfig};

/// Rules of one family, split by direction.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RuleSetConfig {
    /// Inline allow rules
    pub allow: Vec<String>,
    /// Allow rule files
    pub allow_file: Vec<PathBuf>,
    /// Inline deny rules
    pub deny: Vec<String>,
    /// Deny rule files
    pub deny_file: Vec<PathBuf>,
}

impl RuleSetConfig {
    fn resolve_paths(&mut self, base: &Path) {
        for path in self.allow_file.iter_mut().chain(self.deny_file.iter_mut()) {
            if path.is_relative() {
                *path = base.join(&*path);
            }
        }
    }
}

/// Access-control configuration file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AccessConfig {
    /// Allow rule changes after the first build
    pub dynamic: bool,
    /// IPv4 set capacity (0 = default)
    pub ipv4_map_threshold: u64,
    /// IPv6 set capacity (0 = default)
    pub ipv6_map_threshold: u64,
    /// Recency cache capacity per family (0 disables)
    pub cache_capacity: usize,
    /// IPv4 rules
    pub ipv4: RuleSetConfig,
    /// IPv6 rules
    pub ipv6: RuleSetConfig,
}

impl Default for AccessConfig {
    fn default() -> Self {
        Self {
            dynamic: false,
            ipv4_map_threshold: 0,
            ipv6_map_threshold: 0,
            cache_capacity: DEFAULT_CACHE_CAPACITY,
            ipv4: RuleSetConfig::default(),
            ipv6: RuleSetConfig::default(),
        }
    }
}

impl AccessConfig {
    /// Parse a YAML configuration.
    pub fn from_yaml_str(content: &str) -> Result<Self> {
        Ok(serde_yaml::from_str(content)?)
    }

    /// Parse a JSON configuration.
    pub fn from_json_str(content: &str) -> Result<Self> {
        Ok(serde_json::from_str(content)?)
    }

    /// Load a configuration file.
    ///
    /// `.json` files are parsed as JSON; `.yaml`, `.yml` and files
    /// without an extension as YAML. Relative rule file paths are
    /// resolved against the directory of the configuration file.
    pub fn from_path(path: &Path) -> Result<Self> {
        let ext = path
            .extension()
            .map(|ext| ext.to_string_lossy().to_ascii_lowercase());

        let mut config = match ext.as_deref() {
            Some("json") => Self::from_json_str(&fs::read_to_string(path)?)?,
            None | Some("yaml") | Some("yml") => Self::from_yaml_str(&fs::read_to_string(path)?)?,
            Some(other) => {
                return Err(Error::Config(format!(
                    "unsupported configuration format {:?}: {}",
                    other,
                    path.display()
                )))
            }
        };

        if let Some(base) = path.parent() {
            config.ipv4.resolve_paths(base);
            config.ipv6.resolve_paths(base);
        }

        log::debug!("Loaded access configuration from {:?}", path);
        Ok(config)
    }

    fn base_config(&self) -> MatcherConfig {
        MatcherConfig::new()
            .dynamic(self.dynamic)
            .with_ipv4_threshold(self.ipv4_map_threshold)
            .with_ipv6_threshold(self.ipv6_map_threshold)
            .with_cache_capacity(self.cache_capacity)
    }

    /// Matcher configuration for the allow direction.
    pub fn allow_config(&self) -> MatcherConfig {
        self.base_config()
            .with_ipv4_rules(self.ipv4.allow.iter().cloned())
            .with_ipv4_files(self.ipv4.allow_file.iter().cloned())
            .with_ipv6_rules(self.ipv6.allow.iter().cloned())
            .with_ipv6_files(self.ipv6.allow_file.iter().cloned())
    }

    /// Matcher configuration for the deny direction.
    pub fn deny_config(&self) -> MatcherConfig {
        self.base_config()
            .with_ipv4_rules(self.ipv4.deny.iter().cloned())
            .with_ipv4_files(self.ipv4.deny_file.iter().cloned())
            .with_ipv6_rules(self.ipv6.deny.iter().cloned())
            .with_ipv6_files(self.ipv6.deny_file.iter().cloned())
    }
}

/// Allow and deny matchers built from one [`AccessConfig`].
///
/// An unconfigured direction is an unbuilt matcher and therefore
/// matches every address.
#[derive(Debug)]
pub struct AccessLists {
    allow: Matcher,
    deny: Matcher,
}

impl AccessLists {
    /// Build both matchers.
    pub fn from_config(config: &AccessConfig) -> Result<Self> {
        let allow = Matcher::new(config.allow_config())?;
        let deny = Matcher::new(config.deny_config())?;
        Ok(Self { allow, deny })
    }

    /// Load a configuration file and build both matchers.
    pub fn from_path(path: &Path) -> Result<Self> {
        Self::from_config(&AccessConfig::from_path(path)?)
    }

    /// The allow-list matcher.
    pub fn allow(&self) -> &Matcher {
        &self.allow
    }

    /// The deny-list matcher.
    pub fn deny(&self) -> &Matcher {
        &self.deny
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    const YAML: &str = r#"
dynamic: true
ipv4_map_threshold: 1000
ipv4:
  allow: ["10.0.0.0/8"]
  deny: ["10.0.0.13", "10.0.1.0-10.0.1.9"]
ipv6:
  allow: ["2001:db8::/32"]
"#;

    #[test]
    fn test_from_yaml() {
        let config = AccessConfig::from_yaml_str(YAML).unwrap();
        assert!(config.dynamic);
        assert_eq!(config.ipv4_map_threshold, 1000);
        assert_eq!(config.ipv6_map_threshold, 0);
        assert_eq!(config.ipv4.deny.len(), 2);
        assert!(config.ipv6.deny.is_empty());
        assert_eq!(config.cache_capacity, DEFAULT_CACHE_CAPACITY);
    }

    #[test]
    fn test_from_json() {
        let config = AccessConfig::from_json_str(
            r#"{"ipv4": {"deny": ["192.0.2.1"]}, "cache_capacity": 0}"#,
        )
        .unwrap();
        assert_eq!(config.ipv4.deny, vec!["192.0.2.1".to_string()]);
        assert_eq!(config.cache_capacity, 0);
    }

    #[test]
    fn test_invalid_yaml() {
        assert!(matches!(
            AccessConfig::from_yaml_str("ipv4: [").unwrap_err(),
            Error::Yaml(_)
        ));
    }

    #[test]
    fn test_direction_projection() {
        let config = AccessConfig::from_yaml_str(YAML).unwrap();

        let allow = config.allow_config();
        assert!(allow.dynamic);
        assert_eq!(allow.effective_ipv4_threshold(), 1000);
        assert_eq!(allow.ipv4_rules, vec!["10.0.0.0/8".to_string()]);
        assert_eq!(allow.ipv6_rules, vec!["2001:db8::/32".to_string()]);

        let deny = config.deny_config();
        assert_eq!(deny.ipv4_rules.len(), 2);
        assert!(deny.ipv6_rules.is_empty());
    }

    #[test]
    fn test_access_lists_are_independent() {
        let config = AccessConfig::from_yaml_str(YAML).unwrap();
        let lists = AccessLists::from_config(&config).unwrap();

        assert!(lists.allow().contains("10.0.0.13"));
        assert!(lists.deny().contains("10.0.0.13"));
        assert!(lists.allow().contains("10.0.1.5"));
        assert!(lists.deny().contains("10.0.1.5"));
        assert!(lists.allow().contains("10.9.9.9"));
        assert!(!lists.deny().contains("10.9.9.9"));
        assert!(!lists.allow().contains("192.0.2.1"));
        assert!(lists.allow().contains("2001:db8::1"));
    }

    #[test]
    fn test_unconfigured_direction_is_unrestricted() {
        let config = AccessConfig::from_yaml_str("ipv4:\n  deny: [\"192.0.2.1\"]\n").unwrap();
        let lists = AccessLists::from_config(&config).unwrap();

        assert!(!lists.allow().is_built());
        assert!(lists.allow().contains("198.51.100.1"));
        assert!(lists.deny().contains("192.0.2.1"));
        assert!(!lists.deny().contains("198.51.100.1"));
    }

    #[test]
    fn test_from_path_resolves_relative_files() {
        let dir = tempfile::tempdir().unwrap();

        let mut rules = fs::File::create(dir.path().join("deny_v4.txt")).unwrap();
        writeln!(rules, "# blocked").unwrap();
        writeln!(rules, "203.0.113.0/24").unwrap();

        let config_path = dir.path().join("access.yaml");
        fs::write(&config_path, "ipv4:\n  deny_file: [\"deny_v4.txt\"]\n").unwrap();

        let config = AccessConfig::from_path(&config_path).unwrap();
        assert_eq!(config.ipv4.deny_file, vec![dir.path().join("deny_v4.txt")]);

        let lists = AccessLists::from_path(&config_path).unwrap();
        assert!(lists.deny().contains("203.0.113.77"));
        assert!(!lists.deny().contains("203.0.114.1"));
    }

    #[test]
    fn test_unsupported_extension() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("access.toml");
        fs::write(&path, "dynamic = true\n").unwrap();

        assert!(matches!(
            AccessConfig::from_path(&path).unwrap_err(),
            Error::Config(_)
        ));
    }

    #[test]
    fn test_missing_rule_file() {
        let config = AccessConfig::from_yaml_str("ipv6:\n  allow_file: [\"/nonexistent/v6.txt\"]\n")
            .unwrap();
        assert!(matches!(
            AccessLists::from_config(&config).unwrap_err(),
            Error::RuleFile { .. }
        ));
    }
}
