//! Error types for ipguard.

use std::net::IpAddr;
use std::path::PathBuf;

use thiserror::Error;

use crate::addr::Family;

/// Error type for ipguard operations.
///
/// Only the load and build side of the matcher returns errors. Queries
/// never do: a malformed candidate address simply does not match.
#[derive(Error, Debug)]
pub enum Error {
    /// Malformed IP address
    #[error("invalid IP address: {0}")]
    InvalidAddress(String),

    /// Malformed rule (bad CIDR, bad range syntax)
    #[error("invalid rule: {0}")]
    InvalidRule(String),

    /// Range whose start is greater than its end
    #[error("invalid range: start {start} is greater than end {end}")]
    RangeOrder { start: IpAddr, end: IpAddr },

    /// Range endpoints of different families, or a rule of the wrong family
    #[error("address family mismatch in rule {rule:?}: expected {expected}")]
    FamilyMismatch { rule: String, expected: Family },

    /// Rule parse failure at a given line of a rule list
    #[error("line {line}: {source}")]
    RuleLine {
        line: usize,
        #[source]
        source: Box<Error>,
    },

    /// Rule file missing, unreadable or containing an invalid rule
    #[error("rule file {}: {source}", path.display())]
    RuleFile {
        path: PathBuf,
        #[source]
        source: Box<Error>,
    },

    /// Rule change attempted on a non-dynamic matcher after its first build
    #[error("matcher is not dynamic: rules cannot change after the first build")]
    StaticMatcher,

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// YAML parsing error
    #[error("YAML parsing error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    /// JSON parsing error
    #[error("JSON parsing error: {0}")]
    Json(#[from] serde_json::Error),

    /// Configuration error
    #[error("configuration error: {0}")]
    Config(String),
}

impl Error {
    /// Wrap this error with the rule file it came from.
    pub(crate) fn in_file(self, path: impl Into<PathBuf>) -> Self {
        Error::RuleFile {
            path: path.into(),
            source: Box::new(self),
        }
    }
}

/// Result type alias for ipguard operations.
pub type Result<T> = std::result::Result<T, Error>;
