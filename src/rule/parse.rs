//! Rule grammar: single address, CIDR subnet, inclusive range.

use ipnet::IpNet;
use std::net::IpAddr;

use crate::addr::{AddrRange, Family, Ipv4Range, Ipv6Range};
use crate::error::{Error, Result};

/// A parsed rule: an inclusive range in one address family.
///
/// Single addresses are represented as degenerate ranges with
/// `start == end`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParsedRule {
    V4(Ipv4Range),
    V6(Ipv6Range),
}

impl ParsedRule {
    /// Family of this rule.
    pub fn family(&self) -> Family {
        match self {
            ParsedRule::V4(_) => Family::V4,
            ParsedRule::V6(_) => Family::V6,
        }
    }

    /// Whether this rule names exactly one address.
    pub fn is_single(&self) -> bool {
        match self {
            ParsedRule::V4(r) => r.is_single(),
            ParsedRule::V6(r) => r.is_single(),
        }
    }
}

/// Parse a rule of either family.
///
/// Accepted forms:
/// - `10.0.0.5`, `2001:db8::1` (single address)
/// - `192.168.1.0/24`, `2001:db8::/32` (CIDR; host bits are masked off)
/// - `10.0.0.1-10.0.0.10`, `2001:db8::1-2001:db8::ff` (inclusive range)
///
/// Returns `Ok(None)` for an empty (or all-whitespace) rule.
pub fn parse_rule(rule: &str) -> Result<Option<ParsedRule>> {
    let rule = rule.trim();
    if rule.is_empty() {
        return Ok(None);
    }

    let (start, end) = if rule.contains('/') {
        let net: IpNet = rule
            .parse()
            .map_err(|_| Error::InvalidRule(rule.to_string()))?;
        (net.network(), net.broadcast())
    } else if let Some((start, end)) = rule.split_once('-') {
        let start = parse_endpoint(rule, start)?;
        let end = parse_endpoint(rule, end)?;
        if Family::of(&start) != Family::of(&end) {
            return Err(Error::FamilyMismatch {
                rule: rule.to_string(),
                expected: Family::of(&start),
            });
        }
        if start > end {
            return Err(Error::RangeOrder { start, end });
        }
        (start, end)
    } else {
        let ip: IpAddr = rule
            .parse()
            .map_err(|_| Error::InvalidAddress(rule.to_string()))?;
        (ip, ip)
    };

    match (start, end) {
        (IpAddr::V4(s), IpAddr::V4(e)) => Ok(Some(ParsedRule::V4(AddrRange::new(
            u32::from(s),
            u32::from(e),
        )))),
        (IpAddr::V6(s), IpAddr::V6(e)) => Ok(Some(ParsedRule::V6(AddrRange::new(
            u128::from(s),
            u128::from(e),
        )))),
        _ => Err(Error::FamilyMismatch {
            rule: rule.to_string(),
            expected: Family::of(&start),
        }),
    }
}

/// Parse a rule that must belong to `family`.
pub fn parse_family_rule(rule: &str, family: Family) -> Result<Option<ParsedRule>> {
    match parse_rule(rule)? {
        Some(parsed) if parsed.family() != family => Err(Error::FamilyMismatch {
            rule: rule.trim().to_string(),
            expected: family,
        }),
        parsed => Ok(parsed),
    }
}

/// Parse an IPv4 rule.
pub fn parse_ipv4_rule(rule: &str) -> Result<Option<Ipv4Range>> {
    Ok(match parse_family_rule(rule, Family::V4)? {
        Some(ParsedRule::V4(range)) => Some(range),
        _ => None,
    })
}

/// Parse an IPv6 rule.
pub fn parse_ipv6_rule(rule: &str) -> Result<Option<Ipv6Range>> {
    Ok(match parse_family_rule(rule, Family::V6)? {
        Some(ParsedRule::V6(range)) => Some(range),
        _ => None,
    })
}

fn parse_endpoint(rule: &str, endpoint: &str) -> Result<IpAddr> {
    let endpoint = endpoint.trim();
    if endpoint.is_empty() {
        return Err(Error::InvalidRule(rule.to_string()));
    }
    endpoint
        .parse()
        .map_err(|_| Error::InvalidAddress(endpoint.to_string()))
}
