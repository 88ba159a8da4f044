//! Rule file reader.
//!
//! Rule files are newline-delimited UTF-8 text. Blank lines and lines
//! starting with `#` are skipped; every other line is a single rule.

use std::fs::File;
use std::io::{BufRead, BufReader, Read};
use std::path::Path;

use super::parse::{parse_family_rule, parse_rule, ParsedRule};
use crate::addr::Family;
use crate::error::{Error, Result};

/// Parse every rule from a reader.
///
/// When `family` is set, rules of the other family are rejected.
/// Errors carry the 1-based line number of the offending rule.
pub fn parse_rules<R: Read>(reader: R, family: Option<Family>) -> Result<Vec<ParsedRule>> {
    let buf_reader = BufReader::new(reader);
    let mut rules = Vec::new();

    for (idx, line) in buf_reader.lines().enumerate() {
        let line = line?;
        let line = line.trim();

        if line.is_empty() || line.starts_with('#') {
            continue;
        }

        let parsed = match family {
            Some(family) => parse_family_rule(line, family),
            None => parse_rule(line),
        }
        .map_err(|e| Error::RuleLine {
            line: idx + 1,
            source: Box::new(e),
        })?;

        if let Some(rule) = parsed {
            rules.push(rule);
        }
    }

    Ok(rules)
}

/// Load every rule from a file.
pub fn load_rule_file(path: &Path, family: Option<Family>) -> Result<Vec<ParsedRule>> {
    let file = File::open(path).map_err(|e| Error::Io(e).in_file(path))?;
    let rules = parse_rules(file, family).map_err(|e| e.in_file(path))?;

    log::debug!("Loaded {} rules from {:?}", rules.len(), path);
    Ok(rules)
}
