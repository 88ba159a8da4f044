//! Rule parsing and rule file loading.

mod file;
mod parse;

pub use file::{load_rule_file, parse_rules};
pub use parse::{parse_family_rule, parse_ipv4_rule, parse_ipv6_rule, parse_rule, ParsedRule};
