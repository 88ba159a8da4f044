//! ipguard: check addresses against access-control rule sets.

use clap::{Parser, Subcommand};
use ipguard::{AccessLists, FamilyStats, Matcher, MatcherConfig};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "ipguard")]
#[command(author = "Kaitu.io")]
#[command(version = "0.1.0")]
#[command(about = "Check IP addresses against allow/deny rule sets", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Check addresses against the allow and deny lists of a config file
    Check {
        /// Access configuration file (YAML or JSON)
        #[arg(short, long)]
        config: PathBuf,

        /// Addresses to check
        #[arg(required = true)]
        addresses: Vec<String>,
    },

    /// Print storage statistics for a config file
    Stats {
        /// Access configuration file (YAML or JSON)
        #[arg(short, long)]
        config: PathBuf,
    },

    /// Build an ad-hoc matcher from inline rules and check addresses
    TestRules {
        /// Rules (address, CIDR or start-end range)
        #[arg(required = true)]
        rules: Vec<String>,

        /// Addresses to check
        #[arg(short, long = "address", required = true)]
        addresses: Vec<String>,

        /// Addresses expanded into the hash set per family (0 = default)
        #[arg(short, long, default_value_t = 0)]
        threshold: u64,

        /// Print storage statistics
        #[arg(short, long)]
        verbose: bool,
    },
}

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Check { config, addresses } => check(&config, &addresses),
        Commands::Stats { config } => stats(&config),
        Commands::TestRules {
            rules,
            addresses,
            threshold,
            verbose,
        } => test_rules(&rules, &addresses, threshold, verbose),
    };

    if let Err(e) = result {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

fn check(config: &PathBuf, addresses: &[String]) -> Result<(), Box<dyn std::error::Error>> {
    let lists = AccessLists::from_path(config)?;

    for address in addresses {
        println!(
            "{}\tallow={}\tdeny={}",
            address,
            membership(lists.allow(), address),
            membership(lists.deny(), address)
        );
    }
    Ok(())
}

fn stats(config: &PathBuf) -> Result<(), Box<dyn std::error::Error>> {
    let lists = AccessLists::from_path(config)?;

    print_stats("allow", lists.allow());
    print_stats("deny", lists.deny());
    Ok(())
}

fn test_rules(
    rules: &[String],
    addresses: &[String],
    threshold: u64,
    verbose: bool,
) -> Result<(), Box<dyn std::error::Error>> {
    let matcher = Matcher::new(
        MatcherConfig::new()
            .with_ipv4_threshold(threshold)
            .with_ipv6_threshold(threshold),
    )?;
    matcher.add_rules(rules)?;
    matcher.build()?;

    if verbose {
        print_stats("rules", &matcher);
    }

    for address in addresses {
        println!("{}\t{}", address, matcher.contains(address));
    }
    Ok(())
}

fn membership(matcher: &Matcher, address: &str) -> &'static str {
    if !matcher.is_built() {
        "unrestricted"
    } else if matcher.contains(address) {
        "yes"
    } else {
        "no"
    }
}

fn print_stats(name: &str, matcher: &Matcher) {
    let stats = matcher.stats();
    if !stats.is_built() {
        println!("{}: not configured (matches every address)", name);
        return;
    }

    let config = matcher.config();
    println!(
        "{}: generation {}, {}",
        name,
        stats.generation,
        if matcher.is_dynamic() { "dynamic" } else { "static" }
    );
    print_family("  IPv4", config.effective_ipv4_threshold(), stats.ipv4);
    print_family("  IPv6", config.effective_ipv6_threshold(), stats.ipv6);
}

fn print_family(label: &str, threshold: u64, stats: Option<FamilyStats>) {
    if let Some(s) = stats {
        println!(
            "{}: {:?} (threshold {}), {} discrete, {} ranges covering {} addresses, {}/{} cached",
            label,
            s.strategy,
            threshold,
            s.discrete,
            s.ranges,
            s.range_addresses,
            s.cached,
            s.cache_capacity
        );
    }
}
