//! Lookup benchmarks for ipguard.
//!
//! Run with: cargo bench
//!
//! Measures:
//! - Lookup throughput per storage strategy
//! - Recency cache hit vs miss
//! - Build time for growing rule sets

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use ipguard::{Matcher, MatcherConfig};
use std::net::{IpAddr, Ipv4Addr};

/// Rules: `count` /24 subnets plus `count` single addresses.
fn generate_rules(count: u32) -> Vec<String> {
    let mut rules = Vec::with_capacity(count as usize * 2);
    for i in 0..count {
        rules.push(format!("10.{}.{}.0/24", (i >> 8) & 0xff, i & 0xff));
        rules.push(Ipv4Addr::from(0xAC10_0000 + i).to_string());
    }
    rules
}

fn build(rules: &[String], threshold: u64, cache_capacity: usize) -> Matcher {
    let config = MatcherConfig::new()
        .with_ipv4_threshold(threshold)
        .with_cache_capacity(cache_capacity)
        .with_ipv4_rules(rules.iter().cloned());
    Matcher::new(config).unwrap()
}

/// Mix of hits and misses.
fn generate_queries(count: u32) -> Vec<IpAddr> {
    (0..count)
        .map(|i| {
            let ip = match i % 3 {
                0 => Ipv4Addr::new(10, 0, (i % 200) as u8, (i % 250) as u8),
                1 => Ipv4Addr::from(0xAC10_0000 + i % 200),
                _ => Ipv4Addr::new(192, 0, 2, (i % 250) as u8),
            };
            IpAddr::V4(ip)
        })
        .collect()
}

/// Benchmark lookups per storage strategy.
fn bench_strategies(c: &mut Criterion) {
    let rules = generate_rules(200);
    let queries = generate_queries(1000);

    let mut group = c.benchmark_group("strategy");
    group.throughput(Throughput::Elements(queries.len() as u64));

    for (name, threshold) in [("expanded", 1_000_000), ("mixed", 10_000), ("ranges_only", 1)] {
        let matcher = build(&rules, threshold, 0);
        group.bench_function(name, |b| {
            b.iter(|| {
                for ip in &queries {
                    black_box(matcher.contains_addr(*ip));
                }
            })
        });
    }

    group.finish();
}

/// Benchmark string parsing on the query path.
fn bench_string_queries(c: &mut Criterion) {
    let rules = generate_rules(200);
    let matcher = build(&rules, 10_000, 0);
    let queries: Vec<String> = generate_queries(1000)
        .iter()
        .map(|ip| ip.to_string())
        .collect();

    let mut group = c.benchmark_group("string_queries");
    group.throughput(Throughput::Elements(queries.len() as u64));

    group.bench_function("contains", |b| {
        b.iter(|| {
            for query in &queries {
                black_box(matcher.contains(query));
            }
        })
    });

    group.finish();
}

/// Benchmark the recency cache on range hits.
fn bench_cache_performance(c: &mut Criterion) {
    let rules = generate_rules(1_000);
    let probe = IpAddr::V4(Ipv4Addr::new(10, 3, 0, 77));

    let mut group = c.benchmark_group("cache_performance");

    let uncached = build(&rules, 1, 0);
    group.bench_function("range_search", |b| {
        b.iter(|| black_box(uncached.contains_addr(probe)))
    });

    let cached = build(&rules, 1, 1_024);
    let _ = cached.contains_addr(probe);
    group.bench_function("cache_hit", |b| {
        b.iter(|| black_box(cached.contains_addr(probe)))
    });

    group.finish();
}

/// Benchmark build time with different rule set sizes.
fn bench_build(c: &mut Criterion) {
    let mut group = c.benchmark_group("build");
    group.sample_size(20);

    for size in [100u32, 1_000, 10_000].iter() {
        let rules = generate_rules(*size);
        group.throughput(Throughput::Elements(rules.len() as u64));
        group.bench_with_input(BenchmarkId::new("rules", size), size, |b, _| {
            b.iter(|| black_box(build(&rules, 0, 1_024)))
        });
    }

    group.finish();
}

/// Benchmark a dynamic rebuild with one added rule.
fn bench_rebuild(c: &mut Criterion) {
    let rules = generate_rules(10_000);
    let config = MatcherConfig::new()
        .dynamic(true)
        .with_ipv4_rules(rules.iter().cloned());
    let matcher = Matcher::new(config).unwrap();

    let mut group = c.benchmark_group("rebuild");
    group.sample_size(20);

    group.bench_function("add_and_rebuild", |b| {
        b.iter(|| {
            matcher.add_ipv4_rule("198.51.100.0/24").unwrap();
            matcher.build().unwrap();
        })
    });

    group.finish();
}

criterion_group!(
    benches,
    bench_strategies,
    bench_string_queries,
    bench_cache_performance,
    bench_build,
    bench_rebuild,
);

criterion_main!(benches);
