//! Benchmarks for normalization and route resolution.
//!
//! Run with: cargo bench --bench resolver

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use dialroute::normalizer::{normalize, DialPlan};
use dialroute::router::{Pattern, Resolver, Route, RoutesByUsage, RoutingPolicy};

fn bench_pattern(c: &mut Criterion) {
    let mut group = c.benchmark_group("pattern");

    group.bench_function("anchored_match", |b| {
        let pattern = Pattern::new(r"^\+44(20|7\d)\d{8}$").unwrap();
        b.iter(|| black_box(pattern.matches("+447912345678")))
    });

    group.bench_function("unanchored_mismatch", |b| {
        let pattern = Pattern::new(r"999").unwrap();
        b.iter(|| black_box(pattern.matches("+447912345678")))
    });

    group.bench_function("compile", |b| {
        b.iter(|| black_box(Pattern::new(r"^\+44(20|7\d)\d{8}$").unwrap()))
    });

    group.finish();
}

fn bench_normalize(c: &mut Criterion) {
    let mut group = c.benchmark_group("normalize");

    for count in [1, 10, 50].iter() {
        group.throughput(Throughput::Elements(1));
        group.bench_with_input(BenchmarkId::from_parameter(count), count, |b, &count| {
            // Matching rule last for worst case
            let patterns: Vec<String> = (0..count - 1).map(|i| format!(r"^9{:02}(\d+)$", i)).collect();
            let mut rules: Vec<(&str, &str, &str)> =
                patterns.iter().map(|p| ("miss", p.as_str(), "+$1")).collect();
            rules.push(("intl", r"^00(\d+)$", "+$1"));

            let plan = DialPlan::from_rules("Global", rules).unwrap();
            b.iter(|| black_box(normalize("0044123456789", &plan)))
        });
    }

    group.finish();
}

fn bench_resolve(c: &mut Criterion) {
    let mut group = c.benchmark_group("resolve");

    for usages in [1, 5, 20].iter() {
        group.throughput(Throughput::Elements(1));
        group.bench_with_input(BenchmarkId::from_parameter(usages), usages, |b, &usages| {
            // Only the last usage carries the number
            let names: Vec<String> = (0..usages).map(|i| format!("usage-{}", i)).collect();
            let policy = RoutingPolicy::new("Global", names.iter().cloned()).unwrap();

            let mut routes = Vec::new();
            for (i, name) in names.iter().enumerate() {
                let pattern = if i + 1 == names.len() { r"^\+44" } else { r"^\+1" };
                for r in 0..10 {
                    routes.push(
                        Route::new(format!("{}-{}", name, r), pattern, 10 - r)
                            .unwrap()
                            .with_usages([name.as_str()]),
                    );
                }
            }
            let by_usage = RoutesByUsage::from_routes(routes);
            let resolver = Resolver::default();

            b.iter(|| black_box(resolver.resolve("+44123456789", &policy, &by_usage)))
        });
    }

    group.finish();
}

criterion_group!(benches, bench_pattern, bench_normalize, bench_resolve);
criterion_main!(benches);
