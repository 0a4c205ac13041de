use bencher::test_cases;
use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion};
use drash::path;
use drash::resource::{ResourceMatcher, ResourceRegistry};
use drash::Resource;
use http::Uri;
use std::hint::black_box;

fn registry() -> ResourceRegistry {
    let mut registry = ResourceRegistry::new();
    for i in 0..32 {
        registry.register(Resource::builder(format!("filler-{i}")).path(format!("/filler/{i}/:id")).build()).unwrap();
    }
    for case in test_cases() {
        registry.register(Resource::builder(case.name()).path(case.path()).build()).unwrap();
    }
    registry
}

fn benchmark_path_match(criterion: &mut Criterion) {
    let mut group = criterion.benchmark_group("path_match");

    for case in test_cases() {
        let patterns = path::compile(case.path()).expect("bench paths should compile");
        group.bench_with_input(BenchmarkId::from_parameter(case.name()), &case, |b, case| {
            b.iter(|| black_box(patterns.iter().find_map(|pattern| pattern.match_path(case.url()))));
        });
    }

    group.finish();
}

fn benchmark_registry_scan(criterion: &mut Criterion) {
    let registry = registry();
    let mut group = criterion.benchmark_group("registry_scan");

    for case in test_cases() {
        group.bench_with_input(BenchmarkId::from_parameter(case.name()), &case, |b, case| {
            b.iter(|| black_box(registry.find(case.url()).expect("bench urls should match")));
        });
    }

    group.finish();
}

fn benchmark_cached_match(criterion: &mut Criterion) {
    let matcher = ResourceMatcher::new(registry());
    let mut group = criterion.benchmark_group("cached_match");

    for case in test_cases() {
        let uri = Uri::from_static(case.url());
        matcher.match_url(&uri).expect("bench urls should match");
        group.bench_with_input(BenchmarkId::from_parameter(case.name()), &uri, |b, uri| {
            b.iter(|| black_box(matcher.match_url(uri).expect("bench urls should match")));
        });
    }

    group.finish();
}

criterion_group!(matcher, benchmark_path_match, benchmark_registry_scan, benchmark_cached_match);
criterion_main!(matcher);
