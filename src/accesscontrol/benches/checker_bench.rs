/// Benchmarks for access control evaluation
///
/// Measures performance of:
/// - Resource checker over large listings
/// - Fast-path evaluation
/// - Evaluation through cached scope resolution

use accesscontrol::{
    eval_permission, AccessControl, AccessControlConfig, ScopeAttributeResolverFunc, ScopedResource,
    SignedInUser,
};
use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use prometheus::Registry;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;

fn engine() -> AccessControl {
    AccessControl::new(AccessControlConfig::default(), &Registry::new()).unwrap()
}

fn dashboards(count: usize) -> Vec<ScopedResource> {
    (0..count)
        .map(|i| ScopedResource::new([format!("dashboards:uid:d{}", i)]))
        .collect()
}

fn bench_checker(c: &mut Criterion) {
    let mut group = c.benchmark_group("resource_checker");
    let engine = engine();

    let wildcard_user = SignedInUser::new(1, 1, "wildcard")
        .with_permissions(1, "dashboards:read", ["dashboards:uid:*"]);
    let exact_user = SignedInUser::new(2, 1, "exact").with_permissions(
        1,
        "dashboards:read",
        (0..1_000).step_by(2).map(|i| format!("dashboards:uid:d{}", i)),
    );

    for size in [100usize, 1_000, 10_000] {
        let resources = dashboards(size);

        group.bench_with_input(BenchmarkId::new("wildcard", size), &resources, |b, resources| {
            b.iter(|| {
                let mut checker = engine.checker(&wildcard_user, "dashboards:read");
                resources.iter().filter(|r| checker.check(*r)).count()
            });
        });

        group.bench_with_input(BenchmarkId::new("exact", size), &resources, |b, resources| {
            b.iter(|| {
                let mut checker = engine.checker(&exact_user, "dashboards:read");
                resources.iter().filter(|r| checker.check(*r)).count()
            });
        });
    }

    group.finish();
}

fn bench_evaluate(c: &mut Criterion) {
    let mut group = c.benchmark_group("evaluate");
    let runtime = tokio::runtime::Runtime::new().unwrap();
    let engine = engine();
    engine.register_scope_attribute_resolver(
        "dashboards:name:",
        Arc::new(ScopeAttributeResolverFunc::new(|_, scope| {
            Ok(vec![scope.replace(":name:", ":uid:")])
        })),
    );

    let mut user = SignedInUser::new(1, 1, "alice")
        .with_permissions(1, "dashboards:read", ["dashboards:uid:abc"]);
    let ctx = CancellationToken::new();

    let literal = eval_permission("dashboards:read", ["dashboards:uid:abc"]);
    group.bench_function("fast_path", |b| {
        b.iter(|| {
            runtime
                .block_on(engine.evaluate(&ctx, &mut user, black_box(literal.as_ref())))
                .unwrap()
        });
    });

    let by_name = eval_permission("dashboards:read", ["dashboards:name:abc"]);
    group.bench_function("cached_resolution", |b| {
        b.iter(|| {
            runtime
                .block_on(engine.evaluate(&ctx, &mut user, black_box(by_name.as_ref())))
                .unwrap()
        });
    });

    group.finish();
}

criterion_group!(benches, bench_checker, bench_evaluate);
criterion_main!(benches);
