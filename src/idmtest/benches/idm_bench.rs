//! Identity service benchmarks

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use idmtest::{parse_condition, Identity, IdmServer};

fn bench_parse_condition(c: &mut Criterion) {
    let mut group = c.benchmark_group("parse_condition");

    for condition in [
        "is-authenticated-user",
        "is-authenticated-user @test-domain",
        "is-authenticated-user +test-domain",
    ] {
        group.bench_with_input(BenchmarkId::from_parameter(condition), condition, |b, condition| {
            b.iter(|| parse_condition(black_box(condition)))
        });
    }

    group.finish();
}

fn bench_allow(c: &mut Criterion) {
    let mut group = c.benchmark_group("allow");

    for group_count in [1, 10, 100].iter() {
        let server = IdmServer::new("http://127.0.0.1:8080");
        server.add_user("bob", (0..*group_count).map(|i| format!("group-{}", i)));
        let acl: Vec<String> = (0..10).map(|i| format!("acl-{}", i)).collect();
        let bob = Identity::new("bob");

        group.bench_with_input(BenchmarkId::new("groups", group_count), group_count, |b, _| {
            b.iter(|| server.allow(black_box(&bob), black_box(acl.as_slice())).unwrap())
        });
    }

    group.finish();
}

fn bench_discharge(c: &mut Criterion) {
    let server = IdmServer::new("http://127.0.0.1:8080");
    server.set_default_user("bob");

    c.bench_function("discharge_default_user", |b| {
        b.iter(|| server.discharge(black_box("is-authenticated-user @test-domain"), None).unwrap())
    });
}

criterion_group!(benches, bench_parse_condition, bench_allow, bench_discharge);
criterion_main!(benches);
