//! Criterion benchmarks for the surface graph.
//! Focus sizes: n in {50, 100, 200} samples on a unit sphere.
//! Results: by default under target/criterion.

use std::sync::Arc;

use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion};
use icr::graph;
use icr::object::TargetObject;
use icr::shapes::jittered_sphere;

fn sphere(n: usize, seed: u64) -> Arc<TargetObject> {
    let pts = jittered_sphere(n, 1.0, 0.05, seed);
    Arc::new(TargetObject::new("sphere", pts).expect("non-empty sphere"))
}

fn bench_graph(c: &mut Criterion) {
    let mut group = c.benchmark_group("surface_graph");
    for &n in &[50usize, 100, 200] {
        let obj = sphere(n, 42);
        group.bench_with_input(BenchmarkId::new("build", n), &n, |b, _| {
            b.iter(|| graph::build(obj.clone(), 0.5, 0.0).expect("valid radius"))
        });

        let g = graph::build(obj.clone(), 0.5, 0.0).expect("valid radius");
        let all: Vec<usize> = (0..n).collect();
        group.bench_with_input(BenchmarkId::new("floyd_warshall", n), &n, |b, _| {
            b.iter(|| g.shortest_paths(&all).expect("indices in range"))
        });
    }
    group.finish();
}

criterion_group!(benches, bench_graph);
criterion_main!(benches);
