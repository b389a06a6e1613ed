//! Criterion benchmarks for the spherical quality metric.
//! Two, three and four soft fingers on a sphere (12, 18 and 24 wrench points).

use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion};
use icr::object::TargetObject;
use icr::shapes::fibonacci_sphere;
use icr::wrench::{ContactPoint, FrictionModel, WrenchEvaluator};
use nalgebra::Vector3;

fn contacts(obj: &TargetObject, targets: &[Vector3<f64>]) -> Vec<ContactPoint> {
    targets
        .iter()
        .map(|p| {
            let s = obj.samples()[obj.nearest(p)];
            ContactPoint {
                position: s.position,
                normal: s.normal,
                friction: FrictionModel::default(),
            }
        })
        .collect()
}

fn bench_quality(c: &mut Criterion) {
    let obj = TargetObject::new("sphere", fibonacci_sphere(200, 1.0)).expect("non-empty sphere");
    let eval = WrenchEvaluator::for_object(&obj);
    let two = contacts(&obj, &[Vector3::x(), -Vector3::x()]);
    let three = contacts(
        &obj,
        &[
            Vector3::x(),
            Vector3::new(-0.5, 0.866, 0.0),
            Vector3::new(-0.5, -0.866, 0.0),
        ],
    );
    let four = contacts(
        &obj,
        &[Vector3::x(), Vector3::y(), -Vector3::x(), -Vector3::y()],
    );
    let mut group = c.benchmark_group("spherical_quality");
    group.sample_size(10);
    for (name, set) in [
        ("two_fingers", &two),
        ("three_fingers", &three),
        ("four_fingers", &four),
    ] {
        group.bench_with_input(BenchmarkId::new("quality", name), set, |b, set| {
            b.iter(|| eval.quality(set))
        });
        group.bench_with_input(BenchmarkId::new("wrench_space", name), set, |b, set| {
            b.iter(|| eval.wrench_space(set).quality())
        });
    }
    group.finish();
}

criterion_group!(benches, bench_quality);
criterion_main!(benches);
