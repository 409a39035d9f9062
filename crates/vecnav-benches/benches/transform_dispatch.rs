// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
#![allow(missing_docs)]
//! Specialized versus generic transform routines on a point batch.
use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::hint::black_box;
use vecnav_core::{Backend, Precision, Soa3, Transform, TransformKernel, Vec3, Wide};

const NPOINTS: usize = 4096;

fn batch() -> Soa3 {
    let mut rng = StdRng::seed_from_u64(7);
    (0..NPOINTS)
        .map(|_| {
            let mut c = || rng.gen_range(-100.0 as Precision..100.0);
            Vec3::new(c(), c(), c())
        })
        .collect()
}

fn bench_dispatch(c: &mut Criterion) {
    let input = batch();
    let cases = [
        ("identity", Transform::identity()),
        ("translation", Transform::from_translation(Vec3::new(1.0, -2.0, 3.0))),
        ("quarter_turn", Transform::from_matrix(Vec3::new(1.0, 0.0, 0.0), [0.0, -1.0, 0.0, 1.0, 0.0, 0.0, 0.0, 0.0, 1.0])),
        ("generic", Transform::new(1.0, 2.0, 3.0, 35.0, 20.0, 10.0)),
    ];

    let mut group = c.benchmark_group("transform_apply_soa");
    group.throughput(Throughput::Elements(NPOINTS as u64));
    for (name, t) in &cases {
        group.bench_with_input(BenchmarkId::new("selected", name), t, |b, t| {
            let mut out = Soa3::zeros(NPOINTS);
            b.iter(|| {
                t.apply_soa::<Wide>(black_box(&input), &mut out);
                black_box(&out);
            });
        });
        group.bench_with_input(BenchmarkId::new("generic", name), t, |b, t| {
            let kernel = TransformKernel::<Wide>::generic();
            let mut out = Soa3::zeros(NPOINTS);
            b.iter(|| {
                for start in (0..NPOINTS).step_by(Wide::LANES) {
                    let p = input.gather::<Wide>(start);
                    out.scatter::<Wide>(start, &(kernel.apply)(t, &p));
                }
                black_box(&out);
            });
        });
    }
    group.finish();
}

criterion_group!(benches, bench_dispatch);
criterion_main!(benches);
