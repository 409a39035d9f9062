// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
// criterion_group!/criterion_main! expand to undocumented functions that cannot
// carry #[allow] (attributes on macro invocations are ignored). Crate-level
// suppress is required for benchmark binaries using Criterion.
#![allow(missing_docs)]
//! Next-boundary throughput in a detector-like world.
//!
//! # Running
//!
//! ```sh
//! cargo bench --package vecnav-benches --bench boundary_batch
//! ```
//!
//! # What This Measures
//!
//! - `scalar_loop`: one `distance_to_next_boundary` call per point
//! - `batch/<backend>`: the volume-outer batched query per backend width
//! - `parallel_workers/<n>`: the rayon variant on pools of 1, 2, 4 and 8 threads
use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use rand::rngs::StdRng;
use rand::SeedableRng;
use std::{hint::black_box, time::Duration};
use vecnav_core::{Backend, Lanes, Precision, Scalar, Soa3, Wide};
use vecnav_geom::{Navigator, VolumeId};

// Same detector world and sampler the integration tests navigate.
#[path = "../../vecnav-geom/tests/common/mod.rs"]
mod common;

const NPOINTS: usize = 1024;
const STEP: Precision = 1e30;

fn run_batch<B: Backend>(nav: &Navigator<'_>, world: VolumeId, p: &Soa3, d: &Soa3, steps: &[Precision]) {
    let mut dist = vec![0.0; p.len()];
    let mut next = vec![None; p.len()];
    nav.distance_to_next_boundary_batch::<B>(world, p, d, steps, &mut dist, &mut next)
        .expect("batch");
    black_box((dist, next));
}

fn bench_boundary(c: &mut Criterion) {
    let (tree, world) = common::detector();
    let nav = Navigator::new(&tree);
    let mut rng = StdRng::seed_from_u64(0xC4E3_2013);
    let (pts, dirs) = common::sample_world(&tree, world, NPOINTS, 0.5, &mut rng);
    let (p, d) = (Soa3::from_vectors(&pts), Soa3::from_vectors(&dirs));
    let steps = vec![STEP; NPOINTS];

    let mut group = c.benchmark_group("boundary");
    group.sample_size(50);
    group.warm_up_time(Duration::from_secs(2));
    group.measurement_time(Duration::from_secs(5));
    group.throughput(Throughput::Elements(NPOINTS as u64));

    group.bench_function("scalar_loop", |b| {
        b.iter(|| {
            for (pt, dir) in pts.iter().zip(&dirs) {
                black_box(nav.distance_to_next_boundary(world, *pt, *dir, STEP).expect("single"));
            }
        });
    });
    group.bench_function(BenchmarkId::new("batch", "scalar"), |b| {
        b.iter(|| run_batch::<Scalar>(&nav, world, &p, &d, &steps));
    });
    group.bench_function(BenchmarkId::new("batch", "lanes4"), |b| {
        b.iter(|| run_batch::<Lanes<4>>(&nav, world, &p, &d, &steps));
    });
    group.bench_function(BenchmarkId::new("batch", "lanes8"), |b| {
        b.iter(|| run_batch::<Lanes<8>>(&nav, world, &p, &d, &steps));
    });
    group.bench_function(BenchmarkId::new("batch", "wide"), |b| {
        b.iter(|| run_batch::<Wide>(&nav, world, &p, &d, &steps));
    });
    group.finish();

    // Larger batch so every worker gets several chunks.
    let reps = 16;
    let big_p: Soa3 = (0..reps).flat_map(|_| pts.iter().copied()).collect();
    let big_d: Soa3 = (0..reps).flat_map(|_| dirs.iter().copied()).collect();
    let big_steps = vec![STEP; big_p.len()];
    let mut group = c.benchmark_group("parallel_workers");
    group.sample_size(30);
    group.throughput(Throughput::Elements(big_p.len() as u64));
    for &workers in &[1usize, 2, 4, 8] {
        let pool = rayon::ThreadPoolBuilder::new().num_threads(workers).build().expect("pool");
        group.bench_with_input(BenchmarkId::from_parameter(workers), &workers, |b, _| {
            b.iter(|| {
                pool.install(|| {
                    let mut dist = vec![0.0; big_p.len()];
                    let mut next = vec![None; big_p.len()];
                    nav.distance_to_next_boundary_par::<Wide>(world, &big_p, &big_d, &big_steps, &mut dist, &mut next)
                        .expect("par");
                    black_box((dist, next));
                });
            });
        });
    }
    group.finish();
}

criterion_group!(benches, bench_boundary);
criterion_main!(benches);
