use criterion::{BenchmarkId, Criterion, Throughput, criterion_group, criterion_main};
use std::hint::black_box;
use jigsaw_atlas_core::prelude::*;
use rand::SeedableRng;
use rand::rngs::StdRng;

fn bench_tab_assignment(c: &mut Criterion) {
    let mut group = c.benchmark_group("tab_assignment");

    for side in [10u32, 40, 100] {
        let grid = GridSpec::new(side, side, 100, 2).expect("grid");
        group.throughput(Throughput::Elements(grid.piece_count() as u64));
        group.bench_with_input(BenchmarkId::new("Flat", side), &grid, |b, grid| {
            b.iter(|| {
                let mut rng = StdRng::seed_from_u64(7);
                black_box(TabAssigner::new(BottomEdge::Flat).assign(grid, &mut rng))
            });
        });
    }

    group.finish();
}

fn bench_build(c: &mut Criterion) {
    let mut group = c.benchmark_group("build_puzzle");
    let cfg = PuzzleConfig::builder().seed(Some(7)).build();

    for side in [10u32, 40, 100] {
        let grid = GridSpec::new(side, side, 100, 2).expect("grid");
        group.throughput(Throughput::Elements(grid.piece_count() as u64));
        group.bench_with_input(BenchmarkId::new("geometry", side), &grid, |b, grid| {
            b.iter(|| {
                let mut rng = StdRng::seed_from_u64(7);
                black_box(build_puzzle(grid, &cfg, &mut rng))
            });
        });
    }

    group.bench_function("plan_100k", |b| {
        b.iter(|| black_box(plan_atlases(black_box(100_000), 104, &cfg.atlas_sizes)))
    });

    group.finish();
}

criterion_group!(benches, bench_tab_assignment, bench_build);
criterion_main!(benches);
