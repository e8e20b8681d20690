//! Criterion benchmarks for table precomputation and chain steps.
//! Grid sizes: side in {10, 20, 40}.
//! Results live under `target/criterion`.

use criterion::{criterion_group, criterion_main, BatchSize, BenchmarkId, Criterion};
use spatial_ergm::prelude::*;

fn reweighted() -> GravityCfg {
    GravityCfg {
        bin_width: 1.0,
        reweight_boundaries: true,
        reweight_density: true,
        ..GravityCfg::default()
    }
}

fn bench_precompute(c: &mut Criterion) {
    let mut group = c.benchmark_group("gravity");
    for &side in &[10usize, 20, 40] {
        let graph = SpatialGraph::grid(side, side, 1.0).unwrap();
        group.bench_with_input(BenchmarkId::new("build_tables", side), &graph, |b, g| {
            b.iter(|| GravityTerm::new(g, reweighted()).unwrap())
        });

        let term = GravityTerm::new(&graph, reweighted()).unwrap();
        group.bench_with_input(BenchmarkId::new("change_statistic", side), &graph, |b, g| {
            let n = g.vertex_count();
            let mut k = 0usize;
            b.iter(|| {
                k = (k + 7919) % (n * n);
                let (i, j) = (k / n, k % n);
                if i != j {
                    let _ = term.change_statistic(g, i, j, true);
                }
            })
        });
    }
    group.finish();
}

fn bench_sampler(c: &mut Criterion) {
    let mut group = c.benchmark_group("sampler");
    for &side in &[10usize, 20, 40] {
        let graph = SpatialGraph::grid(side, side, 1.0).unwrap();
        let model = Ergm::new().with_term(1.0, GravityTerm::new(&graph, reweighted()).unwrap());
        let cfg = SamplerCfg {
            seed: 43,
            log_every: 0,
        };
        group.bench_with_input(BenchmarkId::new("run_1000", side), &side, |b, _| {
            b.iter_batched(
                || ChainSampler::new(&model, graph.clone(), &cfg).unwrap(),
                |mut chain| {
                    let _stats = chain.run(1_000).unwrap();
                },
                BatchSize::SmallInput,
            )
        });
    }
    group.finish();
}

criterion_group!(benches, bench_precompute, bench_sampler);
criterion_main!(benches);
