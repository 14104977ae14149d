//! Criterion micro-benchmarks for codebook training and encoding.
//!
//! Run all:     `cargo bench`
//! Run subset:  `cargo bench -- encode`
//! Save baseline: `cargo bench -- --save-baseline base`

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use gondola::{DistanceMetric, ProductQuantizer, TrainOptions};

fn random_vectors(n: usize, dim: usize) -> Vec<Vec<f32>> {
    let mut rng = StdRng::seed_from_u64(42);
    (0..n)
        .map(|_| (0..dim).map(|_| rng.gen_range(-1.0..1.0)).collect())
        .collect()
}

fn refs(data: &[Vec<f32>]) -> Vec<&[f32]> {
    data.iter().map(|v| v.as_slice()).collect()
}

fn bench_fit(c: &mut Criterion) {
    let mut group = c.benchmark_group("fit");
    group.sample_size(10);

    for &(dim, m) in &[(64, 8), (128, 8), (128, 16)] {
        let data = random_vectors(2_000, dim);
        let rows = refs(&data);
        let opts = TrainOptions::default();

        group.throughput(Throughput::Elements(rows.len() as u64));
        group.bench_with_input(
            BenchmarkId::new(format!("d{dim}"), m),
            &m,
            |bench, &m| {
                bench.iter(|| {
                    let mut pq =
                        ProductQuantizer::new(m, 256, DistanceMetric::SquaredL2).unwrap();
                    pq.fit(black_box(&rows), &opts).unwrap();
                    pq
                });
            },
        );
    }

    group.finish();
}

fn bench_encode(c: &mut Criterion) {
    let mut group = c.benchmark_group("encode");

    for &(dim, m) in &[(64, 8), (128, 8), (128, 16)] {
        let data = random_vectors(2_000, dim);
        let rows = refs(&data);

        let mut pq = ProductQuantizer::new(m, 256, DistanceMetric::SquaredL2).unwrap();
        pq.fit(&rows, &TrainOptions::default()).unwrap();

        let queries = random_vectors(1_000, dim);
        let query_rows = refs(&queries);

        group.throughput(Throughput::Elements(query_rows.len() as u64));
        group.bench_with_input(
            BenchmarkId::new(format!("d{dim}"), m),
            &m,
            |bench, _| {
                bench.iter(|| pq.encode(black_box(&query_rows)).unwrap());
            },
        );
    }

    group.finish();
}

fn bench_metric_kernels(c: &mut Criterion) {
    let mut group = c.benchmark_group("kernels");

    for &dim in &[2, 8, 16, 64] {
        let a: Vec<f32> = random_vectors(1, dim).remove(0);
        let b: Vec<f32> = random_vectors(1, dim).remove(0);

        group.throughput(Throughput::Elements(dim as u64));
        group.bench_with_input(BenchmarkId::new("squared_l2", dim), &dim, |bench, _| {
            bench.iter(|| gondola::distance::squared_l2(black_box(&a), black_box(&b)));
        });
        group.bench_with_input(BenchmarkId::new("dot", dim), &dim, |bench, _| {
            bench.iter(|| gondola::distance::dot(black_box(&a), black_box(&b)));
        });
    }

    group.finish();
}

criterion_group!(benches, bench_fit, bench_encode, bench_metric_kernels);
criterion_main!(benches);
