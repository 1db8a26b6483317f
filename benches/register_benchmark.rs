#![allow(clippy::expect_used, clippy::unwrap_used, missing_docs)]
//! Benchmark for register reductions and segmented operations.

use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion};
use std::hint::black_box;
use trueno_simt::prelude::*;

fn sum_slice<const N: usize>(data: &[f32]) -> f32 {
    data.chunks_exact(N).map(|chunk| Register::<f32, Warp, N>::load_slice(chunk).sum()).sum()
}

fn reduction_benchmark(c: &mut Criterion) {
    let mut group = c.benchmark_group("register_sum");
    let data: Vec<f32> = (0..4096).map(|i| (i % 97) as f32 * 0.5).collect();

    group.bench_with_input(BenchmarkId::new("warp", 7), &data, |b, data| {
        b.iter(|| sum_slice::<7>(black_box(data)));
    });
    group.bench_with_input(BenchmarkId::new("warp", 8), &data, |b, data| {
        b.iter(|| sum_slice::<8>(black_box(data)));
    });
    group.bench_with_input(BenchmarkId::new("warp", 32), &data, |b, data| {
        b.iter(|| sum_slice::<32>(black_box(data)));
    });

    #[cfg(all(target_arch = "x86_64", target_feature = "avx"))]
    group.bench_with_input(BenchmarkId::new("avx", 8), &data, |b, data| {
        b.iter(|| {
            black_box(data)
                .chunks_exact(8)
                .map(|chunk| Register::<f32, Avx, 8>::load_slice(chunk).sum())
                .sum::<f32>()
        });
    });

    group.finish();
}

fn segmented_benchmark(c: &mut Criterion) {
    let mut group = c.benchmark_group("register_segmented");
    let x = Register::<f32, Warp, 32>::from_lanes(std::array::from_fn(|i| i as f32));

    for segbits in [1u32, 2, 3, 4] {
        group.bench_with_input(BenchmarkId::new("sum_inner", segbits), &segbits, |b, &segbits| {
            b.iter(|| black_box(x).segmented_sum_inner(segbits, 0));
        });
        group.bench_with_input(BenchmarkId::new("broadcast_outer", segbits), &segbits, |b, &segbits| {
            b.iter(|| black_box(x).segmented_broadcast_outer(segbits, 1));
        });
    }

    group.finish();
}

criterion_group!(benches, reduction_benchmark, segmented_benchmark);
criterion_main!(benches);
