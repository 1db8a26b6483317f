#![allow(clippy::expect_used, clippy::unwrap_used, missing_docs)]
//! Benchmark for serial and parallel DAG traversal.

use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion};
use std::hint::black_box;
use trueno_simt::prelude::*;

/// Root fanning out to `width` independent chains of 4 nodes each.
fn fan(width: usize) -> Dag {
    let mut dag = Dag::new();
    let root = dag.add_node(|| {});
    dag.add_root(root);
    for _ in 0..width {
        let mut prev = root;
        for _ in 0..4 {
            let next = dag.add_node(|| {
                black_box((0..2_000u64).sum::<u64>());
            });
            dag.add_edge(prev, next);
            prev = next;
        }
    }
    dag
}

fn traversal_benchmark(c: &mut Criterion) {
    let mut group = c.benchmark_group("dag_traversal");

    for width in [4, 32, 256] {
        let mut dag = fan(width);
        group.bench_with_input(BenchmarkId::new("serial", width), &width, |b, _| {
            b.iter(|| dag.exec());
        });

        let mut dag = fan(width);
        group.bench_with_input(BenchmarkId::new("parallel", width), &width, |b, _| {
            b.iter(|| dag.exec_parallel());
        });
    }

    group.finish();
}

criterion_group!(benches, traversal_benchmark);
criterion_main!(benches);
