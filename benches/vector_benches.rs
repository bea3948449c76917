/*!
 * 稀疏向量性能基准测试
 *
 * 比较有序数组（`SparseVector`）与有序映射（`SetVector`）的 axpy。
 */

use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion};
use rust_persistence::persistence::{Field, SetVector, SparseVector, F3};
use std::hint::black_box;

/// 每隔 stride 一个非零项
fn strided(n: usize, stride: usize, offset: usize) -> Vec<(usize, F3)> {
    (0..n)
        .map(|i| (i * stride + offset, F3::from_i64(1 + (i % 2) as i64)))
        .collect()
}

fn benchmark_axpy(c: &mut Criterion) {
    let mut group = c.benchmark_group("axpy");

    for n in [100, 1_000, 10_000] {
        let a = strided(n, 3, 0);
        let b = strided(n, 2, 1);

        let sa: SparseVector<F3> = SparseVector::from_pairs(a.clone());
        let sb: SparseVector<F3> = SparseVector::from_pairs(b.clone());
        group.bench_with_input(BenchmarkId::new("sparse_vector", n), &n, |bench, _| {
            bench.iter(|| {
                let mut x = sa.clone();
                x.axpy(black_box(F3::from_i64(2)), &sb);
                x
            })
        });

        let ta: SetVector<F3> = SetVector::from_pairs(a);
        let tb: SetVector<F3> = SetVector::from_pairs(b);
        group.bench_with_input(BenchmarkId::new("set_vector", n), &n, |bench, _| {
            bench.iter(|| {
                let mut x = ta.clone();
                x.axpy(black_box(F3::from_i64(2)), &tb);
                x
            })
        });
    }

    group.finish();
}

criterion_group!(benches, benchmark_axpy);
criterion_main!(benches);
