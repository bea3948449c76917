/*!
 * 边界矩阵归约性能基准测试
 *
 * 使用 Criterion 框架，在三角剖分网格上比较各归约选项，以及 zigzag 归约。
 */

use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion};
use rust_persistence::persistence::{
    barcode, zigzag_barcode, Filtration, Optimization, ReductionKind, ReductionOptions,
    RightFiltration, F2,
};
use std::hint::black_box;

/// n×n 顶点网格的三角剖分，值为到中心的距离
fn grid_filtration(n: usize) -> Filtration {
    let id = |i: usize, j: usize| i * n + j;
    let center = (n as f64 - 1.0) / 2.0;
    let height = |v: usize| {
        let (i, j) = ((v / n) as f64, (v % n) as f64);
        ((i - center).powi(2) + (j - center).powi(2)).sqrt()
    };
    let value = |s: &[usize]| s.iter().map(|&v| height(v)).fold(0.0, f64::max);

    let mut f = Filtration::new();
    for v in 0..n * n {
        f.add(value(&[v]), &[v]).unwrap();
    }
    let mut tris = Vec::new();
    for i in 0..n - 1 {
        for j in 0..n - 1 {
            tris.push([id(i, j), id(i + 1, j), id(i + 1, j + 1)]);
            tris.push([id(i, j), id(i, j + 1), id(i + 1, j + 1)]);
        }
    }
    for t in &tris {
        for e in [[t[0], t[1]], [t[0], t[2]], [t[1], t[2]]] {
            f.add(value(&e), &e).unwrap();
        }
    }
    for t in &tris {
        f.add(value(t), t).unwrap();
    }
    f
}

/// 基准测试：各归约选项
fn benchmark_reduction_options(c: &mut Criterion) {
    let mut group = c.benchmark_group("reduction_options");
    let f = grid_filtration(20);

    let cases = [
        ("none", ReductionOptions::new()),
        ("extra", ReductionOptions::new().with_reduction(ReductionKind::Extra)),
        ("apparent", ReductionOptions::new().with_apparent_pairs(true)),
        ("clearing", ReductionOptions::new().with_optimization(Optimization::Clearing)),
        (
            "compression",
            ReductionOptions::new().with_optimization(Optimization::Compression),
        ),
        ("parallel", ReductionOptions::new().with_parallel(true)),
    ];
    for (name, opts) in cases {
        group.bench_with_input(BenchmarkId::from_parameter(name), &opts, |b, opts| {
            b.iter(|| barcode::<F2, _>(black_box(&f), opts).unwrap())
        });
    }

    group.finish();
}

/// 基准测试：网格规模
fn benchmark_grid_size(c: &mut Criterion) {
    let mut group = c.benchmark_group("grid_size");
    let opts = ReductionOptions::new()
        .with_optimization(Optimization::Clearing)
        .with_apparent_pairs(true);

    for n in [10, 20, 40] {
        let f = grid_filtration(n);
        group.bench_with_input(BenchmarkId::from_parameter(n), &f, |b, f| {
            b.iter(|| barcode::<F2, _>(black_box(f), &opts).unwrap())
        });
    }

    group.finish();
}

/// 基准测试：zigzag 归约（只有插入时与单调归约比较）
fn benchmark_zigzag(c: &mut Criterion) {
    let mut group = c.benchmark_group("zigzag");
    let f = grid_filtration(12);
    let right = RightFiltration::from_filtration(&f).unwrap();

    group.bench_function("monotone_n=12", |b| {
        b.iter(|| barcode::<F2, _>(black_box(&f), &ReductionOptions::new()).unwrap())
    });
    group.bench_function("zigzag_n=12", |b| {
        b.iter(|| zigzag_barcode::<F2, _>(black_box(&right)).unwrap())
    });

    group.finish();
}

criterion_group!(
    benches,
    benchmark_reduction_options,
    benchmark_grid_size,
    benchmark_zigzag
);
criterion_main!(benches);
