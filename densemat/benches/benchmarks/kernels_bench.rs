/*
 * Copyright (c) Microsoft Corporation.
 * Licensed under the MIT license.
 */

use criterion::{BenchmarkId, Criterion, Throughput};
use densemat::{Matrix, add, multiply};

fn random(rows: usize, cols: usize, seed: u64) -> Matrix {
    let mut m = Matrix::zeros(rows, cols).unwrap();
    m.fill_random(seed, -1.0, 1.0);
    m
}

pub fn benchmark_elementwise(c: &mut Criterion) {
    let mut group = c.benchmark_group("elementwise_add");

    for order in [64, 256, 1024] {
        let a = random(order, order, 0x35c1e8f60b92da47);
        let b = random(order, order, 0x7a02d94c51e3b86f);
        let mut out = Matrix::zeros(order, order).unwrap();

        group.throughput(Throughput::Elements((order * order) as u64));
        group.bench_with_input(BenchmarkId::from_parameter(order), &order, |bencher, _| {
            bencher.iter(|| add(&mut out, &a, &b));
        });
    }

    group.finish();
}

pub fn benchmark_multiply(c: &mut Criterion) {
    let mut group = c.benchmark_group("multiply");
    group.sample_size(20);

    for order in [64, 128, 256] {
        let a = random(order, order, 0xc8f2106b3d97e5a4);
        let b = random(order, order, 0x59e7b0a48c21f6d3);
        let mut out = Matrix::zeros(order, order).unwrap();

        group.throughput(Throughput::Elements((order * order * order) as u64));
        group.bench_with_input(BenchmarkId::from_parameter(order), &order, |bencher, _| {
            bencher.iter(|| multiply(&mut out, &a, &b).unwrap());
        });
    }

    group.finish();
}
