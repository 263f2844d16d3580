// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! Benchmarks for the convolution and dense kernels.

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use rand::rngs::StdRng;
use rand::SeedableRng;
use tensor_core::{ops, Shape, Tensor, Window2d};

fn bench_conv2d(c: &mut Criterion) {
    let mut rng = StdRng::seed_from_u64(0);
    let mut group = c.benchmark_group("conv2d");

    // (label, input, weight, window)
    let cases = [
        ("3x3_56x56x64", Shape::nchw(1, 64, 56, 56), Shape::nchw(64, 64, 3, 3), Window2d::square(3).pad(1)),
        ("1x1_28x28x256", Shape::nchw(1, 256, 28, 28), Shape::nchw(64, 256, 1, 1), Window2d::square(1)),
        ("7x7s2_224x224x3", Shape::nchw(1, 3, 224, 224), Shape::nchw(64, 3, 7, 7), Window2d::square(7).stride(2).pad(3)),
    ];

    for (label, in_shape, w_shape, window) in cases {
        let input = Tensor::random_uniform(in_shape, -1.0, 1.0, &mut rng);
        let weight = Tensor::random_uniform(w_shape, -0.1, 0.1, &mut rng);
        group.bench_with_input(BenchmarkId::from_parameter(label), &window, |b, window| {
            b.iter(|| ops::conv2d(black_box(&input), black_box(&weight), None, window).unwrap())
        });
    }
    group.finish();
}

fn bench_fully_connected(c: &mut Criterion) {
    let mut rng = StdRng::seed_from_u64(1);
    let mut group = c.benchmark_group("fully_connected");

    for batch in [1usize, 8, 32] {
        let input = Tensor::random_uniform(Shape::matrix(batch, 4096), -1.0, 1.0, &mut rng);
        let weight = Tensor::random_uniform(Shape::matrix(1000, 4096), -0.1, 0.1, &mut rng);
        group.bench_with_input(BenchmarkId::from_parameter(batch), &batch, |b, _| {
            b.iter(|| ops::fully_connected(black_box(&input), black_box(&weight), None).unwrap())
        });
    }
    group.finish();
}

fn bench_pool(c: &mut Criterion) {
    let mut rng = StdRng::seed_from_u64(2);
    let input = Tensor::random_uniform(Shape::nchw(8, 64, 112, 112), -1.0, 1.0, &mut rng);
    let window = Window2d::square(3).stride(2).pad(1);
    c.bench_function("max_pool_3x3s2", |b| {
        b.iter(|| ops::pool2d(black_box(&input), tensor_core::PoolKind::Max, &window).unwrap())
    });
}

criterion_group!(benches, bench_conv2d, bench_fully_connected, bench_pool);
criterion_main!(benches);
