// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! Submit-and-retire latency of a small network on the CPU engine.

use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion};
use engine::{CpuEngine, DataBatch, Device, Engine, Forward, Synchronize, Xavier};
use model_zoo::Architecture;
use tensor_core::{DType, Shape};

fn bench_resnet20_forward(c: &mut Criterion) {
    let engine = CpuEngine::new(0).unwrap();
    let mut group = c.benchmark_group("resnet20_cifar_forward");
    group.sample_size(20);

    for batch in [1usize, 8] {
        let graph = Architecture::ResNet
            .build(10, "3,32,32", 20, DType::Float32)
            .unwrap();
        let data_shape = Shape::nchw(batch, 3, 32, 32);
        let mut model = engine
            .prepare(graph, Device::Cpu, &data_shape, &Xavier::new(2.0))
            .unwrap();
        let data = engine.random_uniform(&data_shape, -1.0, 1.0, Device::Cpu).unwrap();
        let input = DataBatch::new(vec![data]);

        group.bench_with_input(BenchmarkId::from_parameter(batch), &batch, |b, _| {
            b.iter(|| {
                let mut outputs = model.forward(&input).unwrap();
                for out in &mut outputs {
                    out.wait_to_read().unwrap();
                }
            })
        });
    }
    group.finish();
}

criterion_group!(benches, bench_resnet20_forward);
criterion_main!(benches);
