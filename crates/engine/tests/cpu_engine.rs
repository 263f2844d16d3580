// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! End-to-end forward passes of zoo networks on the CPU engine.

use engine::{CpuEngine, DataBatch, Device, Engine, Forward, Synchronize, Xavier};
use model_zoo::Architecture;
use tensor_core::{DType, Shape};

fn run_once(arch: Architecture, image: &str, num_layers: usize, batch: usize, classes: usize) {
    let engine = CpuEngine::new(0).unwrap();
    let graph = arch.build(classes, image, num_layers, DType::Float32).unwrap();
    let data_shape = Shape::parse_csv(image).unwrap().with_batch(batch);

    let mut model = engine
        .prepare(graph, Device::Cpu, &data_shape, &Xavier::new(2.0))
        .unwrap();
    let data = engine.random_uniform(&data_shape, -1.0, 1.0, Device::Cpu).unwrap();
    let batch_data = DataBatch::new(vec![data]);

    let mut outputs = model.forward(&batch_data).unwrap();
    for out in &mut outputs {
        out.wait_to_read().unwrap();
    }
    let probs = outputs[0].read().unwrap();
    assert_eq!(probs.shape(), &Shape::matrix(batch, classes));
    for row in probs.as_slice().chunks(classes) {
        let sum: f32 = row.iter().sum();
        assert!((sum - 1.0).abs() < 1e-3, "row sums to {sum}");
        assert!(row.iter().all(|p| p.is_finite() && *p >= 0.0));
    }
}

#[test]
fn test_small_image_resnet() {
    run_once(Architecture::ResNet, "3,32,32", 20, 2, 10);
}

#[test]
fn test_small_image_bottleneck_resnet() {
    run_once(Architecture::ResNet, "3,28,28", 164, 1, 10);
}

#[test]
fn test_vgg11_reduced_input() {
    run_once(Architecture::Vgg, "3,32,32", 11, 1, 10);
}

#[test]
fn test_float16_graph_rejected() {
    let engine = CpuEngine::new(0).unwrap();
    let graph = Architecture::ResNet
        .build(10, "3,32,32", 20, DType::Float16)
        .unwrap();
    assert!(engine
        .prepare(graph, Device::Cpu, &Shape::nchw(1, 3, 32, 32), &Xavier::new(2.0))
        .is_err());
}

#[test]
#[ignore = "full-size network; run with --ignored in release mode"]
fn test_imagenet_resnet50() {
    run_once(Architecture::ResNet, "3,224,224", 50, 1, 1000);
}
