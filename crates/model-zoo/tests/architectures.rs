// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! Topology checks for every family at its canonical input size.

use model_zoo::{Architecture, ModelGraph, Op, Validated};
use tensor_core::{DType, Shape};

fn build(family: &str, image: &str, num_layers: usize) -> ModelGraph<Validated> {
    Architecture::lookup(family)
        .unwrap()
        .build(1000, image, num_layers, DType::Float32)
        .unwrap()
}

fn convs(g: &ModelGraph<Validated>) -> usize {
    g.count_ops(|op| matches!(op, Op::Convolution { .. }))
}

fn shape_of(g: &ModelGraph<Validated>, name: &str) -> Shape {
    g.iter_layers()
        .find(|l| l.name == name)
        .unwrap_or_else(|| panic!("no layer named {name}"))
        .output_shape
        .clone()
}

#[test]
fn test_alexnet_param_count() {
    let g = build("alexnet", "3,224,224", 0);
    assert_eq!(g.num_params(), 50_844_008);
    assert_eq!(shape_of(&g, "pool3"), Shape::chw(256, 5, 5));
    assert_eq!(g.output_shapes(), vec![&Shape::vector(1000)]);
}

#[test]
fn test_vgg16_param_count() {
    let g = build("vgg", "3,224,224", 16);
    assert_eq!(g.num_params(), 138_357_544);
    assert_eq!(convs(&g), 13);
    assert_eq!(shape_of(&g, "pool5"), Shape::chw(512, 7, 7));
}

#[test]
fn test_vgg_depths() {
    for (depth, expected_convs) in [(11, 8), (13, 10), (16, 13), (19, 16)] {
        let g = build("vgg", "3,224,224", depth);
        assert_eq!(convs(&g), expected_convs, "vgg-{depth}");
    }
}

#[test]
fn test_resnet_imagenet_depths() {
    // stem conv + units * convs-per-unit + one projection per stage
    for (depth, expected_convs) in [(18, 1 + 16 + 4), (34, 1 + 32 + 4), (50, 1 + 48 + 4), (152, 1 + 150 + 4)] {
        let g = build("resnet", "3,224,224", depth);
        assert_eq!(convs(&g), expected_convs, "resnet-{depth}");
        assert_eq!(g.output_shapes(), vec![&Shape::vector(1000)]);
    }
}

#[test]
fn test_resnet50_feature_map() {
    let g = build("resnet", "3,224,224", 50);
    assert_eq!(shape_of(&g, "stage4_unit3_plus"), Shape::chw(2048, 7, 7));
    let millions = g.num_params() as f64 / 1e6;
    assert!((25.0..26.0).contains(&millions), "got {millions}M params");
}

#[test]
fn test_resnet_small_image() {
    let g = build("resnet", "3,32,32", 20);
    assert_eq!(shape_of(&g, "stage3_unit3_plus"), Shape::chw(64, 8, 8));
    assert!(Architecture::ResNet
        .build(10, "3,32,32", 51, DType::Float32)
        .is_err());
}

#[test]
fn test_inception_bn() {
    let g = build("inception-bn", "3,224,224", 0);
    assert_eq!(convs(&g), 69);
    assert_eq!(shape_of(&g, "ch_concat_3c_chconcat"), Shape::chw(576, 14, 14));
    assert_eq!(shape_of(&g, "ch_concat_5b_chconcat"), Shape::chw(1024, 7, 7));
}

#[test]
fn test_inception_v3() {
    let g = build("inception-v3", "3,299,299", 0);
    assert_eq!(convs(&g), 94);
    assert_eq!(shape_of(&g, "pool1"), Shape::chw(192, 35, 35));
    assert_eq!(shape_of(&g, "ch_concat_mixed_3_chconcat"), Shape::chw(768, 17, 17));
    assert_eq!(shape_of(&g, "ch_concat_mixed_10_chconcat"), Shape::chw(2048, 8, 8));
}

#[test]
fn test_float16_graph_keeps_float32_output() {
    let g = Architecture::InceptionV3
        .build(1000, "3,299,299", 0, DType::Float16)
        .unwrap();
    assert_eq!(g.dtype, DType::Float16);
    let last_two: Vec<_> = g.iter_layers().rev().take(2).map(|l| l.op.clone()).collect();
    assert_eq!(last_two[0], Op::SoftmaxOutput);
    assert_eq!(last_two[1], Op::Cast { dtype: DType::Float32 });
}

#[test]
fn test_layer_names_unique() {
    for (family, image, depth) in [
        ("alexnet", "3,224,224", 0),
        ("vgg", "3,224,224", 19),
        ("inception-bn", "3,224,224", 0),
        ("inception-v3", "3,299,299", 0),
        ("resnet", "3,224,224", 101),
    ] {
        let g = build(family, image, depth);
        let mut names: Vec<_> = g.iter_layers().map(|l| l.name.as_str()).collect();
        let total = names.len();
        names.sort_unstable();
        names.dedup();
        assert_eq!(names.len(), total, "duplicate layer names in {family}");
    }
}
