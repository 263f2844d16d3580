// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! Inception-v3 (Szegedy et al., 2015) for 299x299 inputs.
//!
//! Module names follow the `mixed`, `mixed_1`, ... convention of the
//! published checkpoints.

use crate::{GraphBuilder, ModelError, NodeId};
use tensor_core::{PoolKind, Window2d};

const BN_EPS: f32 = 1e-3;

fn conv(
    b: &mut GraphBuilder,
    data: NodeId,
    num_filter: usize,
    window: Window2d,
    name: &str,
    suffix: &str,
) -> Result<NodeId, ModelError> {
    let x = b.conv(&format!("{name}{suffix}_conv2d"), data, num_filter, window, true)?;
    let x = b.batch_norm(&format!("{name}{suffix}_batchnorm"), x, BN_EPS, true)?;
    b.relu(&format!("{name}{suffix}_relu"), x)
}

fn k1() -> Window2d {
    Window2d::square(1)
}

fn k3() -> Window2d {
    Window2d::square(3)
}

/// 1x7 followed by 7x1 factorisation helpers.
fn k1x7() -> Window2d {
    Window2d::rect(1, 7).pad_hw(0, 3)
}

fn k7x1() -> Window2d {
    Window2d::rect(7, 1).pad_hw(3, 0)
}

fn pool_branch(
    b: &mut GraphBuilder,
    data: NodeId,
    pool: PoolKind,
    proj: usize,
    name: &str,
) -> Result<NodeId, ModelError> {
    let pooled = b.pool(
        &format!("{}_pool_{name}_pool", pool.as_str()),
        data,
        pool,
        k3().pad(1),
    )?;
    conv(b, pooled, proj, k1(), &format!("{name}_tower_2"), "_conv")
}

/// 35x35 module: 1x1, 5x5 and double-3x3 towers.
#[allow(clippy::too_many_arguments)]
fn inception_a(
    b: &mut GraphBuilder,
    data: NodeId,
    num_1x1: usize,
    num_3x3_red: usize,
    num_3x3_1: usize,
    num_3x3_2: usize,
    num_5x5_red: usize,
    num_5x5: usize,
    pool: PoolKind,
    proj: usize,
    name: &str,
) -> Result<NodeId, ModelError> {
    let t1 = conv(b, data, num_1x1, k1(), &format!("{name}_conv"), "")?;

    let tower = format!("{name}_tower");
    let t5 = conv(b, data, num_5x5_red, k1(), &tower, "_conv")?;
    let t5 = conv(b, t5, num_5x5, Window2d::square(5).pad(2), &tower, "_conv_1")?;

    let tower = format!("{name}_tower_1");
    let t3 = conv(b, data, num_3x3_red, k1(), &tower, "_conv")?;
    let t3 = conv(b, t3, num_3x3_1, k3().pad(1), &tower, "_conv_1")?;
    let t3 = conv(b, t3, num_3x3_2, k3().pad(1), &tower, "_conv_2")?;

    let proj = pool_branch(b, data, pool, proj, name)?;
    b.concat(&format!("ch_concat_{name}_chconcat"), &[t1, t5, t3, proj])
}

/// 35x35 -> 17x17 reduction.
fn inception_b(
    b: &mut GraphBuilder,
    data: NodeId,
    num_3x3: usize,
    num_d3x3_red: usize,
    num_d3x3_1: usize,
    num_d3x3_2: usize,
    name: &str,
) -> Result<NodeId, ModelError> {
    let t3 = conv(b, data, num_3x3, k3().stride(2), &format!("{name}_conv"), "")?;

    let tower = format!("{name}_tower");
    let td = conv(b, data, num_d3x3_red, k1(), &tower, "_conv")?;
    let td = conv(b, td, num_d3x3_1, k3().pad(1), &tower, "_conv_1")?;
    let td = conv(b, td, num_d3x3_2, k3().stride(2), &tower, "_conv_2")?;

    let pooled = b.pool(&format!("max_pool_{name}_pool"), data, PoolKind::Max, k3().stride(2))?;
    b.concat(&format!("ch_concat_{name}_chconcat"), &[t3, td, pooled])
}

/// Widths of a 17x17 module built from factorised 7x7 convolutions.
struct Factorized7 {
    num_1x1: usize,
    d7_red: usize,
    d7_1: usize,
    d7_2: usize,
    q7_red: usize,
    q7: [usize; 4],
    proj: usize,
}

fn inception_c(
    b: &mut GraphBuilder,
    data: NodeId,
    m: &Factorized7,
    name: &str,
) -> Result<NodeId, ModelError> {
    let t1 = conv(b, data, m.num_1x1, k1(), &format!("{name}_conv"), "")?;

    let tower = format!("{name}_tower");
    let d7 = conv(b, data, m.d7_red, k1(), &tower, "_conv")?;
    let d7 = conv(b, d7, m.d7_1, k1x7(), &tower, "_conv_1")?;
    let d7 = conv(b, d7, m.d7_2, k7x1(), &tower, "_conv_2")?;

    let tower = format!("{name}_tower_1");
    let q7 = conv(b, data, m.q7_red, k1(), &tower, "_conv")?;
    let q7 = conv(b, q7, m.q7[0], k7x1(), &tower, "_conv_1")?;
    let q7 = conv(b, q7, m.q7[1], k1x7(), &tower, "_conv_2")?;
    let q7 = conv(b, q7, m.q7[2], k7x1(), &tower, "_conv_3")?;
    let q7 = conv(b, q7, m.q7[3], k1x7(), &tower, "_conv_4")?;

    let proj = pool_branch(b, data, PoolKind::Avg, m.proj, name)?;
    b.concat(&format!("ch_concat_{name}_chconcat"), &[t1, d7, q7, proj])
}

/// 17x17 -> 8x8 reduction.
fn inception_d(
    b: &mut GraphBuilder,
    data: NodeId,
    num_3x3_red: usize,
    num_3x3: usize,
    d7_red: usize,
    d7: [usize; 3],
    name: &str,
) -> Result<NodeId, ModelError> {
    let tower = format!("{name}_tower");
    let t3 = conv(b, data, num_3x3_red, k1(), &tower, "_conv")?;
    let t3 = conv(b, t3, num_3x3, k3().stride(2), &tower, "_conv_1")?;

    let tower = format!("{name}_tower_1");
    let t7 = conv(b, data, d7_red, k1(), &tower, "_conv")?;
    let t7 = conv(b, t7, d7[0], k1x7(), &tower, "_conv_1")?;
    let t7 = conv(b, t7, d7[1], k7x1(), &tower, "_conv_2")?;
    let t7 = conv(b, t7, d7[2], k3().stride(2), &tower, "_conv_3")?;

    let pooled = b.pool(&format!("max_pool_{name}_pool"), data, PoolKind::Max, k3().stride(2))?;
    b.concat(&format!("ch_concat_{name}_chconcat"), &[t3, t7, pooled])
}

/// 8x8 module with expanded 1x3 / 3x1 filter banks.
fn inception_e(
    b: &mut GraphBuilder,
    data: NodeId,
    pool: PoolKind,
    name: &str,
) -> Result<NodeId, ModelError> {
    let k1x3 = Window2d::rect(1, 3).pad_hw(0, 1);
    let k3x1 = Window2d::rect(3, 1).pad_hw(1, 0);

    let t1 = conv(b, data, 320, k1(), &format!("{name}_conv"), "")?;

    let tower = format!("{name}_tower");
    let d3 = conv(b, data, 384, k1(), &tower, "_conv")?;
    let d3_a = conv(b, d3, 384, k1x3, &tower, "_mixed_conv")?;
    let d3_b = conv(b, d3, 384, k3x1, &tower, "_mixed_conv_1")?;

    let tower = format!("{name}_tower_1");
    let t3 = conv(b, data, 448, k1(), &tower, "_conv")?;
    let t3 = conv(b, t3, 384, k3().pad(1), &tower, "_conv_1")?;
    let t3_a = conv(b, t3, 384, k1x3, &tower, "_mixed_conv")?;
    let t3_b = conv(b, t3, 384, k3x1, &tower, "_mixed_conv_1")?;

    let proj = pool_branch(b, data, pool, 192, name)?;
    b.concat(
        &format!("ch_concat_{name}_chconcat"),
        &[t1, d3_a, d3_b, t3_a, t3_b, proj],
    )
}

pub(crate) fn body(b: &mut GraphBuilder, num_classes: usize) -> Result<NodeId, ModelError> {
    use PoolKind::{Avg, Max};

    let data = b.input();

    // stem: 299 -> 35
    let x = conv(b, data, 32, k3().stride(2), "conv", "")?;
    let x = conv(b, x, 32, k3(), "conv_1", "")?;
    let x = conv(b, x, 64, k3().pad(1), "conv_2", "")?;
    let x = b.pool("pool", x, Max, k3().stride(2))?;
    let x = conv(b, x, 80, k1(), "conv_3", "")?;
    let x = conv(b, x, 192, k3(), "conv_4", "")?;
    let x = b.pool("pool1", x, Max, k3().stride(2))?;

    // 35x35
    let x = inception_a(b, x, 64, 64, 96, 96, 48, 64, Avg, 32, "mixed")?;
    let x = inception_a(b, x, 64, 64, 96, 96, 48, 64, Avg, 64, "mixed_1")?;
    let x = inception_a(b, x, 64, 64, 96, 96, 48, 64, Avg, 64, "mixed_2")?;
    let x = inception_b(b, x, 384, 64, 96, 96, "mixed_3")?;

    // 17x17
    let f7 = |red: usize, inner: usize| Factorized7 {
        num_1x1: 192,
        d7_red: red,
        d7_1: inner,
        d7_2: 192,
        q7_red: red,
        q7: [inner, inner, inner, 192],
        proj: 192,
    };
    let x = inception_c(b, x, &f7(128, 128), "mixed_4")?;
    let x = inception_c(b, x, &f7(160, 160), "mixed_5")?;
    let x = inception_c(b, x, &f7(160, 160), "mixed_6")?;
    let x = inception_c(b, x, &f7(192, 192), "mixed_7")?;
    let x = inception_d(b, x, 192, 320, 192, [192, 192, 192], "mixed_8")?;

    // 8x8
    let x = inception_e(b, x, Avg, "mixed_9")?;
    let x = inception_e(b, x, Max, "mixed_10")?;

    let x = b.global_pool("global_pool", x, Avg)?;
    let x = b.flatten("flatten", x)?;
    b.fully_connected("fc1", x, num_classes)
}
