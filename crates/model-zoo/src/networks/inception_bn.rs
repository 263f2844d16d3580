// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! GoogLeNet with batch normalisation (Ioffe & Szegedy, 2015).

use crate::{GraphBuilder, ModelError, NodeId};
use tensor_core::{PoolKind, Window2d};

const BN_EPS: f32 = 1e-3;

/// `conv -> batch_norm -> relu`, all sharing `name` + `suffix`.
fn conv_factory(
    b: &mut GraphBuilder,
    data: NodeId,
    num_filter: usize,
    window: Window2d,
    name: &str,
    suffix: &str,
) -> Result<NodeId, ModelError> {
    let x = b.conv(&format!("conv_{name}{suffix}"), data, num_filter, window, false)?;
    let x = b.batch_norm(&format!("bn_{name}{suffix}"), x, BN_EPS, true)?;
    b.relu(&format!("relu_{name}{suffix}"), x)
}

/// Channel widths of a stride-1 inception module.
struct ModuleA {
    c1x1: usize,
    c3x3_red: usize,
    c3x3: usize,
    d3x3_red: usize,
    d3x3: usize,
    pool: PoolKind,
    proj: usize,
}

fn inception_a(
    b: &mut GraphBuilder,
    data: NodeId,
    m: &ModuleA,
    name: &str,
) -> Result<NodeId, ModelError> {
    let one = Window2d::square(1);
    let three = Window2d::square(3).pad(1);

    let c1x1 = conv_factory(b, data, m.c1x1, one, &format!("{name}_1x1"), "")?;

    let c3x3 = conv_factory(b, data, m.c3x3_red, one, &format!("{name}_3x3"), "_reduce")?;
    let c3x3 = conv_factory(b, c3x3, m.c3x3, three, &format!("{name}_3x3"), "")?;

    let cd3x3 = conv_factory(b, data, m.d3x3_red, one, &format!("{name}_double_3x3"), "_reduce")?;
    let cd3x3 = conv_factory(b, cd3x3, m.d3x3, three, &format!("{name}_double_3x3_0"), "")?;
    let cd3x3 = conv_factory(b, cd3x3, m.d3x3, three, &format!("{name}_double_3x3_1"), "")?;

    let pooled = b.pool(
        &format!("{}_pool_{name}_pool", m.pool.as_str()),
        data,
        m.pool,
        Window2d::square(3).pad(1),
    )?;
    let cproj = conv_factory(b, pooled, m.proj, one, &format!("{name}_proj"), "")?;

    b.concat(&format!("ch_concat_{name}_chconcat"), &[c1x1, c3x3, cd3x3, cproj])
}

/// Grid-reduction module: halves the spatial size.
fn inception_b(
    b: &mut GraphBuilder,
    data: NodeId,
    c3x3_red: usize,
    c3x3: usize,
    d3x3_red: usize,
    d3x3: usize,
    name: &str,
) -> Result<NodeId, ModelError> {
    let one = Window2d::square(1);
    let down = Window2d::square(3).stride(2).pad(1);

    let t3 = conv_factory(b, data, c3x3_red, one, &format!("{name}_3x3"), "_reduce")?;
    let t3 = conv_factory(b, t3, c3x3, down, &format!("{name}_3x3"), "")?;

    let td = conv_factory(b, data, d3x3_red, one, &format!("{name}_double_3x3"), "_reduce")?;
    let td = conv_factory(b, td, d3x3, Window2d::square(3).pad(1), &format!("{name}_double_3x3_0"), "")?;
    let td = conv_factory(b, td, d3x3, down, &format!("{name}_double_3x3_1"), "")?;

    let pooled = b.pool(&format!("max_pool_{name}_pool"), data, PoolKind::Max, down)?;

    b.concat(&format!("ch_concat_{name}_chconcat"), &[t3, td, pooled])
}

pub(crate) fn body(b: &mut GraphBuilder, num_classes: usize) -> Result<NodeId, ModelError> {
    use PoolKind::{Avg, Max};

    let data = b.input();

    // stem
    let x = conv_factory(b, data, 64, Window2d::square(7).stride(2).pad(3), "1", "")?;
    let x = b.pool("pool_1", x, Max, Window2d::square(3).stride(2))?;
    let x = conv_factory(b, x, 64, Window2d::square(1), "2_red", "")?;
    let x = conv_factory(b, x, 192, Window2d::square(3).pad(1), "2", "")?;
    let x = b.pool("pool_2", x, Max, Window2d::square(3).stride(2))?;

    // stage 3
    let a = |c1x1, c3x3_red, c3x3, d3x3_red, d3x3, pool, proj| ModuleA {
        c1x1,
        c3x3_red,
        c3x3,
        d3x3_red,
        d3x3,
        pool,
        proj,
    };
    let x = inception_a(b, x, &a(64, 64, 64, 64, 96, Avg, 32), "3a")?;
    let x = inception_a(b, x, &a(64, 64, 96, 64, 96, Avg, 64), "3b")?;
    let x = inception_b(b, x, 128, 160, 64, 96, "3c")?;

    // stage 4
    let x = inception_a(b, x, &a(224, 64, 96, 96, 128, Avg, 128), "4a")?;
    let x = inception_a(b, x, &a(192, 96, 128, 96, 128, Avg, 128), "4b")?;
    let x = inception_a(b, x, &a(160, 128, 160, 128, 160, Avg, 128), "4c")?;
    let x = inception_a(b, x, &a(96, 128, 192, 160, 192, Avg, 128), "4d")?;
    let x = inception_b(b, x, 128, 192, 192, 256, "4e")?;

    // stage 5
    let x = inception_a(b, x, &a(352, 192, 320, 160, 224, Avg, 128), "5a")?;
    let x = inception_a(b, x, &a(352, 192, 320, 192, 224, Max, 128), "5b")?;

    let x = b.global_pool("global_pool", x, Avg)?;
    let x = b.flatten("flatten", x)?;
    b.fully_connected("fc1", x, num_classes)
}
