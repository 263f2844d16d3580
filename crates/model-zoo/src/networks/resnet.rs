// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! Pre-activation residual networks (He et al., 2016).
//!
//! Inputs taller than [`SMALL_IMAGE_MAX_HEIGHT`] use the four-stage ImageNet
//! layout; smaller inputs use the three-stage CIFAR layout, whose depth must
//! satisfy `(depth - 2) % 6 == 0` (basic units) or `(depth - 2) % 9 == 0`
//! with `depth >= 164` (bottleneck units).

use crate::{GraphBuilder, ModelError, NodeId};
use tensor_core::{PoolKind, Window2d};

/// Largest input height that selects the small-image layout.
pub(crate) const SMALL_IMAGE_MAX_HEIGHT: usize = 32;

const BN_EPS: f32 = 2e-5;

#[derive(Debug, Clone, PartialEq, Eq)]
struct Layout {
    units: Vec<usize>,
    filters: Vec<usize>,
    bottleneck: bool,
}

fn imagenet_layout(num_layers: usize) -> Option<Layout> {
    let units = match num_layers {
        18 => vec![2, 2, 2, 2],
        34 | 50 => vec![3, 4, 6, 3],
        101 => vec![3, 4, 23, 3],
        152 => vec![3, 8, 36, 3],
        200 => vec![3, 24, 36, 3],
        269 => vec![3, 30, 48, 8],
        _ => return None,
    };
    let bottleneck = num_layers >= 50;
    let filters = if bottleneck {
        vec![64, 256, 512, 1024, 2048]
    } else {
        vec![64, 64, 128, 256, 512]
    };
    Some(Layout {
        units,
        filters,
        bottleneck,
    })
}

fn small_image_layout(num_layers: usize) -> Option<Layout> {
    let depth = num_layers.checked_sub(2)?;
    if depth % 9 == 0 && num_layers >= 164 {
        Some(Layout {
            units: vec![depth / 9; 3],
            filters: vec![16, 64, 128, 256],
            bottleneck: true,
        })
    } else if depth % 6 == 0 && num_layers < 164 && depth > 0 {
        Some(Layout {
            units: vec![depth / 6; 3],
            filters: vec![16, 16, 32, 64],
            bottleneck: false,
        })
    } else {
        None
    }
}

pub(crate) fn body(
    b: &mut GraphBuilder,
    num_classes: usize,
    num_layers: usize,
) -> Result<NodeId, ModelError> {
    let height = b.shape_of(b.input()).dim(1).unwrap_or(0);
    let small = height <= SMALL_IMAGE_MAX_HEIGHT;
    let layout = if small {
        small_image_layout(num_layers)
    } else {
        imagenet_layout(num_layers)
    }
    .ok_or_else(|| ModelError::UnsupportedDepth {
        family: "resnet".into(),
        num_layers,
    })?;

    let data = b.input();
    let x = b.batch_norm("bn_data", data, BN_EPS, true)?;
    let mut x = if small {
        b.conv("conv0", x, layout.filters[0], Window2d::square(3).pad(1), true)?
    } else {
        let x = b.conv("conv0", x, layout.filters[0], Window2d::square(7).stride(2).pad(3), true)?;
        let x = b.batch_norm("bn0", x, BN_EPS, false)?;
        let x = b.relu("relu0", x)?;
        b.pool("pool0", x, PoolKind::Max, Window2d::square(3).stride(2).pad(1))?
    };

    for (i, &units) in layout.units.iter().enumerate() {
        let filters = layout.filters[i + 1];
        let stride = if i == 0 { 1 } else { 2 };
        let stage = i + 1;
        x = residual_unit(b, x, filters, stride, false, &format!("stage{stage}_unit1"), layout.bottleneck)?;
        for j in 2..=units {
            x = residual_unit(b, x, filters, 1, true, &format!("stage{stage}_unit{j}"), layout.bottleneck)?;
        }
    }

    let x = b.batch_norm("bn1", x, BN_EPS, false)?;
    let x = b.relu("relu1", x)?;
    let x = b.global_pool("pool1", x, PoolKind::Avg)?;
    let x = b.flatten("flatten0", x)?;
    b.fully_connected("fc1", x, num_classes)
}

/// One pre-activation residual unit: `BN -> ReLU -> conv` stacks plus a
/// shortcut that is either the identity or a strided 1x1 projection.
fn residual_unit(
    b: &mut GraphBuilder,
    data: NodeId,
    num_filter: usize,
    stride: usize,
    dim_match: bool,
    name: &str,
    bottleneck: bool,
) -> Result<NodeId, ModelError> {
    let bn1 = b.batch_norm(&format!("{name}_bn1"), data, BN_EPS, false)?;
    let act1 = b.relu(&format!("{name}_relu1"), bn1)?;

    let out = if bottleneck {
        let inner = num_filter / 4;
        let x = b.conv(&format!("{name}_conv1"), act1, inner, Window2d::square(1), true)?;
        let x = b.batch_norm(&format!("{name}_bn2"), x, BN_EPS, false)?;
        let x = b.relu(&format!("{name}_relu2"), x)?;
        let x = b.conv(
            &format!("{name}_conv2"),
            x,
            inner,
            Window2d::square(3).stride(stride).pad(1),
            true,
        )?;
        let x = b.batch_norm(&format!("{name}_bn3"), x, BN_EPS, false)?;
        let x = b.relu(&format!("{name}_relu3"), x)?;
        b.conv(&format!("{name}_conv3"), x, num_filter, Window2d::square(1), true)?
    } else {
        let x = b.conv(
            &format!("{name}_conv1"),
            act1,
            num_filter,
            Window2d::square(3).stride(stride).pad(1),
            true,
        )?;
        let x = b.batch_norm(&format!("{name}_bn2"), x, BN_EPS, false)?;
        let x = b.relu(&format!("{name}_relu2"), x)?;
        b.conv(&format!("{name}_conv2"), x, num_filter, Window2d::square(3).pad(1), true)?
    };

    let shortcut = if dim_match {
        data
    } else {
        b.conv(
            &format!("{name}_sc"),
            act1,
            num_filter,
            Window2d::square(1).stride(stride),
            true,
        )?
    };
    b.add(&format!("{name}_plus"), &[out, shortcut])
}
