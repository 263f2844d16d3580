// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! VGG (Simonyan & Zisserman, 2014), configurations A, B, D and E.

use crate::{GraphBuilder, ModelError, NodeId};
use tensor_core::{PoolKind, Window2d};

const FILTERS: [usize; 5] = [64, 128, 256, 512, 512];

/// Convolutions per stage for each supported depth.
fn stage_layout(num_layers: usize) -> Option<[usize; 5]> {
    match num_layers {
        11 => Some([1, 1, 2, 2, 2]),
        13 => Some([2, 2, 2, 2, 2]),
        16 => Some([2, 2, 3, 3, 3]),
        19 => Some([2, 2, 4, 4, 4]),
        _ => None,
    }
}

pub(crate) fn body(
    b: &mut GraphBuilder,
    num_classes: usize,
    num_layers: usize,
) -> Result<NodeId, ModelError> {
    let layout = stage_layout(num_layers).ok_or_else(|| ModelError::UnsupportedDepth {
        family: "vgg".into(),
        num_layers,
    })?;

    let mut x = b.input();
    for (stage, (&convs, &filters)) in layout.iter().zip(FILTERS.iter()).enumerate() {
        for j in 0..convs {
            let tag = format!("{}_{}", stage + 1, j + 1);
            x = b.conv(&format!("conv{tag}"), x, filters, Window2d::square(3).pad(1), false)?;
            x = b.relu(&format!("relu{tag}"), x)?;
        }
        x = b.pool(
            &format!("pool{}", stage + 1),
            x,
            PoolKind::Max,
            Window2d::square(2).stride(2),
        )?;
    }

    let x = b.flatten("flatten", x)?;
    let x = b.fully_connected("fc6", x, 4096)?;
    let x = b.relu("relu6", x)?;
    let x = b.dropout("drop6", x, 0.5)?;
    let x = b.fully_connected("fc7", x, 4096)?;
    let x = b.relu("relu7", x)?;
    let x = b.dropout("drop7", x, 0.5)?;
    b.fully_connected("fc8", x, num_classes)
}
