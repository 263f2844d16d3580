// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! AlexNet (Krizhevsky et al., 2012), single-tower variant.

use crate::{GraphBuilder, ModelError, NodeId};
use tensor_core::{PoolKind, Window2d};

const LRN_SIZE: usize = 5;
const LRN_ALPHA: f32 = 1e-4;
const LRN_BETA: f32 = 0.75;
const LRN_KNORM: f32 = 2.0;

pub(crate) fn body(b: &mut GraphBuilder, num_classes: usize) -> Result<NodeId, ModelError> {
    let x = b.input();

    // stage 1
    let x = b.conv("conv1", x, 96, Window2d::square(11).stride(4), false)?;
    let x = b.relu("relu1", x)?;
    let x = b.lrn("lrn1", x, LRN_SIZE, LRN_ALPHA, LRN_BETA, LRN_KNORM)?;
    let x = b.pool("pool1", x, PoolKind::Max, Window2d::square(3).stride(2))?;

    // stage 2
    let x = b.conv("conv2", x, 256, Window2d::square(5).pad(2), false)?;
    let x = b.relu("relu2", x)?;
    let x = b.lrn("lrn2", x, LRN_SIZE, LRN_ALPHA, LRN_BETA, LRN_KNORM)?;
    let x = b.pool("pool2", x, PoolKind::Max, Window2d::square(3).stride(2))?;

    // stage 3
    let x = b.conv("conv3", x, 384, Window2d::square(3).pad(1), false)?;
    let x = b.relu("relu3", x)?;
    let x = b.conv("conv4", x, 384, Window2d::square(3).pad(1), false)?;
    let x = b.relu("relu4", x)?;
    let x = b.conv("conv5", x, 256, Window2d::square(3).pad(1), false)?;
    let x = b.relu("relu5", x)?;
    let x = b.pool("pool3", x, PoolKind::Max, Window2d::square(3).stride(2))?;

    // classifier
    let x = b.flatten("flatten", x)?;
    let x = b.fully_connected("fc1", x, 4096)?;
    let x = b.relu("relu6", x)?;
    let x = b.dropout("dropout1", x, 0.5)?;
    let x = b.fully_connected("fc2", x, 4096)?;
    let x = b.relu("relu7", x)?;
    let x = b.dropout("dropout2", x, 0.5)?;
    b.fully_connected("fc3", x, num_classes)
}
