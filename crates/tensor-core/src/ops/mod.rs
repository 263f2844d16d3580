// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! CNN inference kernels.
//!
//! Every operation takes its inputs by reference and returns a freshly
//! allocated output, so a graph executor can drop intermediate activations
//! as soon as their last consumer has run. Dense products (convolution via
//! im2col, fully-connected) go through `ndarray`'s GEMM.

mod conv_op;
mod elementwise_op;
mod matmul_op;
mod norm_op;
mod pool_op;
mod softmax_op;
mod window;

pub use conv_op::conv2d;
pub use elementwise_op::{add, concat_channels, flatten, relu};
pub use matmul_op::fully_connected;
pub use norm_op::{batch_norm, lrn, BatchNormParams};
pub use pool_op::{global_pool2d, pool2d, PoolKind};
pub use softmax_op::softmax;
pub use window::Window2d;
