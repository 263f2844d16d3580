// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! # tensor-core
//!
//! Tensor types and the inference kernels needed to run image-classification
//! CNNs on the CPU.
//!
//! This crate provides:
//! - [`Tensor`] — an owned, row-major `f32` tensor (NCHW for image activations).
//! - [`Shape`] — runtime shape descriptors, including the `"C,H,W"` string form.
//! - [`DType`] — the precisions a network can be scored in (`float32`, `float16`).
//! - Kernels: convolution, pooling, batch-norm, LRN, ReLU, fully-connected,
//!   softmax, channel concat and element-wise sum.
//!
//! # Design Goals
//! - Dense products delegate to `ndarray` GEMM; everything else is plain loops.
//! - Shape errors are reported, never panicked on.
//! - Clean error types via `thiserror`.

mod dtype;
mod error;
pub mod ops;
mod shape;
mod tensor;

pub use dtype::DType;
pub use error::TensorError;
pub use ops::{PoolKind, Window2d};
pub use shape::Shape;
pub use tensor::Tensor;
