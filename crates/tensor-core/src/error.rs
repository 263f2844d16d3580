// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! Error types for tensor operations.

use crate::Shape;

/// Errors that can occur during tensor operations.
#[derive(Debug, Clone, thiserror::Error)]
pub enum TensorError {
    /// The provided buffer length does not match the element count of the shape.
    #[error("buffer length mismatch: shape {shape} needs {expected} elements, got {actual}")]
    BufferSizeMismatch {
        shape: Shape,
        expected: usize,
        actual: usize,
    },

    /// Two tensors have incompatible shapes for the requested operation.
    #[error("incompatible shapes for {op}: {lhs} vs {rhs}")]
    ShapeMismatch {
        op: &'static str,
        lhs: Shape,
        rhs: Shape,
    },

    /// The operation expects a tensor of a specific rank.
    #[error("{op} expects a rank-{expected} tensor, got {shape}")]
    RankMismatch {
        op: &'static str,
        expected: usize,
        shape: Shape,
    },

    /// Kernel, stride or padding parameters produce an empty output.
    #[error("invalid window for {op}: {detail}")]
    InvalidWindow { op: &'static str, detail: String },

    /// A buffer could not be viewed with the requested layout.
    #[error("layout error in {op}: {detail}")]
    Layout { op: &'static str, detail: String },

    /// A shape string could not be parsed.
    #[error("cannot parse shape '{input}': {detail}")]
    ShapeParse { input: String, detail: String },
}
