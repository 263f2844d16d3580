// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! Error types for binding and executing graphs on a device.

use crate::Device;
use tensor_core::{DType, Shape};

/// Errors that can occur while preparing or running a model.
#[derive(Debug, Clone, thiserror::Error)]
pub enum EngineError {
    /// The engine cannot address the requested device.
    #[error("device {device} is not available on the {engine} engine")]
    UnsupportedDevice { engine: String, device: Device },

    /// The device has no kernels for the graph's precision.
    #[error("{dtype} is not supported on {device}")]
    UnsupportedDType { dtype: DType, device: Device },

    /// Binding the graph to the requested data shape failed.
    #[error("cannot bind '{model}': {detail}")]
    Bind { model: String, detail: String },

    /// A parameter is missing or has the wrong shape after initialisation.
    #[error("parameter '{name}' is invalid: {detail}")]
    Parameter { name: String, detail: String },

    /// The batch does not match the shape the model was bound with.
    #[error("input shape mismatch: bound for {expected}, got {actual}")]
    InputShape { expected: Shape, actual: Shape },

    /// A kernel failed while executing a layer.
    #[error("execution error in layer '{layer}': {source}")]
    Execution {
        layer: String,
        #[source]
        source: tensor_core::TensorError,
    },

    /// The device worker stopped before completing the request.
    #[error("device worker for {0} has shut down")]
    WorkerGone(Device),
}
