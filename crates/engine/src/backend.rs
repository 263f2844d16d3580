// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! The traits every execution backend implements.
//!
//! Execution is asynchronous: [`Forward::forward`] only *submits* a pass and
//! returns handles to its outputs. The results are guaranteed to exist only
//! after [`Synchronize::wait_to_read`] returns on each handle.

use crate::{Device, EngineError, Initializer};
use model_zoo::{ModelGraph, Validated};
use std::sync::Arc;
use tensor_core::{Shape, Tensor};

/// A batch of input tensors already resident on the target device.
///
/// Tensors are reference-counted so the same batch can be resubmitted on
/// every iteration without copying.
#[derive(Debug, Clone)]
pub struct DataBatch {
    pub data: Vec<Arc<Tensor>>,
}

impl DataBatch {
    pub fn new(data: Vec<Arc<Tensor>>) -> Self {
        Self { data }
    }

    /// Number of samples in the first input.
    pub fn batch_size(&self) -> usize {
        self.data
            .first()
            .and_then(|t| t.shape().dim(0))
            .unwrap_or(0)
    }
}

/// Blocks until a submitted result is complete and host-readable.
pub trait Synchronize {
    fn wait_to_read(&mut self) -> Result<(), EngineError>;
}

/// A model bound to a device with initialised parameters.
pub trait Forward {
    type Output: Synchronize;

    /// Submits one inference pass over `batch`.
    fn forward(&mut self, batch: &DataBatch) -> Result<Vec<Self::Output>, EngineError>;
}

/// An execution backend.
pub trait Engine {
    type Model: Forward;

    fn name(&self) -> &str;

    /// Accelerator devices present on this host, in index order.
    fn accelerators(&self) -> Vec<Device>;

    /// Binds `graph` for inputs of `data_shape` on `device` and initialises
    /// its parameters. This is the one-time cost excluded from timing.
    fn prepare(
        &self,
        graph: ModelGraph<Validated>,
        device: Device,
        data_shape: &Shape,
        initializer: &dyn Initializer,
    ) -> Result<Self::Model, EngineError>;

    /// Allocates a tensor of uniform random values in `[low, high)` on `device`.
    fn random_uniform(
        &self,
        shape: &Shape,
        low: f32,
        high: f32,
        device: Device,
    ) -> Result<Arc<Tensor>, EngineError>;
}
