// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! A graph bound to a device, with a type-state–enforced setup sequence.
//!
//! ```text
//! Module<Bound>
//!     │  .init_params()
//!     ▼
//! Module<Ready>
//!     │  .forward()
//!     ▼
//!   Vec<PendingOutput>  ── .wait_to_read() ──▶ host-readable tensors
//! ```

use crate::worker::{DeviceWorker, Job};
use crate::{DataBatch, Device, EngineError, Forward, Initializer, Synchronize};
use crate::executor::Program;
use model_zoo::{ModelGraph, Validated};
use rand::rngs::StdRng;
use rand::SeedableRng;
use std::sync::Arc;
use tensor_core::{DType, Shape, Tensor};
use tokio::sync::oneshot;

// ── Type-state markers ─────────────────────────────────────────

/// Graph is bound to a device and data shape; parameters are unset.
#[derive(Debug)]
pub struct Bound;

/// Parameters are initialised; the module can run forward passes.
#[derive(Debug)]
pub struct Ready;

/// Sealed trait for module states.
pub trait ModuleState: std::fmt::Debug {}
impl ModuleState for Bound {}
impl ModuleState for Ready {}

// ── Module ─────────────────────────────────────────────────────

/// A model placed on a device.
#[derive(Debug)]
pub struct Module<S: ModuleState = Bound> {
    worker: Arc<DeviceWorker>,
    graph: Option<ModelGraph<Validated>>,
    data_shape: Shape,
    program: Option<Arc<Program>>,
    _state: std::marker::PhantomData<S>,
}

impl Module<Bound> {
    /// Binds `graph` for inputs of exactly `data_shape` (`N, C, H, W`).
    ///
    /// # Errors
    /// - [`EngineError::UnsupportedDType`] for 16-bit graphs on the CPU.
    /// - [`EngineError::Bind`] if `data_shape` disagrees with the graph input.
    pub(crate) fn bind(
        worker: Arc<DeviceWorker>,
        graph: ModelGraph<Validated>,
        data_shape: &Shape,
    ) -> Result<Self, EngineError> {
        let device = worker.device();
        if graph.dtype == DType::Float16 && device.is_cpu() {
            return Err(EngineError::UnsupportedDType {
                dtype: graph.dtype,
                device,
            });
        }
        if data_shape.rank() != graph.input_shape.rank() + 1
            || data_shape.without_batch() != graph.input_shape
            || data_shape.dim(0).unwrap_or(0) == 0
        {
            return Err(EngineError::Bind {
                model: graph.name.clone(),
                detail: format!(
                    "data shape {data_shape} does not match per-sample input {}",
                    graph.input_shape
                ),
            });
        }

        tracing::debug!("bound '{}' on {device} for data {data_shape}", graph.name);
        Ok(Self {
            worker,
            graph: Some(graph),
            data_shape: data_shape.clone(),
            program: None,
            _state: std::marker::PhantomData,
        })
    }

    /// Allocates and initialises every parameter, deterministically from `seed`.
    pub fn init_params(
        mut self,
        initializer: &dyn Initializer,
        seed: u64,
    ) -> Result<Module<Ready>, EngineError> {
        let graph = self.graph.take().ok_or_else(|| EngineError::Bind {
            model: String::new(),
            detail: "module has no graph".into(),
        })?;
        let mut rng = StdRng::seed_from_u64(seed);
        let params = graph
            .iter_layers()
            .map(|layer| {
                layer
                    .params
                    .iter()
                    .map(|p| initializer.init_param(p, &mut rng))
                    .collect::<Result<Vec<_>, _>>()
            })
            .collect::<Result<Vec<_>, _>>()?;

        tracing::debug!(
            "initialised {:.2}M parameters for '{}'",
            graph.num_params() as f64 / 1e6,
            graph.name
        );
        let program = Program::new(graph, params, self.data_shape.clone())?;

        Ok(Module {
            worker: self.worker,
            graph: None,
            data_shape: self.data_shape,
            program: Some(Arc::new(program)),
            _state: std::marker::PhantomData,
        })
    }
}

impl<S: ModuleState> Module<S> {
    pub fn device(&self) -> Device {
        self.worker.device()
    }

    /// The `N, C, H, W` shape the module was bound with.
    pub fn data_shape(&self) -> &Shape {
        &self.data_shape
    }
}

impl Forward for Module<Ready> {
    type Output = PendingOutput;

    fn forward(&mut self, batch: &DataBatch) -> Result<Vec<PendingOutput>, EngineError> {
        let program = self.program.clone().ok_or_else(|| EngineError::Bind {
            model: String::new(),
            detail: "module has no program".into(),
        })?;
        let input = batch.data.first().cloned().ok_or_else(|| EngineError::InputShape {
            expected: program.data_shape().clone(),
            actual: Shape::new(vec![]),
        })?;
        if input.shape() != program.data_shape() {
            return Err(EngineError::InputShape {
                expected: program.data_shape().clone(),
                actual: input.shape().clone(),
            });
        }

        let device = self.device();
        let (senders, pending): (Vec<_>, Vec<_>) = (0..program.num_outputs())
            .map(|_| {
                let (tx, rx) = oneshot::channel();
                (tx, PendingOutput::new(device, rx))
            })
            .unzip();
        self.worker.submit(Job {
            program,
            input,
            outputs: senders,
        })?;
        Ok(pending)
    }
}

// ── Pending output ─────────────────────────────────────────────

/// Handle to one output of a submitted forward pass.
#[derive(Debug)]
pub struct PendingOutput {
    device: Device,
    state: OutputState,
}

#[derive(Debug)]
enum OutputState {
    Pending(oneshot::Receiver<Result<Arc<Tensor>, EngineError>>),
    Ready(Arc<Tensor>),
    Failed(EngineError),
}

impl PendingOutput {
    fn new(device: Device, rx: oneshot::Receiver<Result<Arc<Tensor>, EngineError>>) -> Self {
        Self {
            device,
            state: OutputState::Pending(rx),
        }
    }

    /// Whether the result has already been received.
    pub fn is_ready(&self) -> bool {
        matches!(self.state, OutputState::Ready(_))
    }

    /// Waits for the result and returns it.
    pub fn read(&mut self) -> Result<Arc<Tensor>, EngineError> {
        self.wait_to_read()?;
        match &self.state {
            OutputState::Ready(t) => Ok(Arc::clone(t)),
            OutputState::Failed(e) => Err(e.clone()),
            OutputState::Pending(_) => Err(EngineError::WorkerGone(self.device)),
        }
    }
}

impl Synchronize for PendingOutput {
    /// Blocks the calling thread until the device has produced this output.
    ///
    /// Must not be called from within an async runtime worker thread.
    fn wait_to_read(&mut self) -> Result<(), EngineError> {
        let rx = match std::mem::replace(&mut self.state, OutputState::Failed(EngineError::WorkerGone(self.device))) {
            OutputState::Pending(rx) => rx,
            OutputState::Ready(t) => {
                self.state = OutputState::Ready(t);
                return Ok(());
            }
            OutputState::Failed(e) => {
                self.state = OutputState::Failed(e.clone());
                return Err(e);
            }
        };
        match rx.blocking_recv() {
            Ok(Ok(t)) => {
                self.state = OutputState::Ready(t);
                Ok(())
            }
            Ok(Err(e)) => {
                self.state = OutputState::Failed(e.clone());
                Err(e)
            }
            Err(_) => Err(EngineError::WorkerGone(self.device)),
        }
    }
}
