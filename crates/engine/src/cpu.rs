// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! Host execution backend.

use crate::module::{Module, Ready};
use crate::worker::DeviceWorker;
use crate::{Device, Engine, EngineError, Initializer};
use model_zoo::{ModelGraph, Validated};
use rand::rngs::StdRng;
use rand::SeedableRng;
use std::sync::{Arc, Mutex};
use tensor_core::{Shape, Tensor};

/// Runs models on the host CPU through a single device worker.
///
/// The CPU engine has no accelerators and only computes in 32-bit floats.
#[derive(Debug)]
pub struct CpuEngine {
    worker: Arc<DeviceWorker>,
    seed: u64,
    rng: Mutex<StdRng>,
}

impl CpuEngine {
    /// Starts the CPU worker. `seed` fixes parameter and input values.
    pub fn new(seed: u64) -> Result<Self, EngineError> {
        let worker = DeviceWorker::spawn(Device::Cpu)?;
        tracing::debug!("cpu engine started (seed {seed})");
        Ok(Self {
            worker: Arc::new(worker),
            seed,
            rng: Mutex::new(StdRng::seed_from_u64(seed)),
        })
    }

    fn check_device(&self, device: Device) -> Result<(), EngineError> {
        if device.is_cpu() {
            Ok(())
        } else {
            Err(EngineError::UnsupportedDevice {
                engine: self.name().to_string(),
                device,
            })
        }
    }
}

impl Engine for CpuEngine {
    type Model = Module<Ready>;

    fn name(&self) -> &str {
        "cpu"
    }

    fn accelerators(&self) -> Vec<Device> {
        Vec::new()
    }

    fn prepare(
        &self,
        graph: ModelGraph<Validated>,
        device: Device,
        data_shape: &Shape,
        initializer: &dyn Initializer,
    ) -> Result<Module<Ready>, EngineError> {
        self.check_device(device)?;
        Module::bind(Arc::clone(&self.worker), graph, data_shape)?.init_params(initializer, self.seed)
    }

    fn random_uniform(
        &self,
        shape: &Shape,
        low: f32,
        high: f32,
        device: Device,
    ) -> Result<Arc<Tensor>, EngineError> {
        self.check_device(device)?;
        let mut rng = self.rng.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
        Ok(Arc::new(Tensor::random_uniform(shape.clone(), low, high, &mut *rng)))
    }
}
