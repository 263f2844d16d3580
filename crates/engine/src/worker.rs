// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! The device queue.
//!
//! Each device owns one worker thread that drains a FIFO of submitted
//! passes. Submission never blocks; every output of a pass gets its own
//! completion channel, so callers can wait on outputs individually.

use crate::executor::Program;
use crate::{Device, EngineError};
use std::sync::Arc;
use std::thread::JoinHandle;
use tensor_core::Tensor;
use tokio::sync::{mpsc, oneshot};

pub(crate) type Completion = oneshot::Sender<Result<Arc<Tensor>, EngineError>>;

/// One forward pass waiting to run.
pub(crate) struct Job {
    pub program: Arc<Program>,
    pub input: Arc<Tensor>,
    pub outputs: Vec<Completion>,
}

/// Handle to a running device worker. Dropping it closes the queue and
/// joins the thread once in-flight jobs have drained.
#[derive(Debug)]
pub(crate) struct DeviceWorker {
    device: Device,
    queue: Option<mpsc::UnboundedSender<Job>>,
    thread: Option<JoinHandle<()>>,
}

impl DeviceWorker {
    pub(crate) fn spawn(device: Device) -> Result<Self, EngineError> {
        let (tx, mut rx) = mpsc::unbounded_channel::<Job>();
        let thread = std::thread::Builder::new()
            .name(format!("{device}-worker"))
            .spawn(move || {
                tracing::debug!("{device} worker started");
                let mut completed = 0u64;
                while let Some(job) = rx.blocking_recv() {
                    execute(job);
                    completed += 1;
                }
                tracing::debug!("{device} worker stopped after {completed} passes");
            })
            .map_err(|_| EngineError::WorkerGone(device))?;

        Ok(Self {
            device,
            queue: Some(tx),
            thread: Some(thread),
        })
    }

    pub(crate) fn device(&self) -> Device {
        self.device
    }

    /// Enqueues a pass and returns immediately.
    pub(crate) fn submit(&self, job: Job) -> Result<(), EngineError> {
        self.queue
            .as_ref()
            .ok_or(EngineError::WorkerGone(self.device))?
            .send(job)
            .map_err(|_| EngineError::WorkerGone(self.device))
    }
}

impl Drop for DeviceWorker {
    fn drop(&mut self) {
        self.queue.take();
        if let Some(thread) = self.thread.take() {
            if thread.join().is_err() {
                tracing::error!("{} worker panicked", self.device);
            }
        }
    }
}

fn execute(job: Job) {
    let Job {
        program,
        input,
        outputs,
    } = job;
    match program.run(&input) {
        Ok(tensors) => {
            for (tx, t) in outputs.into_iter().zip(tensors) {
                // The receiver may have been dropped without waiting.
                let _ = tx.send(Ok(Arc::new(t)));
            }
        }
        Err(e) => {
            tracing::error!("forward pass of '{}' failed: {e}", program.name());
            for tx in outputs {
                let _ = tx.send(Err(e.clone()));
            }
        }
    }
}
