// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! # engine
//!
//! Binds validated `model-zoo` graphs to a compute device and runs them.
//!
//! - [`Engine`] — a backend: device discovery, binding with parameter
//!   initialisation, and random input generation on a device.
//! - [`Forward`] / [`Synchronize`] — asynchronous submission and the
//!   blocking barrier that retires it.
//! - [`CpuEngine`] — the host backend. Forward passes are queued to a
//!   dedicated worker thread and complete through per-output channels.
//! - [`Xavier`] — the default weight [`Initializer`].
//!
//! # Type-State Pipeline
//! ```text
//! Module<Bound> → Module<Ready>
//! ```

mod backend;
mod cpu;
mod device;
mod error;
mod executor;
mod initializer;
pub mod module;
mod worker;

pub use backend::{DataBatch, Engine, Forward, Synchronize};
pub use cpu::CpuEngine;
pub use device::Device;
pub use error::EngineError;
pub use initializer::{FactorType, Initializer, Xavier};
pub use module::{Module, PendingOutput};
