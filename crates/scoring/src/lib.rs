// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! # scoring
//!
//! Inference throughput measurement for the `model-zoo` networks.
//!
//! - [`resolver`] — network name and batch size to family, depth and
//!   input shape.
//! - [`timing`] — the warm-up-excluded, synchronized timing harness.
//! - [`sweep`] — the network × device × batch size × dtype driver.
//! - [`SweepConfig`] — the sweep lists, loadable from TOML.
//!
//! # Example
//! ```no_run
//! use engine::CpuEngine;
//! use scoring::{run_sweep, SweepConfig};
//!
//! let engine = CpuEngine::new(0)?;
//! let config = SweepConfig {
//!     networks: vec!["resnet-18".into()],
//!     batch_sizes: vec![1],
//!     ..Default::default()
//! };
//! let report = run_sweep(&engine, &config)?;
//! for record in &report.results {
//!     println!("{record}");
//! }
//! # Ok::<(), scoring::ScoreError>(())
//! ```

pub mod config;
mod error;
pub mod resolver;
pub mod result;
pub mod sweep;
pub mod timing;

pub use config::SweepConfig;
pub use error::ScoreError;
pub use resolver::{resolve, ArchitectureDescriptor, ResolvedWorkload, WorkloadSpec};
pub use result::{BenchmarkResult, SkipReason, SkippedCell, SweepReport};
pub use sweep::{run_sweep, sweep_devices};
pub use timing::{measure, score, TimingPlan, WARMUP_ITERATIONS};
