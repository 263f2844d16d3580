// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! The timing harness.
//!
//! One input batch is generated up front and resubmitted on every
//! iteration. A fixed number of warm-up passes runs first and is never
//! timed. The clock then starts, and every measured pass is followed by a
//! synchronization barrier on each of its outputs, so the elapsed time
//! covers completed device work rather than submission latency.

use crate::ScoreError;
use engine::{DataBatch, Device, Engine, Forward, Initializer, Synchronize};
use model_zoo::{ModelGraph, Validated};
use std::time::{Duration, Instant};
use tensor_core::Shape;

/// Warm-up passes run before the clock starts.
pub const WARMUP_ITERATIONS: usize = 5;

/// Lower and upper bound of the uniform random input.
pub const INPUT_RANGE: (f32, f32) = (-1.0, 1.0);

/// How many passes to run and how many of them to time.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimingPlan {
    pub warmup: usize,
    pub measured: usize,
}

impl TimingPlan {
    /// The standard plan: [`WARMUP_ITERATIONS`] warm-up passes.
    pub fn new(measured: usize) -> Self {
        Self {
            warmup: WARMUP_ITERATIONS,
            measured,
        }
    }

    pub fn total_passes(&self) -> usize {
        self.warmup + self.measured
    }
}

/// Runs `warmup` untimed passes, then times `measured` passes.
///
/// Each pass is synchronized on every output before the next one starts.
/// The returned duration covers only the measured passes and is always
/// strictly positive.
///
/// # Errors
/// [`ScoreError::Config`] if `measured` is zero; engine failures propagate
/// unchanged.
pub fn measure<M: Forward>(
    model: &mut M,
    batch: &DataBatch,
    warmup: usize,
    measured: usize,
) -> Result<Duration, ScoreError> {
    if measured == 0 {
        return Err(ScoreError::Config(
            "at least one measured iteration is required".into(),
        ));
    }

    let mut tic = Instant::now();
    for i in 0..warmup + measured {
        if i == warmup {
            tracing::trace!("warm-up done after {warmup} passes");
            tic = Instant::now();
        }
        let mut outputs = model.forward(batch)?;
        for output in &mut outputs {
            output.wait_to_read()?;
        }
    }
    let elapsed = tic.elapsed();

    Ok(elapsed.max(Duration::from_nanos(1)))
}

/// Binds `graph` on `device`, generates one random input batch there and
/// times it with `plan`.
///
/// Binding and parameter initialisation happen before the harness starts
/// and are not part of the returned duration.
pub fn score<E: Engine>(
    engine: &E,
    graph: ModelGraph<Validated>,
    device: Device,
    data_shape: &Shape,
    initializer: &dyn Initializer,
    plan: TimingPlan,
) -> Result<Duration, ScoreError> {
    let name = graph.name.clone();
    let mut model = engine.prepare(graph, device, data_shape, initializer)?;

    let (low, high) = INPUT_RANGE;
    let data = engine.random_uniform(data_shape, low, high, device)?;
    let batch = DataBatch::new(vec![data]);

    tracing::debug!(
        "timing '{name}' on {device}: {} passes ({} warm-up) of {} images",
        plan.total_passes(),
        plan.warmup,
        batch.batch_size()
    );
    measure(&mut model, &batch, plan.warmup, plan.measured)
}

/// Images per second for `measured` passes of `batch_size` images.
pub fn images_per_second(measured: usize, batch_size: usize, elapsed: Duration) -> f64 {
    (measured * batch_size) as f64 / elapsed.as_secs_f64()
}
