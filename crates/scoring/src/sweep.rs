// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! The sweep driver.
//!
//! Walks network → device → batch size → dtype, filters out combinations
//! that cannot run, and times every surviving cell with the harness in
//! [`crate::timing`]. Cells run strictly one after another; each cell's
//! bound model is dropped before the next one is prepared.

use crate::resolver::WorkloadSpec;
use crate::result::{BenchmarkResult, SkipReason, SkippedCell, SweepReport};
use crate::timing::{self, TimingPlan};
use crate::{ScoreError, SweepConfig};
use engine::{Device, Engine, Xavier};
use model_zoo::Architecture;
use tensor_core::DType;

/// Devices a sweep visits: the first accelerator, if any, then the host.
pub fn sweep_devices<E: Engine>(engine: &E) -> Vec<Device> {
    let mut devices: Vec<Device> = engine.accelerators().into_iter().take(1).collect();
    devices.push(Device::Cpu);
    devices
}

/// Runs the whole sweep described by `config` on `engine`.
///
/// Filtered combinations and cells whose workload fails validation are
/// recorded in [`SweepReport::skipped`]; any other error stops the sweep.
pub fn run_sweep<E: Engine>(engine: &E, config: &SweepConfig) -> Result<SweepReport, ScoreError> {
    let devices = sweep_devices(engine);
    let initializer = Xavier::new(config.xavier_magnitude);
    let plan = TimingPlan::new(config.num_batches);
    let mut report = SweepReport::default();

    tracing::debug!(
        "sweeping {} networks on {} devices with engine '{}'",
        config.networks.len(),
        devices.len(),
        engine.name()
    );

    for network in &config.networks {
        tracing::info!("network: {network}");
        for &device in &devices {
            tracing::info!("device: {device}");
            for &batch_size in &config.batch_sizes {
                for &dtype in &config.dtypes {
                    let workload = WorkloadSpec {
                        architecture: network.clone(),
                        batch_size,
                        dtype,
                    };
                    if let Some(reason) = skip_reason(config, &workload, device) {
                        report.skipped.push(SkippedCell {
                            workload,
                            device,
                            reason,
                        });
                        continue;
                    }

                    match run_cell(engine, config, &workload, device, &initializer, plan) {
                        Ok(result) => {
                            result.log();
                            report.results.push(result);
                        }
                        Err(e) if e.is_cell_local() => {
                            tracing::error!("skipping '{network}' batch {batch_size} {dtype} on {device}: {e}");
                            report.skipped.push(SkippedCell {
                                workload,
                                device,
                                reason: SkipReason::Invalid(e.to_string()),
                            });
                        }
                        Err(e) => return Err(e),
                    }
                }
            }
        }
    }

    tracing::debug!(
        "sweep finished: {} records, {} skipped cells",
        report.results.len(),
        report.skipped.len()
    );
    Ok(report)
}

/// The hard filters. Host 16-bit cells are dropped silently; networks
/// without 16-bit support are announced.
fn skip_reason(config: &SweepConfig, workload: &WorkloadSpec, device: Device) -> Option<SkipReason> {
    if workload.dtype != DType::Float16 {
        return None;
    }
    if device.is_cpu() {
        return Some(SkipReason::CpuFloat16);
    }
    if config.fp16_unsupported.iter().any(|n| *n == workload.architecture) {
        tracing::info!("{} does not support float16", workload.architecture);
        return Some(SkipReason::Float16Unsupported);
    }
    None
}

/// Resolves, builds and times one cell.
pub fn run_cell<E: Engine>(
    engine: &E,
    config: &SweepConfig,
    workload: &WorkloadSpec,
    device: Device,
    initializer: &Xavier,
    plan: TimingPlan,
) -> Result<BenchmarkResult, ScoreError> {
    let resolved = workload.resolve()?;
    let arch = Architecture::lookup(&resolved.descriptor.family)?;
    let graph = arch.build(
        config.num_classes,
        &resolved.image_shape_csv(),
        resolved.descriptor.layer_count,
        resolved.dtype,
    )?;
    tracing::debug!("built {}", graph.summary());

    let elapsed = timing::score(engine, graph, device, &resolved.data_shape, initializer, plan)?;
    Ok(BenchmarkResult {
        workload: workload.clone(),
        device,
        images_per_second: timing::images_per_second(plan.measured, workload.batch_size, elapsed),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use engine::{DataBatch, EngineError, Forward, Initializer, Synchronize};
    use model_zoo::{ModelGraph, Validated};
    use std::sync::{Arc, Mutex};
    use tensor_core::{Shape, Tensor};

    #[derive(Debug, Clone, PartialEq)]
    struct Prepared {
        model: String,
        device: Device,
        dtype: DType,
        data_shape: Shape,
    }

    struct Done;

    impl Synchronize for Done {
        fn wait_to_read(&mut self) -> Result<(), EngineError> {
            Ok(())
        }
    }

    struct NullModel;

    impl Forward for NullModel {
        type Output = Done;

        fn forward(&mut self, _batch: &DataBatch) -> Result<Vec<Done>, EngineError> {
            Ok(vec![Done])
        }
    }

    /// Records every `prepare` call and never computes anything.
    #[derive(Default)]
    struct RecordingEngine {
        accelerators: Vec<Device>,
        prepared: Mutex<Vec<Prepared>>,
        fail_on: Option<String>,
    }

    impl RecordingEngine {
        fn prepared(&self) -> Vec<Prepared> {
            self.prepared.lock().unwrap().clone()
        }
    }

    impl Engine for RecordingEngine {
        type Model = NullModel;

        fn name(&self) -> &str {
            "recording"
        }

        fn accelerators(&self) -> Vec<Device> {
            self.accelerators.clone()
        }

        fn prepare(
            &self,
            graph: ModelGraph<Validated>,
            device: Device,
            data_shape: &Shape,
            _initializer: &dyn Initializer,
        ) -> Result<NullModel, EngineError> {
            if self.fail_on.as_deref() == Some(graph.name.as_str()) {
                return Err(EngineError::Bind {
                    model: graph.name.clone(),
                    detail: "out of memory".into(),
                });
            }
            self.prepared.lock().unwrap().push(Prepared {
                model: graph.name.clone(),
                device,
                dtype: graph.dtype,
                data_shape: data_shape.clone(),
            });
            Ok(NullModel)
        }

        fn random_uniform(
            &self,
            _shape: &Shape,
            _low: f32,
            _high: f32,
            _device: Device,
        ) -> Result<Arc<Tensor>, EngineError> {
            Ok(Arc::new(Tensor::zeros(Shape::vector(1))))
        }
    }

    fn config(networks: &[&str], batch_sizes: &[usize]) -> SweepConfig {
        SweepConfig {
            networks: networks.iter().map(|s| s.to_string()).collect(),
            batch_sizes: batch_sizes.to_vec(),
            num_batches: 1,
            ..Default::default()
        }
    }

    #[test]
    fn test_devices_cpu_only() {
        assert_eq!(sweep_devices(&RecordingEngine::default()), vec![Device::Cpu]);
    }

    #[test]
    fn test_devices_first_accelerator_then_cpu() {
        let engine = RecordingEngine {
            accelerators: vec![Device::Gpu(0), Device::Gpu(1)],
            ..Default::default()
        };
        assert_eq!(sweep_devices(&engine), vec![Device::Gpu(0), Device::Cpu]);
    }

    #[test]
    fn test_cpu_float16_never_prepared() {
        let engine = RecordingEngine::default();
        let report = run_sweep(&engine, &config(&["resnet-18"], &[1, 2])).unwrap();

        let prepared = engine.prepared();
        assert_eq!(prepared.len(), 2);
        assert!(prepared.iter().all(|p| p.dtype == DType::Float32));
        assert_eq!(report.results.len(), 2);
        assert_eq!(report.skipped.len(), 2);
        assert!(report
            .skipped
            .iter()
            .all(|s| s.reason == SkipReason::CpuFloat16));
    }

    #[test]
    fn test_sweep_order() {
        let engine = RecordingEngine {
            accelerators: vec![Device::Gpu(0)],
            ..Default::default()
        };
        run_sweep(&engine, &config(&["resnet-18", "inception-v3"], &[1, 4])).unwrap();

        let order: Vec<_> = engine
            .prepared()
            .into_iter()
            .map(|p| (p.model, p.device, p.data_shape.dim(0).unwrap_or(0), p.dtype))
            .collect();
        let expected = vec![
            ("resnet-18".to_string(), Device::Gpu(0), 1, DType::Float32),
            ("resnet-18".to_string(), Device::Gpu(0), 1, DType::Float16),
            ("resnet-18".to_string(), Device::Gpu(0), 4, DType::Float32),
            ("resnet-18".to_string(), Device::Gpu(0), 4, DType::Float16),
            ("resnet-18".to_string(), Device::Cpu, 1, DType::Float32),
            ("resnet-18".to_string(), Device::Cpu, 4, DType::Float32),
            ("inception-v3".to_string(), Device::Gpu(0), 1, DType::Float32),
            ("inception-v3".to_string(), Device::Gpu(0), 1, DType::Float16),
            ("inception-v3".to_string(), Device::Gpu(0), 4, DType::Float32),
            ("inception-v3".to_string(), Device::Gpu(0), 4, DType::Float16),
            ("inception-v3".to_string(), Device::Cpu, 1, DType::Float32),
            ("inception-v3".to_string(), Device::Cpu, 4, DType::Float32),
        ];
        assert_eq!(order, expected);

        let v3 = engine
            .prepared()
            .into_iter()
            .find(|p| p.model == "inception-v3")
            .map(|p| p.data_shape);
        assert_eq!(v3, Some(Shape::nchw(1, 3, 299, 299)));
    }

    #[test]
    fn test_float16_unsupported_skipped_on_accelerator() {
        let engine = RecordingEngine {
            accelerators: vec![Device::Gpu(0)],
            ..Default::default()
        };
        let report = run_sweep(&engine, &config(&["alexnet"], &[2])).unwrap();

        let prepared = engine.prepared();
        assert_eq!(prepared.len(), 2);
        assert!(prepared.iter().all(|p| p.dtype == DType::Float32));
        assert!(report.skipped.iter().any(|s| s.device == Device::Gpu(0)
            && s.reason == SkipReason::Float16Unsupported));
    }

    #[test]
    fn test_invalid_suffix_skips_only_its_cells() {
        let engine = RecordingEngine::default();
        let cfg = SweepConfig {
            dtypes: vec![DType::Float32],
            ..config(&["resnet-x", "resnet-18"], &[1])
        };
        assert!(cfg.validate().is_ok());
        let report = run_sweep(&engine, &cfg).unwrap();

        assert_eq!(report.results.len(), 1);
        assert_eq!(report.results[0].workload.architecture, "resnet-18");
        assert_eq!(report.skipped.len(), 1);
        assert!(matches!(report.skipped[0].reason, SkipReason::Invalid(_)));
    }

    #[test]
    fn test_engine_error_stops_sweep() {
        let engine = RecordingEngine {
            fail_on: Some("resnet-18".into()),
            ..Default::default()
        };
        let cfg = config(&["resnet-18", "resnet-34"], &[1]);
        assert!(matches!(run_sweep(&engine, &cfg), Err(ScoreError::Engine(_))));
        assert!(engine.prepared().is_empty());
    }

    #[test]
    fn test_results_positive() {
        let engine = RecordingEngine::default();
        let report = run_sweep(&engine, &config(&["vgg-11"], &[1, 2])).unwrap();
        assert!(report.results.iter().all(|r| r.images_per_second > 0.0));
        assert!(report.results.iter().all(|r| r.device == Device::Cpu));
    }
}
