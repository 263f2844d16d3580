// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! Per-cell benchmark records.

use crate::resolver::WorkloadSpec;
use engine::Device;
use std::fmt;

/// Throughput of one (workload, device) cell.
#[derive(Debug, Clone, PartialEq, serde::Serialize)]
pub struct BenchmarkResult {
    pub workload: WorkloadSpec,
    pub device: Device,
    /// Always strictly positive.
    pub images_per_second: f64,
}

impl BenchmarkResult {
    /// Emits the record at info level with structured fields.
    pub fn log(&self) {
        tracing::info!(
            network = %self.workload.architecture,
            device = %self.device,
            batch_size = self.workload.batch_size,
            dtype = %self.workload.dtype,
            images_per_sec = self.images_per_second,
            "{self}"
        );
    }
}

impl fmt::Display for BenchmarkResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "batch size {:2}, dtype {} image/sec: {:.6}",
            self.workload.batch_size, self.workload.dtype, self.images_per_second
        )
    }
}

/// Why a sweep cell produced no record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SkipReason {
    /// 16-bit precision on the host device.
    CpuFloat16,
    /// The network is listed as lacking 16-bit support.
    Float16Unsupported,
    /// The workload failed validation; carries the error text.
    Invalid(String),
}

/// A cell that was filtered out or failed validation.
#[derive(Debug, Clone, PartialEq)]
pub struct SkippedCell {
    pub workload: WorkloadSpec,
    pub device: Device,
    pub reason: SkipReason,
}

/// Everything a sweep produced, in execution order.
#[derive(Debug, Clone, Default)]
pub struct SweepReport {
    pub results: Vec<BenchmarkResult>,
    pub skipped: Vec<SkippedCell>,
}

impl SweepReport {
    /// Records for one network, in sweep order.
    pub fn for_network<'a>(&'a self, network: &'a str) -> impl Iterator<Item = &'a BenchmarkResult> + 'a {
        self.results
            .iter()
            .filter(move |r| r.workload.architecture == network)
    }

    /// The highest throughput observed, if any cell ran.
    pub fn fastest(&self) -> Option<&BenchmarkResult> {
        self.results
            .iter()
            .max_by(|a, b| a.images_per_second.total_cmp(&b.images_per_second))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tensor_core::DType;

    fn result(batch_size: usize, dtype: DType, ips: f64) -> BenchmarkResult {
        BenchmarkResult {
            workload: WorkloadSpec {
                architecture: "vgg-16".into(),
                batch_size,
                dtype,
            },
            device: Device::Cpu,
            images_per_second: ips,
        }
    }

    #[test]
    fn test_record_format() {
        assert_eq!(
            result(8, DType::Float32, 12.5).to_string(),
            "batch size  8, dtype float32 image/sec: 12.500000"
        );
        assert_eq!(
            result(32, DType::Float16, 1234.0).to_string(),
            "batch size 32, dtype float16 image/sec: 1234.000000"
        );
    }

    #[test]
    fn test_fastest() {
        let report = SweepReport {
            results: vec![
                result(1, DType::Float32, 3.0),
                result(2, DType::Float32, 9.0),
                result(4, DType::Float32, 5.0),
            ],
            skipped: Vec::new(),
        };
        assert_eq!(report.fastest().map(|r| r.workload.batch_size), Some(2));
        assert_eq!(report.for_network("vgg-16").count(), 3);
        assert_eq!(report.for_network("alexnet").count(), 0);
        assert!(SweepReport::default().fastest().is_none());
    }
}
