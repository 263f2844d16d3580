// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! Workload resolution: network name and batch size to concrete shapes.
//!
//! Resolution is a pure function of its inputs. Depth-parameterized
//! families (`resnet`, `vgg`) encode their depth as a `-<n>` suffix; the
//! suffix becomes the layer count and the prefix the family. Every other
//! name is its own family with a layer count of zero.

use crate::ScoreError;
use model_zoo::Architecture;
use tensor_core::{DType, Shape};

/// The network whose canonical input is 299x299 instead of 224x224.
pub const HIGH_RESOLUTION_NETWORK: &str = "inception-v3";

/// One cell of a sweep: which network, how many images, which precision.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize)]
pub struct WorkloadSpec {
    pub architecture: String,
    pub batch_size: usize,
    pub dtype: DType,
}

/// Family name with any depth suffix stripped, plus the parsed depth.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize)]
pub struct ArchitectureDescriptor {
    pub family: String,
    pub layer_count: usize,
}

/// Everything needed to build and feed a network for one workload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedWorkload {
    pub descriptor: ArchitectureDescriptor,
    /// Per-sample `(C, H, W)`.
    pub image_shape: Shape,
    /// `(N, C, H, W)` of the single data input.
    pub data_shape: Shape,
    pub dtype: DType,
}

impl ResolvedWorkload {
    /// The image shape in the `"C,H,W"` form the model builders take.
    pub fn image_shape_csv(&self) -> String {
        self.image_shape.to_csv()
    }
}

/// Per-sample input shape for a network name.
pub fn image_shape(architecture: &str) -> Shape {
    if architecture == HIGH_RESOLUTION_NETWORK {
        Shape::chw(3, 299, 299)
    } else {
        Shape::chw(3, 224, 224)
    }
}

/// Splits a network name into family and layer count.
///
/// # Errors
/// [`ScoreError::Validation`] when a depth-parameterized family has a
/// missing, empty or non-numeric depth suffix.
pub fn describe(architecture: &str) -> Result<ArchitectureDescriptor, ScoreError> {
    let invalid = |detail: String| ScoreError::Validation {
        name: architecture.to_string(),
        detail,
    };

    let (prefix, suffix) = match architecture.split_once('-') {
        Some((prefix, suffix)) => (prefix, Some(suffix)),
        None => (architecture, None),
    };
    let depth_family = Architecture::lookup(prefix)
        .map(Architecture::is_depth_parameterized)
        .unwrap_or(false);

    if !depth_family {
        return Ok(ArchitectureDescriptor {
            family: architecture.to_string(),
            layer_count: 0,
        });
    }

    let suffix = suffix.ok_or_else(|| invalid(format!("'{prefix}' needs a depth suffix, e.g. '{prefix}-50'")))?;
    let layer_count = suffix
        .parse::<usize>()
        .map_err(|e| invalid(format!("depth suffix '{suffix}' is not an integer: {e}")))?;
    Ok(ArchitectureDescriptor {
        family: prefix.to_string(),
        layer_count,
    })
}

/// Resolves a network name, batch size and precision into shapes.
///
/// # Errors
/// [`ScoreError::Validation`] for an empty name, a zero batch size or a
/// malformed depth suffix.
pub fn resolve(architecture: &str, batch_size: usize, dtype: DType) -> Result<ResolvedWorkload, ScoreError> {
    if architecture.is_empty() {
        return Err(ScoreError::Validation {
            name: String::new(),
            detail: "network name is empty".into(),
        });
    }
    if batch_size == 0 {
        return Err(ScoreError::Validation {
            name: architecture.to_string(),
            detail: "batch size must be at least 1".into(),
        });
    }

    let descriptor = describe(architecture)?;
    let image_shape = image_shape(architecture);
    let data_shape = image_shape.with_batch(batch_size);
    Ok(ResolvedWorkload {
        descriptor,
        image_shape,
        data_shape,
        dtype,
    })
}

impl WorkloadSpec {
    pub fn resolve(&self) -> Result<ResolvedWorkload, ScoreError> {
        resolve(&self.architecture, self.batch_size, self.dtype)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_depth_suffix_parsed() {
        let r = resolve("resnet-50", 1, DType::Float32).unwrap();
        assert_eq!(r.descriptor.family, "resnet");
        assert_eq!(r.descriptor.layer_count, 50);

        let v = resolve("vgg-16", 8, DType::Float32).unwrap();
        assert_eq!(v.descriptor.family, "vgg");
        assert_eq!(v.descriptor.layer_count, 16);
        assert_eq!(v.data_shape, Shape::nchw(8, 3, 224, 224));
    }

    #[test]
    fn test_plain_names_unchanged() {
        for name in ["alexnet", "inception-bn", "inception-v3"] {
            let d = describe(name).unwrap();
            assert_eq!(d.family, name);
            assert_eq!(d.layer_count, 0);
        }
    }

    #[test]
    fn test_inception_v3_resolution() {
        for batch in [1, 2, 4, 8, 16, 32] {
            let r = resolve("inception-v3", batch, DType::Float16).unwrap();
            assert_eq!(r.image_shape, Shape::chw(3, 299, 299));
            assert_eq!(r.data_shape, Shape::nchw(batch, 3, 299, 299));
        }
        for name in ["alexnet", "vgg-16", "inception-bn", "resnet-152"] {
            assert_eq!(resolve(name, 4, DType::Float32).unwrap().image_shape, Shape::chw(3, 224, 224));
        }
    }

    #[test]
    fn test_non_numeric_suffix_fails() {
        for name in ["resnet-fifty", "vgg-", "resnet-50a", "resnet", "vgg--16"] {
            assert!(
                matches!(describe(name), Err(ScoreError::Validation { .. })),
                "{name} should be rejected"
            );
        }
    }

    #[test]
    fn test_zero_batch_rejected() {
        assert!(matches!(
            resolve("alexnet", 0, DType::Float32),
            Err(ScoreError::Validation { .. })
        ));
        assert!(resolve("", 1, DType::Float32).is_err());
    }

    #[test]
    fn test_idempotent() {
        let a = resolve("resnet-152", 16, DType::Float16).unwrap();
        let b = resolve("resnet-152", 16, DType::Float16).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn test_csv_for_builders() {
        let r = resolve("inception-v3", 1, DType::Float32).unwrap();
        assert_eq!(r.image_shape_csv(), "3,299,299");
    }
}
