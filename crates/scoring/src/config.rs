// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! Sweep configuration loaded from TOML files or constructed programmatically.
//!
//! # TOML Format
//! ```toml
//! networks = ["alexnet", "vgg-16", "resnet-50"]
//! batch_sizes = [1, 8, 32]
//! dtypes = ["float32", "float16"]
//! num_batches = 10
//! num_classes = 1000
//! fp16_unsupported = ["inception-bn", "alexnet"]
//! xavier_magnitude = 2.0
//! seed = 0
//! ```

use crate::resolver;
use crate::ScoreError;
use model_zoo::Architecture;
use std::path::Path;
use tensor_core::DType;

/// The lists a sweep iterates over and the per-cell scoring parameters.
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct SweepConfig {
    /// Network names, e.g. `"resnet-50"`.
    pub networks: Vec<String>,
    pub batch_sizes: Vec<usize>,
    pub dtypes: Vec<DType>,
    /// Measured forward passes per cell.
    pub num_batches: usize,
    pub num_classes: usize,
    /// Networks that are skipped for 16-bit precision.
    pub fp16_unsupported: Vec<String>,
    /// Magnitude of the Xavier weight initializer.
    pub xavier_magnitude: f32,
    /// Seed for parameters and input data.
    pub seed: u64,
}

impl SweepConfig {
    /// Loads configuration from a TOML file.
    pub fn from_file(path: &Path) -> Result<Self, ScoreError> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            ScoreError::Config(format!("cannot read config '{}': {e}", path.display()))
        })?;
        Self::from_toml(&content)
    }

    /// Parses configuration from a TOML string. Missing keys take their
    /// default values.
    pub fn from_toml(toml_str: &str) -> Result<Self, ScoreError> {
        toml::from_str(toml_str).map_err(|e| ScoreError::Config(format!("TOML parse error: {e}")))
    }

    /// Serialises configuration to TOML.
    pub fn to_toml(&self) -> Result<String, ScoreError> {
        toml::to_string_pretty(self)
            .map_err(|e| ScoreError::Config(format!("TOML serialise error: {e}")))
    }

    /// Checks that every list is non-empty and every network family exists.
    ///
    /// A malformed depth suffix only affects that network's cells, so it is
    /// logged here and left for the sweep to skip.
    pub fn validate(&self) -> Result<(), ScoreError> {
        if self.networks.is_empty() {
            return Err(ScoreError::Config("no networks to score".into()));
        }
        if self.batch_sizes.is_empty() || self.batch_sizes.contains(&0) {
            return Err(ScoreError::Config(
                "batch sizes must be a non-empty list of positive integers".into(),
            ));
        }
        if self.dtypes.is_empty() {
            return Err(ScoreError::Config("no dtypes to score".into()));
        }
        if self.num_batches == 0 {
            return Err(ScoreError::Config("num_batches must be at least 1".into()));
        }
        if self.num_classes == 0 {
            return Err(ScoreError::Config("num_classes must be at least 1".into()));
        }
        if !(self.xavier_magnitude > 0.0) {
            return Err(ScoreError::Config(format!(
                "xavier_magnitude must be positive, got {}",
                self.xavier_magnitude
            )));
        }
        for net in &self.networks {
            match resolver::describe(net) {
                Ok(descriptor) => {
                    Architecture::lookup(&descriptor.family)?;
                }
                Err(e) if e.is_cell_local() => {
                    tracing::warn!("{e}; its cells will be skipped");
                }
                Err(e) => return Err(e),
            }
        }
        Ok(())
    }
}

impl Default for SweepConfig {
    fn default() -> Self {
        Self {
            networks: ["alexnet", "vgg-16", "inception-bn", "inception-v3", "resnet-50", "resnet-152"]
                .map(String::from)
                .to_vec(),
            batch_sizes: vec![1, 2, 4, 8, 16, 32],
            dtypes: vec![DType::Float32, DType::Float16],
            num_batches: 10,
            num_classes: 1000,
            fp16_unsupported: vec!["inception-bn".into(), "alexnet".into()],
            xavier_magnitude: 2.0,
            seed: 0,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default() {
        let c = SweepConfig::default();
        assert_eq!(c.networks.len(), 6);
        assert_eq!(c.networks[3], "inception-v3");
        assert_eq!(c.batch_sizes, vec![1, 2, 4, 8, 16, 32]);
        assert_eq!(c.dtypes, vec![DType::Float32, DType::Float16]);
        assert_eq!(c.num_batches, 10);
        assert_eq!(c.num_classes, 1000);
        assert!(c.validate().is_ok());
    }

    #[test]
    fn test_from_toml_partial() {
        let toml = r#"
networks = ["resnet-18"]
batch_sizes = [4]
dtypes = ["float32"]
num_batches = 3
"#;
        let c = SweepConfig::from_toml(toml).unwrap();
        assert_eq!(c.networks, vec!["resnet-18"]);
        assert_eq!(c.batch_sizes, vec![4]);
        assert_eq!(c.dtypes, vec![DType::Float32]);
        assert_eq!(c.num_batches, 3);
        assert_eq!(c.num_classes, 1000);
        assert_eq!(c.fp16_unsupported, vec!["inception-bn", "alexnet"]);
    }

    #[test]
    fn test_from_toml_bad_dtype() {
        assert!(SweepConfig::from_toml("dtypes = [\"int8\"]").is_err());
    }

    #[test]
    fn test_to_toml_roundtrip() {
        let c = SweepConfig::default();
        let toml = c.to_toml().unwrap();
        let back = SweepConfig::from_toml(&toml).unwrap();
        assert_eq!(back, c);
    }

    #[test]
    fn test_validate_rejects_empty_and_zero() {
        let c = SweepConfig {
            batch_sizes: vec![1, 0],
            ..Default::default()
        };
        assert!(c.validate().is_err());

        let c = SweepConfig {
            networks: vec![],
            ..Default::default()
        };
        assert!(c.validate().is_err());

        let c = SweepConfig {
            num_batches: 0,
            ..Default::default()
        };
        assert!(c.validate().is_err());
    }

    #[test]
    fn test_validate_unknown_network() {
        let c = SweepConfig {
            networks: vec!["lenet".into()],
            ..Default::default()
        };
        assert!(matches!(c.validate(), Err(ScoreError::Model(_))));
    }

    #[test]
    fn test_validate_tolerates_bad_suffix() {
        let c = SweepConfig {
            networks: vec!["resnet-x".into(), "resnet-18".into()],
            ..Default::default()
        };
        assert!(c.validate().is_ok());
    }
}
