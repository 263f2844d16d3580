// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! The catalog of buildable network families.

use crate::graph::{ModelGraph, Validated};
use crate::networks::{alexnet, inception_bn, inception_v3, resnet, vgg};
use crate::{GraphBuilder, ModelError};
use std::fmt;
use std::str::FromStr;
use tensor_core::{DType, Shape};

/// A network family. Families marked depth-parameterized take their layer
/// count from a `-<depth>` suffix on the network name (`resnet-50`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
pub enum Architecture {
    #[serde(rename = "alexnet")]
    AlexNet,
    #[serde(rename = "vgg")]
    Vgg,
    #[serde(rename = "inception-bn")]
    InceptionBn,
    #[serde(rename = "inception-v3")]
    InceptionV3,
    #[serde(rename = "resnet")]
    ResNet,
}

impl Architecture {
    /// Every family in the catalog.
    pub const ALL: [Architecture; 5] = [
        Architecture::AlexNet,
        Architecture::Vgg,
        Architecture::InceptionBn,
        Architecture::InceptionV3,
        Architecture::ResNet,
    ];

    /// Looks up a family by its base name.
    pub fn lookup(family: &str) -> Result<Self, ModelError> {
        Self::ALL
            .into_iter()
            .find(|a| a.as_str() == family)
            .ok_or_else(|| ModelError::UnknownArchitecture {
                name: family.to_string(),
                known: Self::ALL.map(|a| a.as_str()).join(", "),
            })
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Architecture::AlexNet => "alexnet",
            Architecture::Vgg => "vgg",
            Architecture::InceptionBn => "inception-bn",
            Architecture::InceptionV3 => "inception-v3",
            Architecture::ResNet => "resnet",
        }
    }

    /// Whether the family selects its topology from a layer count.
    pub fn is_depth_parameterized(self) -> bool {
        matches!(self, Architecture::Vgg | Architecture::ResNet)
    }

    /// Builds and validates the network.
    ///
    /// `image_shape` is the per-sample input as `"C,H,W"`. `num_layers` is
    /// ignored by families that are not depth-parameterized.
    ///
    /// # Errors
    /// - [`ModelError::InvalidInputShape`] if `image_shape` is not three
    ///   positive integers.
    /// - [`ModelError::UnsupportedDepth`] for a depth the family does not define.
    /// - [`ModelError::InvalidLayer`] if the image is too small for the network.
    pub fn build(
        self,
        num_classes: usize,
        image_shape: &str,
        num_layers: usize,
        dtype: DType,
    ) -> Result<ModelGraph<Validated>, ModelError> {
        let shape = Shape::parse_csv(image_shape).map_err(|e| ModelError::InvalidInputShape {
            shape: image_shape.to_string(),
            detail: e.to_string(),
        })?;
        if shape.rank() != 3 {
            return Err(ModelError::InvalidInputShape {
                shape: image_shape.to_string(),
                detail: format!("expected C,H,W, got {} dimensions", shape.rank()),
            });
        }
        if num_classes == 0 {
            return Err(ModelError::InvalidGraph("num_classes must be positive".into()));
        }

        let name = if self.is_depth_parameterized() {
            format!("{}-{num_layers}", self.as_str())
        } else {
            self.as_str().to_string()
        };
        let mut b = GraphBuilder::new(name, shape, dtype);
        let logits = match self {
            Architecture::AlexNet => alexnet::body(&mut b, num_classes)?,
            Architecture::Vgg => vgg::body(&mut b, num_classes, num_layers)?,
            Architecture::InceptionBn => inception_bn::body(&mut b, num_classes)?,
            Architecture::InceptionV3 => inception_v3::body(&mut b, num_classes)?,
            Architecture::ResNet => resnet::body(&mut b, num_classes, num_layers)?,
        };
        let graph = b.finish(logits)?;
        tracing::debug!("{}", graph.summary());
        Ok(graph)
    }
}

impl fmt::Display for Architecture {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Architecture {
    type Err = ModelError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::lookup(s)
    }
}
