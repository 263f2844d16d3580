// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! Model graph: a CNN as a DAG of layers in execution order.
//!
//! # Type-State Pattern
//!
//! ```text
//! ModelGraph<Loaded>     — layers assembled, not yet checked.
//!       │  .validate()
//!       ▼
//! ModelGraph<Validated>  — topology and shapes verified, ready to bind.
//! ```
//!
//! The execution engine only accepts `ModelGraph<Validated>`, so a graph that
//! skipped validation cannot reach a device.

use crate::{LayerDef, ModelError, Op};
use std::fmt;
use tensor_core::{DType, Shape};

// ── Type-state markers ─────────────────────────────────────────────

/// Marker: graph has been assembled but not validated.
#[derive(Debug, Clone)]
pub struct Loaded;

/// Marker: graph has been validated and can be bound to a device.
#[derive(Debug, Clone)]
pub struct Validated;

/// Sealed trait for graph states.
pub trait GraphState: fmt::Debug + Clone {}
impl GraphState for Loaded {}
impl GraphState for Validated {}

// ── ModelGraph ─────────────────────────────────────────────────────

/// The complete model represented as a topologically ordered list of layers.
///
/// Every layer's inputs refer to strictly earlier layers, so evaluating
/// layers in index order is a valid schedule.
#[derive(Debug, Clone)]
pub struct ModelGraph<S: GraphState = Loaded> {
    /// Human-readable model name (e.g., `"resnet-50"`).
    pub name: String,
    /// Precision the graph computes in.
    pub dtype: DType,
    /// Per-sample input shape `(C, H, W)`.
    pub input_shape: Shape,
    /// Layers in execution order.
    pub layers: Vec<LayerDef>,
    /// Indices of the layers whose results are graph outputs.
    pub outputs: Vec<usize>,
    _state: std::marker::PhantomData<S>,
}

// ── Loaded state ───────────────────────────────────────────────────

impl ModelGraph<Loaded> {
    /// Creates a new graph in the `Loaded` state.
    pub fn new(
        name: String,
        dtype: DType,
        input_shape: Shape,
        layers: Vec<LayerDef>,
        outputs: Vec<usize>,
    ) -> Self {
        Self {
            name,
            dtype,
            input_shape,
            layers,
            outputs,
            _state: std::marker::PhantomData,
        }
    }

    /// Validates the graph and transitions to the `Validated` state.
    ///
    /// # Checks
    /// - The graph is non-empty and layer 0 is the only `Data` layer.
    /// - Layer indices are consecutive starting from 0.
    /// - Every input reference points to an earlier layer.
    /// - Every output shape is well formed.
    /// - At least one output is declared and all outputs exist.
    pub fn validate(self) -> Result<ModelGraph<Validated>, ModelError> {
        if self.layers.is_empty() {
            return Err(ModelError::InvalidGraph("model graph contains no layers".into()));
        }
        if !self.input_shape.is_well_formed() {
            return Err(ModelError::InvalidGraph(format!(
                "input shape {} is not well formed",
                self.input_shape
            )));
        }

        for (i, layer) in self.layers.iter().enumerate() {
            if layer.index != i {
                return Err(ModelError::InvalidLayer {
                    layer: layer.name.clone(),
                    detail: format!("expected index {i}, got {}", layer.index),
                });
            }

            let is_data = layer.op == Op::Data;
            if is_data != (i == 0) {
                return Err(ModelError::InvalidLayer {
                    layer: layer.name.clone(),
                    detail: "the data placeholder must be exactly layer 0".into(),
                });
            }
            if !is_data && layer.inputs.is_empty() {
                return Err(ModelError::InvalidLayer {
                    layer: layer.name.clone(),
                    detail: "layer has no inputs".into(),
                });
            }
            if let Some(&bad) = layer.inputs.iter().find(|&&src| src >= i) {
                return Err(ModelError::InvalidLayer {
                    layer: layer.name.clone(),
                    detail: format!("input {bad} does not precede layer {i}"),
                });
            }
            if !layer.output_shape.is_well_formed() {
                return Err(ModelError::InvalidLayer {
                    layer: layer.name.clone(),
                    detail: format!("output shape {} has zero elements", layer.output_shape),
                });
            }
        }

        if self.outputs.is_empty() {
            return Err(ModelError::InvalidGraph("graph declares no outputs".into()));
        }
        if let Some(&bad) = self.outputs.iter().find(|&&o| o >= self.layers.len()) {
            return Err(ModelError::InvalidGraph(format!(
                "output {bad} is out of range for {} layers",
                self.layers.len()
            )));
        }

        let unused = self.count_unused_layers();
        if unused > 0 {
            tracing::warn!("graph '{}' has {unused} layer(s) that feed nothing", self.name);
        }

        Ok(ModelGraph {
            name: self.name,
            dtype: self.dtype,
            input_shape: self.input_shape,
            layers: self.layers,
            outputs: self.outputs,
            _state: std::marker::PhantomData,
        })
    }

    fn count_unused_layers(&self) -> usize {
        let mut used = vec![false; self.layers.len()];
        for layer in &self.layers {
            for &src in &layer.inputs {
                if let Some(u) = used.get_mut(src) {
                    *u = true;
                }
            }
        }
        for &o in &self.outputs {
            if let Some(u) = used.get_mut(o) {
                *u = true;
            }
        }
        used.iter().filter(|&&u| !u).count()
    }
}

// ── Validated state ────────────────────────────────────────────────

impl ModelGraph<Validated> {
    /// Returns the total number of layers, including the data placeholder.
    pub fn num_layers(&self) -> usize {
        self.layers.len()
    }

    /// Returns the total number of scalar parameters.
    pub fn num_params(&self) -> usize {
        self.layers.iter().map(|l| l.num_params()).sum()
    }

    /// Returns the total estimated parameter memory in bytes.
    pub fn total_param_bytes(&self) -> usize {
        self.layers
            .iter()
            .map(|l| l.estimated_param_bytes(self.dtype))
            .sum()
    }

    /// Returns the number of layers performing a given kind of operation.
    pub fn count_ops(&self, predicate: impl Fn(&Op) -> bool) -> usize {
        self.layers.iter().filter(|l| predicate(&l.op)).count()
    }

    /// Returns the per-sample shape of each graph output.
    pub fn output_shapes(&self) -> Vec<&Shape> {
        self.outputs
            .iter()
            .map(|&o| &self.layers[o].output_shape)
            .collect()
    }

    /// For every layer, the index of the last layer that reads its output.
    ///
    /// Graph outputs are pinned to `num_layers()` so they are never released
    /// early. Layers that feed nothing map to their own index.
    pub fn last_consumers(&self) -> Vec<usize> {
        let mut last: Vec<usize> = (0..self.layers.len()).collect();
        for layer in &self.layers {
            for &src in &layer.inputs {
                last[src] = last[src].max(layer.index);
            }
        }
        for &o in &self.outputs {
            last[o] = self.layers.len();
        }
        last
    }

    /// Returns an iterator over the layers in execution order.
    pub fn iter_layers(&self) -> impl DoubleEndedIterator<Item = &LayerDef> + ExactSizeIterator {
        self.layers.iter()
    }

    /// Returns a reference to a layer by index.
    pub fn layer(&self, index: usize) -> Option<&LayerDef> {
        self.layers.get(index)
    }

    /// Returns a summary string describing the model.
    pub fn summary(&self) -> String {
        let param_mb = self.total_param_bytes() as f64 / (1024.0 * 1024.0);
        format!(
            "Model '{}' ({}): {} layers, input {}, {:.2}M params ({:.1} MB)",
            self.name,
            self.dtype,
            self.num_layers(),
            self.input_shape,
            self.num_params() as f64 / 1e6,
            param_mb,
        )
    }
}

// ── Shared implementations ─────────────────────────────────────────

impl<S: GraphState> fmt::Display for ModelGraph<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "ModelGraph '{}' ({} layers):", self.name, self.layers.len())?;
        for layer in &self.layers {
            writeln!(f, "  {}", layer.summary())?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{ParamDef, ParamKind};

    /// Helper: data -> fc(hidden) -> ... chain of `n` dense layers.
    fn make_layers(n: usize, hidden: usize) -> Vec<LayerDef> {
        let mut layers = vec![LayerDef {
            name: "data".into(),
            op: Op::Data,
            index: 0,
            inputs: vec![],
            params: vec![],
            output_shape: Shape::vector(hidden),
        }];
        for i in 1..=n {
            layers.push(LayerDef {
                name: format!("fc{i}"),
                op: Op::FullyConnected { num_hidden: hidden },
                index: i,
                inputs: vec![i - 1],
                params: vec![ParamDef {
                    name: format!("fc{i}_weight"),
                    kind: ParamKind::Weight,
                    shape: Shape::matrix(hidden, hidden),
                }],
                output_shape: Shape::vector(hidden),
            });
        }
        layers
    }

    fn graph(layers: Vec<LayerDef>) -> ModelGraph<Loaded> {
        let last = layers.len() - 1;
        ModelGraph::new("test".into(), DType::Float32, Shape::vector(8), layers, vec![last])
    }

    #[test]
    fn test_validate_ok() {
        let validated = graph(make_layers(3, 8)).validate().unwrap();
        assert_eq!(validated.num_layers(), 4);
        assert_eq!(validated.num_params(), 3 * 64);
    }

    #[test]
    fn test_validate_empty() {
        let g = ModelGraph::new("empty".into(), DType::Float32, Shape::vector(1), vec![], vec![]);
        assert!(g.validate().is_err());
    }

    #[test]
    fn test_validate_bad_index() {
        let mut layers = make_layers(3, 8);
        layers[1].index = 5;
        assert!(graph(layers).validate().is_err());
    }

    #[test]
    fn test_validate_forward_reference() {
        let mut layers = make_layers(3, 8);
        layers[1].inputs = vec![2];
        assert!(matches!(
            graph(layers).validate(),
            Err(ModelError::InvalidLayer { .. })
        ));
    }

    #[test]
    fn test_validate_zero_shape() {
        let mut layers = make_layers(2, 8);
        layers[1].output_shape = Shape::new(vec![0]);
        assert!(graph(layers).validate().is_err());
    }

    #[test]
    fn test_validate_missing_data_layer() {
        let mut layers = make_layers(2, 8);
        layers[0].op = Op::Relu;
        assert!(graph(layers).validate().is_err());
    }

    #[test]
    fn test_validate_output_out_of_range() {
        let layers = make_layers(2, 8);
        let g = ModelGraph::new("t".into(), DType::Float32, Shape::vector(8), layers, vec![9]);
        assert!(g.validate().is_err());
    }

    #[test]
    fn test_last_consumers() {
        let validated = graph(make_layers(3, 8)).validate().unwrap();
        // data -> fc1 -> fc2 -> fc3 (output)
        assert_eq!(validated.last_consumers(), vec![1, 2, 3, 4]);
    }

    #[test]
    fn test_total_param_bytes() {
        let validated = graph(make_layers(2, 8)).validate().unwrap();
        assert_eq!(validated.total_param_bytes(), 2 * 64 * 4);
    }

    #[test]
    fn test_summary_and_display() {
        let validated = graph(make_layers(2, 8)).validate().unwrap();
        let s = validated.summary();
        assert!(s.contains("test"));
        assert!(s.contains("3 layers"));
        let d = format!("{validated}");
        assert!(d.contains("fc1"));
        assert!(d.contains("fc2"));
    }
}
