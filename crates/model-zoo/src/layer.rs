// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! Layer definitions for the CNN graph IR.
//!
//! Each [`LayerDef`] describes one node of the model graph: the operation it
//! performs, which earlier nodes feed it, the parameters it owns and the
//! per-sample shape it produces. Parameter *data* is not stored here; the
//! execution engine allocates and initialises it when the graph is bound to
//! a device.

use tensor_core::{DType, PoolKind, Shape, Window2d};

/// The computation a layer performs.
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Op {
    /// Graph input placeholder.
    Data,
    /// Precision change of the activation stream.
    Cast { dtype: DType },
    /// 2-D convolution.
    Convolution {
        num_filter: usize,
        window: Window2d,
        no_bias: bool,
    },
    /// Batch normalisation using running statistics.
    BatchNorm { eps: f32, fix_gamma: bool },
    /// Rectified linear unit.
    Relu,
    /// Windowed spatial pooling.
    Pooling { kind: PoolKind, window: Window2d },
    /// Pooling over the whole spatial extent.
    GlobalPooling { kind: PoolKind },
    /// Local response normalisation across channels.
    Lrn {
        size: usize,
        alpha: f32,
        beta: f32,
        knorm: f32,
    },
    /// Collapse all per-sample dimensions into one.
    Flatten,
    /// Dense layer; flattens its input implicitly.
    FullyConnected { num_hidden: usize },
    /// Dropout (identity when scoring).
    Dropout { p: f32 },
    /// Channel-axis concatenation of all inputs.
    Concat,
    /// Element-wise sum of all inputs.
    ElementwiseSum,
    /// Class-probability output.
    SoftmaxOutput,
}

impl Op {
    /// Returns a short label for display.
    pub fn as_str(&self) -> &'static str {
        match self {
            Op::Data => "data",
            Op::Cast { .. } => "cast",
            Op::Convolution { .. } => "convolution",
            Op::BatchNorm { .. } => "batch_norm",
            Op::Relu => "relu",
            Op::Pooling { .. } => "pooling",
            Op::GlobalPooling { .. } => "global_pooling",
            Op::Lrn { .. } => "lrn",
            Op::Flatten => "flatten",
            Op::FullyConnected { .. } => "fully_connected",
            Op::Dropout { .. } => "dropout",
            Op::Concat => "concat",
            Op::ElementwiseSum => "elemwise_sum",
            Op::SoftmaxOutput => "softmax_output",
        }
    }
}

impl std::fmt::Display for Op {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Role of a learnable or auxiliary parameter; decides how it is initialised.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ParamKind {
    Weight,
    Bias,
    Gamma,
    Beta,
    MovingMean,
    MovingVar,
}

impl ParamKind {
    /// Suffix appended to the layer name to form the parameter name.
    pub fn suffix(self) -> &'static str {
        match self {
            ParamKind::Weight => "weight",
            ParamKind::Bias => "bias",
            ParamKind::Gamma => "gamma",
            ParamKind::Beta => "beta",
            ParamKind::MovingMean => "moving_mean",
            ParamKind::MovingVar => "moving_var",
        }
    }

    /// Running statistics are auxiliary states rather than learned arguments.
    pub fn is_auxiliary(self) -> bool {
        matches!(self, ParamKind::MovingMean | ParamKind::MovingVar)
    }
}

/// A parameter tensor owned by a layer.
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct ParamDef {
    /// Full name, e.g. `"conv1_weight"`.
    pub name: String,
    pub kind: ParamKind,
    pub shape: Shape,
}

/// Metadata describing a single node of the model graph.
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct LayerDef {
    /// Unique identifier for this layer (e.g., `"stage1_unit1_conv1"`).
    pub name: String,
    /// The computation this layer performs.
    pub op: Op,
    /// Index in the execution order (0-based).
    pub index: usize,
    /// Indices of the layers whose outputs feed this one.
    pub inputs: Vec<usize>,
    /// Parameters owned by this layer.
    pub params: Vec<ParamDef>,
    /// Per-sample output shape (no batch dimension).
    pub output_shape: Shape,
}

impl LayerDef {
    /// Number of scalar parameters this layer owns.
    pub fn num_params(&self) -> usize {
        self.params.iter().map(|p| p.shape.num_elements()).sum()
    }

    /// Estimated parameter memory in bytes for the given precision.
    pub fn estimated_param_bytes(&self, dtype: DType) -> usize {
        self.params.iter().map(|p| p.shape.size_bytes(dtype)).sum()
    }

    /// Estimated per-sample output activation in bytes.
    pub fn estimated_activation_bytes(&self, dtype: DType) -> usize {
        self.output_shape.size_bytes(dtype)
    }

    /// Looks up the parameter of a given kind.
    pub fn param(&self, kind: ParamKind) -> Option<&ParamDef> {
        self.params.iter().find(|p| p.kind == kind)
    }

    /// Returns a concise summary string for display.
    pub fn summary(&self) -> String {
        format!(
            "[{}] {} ({}) <- {:?} -> {}, {} params",
            self.index,
            self.name,
            self.op,
            self.inputs,
            self.output_shape,
            self.num_params(),
        )
    }
}
