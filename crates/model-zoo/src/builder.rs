// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! Incremental graph construction with per-sample shape inference.
//!
//! Network definitions call one method per layer; every call checks that
//! the layer fits the shape of its inputs and records the resulting shape,
//! so a malformed topology is rejected while the graph is being built rather
//! than when it first runs on a device.
//!
//! For 16-bit graphs the builder inserts a cast to `float16` right after the
//! data placeholder and a cast back to `float32` in front of the softmax, so
//! the class probabilities are always produced in full precision.

use crate::graph::{ModelGraph, Validated};
use crate::{LayerDef, ModelError, Op, ParamDef, ParamKind};
use tensor_core::{DType, PoolKind, Shape, Window2d};

/// Handle to a node already added to a [`GraphBuilder`].
pub type NodeId = usize;

/// Builds a [`ModelGraph`] one layer at a time.
#[derive(Debug)]
pub struct GraphBuilder {
    name: String,
    dtype: DType,
    input_shape: Shape,
    layers: Vec<LayerDef>,
    input: NodeId,
}

impl GraphBuilder {
    /// Starts a graph whose data placeholder has the per-sample `image_shape`.
    pub fn new(name: impl Into<String>, image_shape: Shape, dtype: DType) -> Self {
        let mut builder = Self {
            name: name.into(),
            dtype,
            input_shape: image_shape.clone(),
            layers: Vec::new(),
            input: 0,
        };
        builder.push("data", Op::Data, vec![], vec![], image_shape);
        if dtype == DType::Float16 {
            let shape = builder.shape_of(0).clone();
            builder.input = builder.push(
                "data_cast",
                Op::Cast { dtype: DType::Float16 },
                vec![0],
                vec![],
                shape,
            );
        }
        builder
    }

    /// The node network definitions should consume as their input.
    pub fn input(&self) -> NodeId {
        self.input
    }

    /// Per-sample shape produced by `node`.
    pub fn shape_of(&self, node: NodeId) -> &Shape {
        &self.layers[node].output_shape
    }

    /// Precision the graph computes in.
    pub fn dtype(&self) -> DType {
        self.dtype
    }

    /// Adds a 2-D convolution.
    pub fn conv(
        &mut self,
        name: &str,
        src: NodeId,
        num_filter: usize,
        window: Window2d,
        no_bias: bool,
    ) -> Result<NodeId, ModelError> {
        let (c, h, w) = self.chw(name, src)?;
        let (oh, ow) = window
            .output_size(h, w, "convolution")
            .map_err(|e| invalid(name, e.to_string()))?;
        let (kh, kw) = window.kernel;

        let mut params = vec![param(name, ParamKind::Weight, Shape::nchw(num_filter, c, kh, kw))];
        if !no_bias {
            params.push(param(name, ParamKind::Bias, Shape::vector(num_filter)));
        }
        Ok(self.push(
            name,
            Op::Convolution {
                num_filter,
                window,
                no_bias,
            },
            vec![src],
            params,
            Shape::chw(num_filter, oh, ow),
        ))
    }

    /// Adds batch normalisation over the channel axis.
    pub fn batch_norm(
        &mut self,
        name: &str,
        src: NodeId,
        eps: f32,
        fix_gamma: bool,
    ) -> Result<NodeId, ModelError> {
        let shape = self.checked(src)?.clone();
        let channels = shape
            .dim(0)
            .ok_or_else(|| invalid(name, "batch norm needs a channel axis"))?;
        let params = [
            ParamKind::Gamma,
            ParamKind::Beta,
            ParamKind::MovingMean,
            ParamKind::MovingVar,
        ]
        .into_iter()
        .map(|kind| param(name, kind, Shape::vector(channels)))
        .collect();
        Ok(self.push(name, Op::BatchNorm { eps, fix_gamma }, vec![src], params, shape))
    }

    /// Adds a ReLU activation.
    pub fn relu(&mut self, name: &str, src: NodeId) -> Result<NodeId, ModelError> {
        let shape = self.checked(src)?.clone();
        Ok(self.push(name, Op::Relu, vec![src], vec![], shape))
    }

    /// Adds windowed pooling.
    pub fn pool(
        &mut self,
        name: &str,
        src: NodeId,
        kind: PoolKind,
        window: Window2d,
    ) -> Result<NodeId, ModelError> {
        let (c, h, w) = self.chw(name, src)?;
        let (oh, ow) = window
            .output_size(h, w, "pooling")
            .map_err(|e| invalid(name, e.to_string()))?;
        Ok(self.push(
            name,
            Op::Pooling { kind, window },
            vec![src],
            vec![],
            Shape::chw(c, oh, ow),
        ))
    }

    /// Adds pooling over the whole spatial extent.
    pub fn global_pool(
        &mut self,
        name: &str,
        src: NodeId,
        kind: PoolKind,
    ) -> Result<NodeId, ModelError> {
        let (c, _, _) = self.chw(name, src)?;
        Ok(self.push(
            name,
            Op::GlobalPooling { kind },
            vec![src],
            vec![],
            Shape::chw(c, 1, 1),
        ))
    }

    /// Adds cross-channel local response normalisation.
    pub fn lrn(
        &mut self,
        name: &str,
        src: NodeId,
        size: usize,
        alpha: f32,
        beta: f32,
        knorm: f32,
    ) -> Result<NodeId, ModelError> {
        self.chw(name, src)?;
        if size == 0 || size % 2 == 0 {
            return Err(invalid(name, format!("lrn window must be odd, got {size}")));
        }
        let shape = self.shape_of(src).clone();
        Ok(self.push(
            name,
            Op::Lrn {
                size,
                alpha,
                beta,
                knorm,
            },
            vec![src],
            vec![],
            shape,
        ))
    }

    /// Collapses the per-sample shape into a vector.
    pub fn flatten(&mut self, name: &str, src: NodeId) -> Result<NodeId, ModelError> {
        let n = self.checked(src)?.num_elements();
        Ok(self.push(name, Op::Flatten, vec![src], vec![], Shape::vector(n)))
    }

    /// Adds a dense layer; the input is flattened implicitly.
    pub fn fully_connected(
        &mut self,
        name: &str,
        src: NodeId,
        num_hidden: usize,
    ) -> Result<NodeId, ModelError> {
        let fan_in = self.checked(src)?.num_elements();
        if num_hidden == 0 {
            return Err(invalid(name, "num_hidden must be positive"));
        }
        let params = vec![
            param(name, ParamKind::Weight, Shape::matrix(num_hidden, fan_in)),
            param(name, ParamKind::Bias, Shape::vector(num_hidden)),
        ];
        Ok(self.push(
            name,
            Op::FullyConnected { num_hidden },
            vec![src],
            params,
            Shape::vector(num_hidden),
        ))
    }

    /// Adds dropout; a no-op at inference time but kept for topology fidelity.
    pub fn dropout(&mut self, name: &str, src: NodeId, p: f32) -> Result<NodeId, ModelError> {
        let shape = self.checked(src)?.clone();
        Ok(self.push(name, Op::Dropout { p }, vec![src], vec![], shape))
    }

    /// Concatenates inputs along the channel axis.
    pub fn concat(&mut self, name: &str, srcs: &[NodeId]) -> Result<NodeId, ModelError> {
        let first = *srcs
            .first()
            .ok_or_else(|| invalid(name, "concat needs at least one input"))?;
        let (_, h, w) = self.chw(name, first)?;
        let mut channels = 0;
        for &src in srcs {
            let (c, sh, sw) = self.chw(name, src)?;
            if (sh, sw) != (h, w) {
                return Err(invalid(
                    name,
                    format!(
                        "spatial size of {} does not match {}",
                        self.shape_of(src),
                        self.shape_of(first)
                    ),
                ));
            }
            channels += c;
        }
        Ok(self.push(
            name,
            Op::Concat,
            srcs.to_vec(),
            vec![],
            Shape::chw(channels, h, w),
        ))
    }

    /// Sums inputs of identical shape element-wise.
    pub fn add(&mut self, name: &str, srcs: &[NodeId]) -> Result<NodeId, ModelError> {
        let first = *srcs
            .first()
            .ok_or_else(|| invalid(name, "sum needs at least one input"))?;
        let shape = self.checked(first)?.clone();
        for &src in srcs {
            if self.checked(src)? != &shape {
                return Err(invalid(
                    name,
                    format!("cannot add {} to {}", self.shape_of(src), shape),
                ));
            }
        }
        Ok(self.push(name, Op::ElementwiseSum, srcs.to_vec(), vec![], shape))
    }

    /// Appends the softmax output on top of `logits` and validates the graph.
    pub fn finish(mut self, logits: NodeId) -> Result<ModelGraph<Validated>, ModelError> {
        let mut src = logits;
        let shape = self.checked(src)?.clone();
        if self.dtype == DType::Float16 {
            src = self.push(
                "logits_cast",
                Op::Cast { dtype: DType::Float32 },
                vec![src],
                vec![],
                shape.clone(),
            );
        }
        let out = self.push("softmax", Op::SoftmaxOutput, vec![src], vec![], shape);

        tracing::debug!(
            "built graph '{}' with {} layers ({})",
            self.name,
            self.layers.len(),
            self.dtype
        );
        ModelGraph::new(self.name, self.dtype, self.input_shape, self.layers, vec![out]).validate()
    }

    fn push(
        &mut self,
        name: &str,
        op: Op,
        inputs: Vec<NodeId>,
        params: Vec<ParamDef>,
        output_shape: Shape,
    ) -> NodeId {
        let index = self.layers.len();
        self.layers.push(LayerDef {
            name: name.to_string(),
            op,
            index,
            inputs,
            params,
            output_shape,
        });
        index
    }

    fn checked(&self, src: NodeId) -> Result<&Shape, ModelError> {
        self.layers
            .get(src)
            .map(|l| &l.output_shape)
            .ok_or_else(|| ModelError::InvalidGraph(format!("node {src} does not exist")))
    }

    fn chw(&self, name: &str, src: NodeId) -> Result<(usize, usize, usize), ModelError> {
        match *self.checked(src)?.dims() {
            [c, h, w] => Ok((c, h, w)),
            _ => Err(invalid(
                name,
                format!("expected a (C, H, W) input, got {}", self.shape_of(src)),
            )),
        }
    }
}

fn param(layer: &str, kind: ParamKind, shape: Shape) -> ParamDef {
    ParamDef {
        name: format!("{layer}_{}", kind.suffix()),
        kind,
        shape,
    }
}

fn invalid(layer: &str, detail: impl Into<String>) -> ModelError {
    ModelError::InvalidLayer {
        layer: layer.to_string(),
        detail: detail.into(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_conv_shape_inference() {
        let mut b = GraphBuilder::new("t", Shape::chw(3, 32, 32), DType::Float32);
        let x = b.input();
        let c = b
            .conv("conv1", x, 16, Window2d::square(3).stride(2).pad(1), false)
            .unwrap();
        assert_eq!(b.shape_of(c), &Shape::chw(16, 16, 16));
        let layer = &b.layers[c];
        assert_eq!(layer.params.len(), 2);
        assert_eq!(layer.params[0].name, "conv1_weight");
        assert_eq!(layer.params[0].shape, Shape::nchw(16, 3, 3, 3));
    }

    #[test]
    fn test_no_bias_conv() {
        let mut b = GraphBuilder::new("t", Shape::chw(3, 8, 8), DType::Float32);
        let x = b.input();
        let c = b.conv("c", x, 4, Window2d::square(1), true).unwrap();
        assert!(b.layers[c].param(ParamKind::Bias).is_none());
    }

    #[test]
    fn test_kernel_larger_than_input() {
        let mut b = GraphBuilder::new("t", Shape::chw(3, 4, 4), DType::Float32);
        let x = b.input();
        assert!(matches!(
            b.conv("big", x, 4, Window2d::square(7), false),
            Err(ModelError::InvalidLayer { .. })
        ));
    }

    #[test]
    fn test_concat_and_add() {
        let mut b = GraphBuilder::new("t", Shape::chw(3, 8, 8), DType::Float32);
        let x = b.input();
        let a = b.conv("a", x, 4, Window2d::square(1), true).unwrap();
        let c = b.conv("c", x, 6, Window2d::square(3).pad(1), true).unwrap();
        let cat = b.concat("cat", &[a, c]).unwrap();
        assert_eq!(b.shape_of(cat), &Shape::chw(10, 8, 8));
        assert!(b.add("bad", &[a, c]).is_err());
        let s = b.add("sum", &[a, a]).unwrap();
        assert_eq!(b.shape_of(s), &Shape::chw(4, 8, 8));
    }

    #[test]
    fn test_concat_spatial_mismatch() {
        let mut b = GraphBuilder::new("t", Shape::chw(3, 8, 8), DType::Float32);
        let x = b.input();
        let p = b
            .pool("p", x, PoolKind::Max, Window2d::square(2).stride(2))
            .unwrap();
        assert!(b.concat("cat", &[x, p]).is_err());
    }

    #[test]
    fn test_finish_appends_softmax() {
        let mut b = GraphBuilder::new("t", Shape::chw(3, 4, 4), DType::Float32);
        let x = b.input();
        let fc = b.fully_connected("fc", x, 10).unwrap();
        let g = b.finish(fc).unwrap();
        assert_eq!(g.num_layers(), 3);
        assert_eq!(g.output_shapes(), vec![&Shape::vector(10)]);
        assert_eq!(g.num_params(), 10 * 48 + 10);
    }

    #[test]
    fn test_float16_inserts_casts() {
        let mut b = GraphBuilder::new("t", Shape::chw(3, 4, 4), DType::Float16);
        let x = b.input();
        assert_eq!(x, 1);
        let fc = b.fully_connected("fc", x, 10).unwrap();
        let g = b.finish(fc).unwrap();
        assert_eq!(g.count_ops(|op| matches!(op, Op::Cast { .. })), 2);
        let names: Vec<_> = g.iter_layers().map(|l| l.name.as_str()).collect();
        assert_eq!(names, vec!["data", "data_cast", "fc", "logits_cast", "softmax"]);
    }

    #[test]
    fn test_lrn_requires_odd_window() {
        let mut b = GraphBuilder::new("t", Shape::chw(8, 4, 4), DType::Float32);
        let x = b.input();
        assert!(b.lrn("n", x, 4, 1e-4, 0.75, 2.0).is_err());
        assert!(b.lrn("n", x, 5, 1e-4, 0.75, 2.0).is_ok());
    }
}
