// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! Layer-by-layer evaluation of a bound graph on the host.
//!
//! Activations live in a slot per layer and are released as soon as their
//! last consumer has run, so peak memory tracks the widest cut of the graph
//! rather than its total size. Single-consumer activations are reused in
//! place by element-wise layers.

use crate::EngineError;
use model_zoo::{LayerDef, ModelGraph, Op, Validated};
use tensor_core::ops::{self, BatchNormParams};
use tensor_core::{Shape, Tensor, TensorError};

/// A graph with its parameter tensors, ready to evaluate.
#[derive(Debug)]
pub(crate) struct Program {
    graph: ModelGraph<Validated>,
    /// Parameter tensors per layer, in `LayerDef::params` order.
    params: Vec<Vec<Tensor>>,
    last_consumer: Vec<usize>,
    data_shape: Shape,
}

impl Program {
    pub(crate) fn new(
        graph: ModelGraph<Validated>,
        params: Vec<Vec<Tensor>>,
        data_shape: Shape,
    ) -> Result<Self, EngineError> {
        if params.len() != graph.num_layers() {
            return Err(EngineError::Bind {
                model: graph.name.clone(),
                detail: format!(
                    "{} parameter groups for {} layers",
                    params.len(),
                    graph.num_layers()
                ),
            });
        }
        for (layer, tensors) in graph.iter_layers().zip(&params) {
            if layer.params.len() != tensors.len() {
                return Err(EngineError::Bind {
                    model: graph.name.clone(),
                    detail: format!("layer '{}' has the wrong number of parameters", layer.name),
                });
            }
            for (def, t) in layer.params.iter().zip(tensors) {
                if &def.shape != t.shape() {
                    return Err(EngineError::Parameter {
                        name: def.name.clone(),
                        detail: format!("expected {}, got {}", def.shape, t.shape()),
                    });
                }
            }
        }
        let last_consumer = graph.last_consumers();
        Ok(Self {
            graph,
            params,
            last_consumer,
            data_shape,
        })
    }

    pub(crate) fn data_shape(&self) -> &Shape {
        &self.data_shape
    }

    pub(crate) fn num_outputs(&self) -> usize {
        self.graph.outputs.len()
    }

    pub(crate) fn name(&self) -> &str {
        &self.graph.name
    }

    /// Evaluates every layer and returns the graph outputs in order.
    pub(crate) fn run(&self, input: &Tensor) -> Result<Vec<Tensor>, EngineError> {
        if input.shape() != &self.data_shape {
            return Err(EngineError::InputShape {
                expected: self.data_shape.clone(),
                actual: input.shape().clone(),
            });
        }

        let mut slots: Vec<Option<Tensor>> = vec![None; self.graph.num_layers()];
        for (layer, params) in self.graph.iter_layers().zip(&self.params) {
            let out = if layer.op == Op::Data {
                input.clone()
            } else {
                self.eval(layer, params, &mut slots)
                    .map_err(|source| EngineError::Execution {
                        layer: layer.name.clone(),
                        source,
                    })?
            };
            slots[layer.index] = Some(out);
            for &src in &layer.inputs {
                if self.last_consumer[src] == layer.index {
                    slots[src] = None;
                }
            }
        }

        self.graph
            .outputs
            .iter()
            .map(|&o| {
                slots[o].take().ok_or_else(|| EngineError::Bind {
                    model: self.graph.name.clone(),
                    detail: format!("output layer {o} produced no value"),
                })
            })
            .collect()
    }

    fn eval(
        &self,
        layer: &LayerDef,
        params: &[Tensor],
        slots: &mut [Option<Tensor>],
    ) -> Result<Tensor, TensorError> {
        let first = *layer.inputs.first().ok_or_else(|| TensorError::Layout {
            op: "executor",
            detail: format!("layer '{}' has no inputs", layer.name),
        })?;
        match &layer.op {
            Op::Data => input(slots, first).cloned(),
            // Host storage is always f32; casts only mark precision boundaries.
            Op::Cast { .. } | Op::Dropout { .. } => self.take_input(layer, first, slots),
            Op::Convolution { window, no_bias, .. } => {
                let bias = if *no_bias { None } else { params.get(1) };
                ops::conv2d(input(slots, first)?, &params[0], bias, window)
            }
            Op::BatchNorm { eps, fix_gamma } => ops::batch_norm(
                input(slots, first)?,
                &BatchNormParams {
                    gamma: &params[0],
                    beta: &params[1],
                    moving_mean: &params[2],
                    moving_var: &params[3],
                    eps: *eps,
                    fix_gamma: *fix_gamma,
                },
            ),
            Op::Relu => {
                let mut t = self.take_input(layer, first, slots)?;
                ops::relu(&mut t);
                Ok(t)
            }
            Op::Pooling { kind, window } => ops::pool2d(input(slots, first)?, *kind, window),
            Op::GlobalPooling { kind } => ops::global_pool2d(input(slots, first)?, *kind),
            Op::Lrn {
                size,
                alpha,
                beta,
                knorm,
            } => ops::lrn(input(slots, first)?, *size, *alpha, *beta, *knorm),
            Op::Flatten => ops::flatten(self.take_input(layer, first, slots)?),
            Op::FullyConnected { .. } => {
                let x = input(slots, first)?;
                if x.shape().rank() == 2 {
                    ops::fully_connected(x, &params[0], params.get(1))
                } else {
                    let flat = ops::flatten(x.clone())?;
                    ops::fully_connected(&flat, &params[0], params.get(1))
                }
            }
            Op::Concat => {
                let inputs = layer
                    .inputs
                    .iter()
                    .map(|&src| input(slots, src))
                    .collect::<Result<Vec<_>, _>>()?;
                ops::concat_channels(&inputs)
            }
            Op::ElementwiseSum => {
                let mut acc = input(slots, first)?.clone();
                for &src in &layer.inputs[1..] {
                    acc = ops::add(&acc, input(slots, src)?)?;
                }
                Ok(acc)
            }
            Op::SoftmaxOutput => ops::softmax(input(slots, first)?),
        }
    }

    /// Moves the input out of its slot when this layer is its only remaining
    /// reader, otherwise copies it.
    fn take_input(
        &self,
        layer: &LayerDef,
        src: usize,
        slots: &mut [Option<Tensor>],
    ) -> Result<Tensor, TensorError> {
        let sole_reader = self.last_consumer[src] == layer.index
            && layer.inputs.iter().filter(|&&i| i == src).count() == 1;
        if sole_reader {
            slots[src].take().ok_or_else(|| released(src))
        } else {
            input(slots, src).cloned()
        }
    }
}

fn input(slots: &[Option<Tensor>], src: usize) -> Result<&Tensor, TensorError> {
    slots[src].as_ref().ok_or_else(|| released(src))
}

fn released(src: usize) -> TensorError {
    TensorError::Layout {
        op: "executor",
        detail: format!("activation of layer {src} was released before use"),
    }
}
