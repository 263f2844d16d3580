// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! Element-wise activations, sums and channel concatenation.

use crate::{Shape, Tensor, TensorError};

/// Applies `max(x, 0)` in place.
pub fn relu(tensor: &mut Tensor) {
    tensor
        .as_mut_slice()
        .iter_mut()
        .for_each(|x| *x = x.max(0.0));
}

/// Sums tensors of identical shape element-wise.
///
/// Used for residual shortcuts.
pub fn add(lhs: &Tensor, rhs: &Tensor) -> Result<Tensor, TensorError> {
    if lhs.shape() != rhs.shape() {
        return Err(TensorError::ShapeMismatch {
            op: "add",
            lhs: lhs.shape().clone(),
            rhs: rhs.shape().clone(),
        });
    }
    let mut out = lhs.clone();
    for (o, &r) in out.as_mut_slice().iter_mut().zip(rhs.as_slice()) {
        *o += r;
    }
    Ok(out)
}

/// Concatenates NCHW tensors along the channel axis.
///
/// All inputs must agree on batch and spatial dimensions.
pub fn concat_channels(inputs: &[&Tensor]) -> Result<Tensor, TensorError> {
    let first = inputs.first().ok_or_else(|| TensorError::InvalidWindow {
        op: "concat",
        detail: "no inputs".into(),
    })?;
    let (n, _, h, w) = first.nchw("concat")?;
    let mut total_c = 0;
    for t in inputs {
        let (tn, tc, th, tw) = t.nchw("concat")?;
        if (tn, th, tw) != (n, h, w) {
            return Err(TensorError::ShapeMismatch {
                op: "concat",
                lhs: first.shape().clone(),
                rhs: t.shape().clone(),
            });
        }
        total_c += tc;
    }

    let hw = h * w;
    let mut data = Vec::with_capacity(n * total_c * hw);
    for s in 0..n {
        for t in inputs {
            let tc = t.shape().dims()[1];
            let block = tc * hw;
            data.extend_from_slice(&t.as_slice()[s * block..(s + 1) * block]);
        }
    }
    Tensor::from_vec(Shape::nchw(n, total_c, h, w), data)
}

/// Collapses every dimension after the first: `[N, ...] -> [N, prod(...)]`.
pub fn flatten(input: Tensor) -> Result<Tensor, TensorError> {
    let n = input.shape().dim(0).unwrap_or(1);
    let rest = if n == 0 { 0 } else { input.len() / n };
    input.reshape(Shape::matrix(n, rest))
}
