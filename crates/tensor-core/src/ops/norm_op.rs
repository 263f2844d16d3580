// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! Normalisation layers evaluated in inference mode.

use crate::{Shape, Tensor, TensorError};

/// Per-channel parameters of a batch-normalisation layer.
#[derive(Debug, Clone, Copy)]
pub struct BatchNormParams<'a> {
    pub gamma: &'a Tensor,
    pub beta: &'a Tensor,
    pub moving_mean: &'a Tensor,
    pub moving_var: &'a Tensor,
    pub eps: f32,
    /// Treat `gamma` as 1 regardless of its stored value.
    pub fix_gamma: bool,
}

/// Applies batch normalisation with the running statistics:
/// `y = gamma * (x - mean) / sqrt(var + eps) + beta`.
///
/// Channel axis is 1; works on `[N, C]` and `[N, C, H, W]` inputs.
pub fn batch_norm(input: &Tensor, params: &BatchNormParams<'_>) -> Result<Tensor, TensorError> {
    let dims = input.shape().dims();
    if dims.len() < 2 {
        return Err(TensorError::RankMismatch {
            op: "batch_norm",
            expected: 4,
            shape: input.shape().clone(),
        });
    }
    let c = dims[1];
    let inner: usize = dims[2..].iter().product();
    if input.is_empty() {
        return Ok(input.clone());
    }
    for p in [params.gamma, params.beta, params.moving_mean, params.moving_var] {
        if p.len() != c {
            return Err(TensorError::ShapeMismatch {
                op: "batch_norm",
                lhs: Shape::vector(c),
                rhs: p.shape().clone(),
            });
        }
    }

    // Fold into a per-channel affine transform.
    let (scale, shift): (Vec<f32>, Vec<f32>) = (0..c)
        .map(|ch| {
            let gamma = if params.fix_gamma { 1.0 } else { params.gamma.as_slice()[ch] };
            let inv_std = 1.0 / (params.moving_var.as_slice()[ch] + params.eps).sqrt();
            let scale = gamma * inv_std;
            (scale, params.beta.as_slice()[ch] - params.moving_mean.as_slice()[ch] * scale)
        })
        .unzip();

    let mut output = input.clone();
    for (i, block) in output.as_mut_slice().chunks_exact_mut(inner).enumerate() {
        let ch = i % c;
        let (s, b) = (scale[ch], shift[ch]);
        block.iter_mut().for_each(|x| *x = *x * s + b);
    }
    Ok(output)
}

/// Local response normalisation across channels:
/// `y = x / (knorm + alpha / size * sum(x^2 over neighbouring channels))^beta`.
pub fn lrn(input: &Tensor, size: usize, alpha: f32, beta: f32, knorm: f32) -> Result<Tensor, TensorError> {
    let (n, c, h, w) = input.nchw("lrn")?;
    let hw = h * w;
    let half = size / 2;
    let src = input.as_slice();
    let mut output = Tensor::zeros(input.shape().clone());
    let dst = output.as_mut_slice();
    let coeff = alpha / size as f32;

    for s in 0..n {
        let base = s * c * hw;
        for ch in 0..c {
            let lo = ch.saturating_sub(half);
            let hi = (ch + half).min(c - 1);
            for i in 0..hw {
                let mut sq = 0.0f32;
                for k in lo..=hi {
                    let v = src[base + k * hw + i];
                    sq += v * v;
                }
                let idx = base + ch * hw + i;
                dst[idx] = src[idx] / (knorm + coeff * sq).powf(beta);
            }
        }
    }
    Ok(output)
}
