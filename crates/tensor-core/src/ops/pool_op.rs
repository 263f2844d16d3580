// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! Spatial pooling.

use crate::ops::window::Window2d;
use crate::{Shape, Tensor, TensorError};

/// Reduction applied inside each pooling window.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PoolKind {
    Max,
    Avg,
}

impl PoolKind {
    pub fn as_str(self) -> &'static str {
        match self {
            PoolKind::Max => "max",
            PoolKind::Avg => "avg",
        }
    }
}

/// Pools each channel of an NCHW input with the given window.
///
/// Average pooling divides by the full kernel area, so zero padding counts
/// toward the mean. Max pooling ignores padded taps.
pub fn pool2d(input: &Tensor, kind: PoolKind, window: &Window2d) -> Result<Tensor, TensorError> {
    let (n, c, h, w) = input.nchw("pool2d")?;
    let (oh, ow) = window.output_size(h, w, "pool2d")?;
    let (kh, kw) = window.kernel;
    let (sh, sw) = window.stride;
    let (ph, pw) = window.pad;
    let area = (kh * kw) as f32;

    let mut output = Tensor::zeros(Shape::nchw(n, c, oh, ow));
    let src = input.as_slice();
    let dst = output.as_mut_slice();

    for (plane, out_plane) in src.chunks_exact(h * w).zip(dst.chunks_exact_mut(oh * ow)) {
        for oy in 0..oh {
            let y0 = (oy * sh) as isize - ph as isize;
            let y_start = y0.max(0) as usize;
            let y_end = ((y0 + kh as isize).max(0) as usize).min(h);
            for ox in 0..ow {
                let x0 = (ox * sw) as isize - pw as isize;
                let x_start = x0.max(0) as usize;
                let x_end = ((x0 + kw as isize).max(0) as usize).min(w);

                let value = match kind {
                    PoolKind::Max => {
                        let mut m = f32::NEG_INFINITY;
                        for y in y_start..y_end {
                            for &v in &plane[y * w + x_start..y * w + x_end] {
                                m = m.max(v);
                            }
                        }
                        if m.is_finite() { m } else { 0.0 }
                    }
                    PoolKind::Avg => {
                        let mut sum = 0.0f32;
                        for y in y_start..y_end {
                            sum += plane[y * w + x_start..y * w + x_end].iter().sum::<f32>();
                        }
                        sum / area
                    }
                };
                out_plane[oy * ow + ox] = value;
            }
        }
    }

    Ok(output)
}

/// Pools each channel down to a single value: `[N, C, H, W] -> [N, C, 1, 1]`.
pub fn global_pool2d(input: &Tensor, kind: PoolKind) -> Result<Tensor, TensorError> {
    let (n, c, h, w) = input.nchw("global_pool2d")?;
    let hw = h * w;
    let values: Vec<f32> = input
        .as_slice()
        .chunks_exact(hw)
        .map(|plane| match kind {
            PoolKind::Max => plane.iter().copied().fold(f32::NEG_INFINITY, f32::max),
            PoolKind::Avg => plane.iter().sum::<f32>() / hw as f32,
        })
        .collect();
    Tensor::from_vec(Shape::nchw(n, c, 1, 1), values)
}
