// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! 2-D convolution.

use crate::ops::window::Window2d;
use crate::{Shape, Tensor, TensorError};
use ndarray::linalg::general_mat_mul;
use ndarray::{ArrayView2, ArrayViewMut2};

/// Computes a 2-D convolution over an NCHW input.
///
/// `weight` is `[out_channels, in_channels, kh, kw]` and the optional `bias`
/// is `[out_channels]`. Each sample is lowered with im2col into a
/// `[in_channels * kh * kw, oh * ow]` matrix and multiplied by the weight
/// matrix through `ndarray`'s GEMM. Pointwise (1×1, stride 1, unpadded)
/// convolutions skip the lowering.
///
/// # Errors
/// Returns [`TensorError::RankMismatch`] for non rank-4 inputs or weights,
/// [`TensorError::ShapeMismatch`] if channels or kernel sizes disagree, and
/// [`TensorError::InvalidWindow`] if the window does not fit the input.
pub fn conv2d(
    input: &Tensor,
    weight: &Tensor,
    bias: Option<&Tensor>,
    window: &Window2d,
) -> Result<Tensor, TensorError> {
    let (n, c, h, w) = input.nchw("conv2d")?;
    let (o, wc, kh, kw) = weight.nchw("conv2d (weight)")?;
    if wc != c || (kh, kw) != window.kernel {
        return Err(TensorError::ShapeMismatch {
            op: "conv2d",
            lhs: input.shape().clone(),
            rhs: weight.shape().clone(),
        });
    }
    if let Some(b) = bias {
        if b.len() != o {
            return Err(TensorError::ShapeMismatch {
                op: "conv2d (bias)",
                lhs: Shape::vector(o),
                rhs: b.shape().clone(),
            });
        }
    }

    let (oh, ow) = window.output_size(h, w, "conv2d")?;
    let k = c * kh * kw;
    let p = oh * ow;

    let w_mat = ArrayView2::from_shape((o, k), weight.as_slice()).map_err(layout_err)?;
    let mut output = Tensor::zeros(Shape::nchw(n, o, oh, ow));
    let mut col = if window.is_pointwise() {
        Vec::new()
    } else {
        vec![0.0f32; k * p]
    };

    let src = input.as_slice();
    let dst = output.as_mut_slice();
    for s in 0..n {
        let sample = &src[s * c * h * w..(s + 1) * c * h * w];
        let col_mat = if window.is_pointwise() {
            ArrayView2::from_shape((k, p), sample).map_err(layout_err)?
        } else {
            im2col(sample, (c, h, w), window, (oh, ow), &mut col);
            ArrayView2::from_shape((k, p), &col[..]).map_err(layout_err)?
        };
        let out_slice = &mut dst[s * o * p..(s + 1) * o * p];
        let mut out_mat = ArrayViewMut2::from_shape((o, p), out_slice).map_err(layout_err)?;
        general_mat_mul(1.0, &w_mat, &col_mat, 0.0, &mut out_mat);

        if let Some(b) = bias {
            for (row, &bv) in out_slice.chunks_exact_mut(p).zip(b.as_slice()) {
                row.iter_mut().for_each(|x| *x += bv);
            }
        }
    }

    Ok(output)
}

/// Lowers one CHW sample into a column matrix, zero-filling padded taps.
fn im2col(
    src: &[f32],
    (c, h, w): (usize, usize, usize),
    window: &Window2d,
    (oh, ow): (usize, usize),
    col: &mut [f32],
) {
    let (kh, kw) = window.kernel;
    let (sh, sw) = window.stride;
    let (ph, pw) = window.pad;
    let p = oh * ow;

    for ci in 0..c {
        let plane = &src[ci * h * w..(ci + 1) * h * w];
        for ki in 0..kh {
            for kj in 0..kw {
                let row = (ci * kh + ki) * kw + kj;
                let dst = &mut col[row * p..(row + 1) * p];
                for oy in 0..oh {
                    let iy = (oy * sh + ki) as isize - ph as isize;
                    let dst_row = &mut dst[oy * ow..(oy + 1) * ow];
                    if iy < 0 || iy as usize >= h {
                        dst_row.fill(0.0);
                        continue;
                    }
                    let src_row = &plane[iy as usize * w..(iy as usize + 1) * w];
                    for (ox, d) in dst_row.iter_mut().enumerate() {
                        let ix = (ox * sw + kj) as isize - pw as isize;
                        *d = if ix >= 0 && (ix as usize) < w {
                            src_row[ix as usize]
                        } else {
                            0.0
                        };
                    }
                }
            }
        }
    }
}

fn layout_err(e: ndarray::ShapeError) -> TensorError {
    TensorError::Layout {
        op: "conv2d",
        detail: e.to_string(),
    }
}
