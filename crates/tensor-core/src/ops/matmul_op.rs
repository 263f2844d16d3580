// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! Fully-connected (dense) layer.

use crate::{Shape, Tensor, TensorError};
use ndarray::linalg::general_mat_mul;
use ndarray::{ArrayView2, ArrayViewMut2};

/// Computes `output = input @ weight^T + bias`.
///
/// `input` is `[N, K]`, `weight` is `[O, K]` (one row per output unit) and
/// the optional `bias` is `[O]`. The product runs through `ndarray`'s GEMM.
///
/// # Errors
/// Returns [`TensorError::RankMismatch`] if either operand is not 2-D and
/// [`TensorError::ShapeMismatch`] if the inner dimensions differ.
pub fn fully_connected(
    input: &Tensor,
    weight: &Tensor,
    bias: Option<&Tensor>,
) -> Result<Tensor, TensorError> {
    let (n, k) = matrix_dims(input, "fully_connected")?;
    let (o, wk) = matrix_dims(weight, "fully_connected (weight)")?;
    if wk != k {
        return Err(TensorError::ShapeMismatch {
            op: "fully_connected",
            lhs: input.shape().clone(),
            rhs: weight.shape().clone(),
        });
    }

    let mut output = Tensor::zeros(Shape::matrix(n, o));
    {
        let x = ArrayView2::from_shape((n, k), input.as_slice()).map_err(layout_err)?;
        let w = ArrayView2::from_shape((o, k), weight.as_slice()).map_err(layout_err)?;
        let mut y = ArrayViewMut2::from_shape((n, o), output.as_mut_slice()).map_err(layout_err)?;
        general_mat_mul(1.0, &x, &w.t(), 0.0, &mut y);
    }

    if let Some(b) = bias {
        if b.len() != o {
            return Err(TensorError::ShapeMismatch {
                op: "fully_connected (bias)",
                lhs: Shape::vector(o),
                rhs: b.shape().clone(),
            });
        }
        for row in output.as_mut_slice().chunks_exact_mut(o) {
            for (y, &bv) in row.iter_mut().zip(b.as_slice()) {
                *y += bv;
            }
        }
    }

    Ok(output)
}

fn matrix_dims(t: &Tensor, op: &'static str) -> Result<(usize, usize), TensorError> {
    match *t.shape().dims() {
        [r, c] => Ok((r, c)),
        _ => Err(TensorError::RankMismatch {
            op,
            expected: 2,
            shape: t.shape().clone(),
        }),
    }
}

fn layout_err(e: ndarray::ShapeError) -> TensorError {
    TensorError::Layout {
        op: "fully_connected",
        detail: e.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fc_2x3_times_weights() {
        // X = [[1, 2, 3], [4, 5, 6]]
        // W = [[7, 9, 11], [8, 10, 12]]  (rows are output units)
        // Y = X @ W^T = [[58, 64], [139, 154]]
        let x = Tensor::from_vec(Shape::matrix(2, 3), vec![1.0, 2.0, 3.0, 4.0, 5.0, 6.0]).unwrap();
        let w = Tensor::from_vec(Shape::matrix(2, 3), vec![7.0, 9.0, 11.0, 8.0, 10.0, 12.0]).unwrap();

        let y = fully_connected(&x, &w, None).unwrap();

        assert_eq!(y.shape(), &Shape::matrix(2, 2));
        let r = y.as_slice();
        assert!((r[0] - 58.0).abs() < 1e-5);
        assert!((r[1] - 64.0).abs() < 1e-5);
        assert!((r[2] - 139.0).abs() < 1e-5);
        assert!((r[3] - 154.0).abs() < 1e-5);
    }

    #[test]
    fn test_fc_bias() {
        let x = Tensor::from_vec(Shape::matrix(1, 2), vec![1.0, 1.0]).unwrap();
        let w = Tensor::from_vec(Shape::matrix(2, 2), vec![1.0, 0.0, 0.0, 1.0]).unwrap();
        let b = Tensor::from_vec(Shape::vector(2), vec![0.5, -0.5]).unwrap();
        let y = fully_connected(&x, &w, Some(&b)).unwrap();
        assert_eq!(y.as_slice(), &[1.5, 0.5]);
    }

    #[test]
    fn test_fc_shape_mismatch() {
        let x = Tensor::zeros(Shape::matrix(2, 3));
        let w = Tensor::zeros(Shape::matrix(2, 4));
        assert!(fully_connected(&x, &w, None).is_err());
    }

    #[test]
    fn test_fc_rank_mismatch() {
        let x = Tensor::zeros(Shape::nchw(1, 2, 1, 1));
        let w = Tensor::zeros(Shape::matrix(2, 2));
        assert!(matches!(
            fully_connected(&x, &w, None),
            Err(TensorError::RankMismatch { .. })
        ));
    }
}
