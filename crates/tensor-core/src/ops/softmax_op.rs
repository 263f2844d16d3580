// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! Softmax activation operation.

use crate::{Tensor, TensorError};

/// Computes softmax along the last dimension: `output[i] = exp(x[i] - max) / sum(exp(x - max))`.
///
/// Uses the numerically stable variant that subtracts the maximum value
/// before exponentiation to prevent overflow.
///
/// # Errors
/// Returns [`TensorError::RankMismatch`] for a rank-0 input.
pub fn softmax(input: &Tensor) -> Result<Tensor, TensorError> {
    let last_dim = match input.shape().dims().last() {
        Some(&d) => d,
        None => {
            return Err(TensorError::RankMismatch {
                op: "softmax",
                expected: 2,
                shape: input.shape().clone(),
            })
        }
    };

    let mut output = input.clone();
    if last_dim == 0 {
        return Ok(output);
    }

    for row in output.as_mut_slice().chunks_exact_mut(last_dim) {
        let max_val = row.iter().copied().fold(f32::NEG_INFINITY, f32::max);

        let mut sum = 0.0f32;
        for x in row.iter_mut() {
            *x = (*x - max_val).exp();
            sum += *x;
        }

        if sum > 0.0 {
            let inv_sum = 1.0 / sum;
            row.iter_mut().for_each(|x| *x *= inv_sum);
        }
    }

    Ok(output)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Shape;

    fn approx_eq(a: &[f32], b: &[f32], tol: f32) -> bool {
        a.len() == b.len() && a.iter().zip(b).all(|(x, y)| (x - y).abs() < tol)
    }

    #[test]
    fn test_softmax_uniform() {
        let input = Tensor::full(Shape::matrix(1, 4), 1.0);
        let output = softmax(&input).unwrap();
        assert!(approx_eq(output.as_slice(), &[0.25; 4], 1e-5));
    }

    #[test]
    fn test_softmax_monotonic() {
        let input = Tensor::from_vec(Shape::matrix(1, 3), vec![1.0, 2.0, 3.0]).unwrap();
        let r = softmax(&input).unwrap().into_vec();
        assert!(r[0] < r[1]);
        assert!(r[1] < r[2]);
    }

    #[test]
    fn test_softmax_rows_independent() {
        let input = Tensor::from_vec(
            Shape::matrix(2, 3),
            vec![1.0, 2.0, 3.0, 1.0, 1.0, 1.0],
        )
        .unwrap();
        let r = softmax(&input).unwrap().into_vec();
        let sum0: f32 = r[0..3].iter().sum();
        assert!((sum0 - 1.0).abs() < 1e-5);
        assert!(approx_eq(&r[3..6], &[1.0 / 3.0; 3], 1e-5));
    }

    #[test]
    fn test_softmax_numerical_stability() {
        let input = Tensor::from_vec(Shape::matrix(1, 3), vec![1000.0, 1001.0, 1002.0]).unwrap();
        let r = softmax(&input).unwrap().into_vec();
        let sum: f32 = r.iter().sum();
        assert!((sum - 1.0).abs() < 1e-5);
        assert!(r.iter().all(|&x| x.is_finite()));
    }

    #[test]
    fn test_softmax_rank0() {
        let input = Tensor::from_vec(Shape::new(vec![]), vec![1.0]).unwrap();
        assert!(softmax(&input).is_err());
    }
}
