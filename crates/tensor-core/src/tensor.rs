// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! Core tensor type.

use crate::{Shape, TensorError};
use rand::Rng;

/// An owned, n-dimensional `f32` tensor stored in contiguous row-major memory.
///
/// `Tensor` is the data carrier between layers during a forward pass.
/// Activations of image layers are laid out NCHW.
#[derive(Debug, Clone, PartialEq)]
pub struct Tensor {
    shape: Shape,
    data: Vec<f32>,
}

impl Tensor {
    /// Creates a new tensor filled with zeros.
    ///
    /// # Examples
    /// ```
    /// use tensor_core::{Tensor, Shape};
    /// let t = Tensor::zeros(Shape::matrix(2, 3));
    /// assert_eq!(t.len(), 6);
    /// ```
    pub fn zeros(shape: Shape) -> Self {
        Self::full(shape, 0.0)
    }

    /// Creates a tensor with every element set to `value`.
    pub fn full(shape: Shape, value: f32) -> Self {
        let n = shape.num_elements();
        Self {
            shape,
            data: vec![value; n],
        }
    }

    /// Creates a tensor from an owned buffer.
    ///
    /// Returns an error if `data.len()` does not match `shape.num_elements()`.
    ///
    /// # Examples
    /// ```
    /// use tensor_core::{Tensor, Shape};
    /// let t = Tensor::from_vec(Shape::vector(3), vec![1.0, 2.0, 3.0]).unwrap();
    /// assert_eq!(t.as_slice(), &[1.0, 2.0, 3.0]);
    /// ```
    pub fn from_vec(shape: Shape, data: Vec<f32>) -> Result<Self, TensorError> {
        let expected = shape.num_elements();
        if data.len() != expected {
            return Err(TensorError::BufferSizeMismatch {
                shape,
                expected,
                actual: data.len(),
            });
        }
        Ok(Self { shape, data })
    }

    /// Creates a tensor with elements drawn uniformly from `[low, high)`.
    pub fn random_uniform<R: Rng + ?Sized>(shape: Shape, low: f32, high: f32, rng: &mut R) -> Self {
        let n = shape.num_elements();
        let data = if low < high {
            (0..n).map(|_| rng.random_range(low..high)).collect()
        } else {
            vec![low; n]
        };
        Self { shape, data }
    }

    /// Returns the tensor's shape.
    pub fn shape(&self) -> &Shape {
        &self.shape
    }

    /// Returns the number of elements.
    pub fn len(&self) -> usize {
        self.data.len()
    }

    /// Returns `true` if the tensor holds no elements.
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Returns the flat element buffer.
    pub fn as_slice(&self) -> &[f32] {
        &self.data
    }

    /// Returns the flat element buffer mutably.
    pub fn as_mut_slice(&mut self) -> &mut [f32] {
        &mut self.data
    }

    /// Consumes the tensor and returns its buffer.
    pub fn into_vec(self) -> Vec<f32> {
        self.data
    }

    /// Returns the memory footprint of this tensor in bytes.
    pub fn size_bytes(&self) -> usize {
        self.data.len() * std::mem::size_of::<f32>()
    }

    /// Reinterprets the buffer under a new shape with the same element count.
    pub fn reshape(self, shape: Shape) -> Result<Self, TensorError> {
        if shape.num_elements() != self.data.len() {
            return Err(TensorError::ShapeMismatch {
                op: "reshape",
                lhs: self.shape,
                rhs: shape,
            });
        }
        Ok(Self {
            shape,
            data: self.data,
        })
    }

    /// Fills the tensor with a constant value.
    pub fn fill(&mut self, value: f32) {
        self.data.iter_mut().for_each(|x| *x = value);
    }

    /// Returns the dimensions of a rank-4 tensor as `(n, c, h, w)`.
    pub fn nchw(&self, op: &'static str) -> Result<(usize, usize, usize, usize), TensorError> {
        match *self.shape.dims() {
            [n, c, h, w] => Ok((n, c, h, w)),
            _ => Err(TensorError::RankMismatch {
                op,
                expected: 4,
                shape: self.shape.clone(),
            }),
        }
    }
}
