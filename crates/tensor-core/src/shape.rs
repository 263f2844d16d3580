// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! Tensor shape descriptors and dimension utilities.

use crate::TensorError;
use std::fmt;

/// Describes the dimensionality of a [`crate::Tensor`].
///
/// Image tensors follow the NCHW convention: `[batch, channels, height, width]`.
/// Shapes are immutable once created.
#[derive(Debug, Clone, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
pub struct Shape {
    dims: Vec<usize>,
}

impl Shape {
    /// Creates a new shape from the given dimensions.
    ///
    /// # Examples
    /// ```
    /// use tensor_core::Shape;
    /// let s = Shape::new(vec![2, 3, 4]);
    /// assert_eq!(s.rank(), 3);
    /// assert_eq!(s.num_elements(), 24);
    /// ```
    pub fn new(dims: Vec<usize>) -> Self {
        Self { dims }
    }

    /// Creates a 1-D shape.
    pub fn vector(len: usize) -> Self {
        Self { dims: vec![len] }
    }

    /// Creates a 2-D shape (matrix).
    pub fn matrix(rows: usize, cols: usize) -> Self {
        Self {
            dims: vec![rows, cols],
        }
    }

    /// Creates a per-sample image shape `(channels, height, width)`.
    pub fn chw(channels: usize, height: usize, width: usize) -> Self {
        Self {
            dims: vec![channels, height, width],
        }
    }

    /// Creates a batched image shape `(batch, channels, height, width)`.
    pub fn nchw(batch: usize, channels: usize, height: usize, width: usize) -> Self {
        Self {
            dims: vec![batch, channels, height, width],
        }
    }

    /// Parses a comma-separated dimension list such as `"3,224,224"`.
    ///
    /// Every dimension must be a positive integer.
    ///
    /// # Examples
    /// ```
    /// use tensor_core::Shape;
    /// let s = Shape::parse_csv("3,299,299").unwrap();
    /// assert_eq!(s, Shape::chw(3, 299, 299));
    /// ```
    pub fn parse_csv(input: &str) -> Result<Self, TensorError> {
        let dims = input
            .split(',')
            .map(|part| {
                let part = part.trim();
                match part.parse::<usize>() {
                    Ok(0) => Err(TensorError::ShapeParse {
                        input: input.to_string(),
                        detail: "dimensions must be positive".into(),
                    }),
                    Ok(d) => Ok(d),
                    Err(e) => Err(TensorError::ShapeParse {
                        input: input.to_string(),
                        detail: format!("'{part}': {e}"),
                    }),
                }
            })
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self { dims })
    }

    /// Returns a new shape with `batch` prepended as the leading dimension.
    pub fn with_batch(&self, batch: usize) -> Self {
        let mut dims = Vec::with_capacity(self.dims.len() + 1);
        dims.push(batch);
        dims.extend_from_slice(&self.dims);
        Self { dims }
    }

    /// Returns the shape without its leading (batch) dimension.
    pub fn without_batch(&self) -> Self {
        Self {
            dims: self.dims.iter().skip(1).copied().collect(),
        }
    }

    /// Returns the number of dimensions (rank).
    pub fn rank(&self) -> usize {
        self.dims.len()
    }

    /// Returns the total number of elements.
    ///
    /// For a rank-0 shape, returns 1.
    pub fn num_elements(&self) -> usize {
        self.dims.iter().product()
    }

    /// Returns `true` when the shape has at least one dimension and all are positive.
    pub fn is_well_formed(&self) -> bool {
        !self.dims.is_empty() && self.dims.iter().all(|&d| d > 0)
    }

    /// Returns the dimensions as a slice.
    pub fn dims(&self) -> &[usize] {
        &self.dims
    }

    /// Returns the size of a specific dimension, or `None` if out of bounds.
    pub fn dim(&self, index: usize) -> Option<usize> {
        self.dims.get(index).copied()
    }

    /// Computes the memory footprint in bytes for a given [`crate::DType`].
    pub fn size_bytes(&self, dtype: super::DType) -> usize {
        self.num_elements() * dtype.size_bytes()
    }

    /// Renders the shape in the `"C,H,W"` form used by model builders.
    pub fn to_csv(&self) -> String {
        self.dims
            .iter()
            .map(|d| d.to_string())
            .collect::<Vec<_>>()
            .join(",")
    }
}

impl fmt::Display for Shape {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "(")?;
        for (i, d) in self.dims.iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{d}")?;
        }
        write!(f, ")")
    }
}

/// Convenience: `Shape::from(vec![2, 3])`.
impl From<Vec<usize>> for Shape {
    fn from(dims: Vec<usize>) -> Self {
        Self::new(dims)
    }
}

/// Convenience: `Shape::from(&[2, 3][..])`.
impl From<&[usize]> for Shape {
    fn from(dims: &[usize]) -> Self {
        Self::new(dims.to_vec())
    }
}
