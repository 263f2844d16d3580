// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! Sliding-window geometry shared by convolution and pooling.

use crate::TensorError;

/// Kernel size, stride and zero-padding of a 2-D sliding window, each as
/// `(height, width)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
pub struct Window2d {
    pub kernel: (usize, usize),
    pub stride: (usize, usize),
    pub pad: (usize, usize),
}

impl Window2d {
    /// Square kernel with stride 1 and no padding.
    pub fn square(k: usize) -> Self {
        Self {
            kernel: (k, k),
            stride: (1, 1),
            pad: (0, 0),
        }
    }

    /// Rectangular kernel with stride 1 and no padding.
    pub fn rect(kh: usize, kw: usize) -> Self {
        Self {
            kernel: (kh, kw),
            stride: (1, 1),
            pad: (0, 0),
        }
    }

    /// Sets a uniform stride.
    pub fn stride(mut self, s: usize) -> Self {
        self.stride = (s, s);
        self
    }

    /// Sets a uniform padding.
    pub fn pad(mut self, p: usize) -> Self {
        self.pad = (p, p);
        self
    }

    /// Sets a per-axis padding.
    pub fn pad_hw(mut self, ph: usize, pw: usize) -> Self {
        self.pad = (ph, pw);
        self
    }

    /// Returns `true` for a 1×1 kernel with unit stride and no padding,
    /// where a convolution reduces to a plain matrix product.
    pub fn is_pointwise(&self) -> bool {
        self.kernel == (1, 1) && self.stride == (1, 1) && self.pad == (0, 0)
    }

    /// Computes the output spatial size for an `(h, w)` input.
    ///
    /// Uses floor rounding: `out = (in + 2 * pad - kernel) / stride + 1`.
    pub fn output_size(&self, h: usize, w: usize, op: &'static str) -> Result<(usize, usize), TensorError> {
        let (kh, kw) = self.kernel;
        let (sh, sw) = self.stride;
        let (ph, pw) = self.pad;
        if kh == 0 || kw == 0 || sh == 0 || sw == 0 {
            return Err(TensorError::InvalidWindow {
                op,
                detail: format!("kernel {:?} and stride {:?} must be positive", self.kernel, self.stride),
            });
        }
        if ph >= kh || pw >= kw {
            return Err(TensorError::InvalidWindow {
                op,
                detail: format!("padding {:?} must be smaller than kernel {:?}", self.pad, self.kernel),
            });
        }
        if h + 2 * ph < kh || w + 2 * pw < kw {
            return Err(TensorError::InvalidWindow {
                op,
                detail: format!(
                    "kernel {:?} larger than padded input {}x{}",
                    self.kernel,
                    h + 2 * ph,
                    w + 2 * pw
                ),
            });
        }
        Ok(((h + 2 * ph - kh) / sh + 1, (w + 2 * pw - kw) / sw + 1))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_output_size() {
        // AlexNet conv1: 224 -> 54 with 11x11 stride 4.
        let w = Window2d::square(11).stride(4);
        assert_eq!(w.output_size(224, 224, "conv").unwrap(), (54, 54));

        // Same-padding 3x3.
        let w = Window2d::square(3).pad(1);
        assert_eq!(w.output_size(56, 56, "conv").unwrap(), (56, 56));

        // Asymmetric 1x7 with (0, 3) padding keeps the size.
        let w = Window2d::rect(1, 7).pad_hw(0, 3);
        assert_eq!(w.output_size(17, 17, "conv").unwrap(), (17, 17));
    }

    #[test]
    fn test_invalid_windows() {
        assert!(Window2d::square(0).output_size(4, 4, "pool").is_err());
        assert!(Window2d::square(5).output_size(4, 4, "pool").is_err());
        assert!(Window2d::square(3).pad(3).output_size(4, 4, "pool").is_err());
    }

    #[test]
    fn test_pointwise() {
        assert!(Window2d::square(1).is_pointwise());
        assert!(!Window2d::square(1).stride(2).is_pointwise());
    }
}
