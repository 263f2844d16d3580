// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! Parameter initialisation.
//!
//! Biases, shifts and running means start at zero; scales and running
//! variances start at one. Only weights are drawn at random, and how they
//! are drawn is what distinguishes one [`Initializer`] from another.

use crate::EngineError;
use model_zoo::{ParamDef, ParamKind};
use rand::RngCore;
use tensor_core::{Shape, Tensor};

/// Produces the initial value of each model parameter.
pub trait Initializer: Send + Sync {
    /// Draws a weight tensor of `shape`.
    fn init_weight(&self, name: &str, shape: &Shape, rng: &mut dyn RngCore) -> Result<Tensor, EngineError>;

    /// Initialises any parameter, dispatching on its role.
    fn init_param(&self, param: &ParamDef, rng: &mut dyn RngCore) -> Result<Tensor, EngineError> {
        let shape = param.shape.clone();
        match param.kind {
            ParamKind::Weight => self.init_weight(&param.name, &param.shape, rng),
            ParamKind::Bias | ParamKind::Beta | ParamKind::MovingMean => Ok(Tensor::zeros(shape)),
            ParamKind::Gamma | ParamKind::MovingVar => Ok(Tensor::full(shape, 1.0)),
        }
    }
}

/// How Xavier combines fan-in and fan-out.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FactorType {
    Avg,
    In,
    Out,
}

/// Xavier/Glorot uniform initialisation:
/// `w ~ U(-s, s)` with `s = sqrt(magnitude / factor)`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Xavier {
    pub factor_type: FactorType,
    pub magnitude: f32,
}

impl Xavier {
    /// Averaged fan with the given magnitude.
    pub fn new(magnitude: f32) -> Self {
        Self {
            factor_type: FactorType::Avg,
            magnitude,
        }
    }

    pub fn with_factor_type(mut self, factor_type: FactorType) -> Self {
        self.factor_type = factor_type;
        self
    }

    /// Bound of the uniform distribution for a weight of `shape`, or `None`
    /// for shapes with fewer than two dimensions.
    pub fn scale(&self, shape: &Shape) -> Option<f32> {
        let dims = shape.dims();
        if dims.len() < 2 {
            return None;
        }
        let receptive: usize = dims[2..].iter().product();
        let fan_in = (dims[1] * receptive) as f32;
        let fan_out = (dims[0] * receptive) as f32;
        let factor = match self.factor_type {
            FactorType::Avg => (fan_in + fan_out) / 2.0,
            FactorType::In => fan_in,
            FactorType::Out => fan_out,
        };
        if factor <= 0.0 {
            return None;
        }
        Some((self.magnitude / factor).sqrt())
    }
}

impl Default for Xavier {
    fn default() -> Self {
        Self::new(3.0)
    }
}

impl Initializer for Xavier {
    fn init_weight(&self, name: &str, shape: &Shape, rng: &mut dyn RngCore) -> Result<Tensor, EngineError> {
        let scale = self.scale(shape).ok_or_else(|| EngineError::Parameter {
            name: name.to_string(),
            detail: format!("xavier needs a weight of rank >= 2, got {shape}"),
        })?;
        Ok(Tensor::random_uniform(shape.clone(), -scale, scale, rng))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn def(kind: ParamKind, shape: Shape) -> ParamDef {
        ParamDef {
            name: format!("p_{}", kind.suffix()),
            kind,
            shape,
        }
    }

    #[test]
    fn test_conv_scale() {
        // fan_in = 3*3*3 = 27, fan_out = 64*3*3 = 576
        let s = Xavier::new(2.0).scale(&Shape::nchw(64, 3, 3, 3)).unwrap();
        let expected = (2.0f32 / ((27.0 + 576.0) / 2.0)).sqrt();
        assert!((s - expected).abs() < 1e-6);
    }

    #[test]
    fn test_factor_types() {
        let shape = Shape::matrix(10, 40);
        let x = Xavier::new(1.0);
        assert!((x.with_factor_type(FactorType::In).scale(&shape).unwrap() - (1.0f32 / 40.0).sqrt()).abs() < 1e-6);
        assert!((x.with_factor_type(FactorType::Out).scale(&shape).unwrap() - (1.0f32 / 10.0).sqrt()).abs() < 1e-6);
    }

    #[test]
    fn test_weights_within_bounds() {
        let mut rng = StdRng::seed_from_u64(7);
        let x = Xavier::new(2.0);
        let shape = Shape::nchw(16, 8, 3, 3);
        let bound = x.scale(&shape).unwrap();
        let w = x.init_param(&def(ParamKind::Weight, shape), &mut rng).unwrap();
        assert!(w.as_slice().iter().all(|v| v.abs() <= bound));
        assert!(w.as_slice().iter().any(|&v| v != 0.0));
    }

    #[test]
    fn test_non_weight_defaults() {
        let mut rng = StdRng::seed_from_u64(0);
        let x = Xavier::new(2.0);
        for (kind, value) in [
            (ParamKind::Bias, 0.0),
            (ParamKind::Beta, 0.0),
            (ParamKind::MovingMean, 0.0),
            (ParamKind::Gamma, 1.0),
            (ParamKind::MovingVar, 1.0),
        ] {
            let t = x.init_param(&def(kind, Shape::vector(4)), &mut rng).unwrap();
            assert!(t.as_slice().iter().all(|&v| v == value), "{kind:?}");
        }
    }

    #[test]
    fn test_vector_weight_rejected() {
        let mut rng = StdRng::seed_from_u64(0);
        let err = Xavier::new(2.0)
            .init_param(&def(ParamKind::Weight, Shape::vector(4)), &mut rng)
            .unwrap_err();
        assert!(matches!(err, EngineError::Parameter { .. }));
    }
}
