//! Sigmoid (Tanh) Kernel Implementation
//!
//! The Sigmoid kernel is defined as:
//! K(x, y) = tanh(α * <x, y> + constant)
//!
//! Output is bounded to [-1, 1]. The kernel is not positive semi-definite for
//! every parameter choice, so the SMO step treats non-positive curvature as
//! unbounded and lets the box constraints limit the step.

use crate::core::{Observation, ParameterMap, ParameterRangeMap, Result};
use crate::kernel::traits::{required, KernelFunction};

/// Sigmoid (Hyperbolic Tangent) kernel
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SigmoidKernel {
    /// Scaling parameter for the dot product
    pub alpha: f64,
    /// Offset parameter
    pub constant: f64,
}

impl SigmoidKernel {
    pub const NAME: &'static str = "sigmoid";
    pub const ALPHA: &'static str = "alpha";
    pub const CONSTANT: &'static str = "constant";

    pub fn new(alpha: f64, constant: f64) -> Self {
        Self { alpha, constant }
    }
}

impl Default for SigmoidKernel {
    fn default() -> Self {
        Self::new(0.01, 0.0)
    }
}

impl KernelFunction for SigmoidKernel {
    fn name(&self) -> &'static str {
        Self::NAME
    }

    fn parameter_names(&self) -> &'static [&'static str] {
        &[Self::ALPHA, Self::CONSTANT]
    }

    fn default_parameter_ranges(&self) -> ParameterRangeMap {
        ParameterRangeMap::from([
            (Self::ALPHA.to_string(), vec![0.001, 0.01, 0.1, 1.0]),
            (Self::CONSTANT.to_string(), vec![-1.0, 0.0, 1.0]),
        ])
    }

    fn similarity(&self, a: &Observation, b: &Observation) -> f64 {
        (self.alpha * a.dot(b) + self.constant).tanh()
    }

    fn set_parameters(&mut self, parameters: &ParameterMap) -> Result<()> {
        self.alpha = required(parameters, Self::NAME, Self::ALPHA)?;
        self.constant = required(parameters, Self::NAME, Self::CONSTANT)?;
        Ok(())
    }

    fn parameters(&self) -> ParameterMap {
        ParameterMap::from([
            (Self::ALPHA.to_string(), self.alpha),
            (Self::CONSTANT.to_string(), self.constant),
        ])
    }
}
