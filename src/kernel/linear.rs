//! Linear kernel implementation

use crate::core::{Observation, ParameterMap, ParameterRangeMap, Result};
use crate::kernel::traits::{required, KernelFunction};

/// Linear kernel: K(x, y) = x^T * y + constant
///
/// This is the only kernel whose decision function can be written as an
/// explicit weight vector, which recursive feature elimination relies on.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LinearKernel {
    constant: f64,
}

impl LinearKernel {
    pub const NAME: &'static str = "linear";
    pub const CONSTANT: &'static str = "constant";

    /// Create a new linear kernel
    pub fn new(constant: f64) -> Self {
        Self { constant }
    }

    pub fn constant(&self) -> f64 {
        self.constant
    }
}

impl Default for LinearKernel {
    fn default() -> Self {
        Self::new(0.0)
    }
}

impl KernelFunction for LinearKernel {
    fn name(&self) -> &'static str {
        Self::NAME
    }

    fn parameter_names(&self) -> &'static [&'static str] {
        &[Self::CONSTANT]
    }

    fn default_parameter_ranges(&self) -> ParameterRangeMap {
        ParameterRangeMap::from([(Self::CONSTANT.to_string(), vec![0.0, 1.0, 10.0])])
    }

    fn similarity(&self, a: &Observation, b: &Observation) -> f64 {
        a.dot(b) + self.constant
    }

    fn set_parameters(&mut self, parameters: &ParameterMap) -> Result<()> {
        self.constant = required(parameters, Self::NAME, Self::CONSTANT)?;
        Ok(())
    }

    fn parameters(&self) -> ParameterMap {
        ParameterMap::from([(Self::CONSTANT.to_string(), self.constant)])
    }
}
