//! Gaussian radial basis function kernel

use crate::core::{Observation, ParameterMap, ParameterRangeMap, Result};
use crate::kernel::traits::{required, KernelFunction};

/// K(a, b) = exp(-gamma · ‖a - b‖²), searched over `gamma`
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RbfKernel {
    gamma: f64,
}

impl RbfKernel {
    pub const NAME: &'static str = "rbf";
    pub const GAMMA: &'static str = "gamma";

    pub fn new(gamma: f64) -> Self {
        Self { gamma }
    }

    pub fn gamma(&self) -> f64 {
        self.gamma
    }
}

impl Default for RbfKernel {
    fn default() -> Self {
        Self::new(1.0)
    }
}

impl KernelFunction for RbfKernel {
    fn name(&self) -> &'static str {
        Self::NAME
    }

    fn parameter_names(&self) -> &'static [&'static str] {
        &[Self::GAMMA]
    }

    fn default_parameter_ranges(&self) -> ParameterRangeMap {
        ParameterRangeMap::from([(
            Self::GAMMA.to_string(),
            vec![0.0001, 0.001, 0.01, 0.1, 1.0, 10.0],
        )])
    }

    fn similarity(&self, a: &Observation, b: &Observation) -> f64 {
        (-self.gamma * a.squared_distance(b)).exp()
    }

    fn set_parameters(&mut self, parameters: &ParameterMap) -> Result<()> {
        self.gamma = required(parameters, Self::NAME, Self::GAMMA)?;
        Ok(())
    }

    fn parameters(&self) -> ParameterMap {
        ParameterMap::from([(Self::GAMMA.to_string(), self.gamma)])
    }
}
