//! Kernel function trait definition

use crate::core::{Observation, ParameterMap, ParameterRangeMap, Result, SvmError};
use std::fmt::Debug;

/// Kernel function trait
///
/// A kernel function computes a similarity score between two observations,
/// parameterized by a small set of named hyperparameters. Apart from those
/// hyperparameters an implementation is stateless.
pub trait KernelFunction: Send + Sync + Debug {
    /// Name key of the kernel, e.g. `"rbf"`
    fn name(&self) -> &'static str;

    /// Names of the hyperparameters this kernel recognizes
    fn parameter_names(&self) -> &'static [&'static str];

    /// Default grid-search range for every recognized hyperparameter
    fn default_parameter_ranges(&self) -> ParameterRangeMap;

    /// Compute the similarity K(a, b)
    fn similarity(&self, a: &Observation, b: &Observation) -> f64;

    /// Replace the active hyperparameters
    ///
    /// Every recognized parameter must be present; unrelated keys (such as
    /// the trainer's `smoc`) are ignored.
    fn set_parameters(&mut self, parameters: &ParameterMap) -> Result<()>;

    /// The active hyperparameters
    fn parameters(&self) -> ParameterMap;
}

/// Look up a required kernel parameter
pub(crate) fn required(parameters: &ParameterMap, kernel: &str, name: &str) -> Result<f64> {
    parameters
        .get(name)
        .copied()
        .ok_or_else(|| SvmError::MissingParameter {
            kernel: kernel.to_string(),
            parameter: name.to_string(),
        })
}
