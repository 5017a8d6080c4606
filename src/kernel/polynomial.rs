//! Polynomial Kernel Implementation
//!
//! The polynomial kernel is defined as:
//! K(x, y) = (coefficient * <x, y> + constant)^degree
//!
//! Where:
//! - coefficient: scaling factor for the dot product
//! - constant: independent term in the polynomial
//! - degree: degree of the polynomial
//!
//! Common configurations:
//! - Linear kernel: degree=1, coefficient=1, constant=0
//! - Quadratic kernel: degree=2, coefficient=1, constant=1

use crate::core::{Observation, ParameterMap, ParameterRangeMap, Result};
use crate::kernel::traits::{required, KernelFunction};

/// Polynomial kernel with configurable degree, coefficient, and constant
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PolynomialKernel {
    /// Scaling factor for the dot product
    pub coefficient: f64,
    /// Independent term in the polynomial
    pub constant: f64,
    /// Degree of the polynomial; integral values use fast integer powers
    pub degree: f64,
}

impl PolynomialKernel {
    pub const NAME: &'static str = "polynomial";
    pub const CONSTANT: &'static str = "constant";
    pub const COEFFICIENT: &'static str = "coefficient";
    pub const DEGREE: &'static str = "degree";

    /// Creates a new polynomial kernel with the specified parameters
    ///
    /// # Examples
    /// ```
    /// use mcsvm::kernel::PolynomialKernel;
    ///
    /// // Quadratic kernel: (x·y + 1)²
    /// let quad_kernel = PolynomialKernel::new(1.0, 1.0, 2.0);
    /// assert_eq!(quad_kernel.degree, 2.0);
    /// ```
    pub fn new(coefficient: f64, constant: f64, degree: f64) -> Self {
        Self {
            coefficient,
            constant,
            degree,
        }
    }
}

impl Default for PolynomialKernel {
    /// Quadratic kernel (x·y + 1)²
    fn default() -> Self {
        Self::new(1.0, 1.0, 2.0)
    }
}

impl KernelFunction for PolynomialKernel {
    fn name(&self) -> &'static str {
        Self::NAME
    }

    fn parameter_names(&self) -> &'static [&'static str] {
        &[Self::CONSTANT, Self::COEFFICIENT, Self::DEGREE]
    }

    fn default_parameter_ranges(&self) -> ParameterRangeMap {
        ParameterRangeMap::from([
            (Self::CONSTANT.to_string(), vec![0.0, 1.0, 2.0]),
            (Self::COEFFICIENT.to_string(), vec![0.01, 0.1, 1.0]),
            (Self::DEGREE.to_string(), vec![2.0, 3.0, 4.0]),
        ])
    }

    fn similarity(&self, a: &Observation, b: &Observation) -> f64 {
        let base = self.coefficient * a.dot(b) + self.constant;
        if self.degree.fract() == 0.0 {
            base.powi(self.degree as i32)
        } else {
            base.powf(self.degree)
        }
    }

    fn set_parameters(&mut self, parameters: &ParameterMap) -> Result<()> {
        self.constant = required(parameters, Self::NAME, Self::CONSTANT)?;
        self.coefficient = required(parameters, Self::NAME, Self::COEFFICIENT)?;
        self.degree = required(parameters, Self::NAME, Self::DEGREE)?;
        Ok(())
    }

    fn parameters(&self) -> ParameterMap {
        ParameterMap::from([
            (Self::CONSTANT.to_string(), self.constant),
            (Self::COEFFICIENT.to_string(), self.coefficient),
            (Self::DEGREE.to_string(), self.degree),
        ])
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_polynomial_kernel_basic() {
        let kernel = PolynomialKernel::new(1.0, 1.0, 2.0);

        let x = Observation::new(vec![1.0, 2.0]);
        let y = Observation::new(vec![3.0, 4.0]);

        // <x, y> = 11 -> (11 + 1)^2 = 144
        assert_relative_eq!(kernel.similarity(&x, &y), 144.0);
    }

    #[test]
    fn test_polynomial_kernel_degree_one_matches_linear() {
        let kernel = PolynomialKernel::new(1.0, 0.0, 1.0);
        let x = Observation::new(vec![1.0, -2.0, 0.5]);
        let y = Observation::new(vec![2.0, 1.0, 4.0]);
        assert_relative_eq!(kernel.similarity(&x, &y), x.dot(&y));
    }

    #[test]
    fn test_polynomial_kernel_coefficient_scaling() {
        let kernel = PolynomialKernel::new(0.5, 1.0, 3.0);
        let x = Observation::new(vec![2.0]);
        let y = Observation::new(vec![2.0]);

        // (0.5 * 4 + 1)^3 = 27
        assert_relative_eq!(kernel.similarity(&x, &y), 27.0);
    }

    #[test]
    fn test_polynomial_kernel_fractional_degree() {
        let kernel = PolynomialKernel::new(1.0, 0.0, 0.5);
        let x = Observation::new(vec![2.0, 0.0]);
        let y = Observation::new(vec![8.0, 0.0]);

        // sqrt(16) = 4
        assert_relative_eq!(kernel.similarity(&x, &y), 4.0);
    }

    #[test]
    fn test_set_parameters_reads_all_three() {
        let mut kernel = PolynomialKernel::default();
        let params = ParameterMap::from([
            ("constant".to_string(), 2.0),
            ("coefficient".to_string(), 0.1),
            ("degree".to_string(), 4.0),
        ]);
        kernel.set_parameters(&params).unwrap();
        assert_eq!(kernel, PolynomialKernel::new(0.1, 2.0, 4.0));
        assert_eq!(kernel.parameters(), params);
    }
}
