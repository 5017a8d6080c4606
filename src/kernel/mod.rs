//! Kernel functions for SVM

pub mod linear;
pub mod polynomial;
pub mod rbf;
pub mod sigmoid;
pub mod traits;

pub use self::linear::*;
pub use self::polynomial::*;
pub use self::rbf::*;
pub use self::sigmoid::*;
pub use self::traits::*;

use crate::core::{ParameterRangeMap, SvmError};
use std::fmt;
use std::str::FromStr;

/// The recognized kernel families, looked up by name key
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum KernelKind {
    Linear,
    Rbf,
    Polynomial,
    Sigmoid,
}

impl KernelKind {
    pub const ALL: [KernelKind; 4] = [
        KernelKind::Linear,
        KernelKind::Rbf,
        KernelKind::Polynomial,
        KernelKind::Sigmoid,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            KernelKind::Linear => LinearKernel::NAME,
            KernelKind::Rbf => RbfKernel::NAME,
            KernelKind::Polynomial => PolynomialKernel::NAME,
            KernelKind::Sigmoid => SigmoidKernel::NAME,
        }
    }

    /// A fresh kernel instance with default hyperparameters
    pub fn create(&self) -> Box<dyn KernelFunction> {
        match self {
            KernelKind::Linear => Box::new(LinearKernel::default()),
            KernelKind::Rbf => Box::new(RbfKernel::default()),
            KernelKind::Polynomial => Box::new(PolynomialKernel::default()),
            KernelKind::Sigmoid => Box::new(SigmoidKernel::default()),
        }
    }

    pub fn parameter_names(&self) -> &'static [&'static str] {
        self.create().parameter_names()
    }

    pub fn default_parameter_ranges(&self) -> ParameterRangeMap {
        self.create().default_parameter_ranges()
    }
}

impl fmt::Display for KernelKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for KernelKind {
    type Err = SvmError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        KernelKind::ALL
            .into_iter()
            .find(|k| k.name() == s)
            .ok_or_else(|| SvmError::UnknownKernel(s.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::Observation;

    #[test]
    fn test_kernel_kind_round_trip_names() {
        for kind in KernelKind::ALL {
            assert_eq!(kind.name().parse::<KernelKind>().unwrap(), kind);
            assert_eq!(kind.create().name(), kind.name());
        }
        assert!(matches!(
            "gaussian".parse::<KernelKind>(),
            Err(SvmError::UnknownKernel(_))
        ));
    }

    #[test]
    fn test_default_ranges_cover_parameter_names() {
        for kind in KernelKind::ALL {
            let ranges = kind.default_parameter_ranges();
            for name in kind.parameter_names() {
                let range = ranges.get(*name).expect("range for every parameter");
                assert!(!range.is_empty());
            }
            assert_eq!(ranges.len(), kind.parameter_names().len());
        }
    }

    #[test]
    fn test_all_kernels_are_symmetric() {
        let vectors = [
            Observation::new(vec![0.3, -1.2, 4.0, 0.0]),
            Observation::new(vec![2.5, 0.7, -0.4, 1.1]),
            Observation::new(vec![-3.0, 0.0, 0.25, 9.0]),
        ];
        let kernels: Vec<Box<dyn KernelFunction>> = vec![
            Box::new(LinearKernel::new(1.0)),
            Box::new(RbfKernel::new(0.3)),
            Box::new(PolynomialKernel::new(0.5, 1.0, 3.0)),
            Box::new(SigmoidKernel::new(0.1, -0.5)),
        ];

        for kernel in &kernels {
            for a in &vectors {
                for b in &vectors {
                    assert_eq!(
                        kernel.similarity(a, b),
                        kernel.similarity(b, a),
                        "{} kernel is not symmetric",
                        kernel.name()
                    );
                }
            }
        }
    }
}
