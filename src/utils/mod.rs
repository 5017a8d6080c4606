//! Dataset preprocessing: feature scaling and low-variance feature filtering

use crate::core::{Feature, Observation, Result, SvmDataset, SvmError};

/// Column statistics
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FeatureStats {
    pub min: f64,
    pub max: f64,
    pub mean: f64,
    /// Sample standard deviation (n - 1 denominator); 0 for fewer than two values
    pub std: f64,
}

impl FeatureStats {
    pub fn from_values(values: &[f64]) -> Self {
        if values.is_empty() {
            return Self {
                min: 0.0,
                max: 0.0,
                mean: 0.0,
                std: 0.0,
            };
        }
        let min = values.iter().fold(f64::INFINITY, |a, &b| a.min(b));
        let max = values.iter().fold(f64::NEG_INFINITY, |a, &b| a.max(b));
        let mean = values.iter().sum::<f64>() / values.len() as f64;
        let variance = if values.len() > 1 {
            values.iter().map(|&x| (x - mean).powi(2)).sum::<f64>() / (values.len() - 1) as f64
        } else {
            0.0
        };
        Self {
            min,
            max,
            mean,
            std: variance.sqrt(),
        }
    }
}

/// Per-column statistics of a dataset
pub fn column_stats(dataset: &SvmDataset) -> Vec<FeatureStats> {
    (0..dataset.feature_count())
        .map(|i| FeatureStats::from_values(&dataset.column(i)))
        .collect()
}

/// Feature scaling
pub mod scaling {
    use super::*;
    use serde::{Deserialize, Serialize};
    use std::fmt;
    use std::str::FromStr;

    /// Scaling applied to every feature column
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
    #[serde(rename_all = "kebab-case")]
    pub enum ObservationTransform {
        /// (x - min) / (max - min), mapping each column onto [0, 1]
        ZeroOne,
        /// (x - mean) / std
        ZeroMeanUnitVariance,
    }

    impl ObservationTransform {
        /// Fit to `dataset` and rescale it in place
        pub fn apply_to(self, dataset: &mut SvmDataset) -> FittedTransform {
            let fitted = FittedTransform::fit(dataset, self);
            dataset.map_observations(|o| Observation::new(fitted.transform_values(o.values())));
            fitted
        }
    }

    impl fmt::Display for ObservationTransform {
        fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
            match self {
                ObservationTransform::ZeroOne => f.write_str("zero-one"),
                ObservationTransform::ZeroMeanUnitVariance => f.write_str("zero-mean"),
            }
        }
    }

    impl FromStr for ObservationTransform {
        type Err = SvmError;

        fn from_str(s: &str) -> Result<Self> {
            match s {
                "zero-one" | "zeroone" => Ok(ObservationTransform::ZeroOne),
                "zero-mean" | "zero-mean-unit-variance" | "zeromean" => {
                    Ok(ObservationTransform::ZeroMeanUnitVariance)
                }
                other => Err(SvmError::InvalidParameter(format!(
                    "unknown transform '{other}', expected 'zero-one' or 'zero-mean'"
                ))),
            }
        }
    }

    /// A transform together with the column statistics it was fitted on
    #[derive(Debug, Clone)]
    pub struct FittedTransform {
        pub transform: ObservationTransform,
        pub stats: Vec<FeatureStats>,
    }

    impl FittedTransform {
        pub fn fit(dataset: &SvmDataset, transform: ObservationTransform) -> Self {
            Self {
                transform,
                stats: column_stats(dataset),
            }
        }

        /// Rescale one observation; constant columns map to 0
        pub fn apply(&self, observation: &Observation) -> Result<Observation> {
            if observation.len() != self.stats.len() {
                return Err(SvmError::DimensionMismatch {
                    expected: self.stats.len(),
                    actual: observation.len(),
                });
            }
            Ok(Observation::new(self.transform_values(observation.values())))
        }

        fn transform_values(&self, values: &[f64]) -> Vec<f64> {
            values
                .iter()
                .zip(&self.stats)
                .map(|(&x, stats)| match self.transform {
                    ObservationTransform::ZeroOne => {
                        let range = stats.max - stats.min;
                        if range.abs() < 1e-12 {
                            0.0
                        } else {
                            (x - stats.min) / range
                        }
                    }
                    ObservationTransform::ZeroMeanUnitVariance => {
                        if stats.std < 1e-12 {
                            0.0
                        } else {
                            (x - stats.mean) / stats.std
                        }
                    }
                })
                .collect()
        }
    }
}

/// Feature selection by spread
pub mod filter {
    use super::*;

    /// Remove every feature whose sample standard deviation is below `threshold`
    ///
    /// Returns the removed features with their indices before removal. At
    /// least one feature must survive.
    pub fn remove_low_std_features(dataset: &mut SvmDataset, threshold: f64) -> Result<Vec<Feature>> {
        let stats = column_stats(dataset);
        let low: Vec<usize> = stats
            .iter()
            .enumerate()
            .filter(|(_, s)| s.std < threshold)
            .map(|(i, _)| i)
            .collect();
        if low.len() == dataset.feature_count() {
            return Err(SvmError::InvalidParameter(format!(
                "standard deviation threshold {threshold} removes every feature"
            )));
        }
        let removed = low.iter().map(|&i| dataset.features()[i].clone()).collect();
        dataset.remove_features(&low)?;
        Ok(removed)
    }
}

pub use self::filter::remove_low_std_features;
pub use self::scaling::{FittedTransform, ObservationTransform};
