//! Trainer configuration loaded from JSON

use crate::core::{KernelParameterRangeMap, ParameterRangeMap, Result, SvmError};
use crate::kernel::KernelKind;
use crate::solver::SmoConfig;
use crate::trainer::{
    resolve_kernel_ranges, DEFAULT_CACHE_SIZE, DEFAULT_EVALUATION_FOLD_COUNT,
    DEFAULT_TRAIN_FOLD_COUNT,
};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

/// Settings of the one-vs-one trainer and the SMO solver
///
/// Every field is optional in JSON:
///
/// ```json
/// {
///   "evaluation_fold_count": 3,
///   "train_fold_count": 5,
///   "smo": { "max_iterations": 1000, "min_step": 0.0001, "c_range": [0.1, 1.0, 10.0] },
///   "kernels": { "linear": { "constant": [0.0, 1.0] }, "rbf": {} },
///   "cache_size": 104857600,
///   "parallel": true
/// }
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TrainerConfig {
    pub evaluation_fold_count: usize,
    pub train_fold_count: usize,
    pub smo: SmoConfig,
    /// Kernels to search and their ranges; empty means every kernel with defaults
    pub kernels: KernelParameterRangeMap,
    /// Memory budget of each kernel cache, in bytes; every concurrent
    /// training task holds one cache
    pub cache_size: usize,
    pub parallel: bool,
}

impl Default for TrainerConfig {
    fn default() -> Self {
        Self {
            evaluation_fold_count: DEFAULT_EVALUATION_FOLD_COUNT,
            train_fold_count: DEFAULT_TRAIN_FOLD_COUNT,
            smo: SmoConfig::default(),
            kernels: KernelParameterRangeMap::new(),
            cache_size: DEFAULT_CACHE_SIZE,
            parallel: true,
        }
    }
}

impl TrainerConfig {
    pub fn from_json_str(json: &str) -> Result<Self> {
        let config: Self =
            serde_json::from_str(json).map_err(|e| SvmError::ConfigError(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_json_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let json = fs::read_to_string(path)?;
        Self::from_json_str(&json)
    }

    pub fn to_json_string(&self) -> Result<String> {
        serde_json::to_string_pretty(self).map_err(|e| SvmError::ConfigError(e.to_string()))
    }

    /// Check fold counts, SMO settings and kernel names
    pub fn validate(&self) -> Result<()> {
        if self.evaluation_fold_count < 2 || self.train_fold_count < 2 {
            return Err(SvmError::ConfigError(format!(
                "fold counts must be at least 2 (evaluation {}, train {})",
                self.evaluation_fold_count, self.train_fold_count
            )));
        }
        if self.smo.max_iterations == 0 {
            return Err(SvmError::ConfigError(
                "smo.max_iterations must be positive".to_string(),
            ));
        }
        if !(self.smo.min_step > 0.0) {
            return Err(SvmError::ConfigError(
                "smo.min_step must be positive".to_string(),
            ));
        }
        if self.smo.c_range.is_empty() || self.smo.c_range.iter().any(|&c| !(c > 0.0)) {
            return Err(SvmError::ConfigError(
                "smo.c_range must hold positive values".to_string(),
            ));
        }
        self.resolved_kernel_ranges().map(|_| ())
    }

    /// Kernel ranges completed with defaults and the `smoc` range
    pub fn resolved_kernel_ranges(&self) -> Result<KernelParameterRangeMap> {
        Ok(resolve_kernel_ranges(&self.kernels, &self.smo.c_range)?
            .into_iter()
            .map(|(kind, ranges)| (kind.name().to_string(), ranges))
            .collect())
    }

    /// Restrict the search to the named kernels, keeping configured ranges
    pub fn select_kernels(&mut self, kernels: &[KernelKind]) {
        if kernels.is_empty() {
            return;
        }
        self.kernels = kernels
            .iter()
            .map(|kind| {
                let ranges = self
                    .kernels
                    .get(kind.name())
                    .cloned()
                    .unwrap_or_else(ParameterRangeMap::new);
                (kind.name().to_string(), ranges)
            })
            .collect();
    }
}
