//! One-vs-one multiclass Support Vector Machines
//!
//! Two-class SVMs are trained with Sequential Minimal Optimization (after
//! Bottou and Lin, "Support Vector Machine Solvers"), combined by majority
//! vote, tuned by nested K-fold grid search and used for recursive feature
//! elimination (Guyon et al., "Gene Selection for Cancer Classification
//! using Support Vector Machines").

pub mod cache;
pub mod config;
pub mod core;
pub mod data;
pub mod kernel;
pub mod model;
pub mod report;
pub mod rfe;
pub mod solver;
pub mod trainer;
pub mod utils;

// Re-export main types for convenience
pub use crate::cache::{CacheStats, KernelFunctionCache};
pub use crate::config::TrainerConfig;
pub use crate::core::traits::*;
pub use crate::core::types::*;
pub use crate::core::{CancellationToken, Result, SvmError};
pub use crate::data::{load_csv, CsvReader};
pub use crate::kernel::{KernelFunction, KernelKind};
pub use crate::model::{ClassificationTie, MultiClassSvm, Svm, SvmPerformanceSummary};
pub use crate::report::{RfeReport, TrainingReport};
pub use crate::rfe::{RankedFeatureList, SvmRfe};
pub use crate::solver::{SmoConfig, SmoTrainer};
pub use crate::trainer::OneVsOneMultiClassSvmTrainer;
pub use crate::utils::ObservationTransform;

// Version info
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
