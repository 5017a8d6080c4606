//! Two-class SVM solver
//!
//! Sequential Minimal Optimization with maximal-violating-pair working set
//! selection, after Bottou and Lin, "Support Vector Machine Solvers".

pub mod smo;

pub use self::smo::*;
