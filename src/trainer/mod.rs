//! Multiclass training: hyperparameter grids, K-fold splitting and the
//! one-vs-one trainer

pub mod grid;
pub mod kfold;
pub mod one_vs_one;

pub use self::grid::*;
pub use self::kfold::*;
pub use self::one_vs_one::*;
