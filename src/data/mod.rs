//! Data loading
//!
//! Reads labeled observation tables into an [`SvmDataset`](crate::core::SvmDataset).

pub mod csv;

pub use self::csv::*;
