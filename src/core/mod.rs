//! Core types and traits for SVM training

pub mod cancel;
pub mod error;
pub mod traits;
pub mod types;

pub use self::cancel::*;
pub use self::error::*;
pub use self::traits::*;
pub use self::types::*;
