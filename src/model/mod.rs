//! Trained models: two-class SVMs, their performance summaries and the
//! one-vs-one multiclass ensemble

pub mod multiclass;
pub mod performance;
pub mod svm;

pub use self::multiclass::*;
pub use self::performance::*;
pub use self::svm::*;
