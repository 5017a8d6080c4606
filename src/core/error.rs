//! Error types for SVM training and classification

use thiserror::Error;

#[derive(Error, Debug)]
pub enum SvmError {
    #[error("Invalid label count: expected {expected} distinct labels, found {found}")]
    InvalidLabelCount { expected: usize, found: usize },

    #[error("Invalid parameter: {0}")]
    InvalidParameter(String),

    #[error("Missing parameter '{parameter}' for kernel '{kernel}'")]
    MissingParameter { kernel: String, parameter: String },

    #[error("Unknown kernel: {0}")]
    UnknownKernel(String),

    #[error("Invalid model: {0}")]
    InvalidModel(String),

    #[error("Failed to train SVM on labels {first} and {second}")]
    LabelPairTrainingFailed { first: String, second: String },

    #[error("Unexpected label '{label}': expected '{negative}' or '{positive}'")]
    UnexpectedLabel {
        label: String,
        negative: String,
        positive: String,
    },

    #[error("Dimension mismatch: expected {expected}, got {actual}")]
    DimensionMismatch { expected: usize, actual: usize },

    #[error("Empty dataset")]
    EmptyDataset,

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Parse error: {0}")]
    ParseError(String),

    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("Serialization error: {0}")]
    SerializationError(String),
}

pub type Result<T> = std::result::Result<T, SvmError>;
