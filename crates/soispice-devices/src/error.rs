//! Error types for SOI device elaboration.
//!
//! Evaluation never fails; only model and instance elaboration can.

use thiserror::Error;

/// Errors raised while elaborating a model or an instance.
#[derive(Debug, Error)]
pub enum Error {
    /// A parameter value is outside its physical range.
    #[error("Invalid parameter: {0}")]
    InvalidParameter(String),

    /// A named parameter has an unusable value.
    #[error("Invalid value for {name}: {value}")]
    InvalidValue { name: String, value: f64 },

    /// A parameter name is not part of the table.
    #[error("Unknown parameter: {0}")]
    UnknownParameter(String),

    /// Per-instance storage could not be allocated.
    #[error("Allocation failed: {0}")]
    Allocation(String),
}

impl Error {
    /// Integer status reported to a host simulator.
    pub fn status(&self) -> i32 {
        match self {
            Error::Allocation(_) => -1,
            Error::InvalidParameter(_) | Error::InvalidValue { .. } => -2,
            Error::UnknownParameter(_) => -3,
        }
    }
}

/// Result type for elaboration.
pub type Result<T> = std::result::Result<T, Error>;
