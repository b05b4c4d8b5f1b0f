//! Error types for the tsdataset crate

use polars::prelude::PolarsError;
use thiserror::Error;

/// Custom error types for the tsdataset crate
#[derive(Debug, Error)]
pub enum DatasetError {
    /// Invalid or missing column, wrong type for a schema field, or nulls in
    /// the identifier/timestamp columns
    #[error("Schema error: {0}")]
    SchemaError(String),

    /// Operation invoked out of order (export before roll, unscale before scale)
    #[error("State error: {0}")]
    StateError(String),

    /// Invalid window or strategy parameters
    #[error("Config error: {0}")]
    ConfigError(String),

    /// Tensor or matrix with an unexpected shape
    #[error("Invalid shape: expected {expected}, got {actual}")]
    ShapeError { expected: String, actual: String },

    /// Error from IO operations
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    /// Error from Polars operations
    #[error("Polars error: {0}")]
    PolarsError(String),

    /// Error from JSON (de)serialization
    #[error("Serialization error: {0}")]
    SerializationError(String),
}

/// Result type with our custom error
pub type Result<T> = std::result::Result<T, DatasetError>;

impl From<PolarsError> for DatasetError {
    fn from(err: PolarsError) -> Self {
        DatasetError::PolarsError(err.to_string())
    }
}

impl From<serde_json::Error> for DatasetError {
    fn from(err: serde_json::Error) -> Self {
        DatasetError::SerializationError(err.to_string())
    }
}

impl From<ndarray::ShapeError> for DatasetError {
    fn from(err: ndarray::ShapeError) -> Self {
        DatasetError::ShapeError {
            expected: "consistent array dimensions".to_string(),
            actual: err.to_string(),
        }
    }
}
