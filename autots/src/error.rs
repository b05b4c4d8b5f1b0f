//! Error types for the autots crate

use thiserror::Error;
use tsdataset::DatasetError;

/// Custom error types for the autots crate
#[derive(Debug, Error)]
pub enum AutoTsError {
    /// Error raised by the underlying dataset
    #[error("Dataset error: {0}")]
    Dataset(#[from] DatasetError),

    /// Invalid trial configuration or stop criteria
    #[error("Config error: {0}")]
    ConfigError(String),

    /// Unknown metric or tensors that cannot be compared
    #[error("Metric error: {0}")]
    MetricError(String),

    /// Error from JSON (de)serialization
    #[error("Serialization error: {0}")]
    SerializationError(String),
}

/// Result type with our custom error
pub type Result<T> = std::result::Result<T, AutoTsError>;

impl From<serde_json::Error> for AutoTsError {
    fn from(err: serde_json::Error) -> Self {
        AutoTsError::SerializationError(err.to_string())
    }
}
