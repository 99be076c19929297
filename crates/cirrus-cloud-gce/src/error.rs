//! Compute Engine provider error types

use cirrus_cloud::CloudError;
use std::time::Duration;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum GceError {
    #[error("Resource not found: {0}")]
    NotFound(String),

    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    #[error("Could not {action}, operation {operation} failed with HTTP {status}: {message}")]
    OperationFailed {
        action: String,
        operation: String,
        status: u16,
        message: String,
    },

    #[error("Could not {action}, operation {operation} did not complete within {timeout:?}")]
    OperationTimeout {
        action: String,
        operation: String,
        timeout: Duration,
    },

    #[error("Compute API error: {0}")]
    Api(String),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, GceError>;

impl From<GceError> for CloudError {
    fn from(err: GceError) -> Self {
        match err {
            GceError::NotFound(what) => CloudError::ResourceNotFound(what),
            GceError::InvalidArgument(what) => CloudError::InvalidArgument(what),
            e @ GceError::OperationFailed { .. } => CloudError::OperationFailed(e.to_string()),
            e @ GceError::OperationTimeout { .. } => CloudError::Timeout(e.to_string()),
            e => CloudError::ApiError(e.to_string()),
        }
    }
}
