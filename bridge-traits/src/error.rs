use std::time::Duration;
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum BridgeError {
    #[error("Resource not found: {0}")]
    NotFound(String),

    #[error("Operation timed out after {0:?}")]
    Timeout(Duration),

    #[error("Bridge capability not available: {0}")]
    NotAvailable(String),

    #[error("Bridge operation failed: {0}")]
    OperationFailed(String),
}

pub type Result<T> = std::result::Result<T, BridgeError>;
