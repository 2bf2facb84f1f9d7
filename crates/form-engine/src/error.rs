//! Error types for form-engine operations.

use thiserror::Error;

/// Errors raised while loading form definitions.
#[derive(Error, Debug)]
pub enum FormError {
    /// The field list was not valid JSON or did not match the field model.
    #[error("Invalid form definition: {0}")]
    Parse(#[from] serde_json::Error),

    /// A step id was requested that the schema does not contain.
    #[error("Unknown step: {0}")]
    UnknownStep(String),
}

/// Errors raised by key-value storage adapters.
#[derive(Error, Debug)]
pub enum StoreError {
    #[error("Storage I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Storage serialization error: {0}")]
    Serialize(#[from] serde_json::Error),
}

/// Convenience alias used throughout form-engine.
pub type Result<T> = std::result::Result<T, FormError>;
