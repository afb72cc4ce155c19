//! Validation Error Types

use thiserror::Error;

/// Errors during payload validation
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ValidationError {
    /// No records were supplied
    #[error("Empty or invalid input passed to preprocess")]
    EmptyInput,

    /// Missing required field
    #[error("Missing required field: {0}")]
    MissingField(&'static str),

    /// Field present but of the wrong shape
    #[error("Invalid value for {field}: {reason}")]
    InvalidFormat { field: String, reason: String },

    /// Date could not be parsed
    #[error("Unparsable date: {0:?}")]
    InvalidDate(String),
}
