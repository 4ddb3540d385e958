//! Domain error types

use thiserror::Error;

/// Domain-level errors that can occur while building or validating definitions.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum DomainError {
    /// The HTTP method is not supported.
    #[error("unsupported HTTP method: {0}")]
    UnsupportedMethod(String),

    /// An identifier is invalid or empty.
    #[error("invalid identifier: {0}")]
    InvalidIdentifier(String),

    /// A definition field carries a value that cannot be used.
    #[error("invalid value for '{field}': {reason}")]
    InvalidValue {
        /// Name of the offending field.
        field: String,
        /// Why the value was rejected.
        reason: String,
    },
}

impl DomainError {
    /// Creates an `InvalidValue` error.
    pub fn invalid_value(field: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidValue {
            field: field.into(),
            reason: reason.into(),
        }
    }
}

/// Result type alias for domain operations.
pub type DomainResult<T> = Result<T, DomainError>;
