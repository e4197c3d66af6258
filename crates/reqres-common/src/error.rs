//! Validation errors for User specs

use thiserror::Error;

/// A User spec that cannot be pushed to the remote system
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("invalid spec field {field}: {message}")]
pub struct ValidationError {
    /// The offending field path (e.g., "spec.email")
    pub field: &'static str,
    /// Description of what's invalid
    pub message: String,
}

impl ValidationError {
    /// Create a validation error for a field
    pub fn new(field: &'static str, message: impl Into<String>) -> Self {
        Self {
            field,
            message: message.into(),
        }
    }
}
