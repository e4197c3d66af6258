//! Remote client errors

use thiserror::Error;

/// Errors returned by [`crate::RemoteUsers`] calls
#[derive(Debug, Error)]
pub enum ClientError {
    /// The request never produced a response (connect failure, timeout, TLS)
    #[error("transport error: {source}")]
    Transport {
        /// Underlying HTTP client error
        #[source]
        source: reqwest::Error,
    },

    /// The remote answered with a status other than the documented success code
    #[error("{operation} returned unexpected status {status}")]
    UnexpectedStatus {
        /// The call that failed (create, update, delete)
        operation: &'static str,
        /// HTTP status code
        status: u16,
    },

    /// A fetch by id did not answer 200
    #[error("user {id} not found (status {status})")]
    NotFound {
        /// Requested remote id
        id: u64,
        /// HTTP status code
        status: u16,
    },

    /// A success response whose body could not be understood
    #[error("failed to decode response: {message}")]
    Decode {
        /// What was wrong with the body
        message: String,
    },
}

impl ClientError {
    /// Create a decode error
    pub fn decode(message: impl Into<String>) -> Self {
        Self::Decode {
            message: message.into(),
        }
    }

    /// Whether this is a not-found answer to a fetch
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }
}

impl From<reqwest::Error> for ClientError {
    fn from(source: reqwest::Error) -> Self {
        if source.is_decode() {
            Self::decode(source.to_string())
        } else {
            Self::Transport { source }
        }
    }
}
