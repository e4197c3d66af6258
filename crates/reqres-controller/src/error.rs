//! Controller error types

use thiserror::Error;

/// Failures talking to the desired-state store
#[derive(Debug, Error)]
pub enum StoreError {
    /// The record no longer exists
    #[error("user {key} not found")]
    NotFound {
        /// `namespace/name` of the record
        key: String,
    },

    /// The write carried a stale resourceVersion
    #[error("user {key} was modified concurrently")]
    Conflict {
        /// `namespace/name` of the record
        key: String,
    },

    /// Any other API failure
    #[error("kubernetes error: {source}")]
    Kube {
        /// Underlying kube error
        #[from]
        source: kube::Error,
    },

    /// The record lacks metadata needed to address it
    #[error("user record has no {0}")]
    InvalidRecord(&'static str),
}

/// Errors that end a reconcile in `error_policy`
#[derive(Debug, Error)]
pub enum Error {
    /// The record could not be read
    #[error("store error: {0}")]
    Store(#[from] StoreError),

    /// The watched object has no namespace
    #[error("missing namespace on User")]
    MissingNamespace,
}
