//! Typed client for the reqres users REST API
//!
//! Four calls (create, get, update, delete) against one base URL. Each call
//! enforces the exact success status documented by the remote API and maps
//! everything else onto [`ClientError`]. The client holds no state beyond its
//! connection pool: no retries, no caching.

#![deny(missing_docs)]

mod client;
mod error;
mod types;

pub use client::{ClientConfig, RemoteUsers, ReqresClient, DEFAULT_TIMEOUT};
pub use error::ClientError;
pub use types::{RemoteUser, UserFields};
