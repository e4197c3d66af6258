//! reqres operator: watches `User` resources and keeps the remote users API in sync

#![deny(missing_docs)]

/// Environment configuration
pub mod config;
/// Controller wiring for kube-runtime
pub mod controller_runner;
/// Startup utilities (CRD install)
pub mod startup;

pub use config::{ConfigError, OperatorConfig};
