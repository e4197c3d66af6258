//! Common types for the reqres operator: the User CRD, conditions and telemetry

#![deny(missing_docs)]

pub mod crd;
pub mod error;
pub mod telemetry;

pub use error::ValidationError;

/// Finalizer that blocks removal of a User until its remote user is deleted
pub const USER_FINALIZER: &str = "users.reqres.in/finalizer";

/// Field manager used for every write the controller makes
pub const FIELD_MANAGER: &str = "reqres-controller";

/// Default base URL of the remote users API
pub const DEFAULT_REMOTE_BASE_URL: &str = "https://reqres.in";
