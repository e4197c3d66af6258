//! User reconciliation for the reqres operator
//!
//! [`Reconciler`] runs one pass of the state machine for a single record and
//! reports a three-valued [`Outcome`]. [`controller`] adapts it to
//! `kube::runtime::Controller`, turning outcomes into requeue actions with
//! per-key backoff.

pub mod backoff;
pub mod controller;
pub mod error;
pub mod reconciler;
pub mod store;

#[cfg(test)]
mod testing;

pub use backoff::KeyBackoff;
pub use controller::{error_policy, reconcile, Context};
pub use error::{Error, StoreError};
pub use reconciler::{desired_fields, Outcome, Reconciler, ReconcilerConfig};
pub use store::{KubeUserStore, RecordKey, UserStore};
