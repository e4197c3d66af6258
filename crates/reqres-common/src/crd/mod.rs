//! Custom Resource Definitions for the reqres operator

mod types;
mod user;

pub use types::{reasons, Condition, ConditionStatus, CONDITION_AVAILABLE, CONDITION_UNAVAILABLE};
pub use user::{User, UserSpec, UserStatus};
