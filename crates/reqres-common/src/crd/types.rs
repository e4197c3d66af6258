//! Status condition types shared by reqres resources

use chrono::{DateTime, Utc};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// Condition type reported while the remote user exists and matches its User
pub const CONDITION_AVAILABLE: &str = "Available";

/// Condition type reported when the remote user could not be fetched
pub const CONDITION_UNAVAILABLE: &str = "Unavailable";

/// Machine-readable condition reasons
pub mod reasons {
    /// The remote user was created in this pass
    pub const CREATED: &str = "created";
    /// The remote user already matched the User
    pub const SYNCED: &str = "synced";
    /// The remote user had drifted and was patched
    pub const UPDATED: &str = "updated";
    /// `email` or `firstName` is empty, nothing was pushed
    pub const INVALID: &str = "invalid";
    /// The remote system answered the fetch with a non-success status
    pub const NOT_FOUND: &str = "notFound";
    /// The remote system could not be reached
    pub const UNREACHABLE: &str = "unreachable";
}

/// Condition status following Kubernetes conventions
#[derive(Clone, Copy, Debug, Default, Deserialize, Serialize, JsonSchema, PartialEq, Eq)]
pub enum ConditionStatus {
    /// Condition is true
    True,
    /// Condition is false
    False,
    /// Condition status is unknown
    #[default]
    Unknown,
}

impl std::fmt::Display for ConditionStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::True => write!(f, "True"),
            Self::False => write!(f, "False"),
            Self::Unknown => write!(f, "Unknown"),
        }
    }
}

/// Kubernetes-style condition for status reporting
#[derive(Clone, Debug, Deserialize, Serialize, JsonSchema, PartialEq)]
pub struct Condition {
    /// Type of condition (Available, Unavailable)
    #[serde(rename = "type")]
    pub type_: String,

    /// Status of the condition (True, False, Unknown)
    pub status: ConditionStatus,

    /// Machine-readable reason for the condition
    pub reason: String,

    /// Human-readable message
    pub message: String,

    /// Last time the condition transitioned
    #[serde(rename = "lastTransitionTime")]
    pub last_transition_time: DateTime<Utc>,
}

impl Condition {
    /// Create a new condition with the current timestamp
    pub fn new(
        type_: impl Into<String>,
        status: ConditionStatus,
        reason: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        Self {
            type_: type_.into(),
            status,
            reason: reason.into(),
            message: message.into(),
            last_transition_time: Utc::now(),
        }
    }

    /// `Available` condition with the given status
    pub fn available(
        status: ConditionStatus,
        reason: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        Self::new(CONDITION_AVAILABLE, status, reason, message)
    }

    /// `Unavailable/Unknown` condition: the remote user may or may not still exist
    pub fn unavailable(reason: impl Into<String>, message: impl Into<String>) -> Self {
        Self::new(CONDITION_UNAVAILABLE, ConditionStatus::Unknown, reason, message)
    }

    /// Whether `other` describes the same state (type and status)
    pub fn same_state(&self, other: &Condition) -> bool {
        self.type_ == other.type_ && self.status == other.status
    }
}
