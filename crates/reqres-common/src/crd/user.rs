//! User CRD types
//!
//! A `User` declares a user that should exist on the remote users API. The
//! controller owns `status`: the remote-assigned id and the last
//! reconciliation outcome.

use kube::CustomResource;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use super::types::Condition;
use crate::{ValidationError, USER_FINALIZER};

/// Desired state of a remote user
#[derive(CustomResource, Clone, Debug, Default, Deserialize, Serialize, JsonSchema, PartialEq)]
#[kube(
    group = "users.reqres.in",
    version = "v1alpha1",
    kind = "User",
    plural = "users",
    namespaced,
    status = "UserStatus",
    printcolumn = r#"{"name":"Email","type":"string","jsonPath":".spec.email"}"#,
    printcolumn = r#"{"name":"RemoteID","type":"integer","jsonPath":".status.remoteId"}"#,
    printcolumn = r#"{"name":"Status","type":"string","jsonPath":".status.conditions[0].type"}"#,
    printcolumn = r#"{"name":"Age","type":"date","jsonPath":".metadata.creationTimestamp"}"#
)]
#[serde(rename_all = "camelCase")]
pub struct UserSpec {
    /// Email address of the user
    pub email: String,

    /// First name of the user
    pub first_name: String,

    /// Last name of the user (empty when unset)
    #[serde(default)]
    pub last_name: String,

    /// Avatar URL. Assigned by the remote system and never pushed.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub avatar: Option<String>,
}

impl UserSpec {
    /// Check that this carries everything a remote create needs
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.email.trim().is_empty() {
            return Err(ValidationError::new("spec.email", "must not be empty"));
        }
        if self.first_name.trim().is_empty() {
            return Err(ValidationError::new("spec.firstName", "must not be empty"));
        }
        Ok(())
    }
}

/// Observed state of a User
#[derive(Clone, Debug, Default, Deserialize, Serialize, JsonSchema, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct UserStatus {
    /// Id assigned by the remote system. Zero until the first successful create.
    #[serde(default)]
    pub remote_id: u64,

    /// Outcome of the last reconciliation
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub conditions: Vec<Condition>,
}

impl UserStatus {
    /// Replace the current condition.
    ///
    /// `lastTransitionTime` is carried over from the previous condition when
    /// type and status are unchanged, so repeated passes with the same
    /// outcome write identical status.
    pub fn with_condition(mut self, mut condition: Condition) -> Self {
        if let Some(previous) = self.conditions.iter().find(|c| c.same_state(&condition)) {
            condition.last_transition_time = previous.last_transition_time;
        }
        self.conditions = vec![condition];
        self
    }

    /// Set the remote id
    pub fn with_remote_id(mut self, remote_id: u64) -> Self {
        self.remote_id = remote_id;
        self
    }

    /// The current condition, if any
    pub fn condition(&self) -> Option<&Condition> {
        self.conditions.first()
    }
}

impl User {
    /// Remote id recorded in status, zero when no remote user exists
    pub fn remote_id(&self) -> u64 {
        self.status.as_ref().map(|s| s.remote_id).unwrap_or(0)
    }

    /// Whether the user has been marked for deletion
    pub fn is_deleting(&self) -> bool {
        self.metadata.deletion_timestamp.is_some()
    }

    /// Whether the controller's finalizer is present
    pub fn has_finalizer(&self) -> bool {
        self.metadata
            .finalizers
            .as_ref()
            .is_some_and(|f| f.iter().any(|s| s == USER_FINALIZER))
    }

    /// Finalizer list with the controller's finalizer added
    pub fn finalizers_with_ours(&self) -> Vec<String> {
        let mut finalizers = self.metadata.finalizers.clone().unwrap_or_default();
        if !finalizers.iter().any(|s| s == USER_FINALIZER) {
            finalizers.push(USER_FINALIZER.to_string());
        }
        finalizers
    }

    /// Finalizer list with the controller's finalizer removed.
    ///
    /// Other finalizers keep their relative order.
    pub fn finalizers_without_ours(&self) -> Vec<String> {
        self.metadata
            .finalizers
            .as_ref()
            .map(|f| f.iter().filter(|s| *s != USER_FINALIZER).cloned().collect())
            .unwrap_or_default()
    }
}
