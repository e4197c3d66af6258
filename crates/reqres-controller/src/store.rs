//! Desired-state store for User records
//!
//! The reconciler reads and writes records only through [`UserStore`]. Every
//! write carries the record's `resourceVersion`, so a write based on a stale
//! read is rejected with [`StoreError::Conflict`] instead of clobbering a
//! concurrent change.

use std::fmt;

use async_trait::async_trait;
use kube::api::{Api, Patch, PatchParams};
use kube::{Client, ResourceExt};
#[cfg(test)]
use mockall::automock;
use serde_json::{json, Value};

use reqres_common::crd::{User, UserStatus};
use reqres_common::FIELD_MANAGER;

use crate::error::StoreError;

/// Identity of a User record
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct RecordKey {
    /// Namespace of the record
    pub namespace: String,
    /// Name of the record
    pub name: String,
}

impl RecordKey {
    /// Key for `namespace/name`
    pub fn new(namespace: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            namespace: namespace.into(),
            name: name.into(),
        }
    }

    /// Key of an existing record. Fails for records without a namespace.
    pub fn for_user(user: &User) -> Result<Self, StoreError> {
        let namespace = user
            .namespace()
            .ok_or(StoreError::InvalidRecord("namespace"))?;
        Ok(Self::new(namespace, user.name_any()))
    }
}

impl fmt::Display for RecordKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.namespace, self.name)
    }
}

/// Read and conditionally write User records
#[cfg_attr(test, automock)]
#[async_trait]
pub trait UserStore: Send + Sync {
    /// Fetch the current record
    async fn get(&self, key: &RecordKey) -> Result<User, StoreError>;

    /// Replace the status of `user`
    async fn update_status(&self, user: &User, status: &UserStatus) -> Result<(), StoreError>;

    /// Replace the finalizer list of `user`, returning the updated record
    async fn update_finalizers(
        &self,
        user: &User,
        finalizers: Vec<String>,
    ) -> Result<User, StoreError>;
}

/// [`UserStore`] backed by the Kubernetes API
#[derive(Clone)]
pub struct KubeUserStore {
    client: Client,
}

impl KubeUserStore {
    /// Create a store using `client`
    pub fn new(client: Client) -> Self {
        Self { client }
    }

    fn api(&self, namespace: &str) -> Api<User> {
        Api::namespaced(self.client.clone(), namespace)
    }
}

#[async_trait]
impl UserStore for KubeUserStore {
    async fn get(&self, key: &RecordKey) -> Result<User, StoreError> {
        self.api(&key.namespace)
            .get_opt(&key.name)
            .await?
            .ok_or_else(|| StoreError::NotFound {
                key: key.to_string(),
            })
    }

    async fn update_status(&self, user: &User, status: &UserStatus) -> Result<(), StoreError> {
        let key = RecordKey::for_user(user)?;
        let patch = with_resource_version(json!({ "status": status }), user);

        self.api(&key.namespace)
            .patch_status(
                &key.name,
                &PatchParams::apply(FIELD_MANAGER),
                &Patch::Merge(&patch),
            )
            .await
            .map_err(|e| classify(e, &key))?;
        Ok(())
    }

    async fn update_finalizers(
        &self,
        user: &User,
        finalizers: Vec<String>,
    ) -> Result<User, StoreError> {
        let key = RecordKey::for_user(user)?;
        let patch = with_resource_version(
            json!({ "metadata": { "finalizers": finalizers } }),
            user,
        );

        self.api(&key.namespace)
            .patch(
                &key.name,
                &PatchParams::apply(FIELD_MANAGER),
                &Patch::Merge(&patch),
            )
            .await
            .map_err(|e| classify(e, &key))
    }
}

/// Add `metadata.resourceVersion` as a write precondition when the record has one
fn with_resource_version(mut patch: Value, user: &User) -> Value {
    if let Some(version) = &user.metadata.resource_version {
        patch["metadata"]["resourceVersion"] = Value::String(version.clone());
    }
    patch
}

fn classify(error: kube::Error, key: &RecordKey) -> StoreError {
    let code = match &error {
        kube::Error::Api(response) => Some(response.code),
        _ => None,
    };
    match code {
        Some(404) => StoreError::NotFound {
            key: key.to_string(),
        },
        Some(409) => StoreError::Conflict {
            key: key.to_string(),
        },
        _ => StoreError::Kube { source: error },
    }
}
