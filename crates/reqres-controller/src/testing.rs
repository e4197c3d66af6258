//! Fixtures shared by the controller tests

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Mutex;

use async_trait::async_trait;
use k8s_openapi::apimachinery::pkg::apis::meta::v1::{ObjectMeta, Time};
use mockall::mock;

use reqres_client::{ClientError, RemoteUser, RemoteUsers, UserFields};
use reqres_common::crd::{User, UserSpec, UserStatus};
use reqres_common::USER_FINALIZER;

use crate::error::StoreError;
use crate::store::{RecordKey, UserStore};

mock! {
    pub Remote {}

    #[async_trait::async_trait]
    impl RemoteUsers for Remote {
        async fn create(&self, fields: &UserFields) -> Result<RemoteUser, ClientError>;
        async fn get(&self, id: u64) -> Result<RemoteUser, ClientError>;
        async fn update(&self, id: u64, fields: &UserFields) -> Result<(), ClientError>;
        async fn delete(&self, id: u64) -> Result<bool, ClientError>;
    }
}

pub fn key() -> RecordKey {
    RecordKey::new("default", "x")
}

/// A fresh record as submitted by a user: no status, no finalizer
pub fn sample_user(email: &str, first_name: &str) -> User {
    User {
        metadata: ObjectMeta {
            name: Some("x".to_string()),
            namespace: Some("default".to_string()),
            resource_version: Some("1".to_string()),
            ..Default::default()
        },
        spec: UserSpec {
            email: email.to_string(),
            first_name: first_name.to_string(),
            ..Default::default()
        },
        status: None,
    }
}

/// A record that already owns remote user `remote_id`
pub fn synced_user(remote_id: u64) -> User {
    let mut user = sample_user("x@y.com", "X");
    user.metadata.finalizers = Some(vec![USER_FINALIZER.to_string()]);
    user.status = Some(UserStatus::default().with_remote_id(remote_id));
    user
}

/// `user` with deletion requested
pub fn deleting(mut user: User) -> User {
    user.metadata.deletion_timestamp = Some(Time(chrono::Utc::now()));
    user
}

/// Remote copy of `user` as the API would return it
pub fn remote_copy(user: &User) -> RemoteUser {
    RemoteUser {
        id: user.remote_id(),
        email: user.spec.email.clone(),
        first_name: user.spec.first_name.clone(),
        last_name: user.spec.last_name.clone(),
        avatar: "https://reqres.in/img/faces/1-image.jpg".to_string(),
    }
}

/// In-memory store that behaves like the API server for a single record:
/// writes must carry the current resourceVersion and bump it, and dropping
/// the last finalizer of a deleting record removes it.
#[derive(Default)]
pub struct FakeStore {
    record: Mutex<Option<User>>,
    status_writes: Mutex<Vec<UserStatus>>,
    finalizer_writes: Mutex<Vec<Vec<String>>>,
    conflict_next_write: AtomicBool,
}

impl FakeStore {
    pub fn with(user: User) -> Self {
        Self {
            record: Mutex::new(Some(user)),
            ..Default::default()
        }
    }

    pub fn current(&self) -> Option<User> {
        self.record.lock().unwrap().clone()
    }

    pub fn status(&self) -> UserStatus {
        self.current()
            .and_then(|u| u.status)
            .expect("record has status")
    }

    pub fn status_writes(&self) -> Vec<UserStatus> {
        self.status_writes.lock().unwrap().clone()
    }

    pub fn finalizer_writes(&self) -> Vec<Vec<String>> {
        self.finalizer_writes.lock().unwrap().clone()
    }

    /// Reject the next write as if another writer got there first
    pub fn conflict_next_write(&self) {
        self.conflict_next_write.store(true, Ordering::SeqCst);
    }

    /// Simulate another writer touching the record
    pub fn touch(&self) {
        if let Some(user) = self.record.lock().unwrap().as_mut() {
            bump(user);
        }
    }

    fn check_version(&self, stored: &User, user: &User) -> Result<(), StoreError> {
        if self.conflict_next_write.swap(false, Ordering::SeqCst)
            || stored.metadata.resource_version != user.metadata.resource_version
        {
            return Err(StoreError::Conflict {
                key: key().to_string(),
            });
        }
        Ok(())
    }
}

fn bump(user: &mut User) {
    let version: u64 = user
        .metadata
        .resource_version
        .as_deref()
        .and_then(|v| v.parse().ok())
        .unwrap_or(0);
    user.metadata.resource_version = Some((version + 1).to_string());
}

fn not_found() -> StoreError {
    StoreError::NotFound {
        key: key().to_string(),
    }
}

#[async_trait]
impl UserStore for FakeStore {
    async fn get(&self, _key: &RecordKey) -> Result<User, StoreError> {
        self.current().ok_or_else(not_found)
    }

    async fn update_status(&self, user: &User, status: &UserStatus) -> Result<(), StoreError> {
        let mut record = self.record.lock().unwrap();
        let stored = record.as_mut().ok_or_else(not_found)?;
        self.check_version(stored, user)?;

        if stored.status.as_ref() != Some(status) {
            stored.status = Some(status.clone());
            bump(stored);
        }
        self.status_writes.lock().unwrap().push(status.clone());
        Ok(())
    }

    async fn update_finalizers(
        &self,
        user: &User,
        finalizers: Vec<String>,
    ) -> Result<User, StoreError> {
        let mut record = self.record.lock().unwrap();
        let stored = record.as_mut().ok_or_else(not_found)?;
        self.check_version(stored, user)?;

        stored.metadata.finalizers = Some(finalizers.clone());
        bump(stored);
        let updated = stored.clone();
        self.finalizer_writes.lock().unwrap().push(finalizers.clone());

        if finalizers.is_empty() && updated.is_deleting() {
            *record = None;
        }
        Ok(updated)
    }
}
