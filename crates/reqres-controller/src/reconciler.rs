//! The User reconciliation state machine
//!
//! One pass reads the record, decides where it stands from
//! `deletionTimestamp`, `status.remoteId` and the finalizer, drives the remote
//! user one step toward the declared state, and writes the outcome back to
//! status:
//!
//! - record gone, or deleting without our finalizer: nothing to do
//! - deleting with our finalizer: delete remotely, then drop the finalizer
//! - `remoteId == 0`: create remotely, attach the finalizer, record the id
//! - `remoteId > 0`: fetch, compare, patch on drift
//!
//! Retry scheduling is left to the caller through [`Outcome`].

use std::sync::Arc;
use std::time::Duration;

use tracing::{debug, info, instrument, warn};

use reqres_client::{RemoteUsers, UserFields};
use reqres_common::crd::{reasons, Condition, ConditionStatus, User, UserSpec, UserStatus};

use crate::error::{Error, StoreError};
use crate::store::{RecordKey, UserStore};

/// Result of a single reconcile pass
#[derive(Debug)]
pub enum Outcome {
    /// Remote state matches the record (or there is nothing left to do)
    Converged,
    /// Try again after at least this long
    RetryAfter(Duration),
    /// The pass could not run at all
    Fatal(Error),
}

/// Timing knobs for [`Reconciler`]
#[derive(Clone, Debug)]
pub struct ReconcilerConfig {
    /// Delay requested after a failed remote call
    pub retry_delay: Duration,
    /// Delay requested after a store write lost an optimistic-concurrency race
    pub conflict_delay: Duration,
}

impl Default for ReconcilerConfig {
    fn default() -> Self {
        Self {
            retry_delay: Duration::from_secs(10),
            conflict_delay: Duration::from_secs(1),
        }
    }
}

/// Fields pushed to the remote system for `spec`
pub fn desired_fields(spec: &UserSpec) -> UserFields {
    UserFields {
        email: spec.email.clone(),
        first_name: spec.first_name.clone(),
        last_name: spec.last_name.clone(),
    }
}

/// Drives remote users toward their User records
pub struct Reconciler {
    store: Arc<dyn UserStore>,
    remote: Arc<dyn RemoteUsers>,
    config: ReconcilerConfig,
}

impl Reconciler {
    /// Create a reconciler over a store and a remote client
    pub fn new(
        store: Arc<dyn UserStore>,
        remote: Arc<dyn RemoteUsers>,
        config: ReconcilerConfig,
    ) -> Self {
        Self {
            store,
            remote,
            config,
        }
    }

    /// Timing configuration in use
    pub fn config(&self) -> &ReconcilerConfig {
        &self.config
    }

    /// Run one pass for the record at `key`
    #[instrument(skip(self, key), fields(user = %key))]
    pub async fn reconcile(&self, key: &RecordKey) -> Outcome {
        let user = match self.store.get(key).await {
            Ok(user) => user,
            Err(StoreError::NotFound { .. }) => {
                debug!("user no longer exists");
                return Outcome::Converged;
            }
            Err(e) => return Outcome::Fatal(e.into()),
        };

        if user.is_deleting() {
            self.finalize(user).await
        } else if user.remote_id() == 0 {
            self.create(user).await
        } else {
            self.sync(user).await
        }
    }

    async fn finalize(&self, user: User) -> Outcome {
        if !user.has_finalizer() {
            debug!("user deleted, finalizer already released");
            return Outcome::Converged;
        }

        let remote_id = user.remote_id();
        if remote_id > 0 {
            match self.remote.delete(remote_id).await {
                Ok(true) => info!(remote_id, "remote user deleted"),
                Ok(false) => {
                    warn!(remote_id, "remote delete not confirmed, keeping finalizer");
                    return Outcome::RetryAfter(self.config.retry_delay);
                }
                Err(e) => {
                    warn!(remote_id, error = %e, "remote delete failed, keeping finalizer");
                    return Outcome::RetryAfter(self.config.retry_delay);
                }
            }
        } else {
            debug!("no remote user was ever recorded");
        }

        match self
            .store
            .update_finalizers(&user, user.finalizers_without_ours())
            .await
        {
            Ok(_) => {
                info!("finalizer removed");
                Outcome::Converged
            }
            Err(e) => self.store_write_failed(e, "remove finalizer"),
        }
    }

    async fn create(&self, user: User) -> Outcome {
        let status = user.status.clone().unwrap_or_default();

        if let Err(e) = user.spec.validate() {
            info!(error = %e, "spec incomplete, not creating remote user");
            let status = status.with_condition(Condition::available(
                ConditionStatus::False,
                reasons::INVALID,
                e.to_string(),
            ));
            return self.persist_status(&user, status, Outcome::Converged).await;
        }

        // the finalizer goes on before any remote user exists
        let user = match self.ensure_finalizer(user).await {
            Ok(user) => user,
            Err(e) => return self.store_write_failed(e, "attach finalizer"),
        };

        let created = match self.remote.create(&desired_fields(&user.spec)).await {
            Ok(created) => created,
            Err(e) => {
                warn!(error = %e, "remote create failed");
                return Outcome::RetryAfter(self.config.retry_delay);
            }
        };
        info!(remote_id = created.id, "remote user created");

        let status = status
            .with_remote_id(created.id)
            .with_condition(Condition::available(
                ConditionStatus::True,
                reasons::CREATED,
                format!("remote user {} created", created.id),
            ));
        self.persist_status(&user, status, Outcome::Converged).await
    }

    async fn sync(&self, user: User) -> Outcome {
        let user = match self.ensure_finalizer(user).await {
            Ok(user) => user,
            Err(e) => return self.store_write_failed(e, "attach finalizer"),
        };
        let status = user.status.clone().unwrap_or_default();
        let remote_id = status.remote_id;

        let remote = match self.remote.get(remote_id).await {
            Ok(remote) => remote,
            Err(e) => {
                let (reason, message) = if e.is_not_found() {
                    (reasons::NOT_FOUND, format!("remote user {remote_id} not found"))
                } else {
                    (
                        reasons::UNREACHABLE,
                        format!("remote user {remote_id} could not be fetched"),
                    )
                };
                warn!(remote_id, error = %e, "remote fetch failed");
                let status = status.with_condition(Condition::unavailable(reason, message));
                return self
                    .persist_status(&user, status, Outcome::RetryAfter(self.config.retry_delay))
                    .await;
            }
        };

        let desired = desired_fields(&user.spec);
        if remote.fields() == desired {
            debug!(remote_id, "remote user in sync");
            let status = status.with_condition(Condition::available(
                ConditionStatus::True,
                reasons::SYNCED,
                format!("remote user {remote_id} in sync"),
            ));
            return self.persist_status(&user, status, Outcome::Converged).await;
        }

        info!(remote_id, "remote user drifted, updating");
        if let Err(e) = self.remote.update(remote_id, &desired).await {
            warn!(remote_id, error = %e, "remote update failed");
            return Outcome::RetryAfter(self.config.retry_delay);
        }

        let status = status.with_condition(Condition::available(
            ConditionStatus::True,
            reasons::UPDATED,
            format!("remote user {remote_id} updated"),
        ));
        self.persist_status(&user, status, Outcome::Converged).await
    }

    /// Attach our finalizer if missing, returning the freshest record
    async fn ensure_finalizer(&self, user: User) -> Result<User, StoreError> {
        if user.has_finalizer() {
            return Ok(user);
        }
        let user = self
            .store
            .update_finalizers(&user, user.finalizers_with_ours())
            .await?;
        debug!("finalizer attached");
        Ok(user)
    }

    /// Write `status`, keeping `outcome` unless the write lost a race
    async fn persist_status(&self, user: &User, status: UserStatus, outcome: Outcome) -> Outcome {
        match self.store.update_status(user, &status).await {
            Ok(()) => outcome,
            Err(StoreError::Conflict { .. }) => {
                debug!("status write conflicted, retrying pass");
                Outcome::RetryAfter(self.config.conflict_delay)
            }
            Err(e) => {
                warn!(error = %e, "failed to persist status");
                outcome
            }
        }
    }

    fn store_write_failed(&self, error: StoreError, action: &str) -> Outcome {
        match error {
            StoreError::NotFound { .. } => {
                debug!(action, "user vanished during pass");
                Outcome::Converged
            }
            StoreError::Conflict { .. } => {
                debug!(action, "write conflicted, retrying pass");
                Outcome::RetryAfter(self.config.conflict_delay)
            }
            e => {
                warn!(action, error = %e, "store write failed");
                Outcome::RetryAfter(self.config.retry_delay)
            }
        }
    }
}
