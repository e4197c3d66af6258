//! HTTP implementation of the remote users API

use std::time::Duration;

use async_trait::async_trait;
#[cfg(test)]
use mockall::automock;
use reqwest::StatusCode;
use tracing::debug;

use crate::error::ClientError;
use crate::types::{CreateUserResponse, GetUserResponse, RemoteUser, UserFields};

/// Request timeout used when none is configured
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

const USERS_PATH: &str = "/api/users";

/// CRUD operations on the remote users collection.
///
/// Abstracted so the reconciler can be tested against a mock.
#[cfg_attr(test, automock)]
#[async_trait]
pub trait RemoteUsers: Send + Sync {
    /// Create a user. Only `id` is populated on the returned user.
    async fn create(&self, fields: &UserFields) -> Result<RemoteUser, ClientError>;

    /// Fetch a user by id
    async fn get(&self, id: u64) -> Result<RemoteUser, ClientError>;

    /// Overwrite the pushed fields of an existing user
    async fn update(&self, id: u64, fields: &UserFields) -> Result<(), ClientError>;

    /// Delete a user. `true` means the remote confirmed the delete.
    async fn delete(&self, id: u64) -> Result<bool, ClientError>;
}

/// Connection settings for [`ReqresClient`]
#[derive(Clone, Debug)]
pub struct ClientConfig {
    /// Scheme and host of the remote API, e.g. `https://reqres.in`
    pub base_url: String,
    /// Per-request timeout
    pub timeout: Duration,
}

impl ClientConfig {
    /// Config for `base_url` with the default timeout
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            timeout: DEFAULT_TIMEOUT,
        }
    }
}

/// [`RemoteUsers`] over reqwest
#[derive(Clone, Debug)]
pub struct ReqresClient {
    http: reqwest::Client,
    base_url: String,
}

impl ReqresClient {
    /// Build a client. Fails only if the TLS backend cannot be initialized.
    pub fn new(config: ClientConfig) -> Result<Self, ClientError> {
        let http = reqwest::Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|source| ClientError::Transport { source })?;

        Ok(Self {
            http,
            base_url: config.base_url.trim_end_matches('/').to_string(),
        })
    }

    /// The base URL requests are sent to
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn collection_url(&self) -> String {
        format!("{}{}", self.base_url, USERS_PATH)
    }

    fn user_url(&self, id: u64) -> String {
        format!("{}{}/{}", self.base_url, USERS_PATH, id)
    }
}

#[async_trait]
impl RemoteUsers for ReqresClient {
    async fn create(&self, fields: &UserFields) -> Result<RemoteUser, ClientError> {
        let response = self
            .http
            .post(self.collection_url())
            .json(fields)
            .send()
            .await?;

        let status = response.status();
        if status != StatusCode::CREATED {
            return Err(ClientError::UnexpectedStatus {
                operation: "create",
                status: status.as_u16(),
            });
        }

        let body: CreateUserResponse = response.json().await?;
        let id = parse_remote_id(&body.id)?;
        debug!(remote_id = id, created_at = ?body.created_at, "remote user created");

        Ok(RemoteUser {
            id,
            ..Default::default()
        })
    }

    async fn get(&self, id: u64) -> Result<RemoteUser, ClientError> {
        let response = self.http.get(self.user_url(id)).send().await?;

        let status = response.status();
        if status != StatusCode::OK {
            return Err(ClientError::NotFound {
                id,
                status: status.as_u16(),
            });
        }

        let body: GetUserResponse = response.json().await?;
        Ok(body.data.into())
    }

    async fn update(&self, id: u64, fields: &UserFields) -> Result<(), ClientError> {
        let response = self
            .http
            .patch(self.user_url(id))
            .json(fields)
            .send()
            .await?;

        let status = response.status();
        if status != StatusCode::NO_CONTENT {
            return Err(ClientError::UnexpectedStatus {
                operation: "update",
                status: status.as_u16(),
            });
        }
        Ok(())
    }

    async fn delete(&self, id: u64) -> Result<bool, ClientError> {
        let response = self.http.delete(self.user_url(id)).send().await?;

        let status = response.status();
        if status != StatusCode::NO_CONTENT {
            return Err(ClientError::UnexpectedStatus {
                operation: "delete",
                status: status.as_u16(),
            });
        }
        Ok(true)
    }
}

/// The remote hands out ids as strings; zero or garbage means no usable id.
fn parse_remote_id(raw: &str) -> Result<u64, ClientError> {
    match raw.trim().parse::<u64>() {
        Ok(id) if id > 0 => Ok(id),
        _ => Err(ClientError::decode(format!(
            "remote id {raw:?} is not a positive integer"
        ))),
    }
}
