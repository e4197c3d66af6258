//! Remote user types and their wire representations

use serde::{Deserialize, Serialize};

/// The fields the controller pushes to the remote system.
///
/// This is also the drift comparator: two users are in sync when their
/// `UserFields` are equal. `id` and `avatar` never take part.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub struct UserFields {
    /// Email address
    pub email: String,
    /// First name
    pub first_name: String,
    /// Last name, empty when unset
    pub last_name: String,
}

/// A user as reported by the remote system
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct RemoteUser {
    /// Remote-assigned id, always positive
    pub id: u64,
    /// Email address
    pub email: String,
    /// First name
    pub first_name: String,
    /// Last name
    pub last_name: String,
    /// Avatar URL, owned by the remote system
    pub avatar: String,
}

impl RemoteUser {
    /// The comparable subset of this user
    pub fn fields(&self) -> UserFields {
        UserFields {
            email: self.email.clone(),
            first_name: self.first_name.clone(),
            last_name: self.last_name.clone(),
        }
    }
}

/// Body of a 201 answer to `POST /api/users`
#[derive(Debug, Deserialize)]
pub(crate) struct CreateUserResponse {
    /// The remote answers with the id as a string
    pub id: String,
    #[serde(rename = "createdAt", default)]
    pub created_at: Option<String>,
}

/// Body of a 200 answer to `GET /api/users/{id}`
#[derive(Debug, Deserialize)]
pub(crate) struct GetUserResponse {
    pub data: UserData,
}

#[derive(Debug, Deserialize)]
pub(crate) struct UserData {
    pub id: u64,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub first_name: String,
    #[serde(default)]
    pub last_name: String,
    #[serde(default)]
    pub avatar: String,
}

impl From<UserData> for RemoteUser {
    fn from(data: UserData) -> Self {
        Self {
            id: data.id,
            email: data.email,
            first_name: data.first_name,
            last_name: data.last_name,
            avatar: data.avatar,
        }
    }
}
