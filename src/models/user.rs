//! User model for storage and API.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};
#[cfg(feature = "binding-generation")]
use ts_rs::TS;
use uuid::Uuid;
use validator::Validate;

/// User record as stored.
///
/// `password_hash` is an Argon2id PHC string. It is stored but never
/// leaves the service; API responses use [`UserResponse`].
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct User {
    pub id: Uuid,
    pub name: String,
    /// Unique across users (compared case-insensitively)
    pub email: String,
    pub password_hash: String,
    /// Team membership, if any
    pub team_id: Option<Uuid>,
    pub created_at: DateTime<Utc>,
}

/// Public view of a user.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "frontend/src/generated/")
)]
pub struct UserResponse {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    pub team_id: Option<Uuid>,
    pub created_at: DateTime<Utc>,
}

impl From<&User> for UserResponse {
    fn from(user: &User) -> Self {
        Self {
            id: user.id,
            name: user.name.clone(),
            email: user.email.clone(),
            team_id: user.team_id,
            created_at: user.created_at,
        }
    }
}

/// Body of `POST /api/users`.
#[derive(Debug, Deserialize, Validate)]
pub struct CreateUserRequest {
    #[validate(length(min = 1, max = 200))]
    pub name: String,
    #[validate(email)]
    pub email: String,
    #[validate(length(min = 6, max = 200))]
    pub password: String,
    #[serde(default)]
    pub team_id: Option<Uuid>,
}

/// Body of `PATCH /api/users/{id}`. Absent fields are left unchanged;
/// `"team_id": null` removes the user from their team.
#[derive(Debug, Default, Deserialize, Validate)]
pub struct UpdateUserRequest {
    #[validate(length(min = 1, max = 200))]
    pub name: Option<String>,
    #[validate(email)]
    pub email: Option<String>,
    #[validate(length(min = 6, max = 200))]
    pub password: Option<String>,
    #[serde(default, deserialize_with = "present_or_null")]
    pub team_id: Option<Option<Uuid>>,
}

/// Canonical stored form of an email address.
pub fn normalize_email(email: &str) -> String {
    email.trim().to_ascii_lowercase()
}

/// Distinguish a field set to `null` (`Some(None)`) from an absent one (`None`).
pub(crate) fn present_or_null<'de, D, T>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Option::<T>::deserialize(deserializer).map(Some)
}
