//! User domain entity and related types.

use chrono::{DateTime, Utc};
use serde::Serialize;
use utoipa::ToSchema;
use uuid::Uuid;

use super::Role;
use crate::config::RESOURCE_TIMESTAMP_FORMAT;

/// User domain entity
#[derive(Debug, Clone, Serialize)]
pub struct User {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    #[serde(skip_serializing)]
    pub password_hash: String,
    /// Assigned roles, sorted and deduplicated
    pub roles: Vec<Role>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl User {
    /// Role names in wire form
    pub fn role_names(&self) -> Vec<String> {
        self.roles.iter().map(|r| r.as_str().to_string()).collect()
    }
}

/// Data for inserting a user together with its role assignment
#[derive(Debug, Clone, PartialEq)]
pub struct NewUser {
    pub name: String,
    pub email: String,
    pub password_hash: String,
    pub role: Role,
}

/// Partial update of a user; `None` leaves the field untouched.
///
/// A `role` replaces the whole role set.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct UserChanges {
    pub name: Option<String>,
    pub email: Option<String>,
    pub password_hash: Option<String>,
    pub role: Option<Role>,
}

impl UserChanges {
    pub fn is_empty(&self) -> bool {
        self.name.is_none()
            && self.email.is_none()
            && self.password_hash.is_none()
            && self.role.is_none()
    }
}

/// Wire shape of a user (safe to return to client)
#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
pub struct UserResource {
    /// Unique user identifier
    #[schema(example = "550e8400-e29b-41d4-a716-446655440000")]
    pub id: Uuid,
    /// User display name
    #[schema(example = "John Doe")]
    pub name: String,
    /// User email address
    #[schema(example = "user@example.com")]
    pub email: String,
    /// Names of the roles attached to the user.
    ///
    /// Always a JSON array, even when the user holds a single role
    /// (`["user"]`, never `"user"`).
    #[schema(example = json!(["user"]))]
    pub role: Vec<String>,
    /// Creation time, `MM/DD/YYYY HH:mm:ss`
    #[schema(example = "01/31/2024 09:05:00")]
    pub created_at: String,
    /// Last update time, `MM/DD/YYYY HH:mm:ss`
    #[schema(example = "01/31/2024 09:05:00")]
    pub updated_at: String,
}

/// Render a timestamp the way user resources expose it
pub fn format_timestamp(at: &DateTime<Utc>) -> String {
    at.format(RESOURCE_TIMESTAMP_FORMAT).to_string()
}

impl From<&User> for UserResource {
    fn from(user: &User) -> Self {
        Self {
            id: user.id,
            name: user.name.clone(),
            email: user.email.clone(),
            role: user.role_names(),
            created_at: format_timestamp(&user.created_at),
            updated_at: format_timestamp(&user.updated_at),
        }
    }
}

impl From<User> for UserResource {
    fn from(user: User) -> Self {
        UserResource::from(&user)
    }
}
