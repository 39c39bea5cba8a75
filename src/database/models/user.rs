use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// Account role. `Admin` accounts can only come from the bootstrap seed;
/// no API operation creates or promotes to admin.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "user_role", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Admin,
    Realtor,
    Client,
}

impl Role {
    pub fn as_str(self) -> &'static str {
        match self {
            Role::Admin => "admin",
            Role::Realtor => "realtor",
            Role::Client => "client",
        }
    }
}

#[derive(Debug, Clone, Serialize, FromRow)]
pub struct User {
    pub id: Uuid,
    /// Never leaves the process: skipped on serialization.
    #[serde(skip_serializing)]
    pub password_hash: String,
    pub email: String,
    pub firstname: String,
    pub lastname: String,
    pub role: Role,
    pub verified: bool,
    pub created: DateTime<Utc>,
}

/// Insert payload for the user directory
#[derive(Debug, Clone)]
pub struct NewUser {
    pub email: String,
    pub password_hash: String,
    pub firstname: String,
    pub lastname: String,
    pub role: Role,
    pub verified: bool,
}

/// Partial update; absent fields are left untouched
#[derive(Debug, Clone, Default)]
pub struct UserChanges {
    pub email: Option<String>,
    pub password_hash: Option<String>,
    pub firstname: Option<String>,
    pub lastname: Option<String>,
    pub role: Option<Role>,
    pub verified: Option<bool>,
}

impl UserChanges {
    pub fn is_empty(&self) -> bool {
        self.email.is_none()
            && self.password_hash.is_none()
            && self.firstname.is_none()
            && self.lastname.is_none()
            && self.role.is_none()
            && self.verified.is_none()
    }
}
