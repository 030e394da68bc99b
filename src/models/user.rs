//! User domain models

use super::role::Role;
use chrono::{DateTime, Utc};
use secrecy::Secret;
use serde::Serialize;

/// Stored user account.
///
/// Not serializable: only [`PublicUser`] leaves the service. The digest is
/// wrapped in `Secret` so it is redacted from `Debug` output.
#[derive(Debug, Clone)]
pub struct User {
    pub id: u64,
    pub username: String,
    pub password_hash: Secret<String>,
    pub role: Role,
    pub created_at: DateTime<Utc>,
}

/// User about to be inserted; the repository assigns the id.
#[derive(Debug)]
pub struct NewUser {
    pub username: String,
    pub password_hash: Secret<String>,
    pub role: Role,
}

/// User response (without sensitive data)
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PublicUser {
    pub id: u64,
    pub username: String,
    pub role: Role,
}

impl From<&User> for PublicUser {
    fn from(user: &User) -> Self {
        Self {
            id: user.id,
            username: user.username.clone(),
            role: user.role,
        }
    }
}

impl From<User> for PublicUser {
    fn from(user: User) -> Self {
        Self {
            id: user.id,
            username: user.username,
            role: user.role,
        }
    }
}
