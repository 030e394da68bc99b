//! Authentication-related models

use super::{role::Role, user::PublicUser};
use crate::error::AppError;
use secrecy::Secret;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use validator::Validate;

const MISSING_FIELDS: &str = "Username and password are required";

/// Registration request
///
/// Fields are optional at the serde level so that a missing field is
/// reported as `InvalidInput` instead of a deserialization rejection.
#[derive(Deserialize, Validate)]
pub struct RegisterRequest {
    #[validate(required, length(min = 1))]
    pub username: Option<String>,
    #[validate(required, length(min = 1))]
    pub password: Option<String>,
    /// Any JSON value; only the exact string labels select a role.
    pub role: Option<Value>,
}

/// Login request
#[derive(Deserialize, Validate)]
pub struct LoginRequest {
    #[validate(required, length(min = 1))]
    pub username: Option<String>,
    #[validate(required, length(min = 1))]
    pub password: Option<String>,
}

/// Validated credentials; the password lives only inside a `Secret`.
pub struct Credentials {
    pub username: String,
    pub password: Secret<String>,
}

fn credentials(username: Option<String>, password: Option<String>) -> Result<Credentials, AppError> {
    match (username, password) {
        (Some(username), Some(password)) => Ok(Credentials {
            username,
            password: Secret::new(password),
        }),
        _ => Err(AppError::InvalidInput(MISSING_FIELDS.to_string())),
    }
}

impl RegisterRequest {
    /// Validate and split into credentials plus the resolved role.
    pub fn into_parts(self) -> Result<(Credentials, Role), AppError> {
        self.validate()
            .map_err(|_| AppError::InvalidInput(MISSING_FIELDS.to_string()))?;

        let role = Role::from_requested(self.role.as_ref().and_then(Value::as_str));
        Ok((credentials(self.username, self.password)?, role))
    }
}

impl LoginRequest {
    pub fn into_credentials(self) -> Result<Credentials, AppError> {
        self.validate()
            .map_err(|_| AppError::InvalidInput(MISSING_FIELDS.to_string()))?;

        credentials(self.username, self.password)
    }
}

/// Registration response
#[derive(Debug, Serialize)]
pub struct RegisterResponse {
    pub message: String,
    #[serde(flatten)]
    pub user: PublicUser,
}

/// Login response
#[derive(Debug, Serialize)]
pub struct LoginResponse {
    pub message: String,
    pub token: String,
    #[serde(flatten)]
    pub user: PublicUser,
}
