//! JWT token generation and validation
//! Stateless: a token is valid iff its signature matches and it has not expired

use crate::{
    auth::clock::Clock,
    config::AppConfig,
    error::AppError,
    models::{role::Role, user::PublicUser},
    telemetry,
};
use chrono::Duration;
use jsonwebtoken::{
    decode, encode, errors::ErrorKind, Algorithm, DecodingKey, EncodingKey, Header, Validation,
};
use secrecy::{ExposeSecret, Secret};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use thiserror::Error;

/// JWT claims
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct Claims {
    /// User ID
    pub id: u64,

    /// Username
    pub username: String,

    /// User role
    pub role: Role,

    /// Issued at
    pub iat: i64,

    /// Expiration
    pub exp: i64,
}

/// Why a token was rejected. Callers only ever see "unauthorized".
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum TokenError {
    #[error("malformed token")]
    Malformed,

    #[error("signature mismatch")]
    SignatureInvalid,

    #[error("token expired")]
    Expired,
}

impl TokenError {
    /// Label used in logs and metrics
    pub fn as_str(&self) -> &'static str {
        match self {
            TokenError::Malformed => "malformed",
            TokenError::SignatureInvalid => "signature_invalid",
            TokenError::Expired => "expired",
        }
    }
}

/// JWT service
pub struct TokenService {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    validation: Validation,
    default_ttl: Duration,
    clock: Arc<dyn Clock>,
}

impl TokenService {
    /// Create JWT service from an opaque secret
    pub fn new(
        secret: &Secret<String>,
        default_ttl: Duration,
        clock: Arc<dyn Clock>,
    ) -> Result<Self, AppError> {
        let secret = secret.expose_secret();

        // Ensure secret is at least 32 bytes for HS256
        if secret.len() < 32 {
            return Err(AppError::Config("JWT secret too short (min 32 chars)".to_string()));
        }

        // Expiry is checked against the injected clock after decoding
        let mut validation = Validation::new(Algorithm::HS256);
        validation.validate_exp = false;
        validation.leeway = 0;

        Ok(Self {
            encoding_key: EncodingKey::from_secret(secret.as_bytes()),
            decoding_key: DecodingKey::from_secret(secret.as_bytes()),
            validation,
            default_ttl,
            clock,
        })
    }

    /// Create JWT service from config
    pub fn from_config(config: &AppConfig, clock: Arc<dyn Clock>) -> Result<Self, AppError> {
        let ttl_secs = i64::try_from(config.security.token_ttl_secs)
            .map_err(|_| AppError::Config("token_ttl_secs out of range".to_string()))?;

        Self::new(&config.security.jwt_secret, Duration::seconds(ttl_secs), clock)
    }

    /// Issue a token for `user` valid for `ttl`
    pub fn issue(&self, user: &PublicUser, ttl: Duration) -> Result<String, AppError> {
        let now = self.clock.now();
        let expiration = now + ttl;

        let claims = Claims {
            id: user.id,
            username: user.username.clone(),
            role: user.role,
            iat: now.timestamp(),
            exp: expiration.timestamp(),
        };

        encode(&Header::new(Algorithm::HS256), &claims, &self.encoding_key).map_err(|e| {
            tracing::error!("Failed to encode access token: {:?}", e);
            AppError::Internal(format!("Failed to encode access token: {}", e))
        })
    }

    /// Issue a token with the configured TTL
    pub fn issue_default(&self, user: &PublicUser) -> Result<String, AppError> {
        self.issue(user, self.default_ttl)
    }

    /// Validate and decode token
    ///
    /// The signature is checked before any claim is read; expiry last.
    pub fn verify(&self, token: &str) -> Result<Claims, TokenError> {
        let result = decode::<Claims>(token, &self.decoding_key, &self.validation)
            .map_err(|e| match e.kind() {
                ErrorKind::InvalidSignature => TokenError::SignatureInvalid,
                _ => TokenError::Malformed,
            })
            .and_then(|data| {
                if self.clock.now().timestamp() >= data.claims.exp {
                    Err(TokenError::Expired)
                } else {
                    Ok(data.claims)
                }
            });

        if let Err(kind) = &result {
            tracing::debug!(reason = kind.as_str(), "Token validation failed");
            telemetry::record_token_rejection(kind.as_str());
        }

        result
    }
}
